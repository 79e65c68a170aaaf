//! Round-trip verification binary
//!
//! Pushes interchange records through the probe programs on the default
//! adapter and checks that the fragment stage receives them unchanged. When an
//! input image and output directory are given, also renders every operation
//! program over the image and saves the results.

use vertex_interchange::{ImageOrientation, SingleInputVertexIO, TwoInputVertexIO, programs};
use vertex_interchange_verification::{
    compare::{CompareResult, compare_pixels},
    probes,
    roundtrip_engine::RoundTripEngine,
    wgpu_helpers::save_image_file,
};

/// Tolerance for values that pass through interpolation unchanged
const TOLERANCE: f32 = 1e-5;

fn report(name: &str, expected: [f32; 4], actual: [f32; 4]) -> bool {
    match compare_pixels(expected, actual, TOLERANCE) {
        CompareResult::Match => {
            println!("✓ {name}: {actual:?}");
            true
        }
        result => {
            eprintln!("✗ {name}: expected {expected:?}, got {actual:?} ({result:?})");
            false
        }
    }
}

fn render_operations(engine: &RoundTripEngine, input_path: &str, output_dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let input_image = image::open(input_path).map_err(|e| format!("Failed to open input image: {e}"))?;
    std::fs::create_dir_all(output_dir)?;

    for &program in programs::ALL {
        let inputs = vec![(&input_image, ImageOrientation::Portrait); program.inputs as usize];
        let output = match engine.run_operation(program, &inputs, &[]) {
            Ok(output) => output,
            Err(e) => {
                eprintln!("✗ Error rendering {}: {e}", program.id);
                continue;
            }
        };

        let output_path = std::path::Path::new(output_dir).join(format!("{}.png", program.id.to_lowercase()));
        save_image_file(output, &output_path)?;
        println!("✓ Rendered {} to {}", program.id, output_path.display());
    }

    Ok(())
}

/// Optional `<input_image> <output_dir>` pair following the program name
fn render_arguments(args: &[String]) -> Result<Option<(&str, &str)>, String> {
    match args {
        [_] => Ok(None),
        [_, input_path, output_dir] => Ok(Some((input_path.as_str(), output_dir.as_str()))),
        _ => {
            let program = args.first().map_or("verify_roundtrip", String::as_str);
            Err(format!("Usage: {program} [<input_image> <output_dir>]"))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().collect();
    let render_arguments = match render_arguments(&args) {
        Ok(render_arguments) => render_arguments,
        Err(usage) => {
            eprintln!("{usage}");
            std::process::exit(1);
        }
    };

    let engine = RoundTripEngine::new().await?;
    let mut passed = true;

    let single = SingleInputVertexIO::new([0.0, 0.0, 0.0, 1.0], [0.5, 0.5]);
    passed &= report("SingleInputVertexIO", [0.5, 0.5, 0.0, 1.0], engine.round_trip(&probes::SINGLE_INPUT_PROBE, &single)?);

    let two = TwoInputVertexIO::new([0.0, 0.0, 0.0, 1.0], [0.0, 0.0], [1.0, 1.0]);
    passed &= report("TwoInputVertexIO", [0.0, 0.0, 1.0, 1.0], engine.round_trip(&probes::TWO_INPUT_PROBE, &two)?);

    let mut mutated = two;
    mutated.texture_coordinate2 = [0.25, 0.75];
    passed &= report("TwoInputVertexIO (second coordinate changed)", [0.0, 0.0, 0.25, 0.75], engine.round_trip(&probes::TWO_INPUT_PROBE, &mutated)?);

    if let Some((input_path, output_dir)) = render_arguments {
        render_operations(&engine, input_path, output_dir)?;
    }

    if passed { Ok(()) } else { Err("Round trip verification failed".into()) }
}
