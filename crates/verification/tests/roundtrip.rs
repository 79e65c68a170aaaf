//! GPU round trips through probe and operation programs
//!
//! Every test skips when no wgpu adapter is available.

use vertex_interchange::{
    ImageOrientation, RenderError, RenderOperation, ShaderProgram, SingleInputVertexIO, TwoInputVertexIO, UniformFieldLayout, UniformLayout, luminance, programs,
};
use vertex_interchange_verification::{
    compare::{CompareResult, compare_images, compare_pixels},
    probes,
    roundtrip_engine::RoundTripEngine,
};

/// Tolerance for values that pass through interpolation unchanged
const EXACT: f32 = 1e-5;
/// Tolerance for values sampled from 8-bit textures
const SAMPLED: f32 = 2e-3;

async fn engine() -> Option<RoundTripEngine> {
    match RoundTripEngine::new().await {
        Ok(engine) => Some(engine),
        Err(e) => {
            eprintln!("Skipping GPU test: {e}");
            None
        }
    }
}

/// Stages that write the aspect ratio uniform or the interpolated texture coordinate
const OPERATION_OUTPUT_SHADER: &str = concat!(
    include_str!("../../vertex-interchange/wgsl/operation_shader_types.wgsl"),
    r#"
@vertex
fn one_input_vertex(@location(0) position: vec2<f32>, @location(1) texture_coordinate: vec2<f32>) -> SingleInputVertexIO {
    var output: SingleInputVertexIO;
    output.position = vec4<f32>(position, 0.0, 1.0);
    output.texture_coordinate = texture_coordinate;
    return output;
}

struct AspectRatioUniform {
    aspectRatio: f32,
}
@group(0) @binding(0) var<uniform> uniforms: AspectRatioUniform;

@fragment
fn aspect_ratio_fragment(fragment_input: SingleInputVertexIO) -> @location(0) vec4<f32> {
    return vec4<f32>(uniforms.aspectRatio, 0.0, 0.0, 1.0);
}

@fragment
fn texture_coordinate_fragment(fragment_input: SingleInputVertexIO) -> @location(0) vec4<f32> {
    return vec4<f32>(fragment_input.texture_coordinate, 0.0, 1.0);
}
"#
);

const ASPECT_RATIO_OUTPUT: ShaderProgram = ShaderProgram {
    id: "ASPECT_RATIO_OUTPUT",
    name: "Aspect Ratio Output",
    shader: OPERATION_OUTPUT_SHADER,
    vertex_entry: "one_input_vertex",
    fragment_entry: "aspect_ratio_fragment",
    inputs: 1,
    texture_bindings: &[],
    sampler_binding: None,
    uniform: Some(UniformLayout {
        binding: 0,
        size: 4,
        fields: &[UniformFieldLayout {
            name: "aspectRatio",
            offset: 0,
            components: 1,
            default: 0.0,
        }],
    }),
};

const TEXTURE_COORDINATE_OUTPUT: ShaderProgram = ShaderProgram {
    id: "TEXTURE_COORDINATE_OUTPUT",
    name: "Texture Coordinate Output",
    fragment_entry: "texture_coordinate_fragment",
    uniform: None,
    ..ASPECT_RATIO_OUTPUT
};

fn rgba_image(width: u32, height: u32, pixels: &[[u8; 4]]) -> image::DynamicImage {
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_raw(width, height, pixels.concat()).unwrap())
}

fn rgba32f_image(width: u32, height: u32, pixels: &[[f32; 4]]) -> image::Rgba32FImage {
    image::Rgba32FImage::from_raw(width, height, pixels.concat()).unwrap()
}

#[tokio::test]
async fn test_single_input_record_round_trips() {
    let Some(engine) = engine().await else { return };

    let record = SingleInputVertexIO::new([0.0, 0.0, 0.0, 1.0], [0.5, 0.5]);
    let pixel = engine.round_trip(&probes::SINGLE_INPUT_PROBE, &record).unwrap();

    assert_eq!(compare_pixels([0.5, 0.5, 0.0, 1.0], pixel, EXACT), CompareResult::Match, "{pixel:?}");
}

#[tokio::test]
async fn test_two_input_coordinates_are_preserved_independently() {
    let Some(engine) = engine().await else { return };

    let record = TwoInputVertexIO::new([0.0, 0.0, 0.0, 1.0], [0.0, 0.0], [1.0, 1.0]);
    let pixel = engine.round_trip(&probes::TWO_INPUT_PROBE, &record).unwrap();
    assert_eq!(compare_pixels([0.0, 0.0, 1.0, 1.0], pixel, EXACT), CompareResult::Match, "{pixel:?}");

    let mut mutated = record;
    mutated.texture_coordinate2 = [0.25, 0.75];
    let pixel = engine.round_trip(&probes::TWO_INPUT_PROBE, &mutated).unwrap();
    assert_eq!(compare_pixels([0.0, 0.0, 0.25, 0.75], pixel, EXACT), CompareResult::Match, "{pixel:?}");
}

#[tokio::test]
async fn test_record_must_match_probe() {
    let Some(engine) = engine().await else { return };

    let record = SingleInputVertexIO::new([0.0, 0.0, 0.0, 1.0], [0.5, 0.5]);
    assert!(engine.round_trip(&probes::TWO_INPUT_PROBE, &record).is_err());
}

#[tokio::test]
async fn test_passthrough_applies_orientation() {
    let Some(engine) = engine().await else { return };

    let input = rgba_image(2, 1, &[[255, 0, 0, 255], [0, 255, 0, 255]]);

    let output = engine.run_operation(&programs::PASSTHROUGH, &[(&input, ImageOrientation::Portrait)], &[]).unwrap();
    let expected = rgba32f_image(2, 1, &[[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
    assert_eq!(compare_images(&expected, &output, SAMPLED), CompareResult::Match);

    // A landscape-left input is rotated clockwise into a portrait output
    let output = engine.run_operation(&programs::PASSTHROUGH, &[(&input, ImageOrientation::LandscapeLeft)], &[]).unwrap();
    let expected = rgba32f_image(1, 2, &[[0.0, 1.0, 0.0, 1.0], [1.0, 0.0, 0.0, 1.0]]);
    assert_eq!(compare_images(&expected, &output, SAMPLED), CompareResult::Match);
}

#[tokio::test]
async fn test_luminance_uses_shared_weighting() {
    let Some(engine) = engine().await else { return };

    let input = rgba_image(3, 1, &[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]);
    let output = engine.run_operation(&programs::LUMINANCE, &[(&input, ImageOrientation::Portrait)], &[]).unwrap();

    let expected = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]].map(|rgb| {
        let grey = luminance(rgb);
        [grey, grey, grey, 1.0]
    });
    assert_eq!(compare_images(&rgba32f_image(3, 1, &expected), &output, SAMPLED), CompareResult::Match);
}

#[tokio::test]
async fn test_gamma_uniform() {
    let Some(engine) = engine().await else { return };

    let input = rgba_image(1, 1, &[[51, 102, 255, 255]]);

    // The default gamma leaves the input unchanged
    let output = engine.run_operation(&programs::GAMMA_ADJUSTMENT, &[(&input, ImageOrientation::Portrait)], &[]).unwrap();
    assert_eq!(compare_images(&rgba32f_image(1, 1, &[[0.2, 0.4, 1.0, 1.0]]), &output, SAMPLED), CompareResult::Match);

    let output = engine.run_operation(&programs::GAMMA_ADJUSTMENT, &[(&input, ImageOrientation::Portrait)], &[("gamma", 2.0)]).unwrap();
    assert_eq!(compare_images(&rgba32f_image(1, 1, &[[0.04, 0.16, 1.0, 1.0]]), &output, SAMPLED), CompareResult::Match);
}

#[tokio::test]
async fn test_dissolve_blend_mixes_two_inputs() {
    let Some(engine) = engine().await else { return };

    let black = rgba_image(1, 1, &[[0, 0, 0, 255]]);
    let white = rgba_image(1, 1, &[[255, 255, 255, 255]]);
    let inputs = [(&black, ImageOrientation::Portrait), (&white, ImageOrientation::Portrait)];

    let output = engine.run_operation(&programs::DISSOLVE_BLEND, &inputs, &[("mix_percent", 0.25)]).unwrap();
    assert_eq!(compare_images(&rgba32f_image(1, 1, &[[0.25, 0.25, 0.25, 1.0]]), &output, SAMPLED), CompareResult::Match);
}

#[tokio::test]
async fn test_operation_rejects_wrong_input_count() {
    let Some(engine) = engine().await else { return };

    let input = rgba_image(1, 1, &[[0, 0, 0, 255]]);
    assert!(engine.run_operation(&programs::DISSOLVE_BLEND, &[(&input, ImageOrientation::Portrait)], &[]).is_err());
    assert!(engine.run_operation(&programs::PASSTHROUGH, &[(&input, ImageOrientation::Portrait)], &[("gamma", 1.0)]).is_err());
}

#[tokio::test]
async fn test_unrenderable_target_format_is_an_error() {
    let Some(engine) = engine().await else { return };

    let error = RenderOperation::new(engine.device(), &programs::PASSTHROUGH, wgpu::TextureFormat::Rgb9e5Ufloat).unwrap_err();
    assert!(matches!(
        error,
        RenderError::PipelineCreation {
            program: "PASSTHROUGH",
            format: wgpu::TextureFormat::Rgb9e5Ufloat,
            ..
        }
    ));

    assert!(matches!(engine.target_format(), wgpu::TextureFormat::Rgba32Float | wgpu::TextureFormat::Rgba16Float));
    assert!(RenderOperation::new(engine.device(), &programs::PASSTHROUGH, engine.target_format()).is_ok());
}

#[tokio::test]
async fn test_aspect_ratio_uniform_follows_first_input() {
    let Some(engine) = engine().await else { return };

    let input = rgba_image(4, 2, &[[0, 0, 0, 255]; 8]);

    let output = engine.run_operation(&ASPECT_RATIO_OUTPUT, &[(&input, ImageOrientation::Portrait)], &[]).unwrap();
    assert_eq!(compare_images(&rgba32f_image(4, 2, &[[0.5, 0.0, 0.0, 1.0]; 8]), &output, EXACT), CompareResult::Match);

    // Height over width of the stored texture, even when the output is rotated
    let output = engine.run_operation(&ASPECT_RATIO_OUTPUT, &[(&input, ImageOrientation::LandscapeLeft)], &[]).unwrap();
    assert_eq!(compare_images(&rgba32f_image(2, 4, &[[0.5, 0.0, 0.0, 1.0]; 8]), &output, EXACT), CompareResult::Match);
}

#[tokio::test]
async fn test_texture_coordinates_in_texels() {
    let Some(engine) = engine().await else { return };

    let input = rgba_image(4, 2, &[[0, 0, 0, 255]; 8]);
    let pixel_centers = |scale_x: f32, scale_y: f32| {
        let pixels: Vec<[f32; 4]> = (0..2)
            .flat_map(|y| (0..4).map(move |x| [(x as f32 + 0.5) * scale_x, (y as f32 + 0.5) * scale_y, 0.0, 1.0]))
            .collect();
        rgba32f_image(4, 2, &pixels)
    };

    let output = engine.run_operation(&TEXTURE_COORDINATE_OUTPUT, &[(&input, ImageOrientation::Portrait)], &[]).unwrap();
    assert_eq!(compare_images(&pixel_centers(0.25, 0.5), &output, SAMPLED), CompareResult::Match);

    let output = engine
        .run_configured_operation(&TEXTURE_COORDINATE_OUTPUT, &[(&input, ImageOrientation::Portrait)], |operation| {
            operation.set_use_normalized_texture_coordinates(false);
            Ok(())
        })
        .unwrap();
    assert_eq!(compare_images(&pixel_centers(1.0, 1.0), &output, SAMPLED), CompareResult::Match);
}
