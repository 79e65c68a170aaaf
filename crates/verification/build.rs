//! Build script for the verification crate
//!
//! Compiles the probe programs in `wgsl/probes.yaml` through the same linkage
//! checks as the library's operation programs and embeds them as constants.

use vertex_interchange_build::programs::CompiledProgram;

/// Converts WGSL shader source into a Rust string literal
fn dump_shader_string_literal(shader: &str) -> String {
    let escaped_shader = shader.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
    format!("\"{}\"", escaped_shader)
}

/// Generates Rust code for a Probe constant
fn dump_probe(program: &CompiledProgram) -> String {
    let mut output = String::new();
    output.push_str("Probe {\n");
    output.push_str(&format!("    id: \"{}\",\n", program.id));
    output.push_str(&format!("    name: \"{}\",\n", program.name));
    output.push_str(&format!("    shader: {},\n", dump_shader_string_literal(&program.shader)));
    output.push_str(&format!("    vertex_entry: \"{}\",\n", program.vertex_entry));
    output.push_str(&format!("    fragment_entry: \"{}\",\n", program.fragment_entry));
    output.push_str(&format!("    inputs: {},\n", program.inputs));
    output.push('}');
    output
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let crate_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let manifest_path = crate_dir.join("wgsl").join("probes.yaml");
    let manifest_path = manifest_path.to_str().ok_or("Failed to convert path to string")?;

    println!("cargo:rerun-if-changed=wgsl");
    println!("cargo:rerun-if-changed=../vertex-interchange/wgsl/operation_shader_types.wgsl");

    let probes = vertex_interchange_build::compile_manifest_file(manifest_path, false)?;

    let mut code = String::new();
    code.push_str("// This file is auto-generated by build.rs\n\n");
    code.push_str("use crate::roundtrip_engine::Probe;\n\n");
    for probe in &probes {
        if let Some(description) = &probe.description {
            code.push_str(&format!("/// {description}\n"));
        }
        code.push_str(&format!("pub const {}: Probe = {};\n\n", probe.id, dump_probe(probe)));
    }

    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);
    std::fs::write(out_dir.join("probes.rs"), code)?;

    Ok(())
}
