//! Build script for vertex-interchange crate
//!
//! This build script compiles the operation programs listed in `wgsl/programs.yaml`
//! and embeds them as Rust constants. Every program's vertex stage is checked
//! against its fragment stage here, so a pair that disagrees on its interchange
//! record fails the build instead of misreading data at runtime.

use vertex_interchange_build::programs::CompiledProgram;

/// Converts WGSL shader source into a Rust string literal
fn dump_shader_string_literal(shader: &str) -> String {
    // Escape special characters for Rust string literal
    let escaped_shader = shader.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
    format!("\"{}\"", escaped_shader)
}

/// Formats an f32 so the generated code always reads as a float literal
fn dump_f32(value: f32) -> String {
    format!("{value:?}")
}

/// Generates Rust code for a ShaderProgram constant
fn dump_shader_program(program: &CompiledProgram) -> String {
    let mut output = String::new();
    output.push_str("ShaderProgram {\n");
    output.push_str(&format!("    id: \"{}\",\n", program.id));
    output.push_str(&format!("    name: \"{}\",\n", program.name));
    output.push_str(&format!("    shader: {},\n", dump_shader_string_literal(&program.shader)));
    output.push_str(&format!("    vertex_entry: \"{}\",\n", program.vertex_entry));
    output.push_str(&format!("    fragment_entry: \"{}\",\n", program.fragment_entry));
    output.push_str(&format!("    inputs: {},\n", program.inputs));

    // Generate resource bindings
    let textures = program.resources.textures.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
    output.push_str(&format!("    texture_bindings: &[{textures}],\n"));
    match program.resources.samplers.first() {
        Some(binding) => output.push_str(&format!("    sampler_binding: Some({binding}),\n")),
        None => output.push_str("    sampler_binding: None,\n"),
    }

    // Generate the uniform block layout
    match &program.resources.uniform {
        Some(block) => {
            output.push_str("    uniform: Some(UniformLayout {\n");
            output.push_str(&format!("        binding: {},\n", block.binding));
            output.push_str(&format!("        size: {},\n", block.size));
            output.push_str("        fields: &[\n");
            for field in &block.fields {
                output.push_str("            UniformFieldLayout {\n");
                output.push_str(&format!("                name: \"{}\",\n", field.name));
                output.push_str(&format!("                offset: {},\n", field.offset));
                output.push_str(&format!("                components: {},\n", field.components));
                output.push_str(&format!("                default: {},\n", dump_f32(field.default)));
                output.push_str("            },\n");
            }
            output.push_str("        ],\n");
            output.push_str("    }),\n");
        }
        None => output.push_str("    uniform: None,\n"),
    }

    output.push('}');
    output
}

/// Generates the complete programs.rs file with all program constants
fn write_code() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let manifest_path = manifest_dir.join("wgsl").join("programs.yaml");
    let manifest_path = manifest_path.to_str().expect("Failed to convert path to string");

    println!("cargo:rerun-if-changed=wgsl");

    let programs = vertex_interchange_build::compile_manifest_file(manifest_path, true).unwrap_or_else(|e| panic!("Failed to compile {manifest_path}: {e}"));

    let mut code = String::new();

    // File header
    code.push_str("// This file is generated by the build script.\n\n");
    code.push_str("use crate::shader_program::*;\n\n");

    for program in &programs {
        if let Some(description) = &program.description {
            code.push_str(&format!("/// {description}\n"));
        }
        code.push_str(&format!("pub const {}: ShaderProgram = {};\n\n", program.id, dump_shader_program(program)));
    }

    // Generate the list of all programs in manifest order
    let ids = programs.iter().map(|program| format!("&{}", program.id)).collect::<Vec<_>>().join(", ");
    code.push_str(&format!("/// Every program in manifest order\npub const ALL: &[&ShaderProgram] = &[{ids}];\n\n"));

    code.push_str("// END OF GENERATED CODE\n");

    // Write the generated code to the build output directory
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    let output_path = std::path::PathBuf::from(out_dir).join("programs.rs");
    std::fs::write(output_path, code).expect("Failed to write programs.rs");
}

/// Build script main function
fn main() {
    write_code();
}
