//! Vertex interchange build utilities
//!
//! This crate provides the build-time half of the vertex interchange format:
//! include resolution for WGSL sources, extraction and comparison of stage
//! interfaces, resource reflection, and compilation of program manifests into
//! checked, self-contained WGSL programs. A vertex/fragment pair that disagrees
//! on its interchange record is rejected here, before any pipeline is built.

mod minify;

pub mod include;
pub mod interface;
pub mod programs;
pub mod resources;

pub use minify::minify_wgsl;

/// Compiles every program of a YAML manifest file
///
/// WGSL files are loaded relative to the manifest directory.
///
/// # Arguments
/// * `manifest_filepath` - Path to the YAML manifest file
/// * `minify` - Whether to minify the WGSL code
///
/// # Returns
/// The compiled programs in manifest order
pub fn compile_manifest_file(manifest_filepath: &str, minify: bool) -> Result<Vec<programs::CompiledProgram>, std::boxed::Box<dyn std::error::Error>> {
    let dir = std::path::Path::new(manifest_filepath).parent().unwrap_or(std::path::Path::new("."));
    let manifest = programs::ProgramManifest::from_file(manifest_filepath)?;
    programs::CompiledProgram::compile_manifest(
        &manifest,
        |filename: &str| {
            let path = dir.join(filename);
            std::fs::read_to_string(&path).inspect_err(|e| {
                eprintln!("Error reading file {path:?}: {e}");
            })
        },
        minify,
    )
}
