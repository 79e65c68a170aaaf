//! Program compilation
//!
//! Turns a `ProgramSpec` into a `CompiledProgram`: a single self-contained WGSL
//! module whose vertex and fragment stages are known to link through one of
//! the interchange records.

use super::{ProgramManifest, ProgramSpec, ProgramValidationError};
use crate::include::resolve_includes;
use crate::interface::{StageInterface, check_linkage, check_record, contract_for_inputs};
use crate::minify::minify_wgsl;
use crate::resources::{ShaderResources, reflect_resources};
use serde::Serialize;

/// A fully resolved and checked operation program
#[derive(Debug, Clone, Serialize)]
pub struct CompiledProgram {
    /// Identifier, also the generated constant name
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Self-contained WGSL source with all includes resolved
    pub shader: String,
    /// Vertex entry point
    pub vertex_entry: String,
    /// Fragment entry point
    pub fragment_entry: String,
    /// Number of input textures
    pub inputs: u32,
    /// Interface shared by the two stages
    pub interface: StageInterface,
    /// Bound resources
    pub resources: ShaderResources,
}

impl CompiledProgram {
    /// Compiles a program specification
    ///
    /// # Arguments
    /// * `spec` - The program specification
    /// * `load_file` - Loads a WGSL file by its path relative to the manifest
    /// * `minify` - Whether to minify the resulting WGSL code
    ///
    /// # Returns
    /// The compiled program, or the first parse, validation, linkage or
    /// reflection error encountered
    pub fn compile<F>(spec: &ProgramSpec, load_file: F, minify: bool) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: FnMut(&str) -> Result<String, std::io::Error>,
    {
        let fragment_entry = spec
            .fragment
            .entry
            .clone()
            .ok_or_else(|| ProgramValidationError::MissingFragmentEntry(spec.id.clone()))?;
        let vertex_entry = spec.vertex_entry().to_string();

        // Both stages include the interchange header; it is spliced in once
        let root = format!("#include \"{}\"\n#include \"{}\"\n", spec.vertex_file(), spec.fragment.file);
        let source = resolve_includes(&root, "", load_file)?;

        let module = naga::front::wgsl::parse_str(&source).map_err(|e| format!("Failed to parse program '{}': {}", spec.id, e.emit_to_string(&source)))?;
        let mut validator = naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all());
        validator
            .validate(&module)
            .map_err(|e| format!("Failed to validate program '{}': {e}", spec.id))?;

        let interface = check_linkage(&module, &vertex_entry, &fragment_entry)?;
        let contract = contract_for_inputs(spec.inputs).ok_or_else(|| ProgramValidationError::UnsupportedInputCount(spec.id.clone(), spec.inputs))?;
        check_record(&interface, contract)?;

        let mut resources = reflect_resources(&module)?;
        validate_resources(spec, &resources)?;
        apply_uniform_defaults(spec, &mut resources)?;

        let shader = if minify { minify_wgsl(&source, &[vertex_entry.as_str(), fragment_entry.as_str()])? } else { source };

        Ok(Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            description: spec.description.clone(),
            shader,
            vertex_entry,
            fragment_entry,
            inputs: spec.inputs,
            interface,
            resources,
        })
    }

    /// Compiles every program of a manifest
    ///
    /// # Arguments
    /// * `manifest` - The parsed manifest
    /// * `load_file` - Loads a WGSL file by its path relative to the manifest
    /// * `minify` - Whether to minify the resulting WGSL code
    pub fn compile_manifest<F>(manifest: &ProgramManifest, mut load_file: F, minify: bool) -> Result<Vec<Self>, Box<dyn std::error::Error>>
    where
        F: FnMut(&str) -> Result<String, std::io::Error>,
    {
        manifest.validate()?;
        manifest
            .programs
            .iter()
            .map(|spec| Self::compile(spec, &mut load_file, minify).map_err(|e| -> Box<dyn std::error::Error> { format!("Program '{}': {e}", spec.id).into() }))
            .collect()
    }
}

fn apply_uniform_defaults(spec: &ProgramSpec, resources: &mut ShaderResources) -> Result<(), ProgramValidationError> {
    for (name, value) in &spec.uniform_defaults {
        let field = resources
            .uniform
            .as_mut()
            .and_then(|block| block.fields.iter_mut().find(|field| &field.name == name))
            .ok_or_else(|| ProgramValidationError::UnknownUniformDefault {
                id: spec.id.clone(),
                name: name.clone(),
            })?;
        field.default = *value;
    }
    Ok(())
}

/// Programs either bind no textures (probes) or exactly one per input plus one sampler
fn validate_resources(spec: &ProgramSpec, resources: &ShaderResources) -> Result<(), ProgramValidationError> {
    if resources.textures.is_empty() {
        return Ok(());
    }
    if resources.textures.len() != spec.inputs as usize {
        return Err(ProgramValidationError::TextureCountMismatch {
            id: spec.id.clone(),
            inputs: spec.inputs,
            textures: resources.textures.len(),
        });
    }
    if resources.samplers.len() != 1 {
        return Err(ProgramValidationError::SamplerCountMismatch {
            id: spec.id.clone(),
            samplers: resources.samplers.len(),
        });
    }
    Ok(())
}
