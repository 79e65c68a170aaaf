//! Program descriptors embedded by the build script
//!
//! Every manifest program becomes a `ShaderProgram` constant in
//! [`programs`](crate::programs). The WGSL source already contains the
//! interchange header, and its resource bindings were reflected from the
//! shader itself, so host code never restates them.

use crate::vertex_io::{FieldLayout, SingleInputVertexIO, TwoInputVertexIO, VertexRecord};

/// One member of a program's uniform block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformFieldLayout {
    pub name: &'static str,
    /// Byte offset inside the block
    pub offset: u32,
    /// Number of f32 words, including the column padding of `mat3x3`
    pub components: u32,
    /// Initial value of every component
    pub default: f32,
}

/// The uniform block bound to a program's fragment stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformLayout {
    pub binding: u32,
    /// Byte size of the WGSL struct
    pub size: u32,
    pub fields: &'static [UniformFieldLayout],
}

impl UniformLayout {
    /// Size of the GPU buffer backing this block, padded to a 16-byte multiple
    pub fn buffer_size(&self) -> u64 {
        (self.size as u64).next_multiple_of(16).max(16)
    }
}

/// A linkage-checked vertex/fragment program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderProgram {
    /// Manifest identifier, also the name of the generated constant
    pub id: &'static str,
    /// Human-readable name used for labels
    pub name: &'static str,
    /// Complete WGSL source of both stages
    pub shader: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    /// Number of input textures (1 or 2)
    pub inputs: u32,
    /// Binding of each input texture, in input order
    pub texture_bindings: &'static [u32],
    pub sampler_binding: Option<u32>,
    pub uniform: Option<UniformLayout>,
}

impl ShaderProgram {
    /// Looks up a uniform member by name
    pub fn uniform_field(&self, name: &str) -> Option<&'static UniformFieldLayout> {
        self.uniform.and_then(|block| block.fields.iter().find(|field| field.name == name))
    }

    /// Name of the interchange record passed between the two stages
    pub fn record_name(&self) -> &'static str {
        self.record_fields().0
    }

    /// Slot table of the interchange record passed between the two stages
    pub fn record_fields(&self) -> (&'static str, &'static [FieldLayout]) {
        match self.inputs {
            2 => (TwoInputVertexIO::NAME, TwoInputVertexIO::FIELDS),
            _ => (SingleInputVertexIO::NAME, SingleInputVertexIO::FIELDS),
        }
    }

    pub fn create_shader_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.name),
            source: wgpu::ShaderSource::Wgsl(self.shader.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs;

    #[test]
    fn test_generated_programs() {
        let ids = programs::ALL.iter().map(|program| program.id).collect::<Vec<_>>();
        assert_eq!(ids, ["PASSTHROUGH", "LUMINANCE", "GAMMA_ADJUSTMENT", "DISSOLVE_BLEND"]);

        assert_eq!(programs::PASSTHROUGH.vertex_entry, "one_input_vertex");
        assert_eq!(programs::PASSTHROUGH.texture_bindings, &[0]);
        assert_eq!(programs::PASSTHROUGH.sampler_binding, Some(1));
        assert_eq!(programs::PASSTHROUGH.uniform, None);

        assert_eq!(programs::DISSOLVE_BLEND.vertex_entry, "two_input_vertex");
        assert_eq!(programs::DISSOLVE_BLEND.texture_bindings, &[0, 1]);
        assert_eq!(programs::DISSOLVE_BLEND.sampler_binding, Some(2));
    }

    #[test]
    fn test_record_follows_input_count() {
        assert_eq!(programs::LUMINANCE.record_name(), "SingleInputVertexIO");
        assert_eq!(programs::DISSOLVE_BLEND.record_name(), "TwoInputVertexIO");
        assert_eq!(programs::DISSOLVE_BLEND.record_fields().1.len(), 3);
    }

    #[test]
    fn test_uniform_layout() {
        let gamma = programs::GAMMA_ADJUSTMENT.uniform_field("gamma").unwrap();
        assert_eq!(gamma.offset, 0);
        assert_eq!(gamma.components, 1);
        assert_eq!(gamma.default, 1.0);

        let block = programs::GAMMA_ADJUSTMENT.uniform.unwrap();
        assert_eq!(block.binding, 2);
        assert_eq!(block.size, 4);
        assert_eq!(block.buffer_size(), 16);

        assert_eq!(programs::DISSOLVE_BLEND.uniform_field("mix_percent").unwrap().default, 0.5);
        assert!(programs::PASSTHROUGH.uniform_field("gamma").is_none());
    }
}
