//! Resource reflection for operation shaders
//!
//! Collects the texture, sampler and uniform bindings a program declares so the
//! host can build bind group layouts and write uniforms by name without
//! hard-coding offsets.

use crate::interface::{SlotScalar, slot_type};
use serde::Serialize;
use std::fmt;

/// A named float, float vector or float matrix inside a uniform block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniformField {
    /// Member name as declared in WGSL
    pub name: String,
    /// Byte offset within the block
    pub offset: u32,
    /// Number of f32 words, including the column padding of `mat3x3`
    pub components: u32,
    /// Initial value of every component
    pub default: f32,
}

/// The single uniform buffer of a program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniformBlock {
    /// Binding index in group 0
    pub binding: u32,
    /// Byte size of the block
    pub size: u32,
    /// Fields in declaration order
    pub fields: Vec<UniformField>,
}

/// Bindings declared by a program, all in group 0
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShaderResources {
    /// Sampled texture bindings, ascending
    pub textures: Vec<u32>,
    /// Sampler bindings, ascending
    pub samplers: Vec<u32>,
    /// Uniform block, if any
    pub uniform: Option<UniformBlock>,
}

/// Errors raised while reflecting shader resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectionError {
    /// Resource bound outside group 0
    UnsupportedGroup { name: String, group: u32 },
    /// More than one uniform buffer declared
    MultipleUniformBlocks,
    /// Uniform member that is not an f32 scalar, vector, `mat3x3` or `mat4x4`
    UnsupportedUniformMember(String),
    /// Bound resource that is neither texture, sampler nor uniform
    UnsupportedResource(String),
}

impl fmt::Display for ReflectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedGroup { name, group } => write!(f, "Resource '{name}' is bound in group {group}, only group 0 is supported"),
            Self::MultipleUniformBlocks => write!(f, "Only one uniform buffer per program is supported"),
            Self::UnsupportedUniformMember(name) => write!(f, "Uniform member '{name}' must be an f32 scalar, vector, mat3x3 or mat4x4"),
            Self::UnsupportedResource(name) => write!(f, "Resource '{name}' is not a texture, sampler or uniform buffer"),
        }
    }
}

impl std::error::Error for ReflectionError {}

/// Reflects the bound resources of a module
pub fn reflect_resources(module: &naga::Module) -> Result<ShaderResources, ReflectionError> {
    let mut resources = ShaderResources::default();

    for (_, variable) in module.global_variables.iter() {
        let Some(binding) = &variable.binding else {
            continue;
        };
        let name = variable.name.clone().unwrap_or_default();
        if binding.group != 0 {
            return Err(ReflectionError::UnsupportedGroup { name, group: binding.group });
        }

        match (&variable.space, &module.types[variable.ty].inner) {
            (_, naga::TypeInner::Image { .. }) => resources.textures.push(binding.binding),
            (_, naga::TypeInner::Sampler { .. }) => resources.samplers.push(binding.binding),
            (naga::AddressSpace::Uniform, inner) => {
                if resources.uniform.is_some() {
                    return Err(ReflectionError::MultipleUniformBlocks);
                }
                resources.uniform = Some(reflect_uniform_block(module, binding.binding, &name, variable.ty, inner)?);
            }
            _ => return Err(ReflectionError::UnsupportedResource(name)),
        }
    }

    resources.textures.sort_unstable();
    resources.samplers.sort_unstable();
    Ok(resources)
}

fn reflect_uniform_block(module: &naga::Module, binding: u32, name: &str, ty: naga::Handle<naga::Type>, inner: &naga::TypeInner) -> Result<UniformBlock, ReflectionError> {
    if let naga::TypeInner::Struct { members, span } = inner {
        let fields = members
            .iter()
            .map(|member| {
                let member_name = member.name.clone().unwrap_or_default();
                let components = float_components(module, member.ty).ok_or_else(|| ReflectionError::UnsupportedUniformMember(member_name.clone()))?;
                Ok(UniformField {
                    name: member_name,
                    offset: member.offset,
                    components,
                    default: 0.0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(UniformBlock { binding, size: *span, fields });
    }

    // A bare `var<uniform> gamma: f32` is a block with one field named after the variable
    let components = float_components(module, ty).ok_or_else(|| ReflectionError::UnsupportedUniformMember(name.to_string()))?;
    Ok(UniformBlock {
        binding,
        size: components * 4,
        fields: vec![UniformField {
            name: name.to_string(),
            offset: 0,
            components,
            default: 0.0,
        }],
    })
}

fn float_components(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Option<u32> {
    use naga::VectorSize::{Quad, Tri};

    if let naga::TypeInner::Matrix { columns, rows, scalar } = module.types[ty].inner {
        return match (columns, rows) {
            _ if scalar != naga::Scalar::F32 => None,
            // Each vec3 column occupies 16 bytes
            (Tri, Tri) => Some(12),
            (Quad, Quad) => Some(16),
            _ => None,
        };
    }

    let slot_type = slot_type(module, ty);
    (slot_type.scalar == SlotScalar::F32 && slot_type.components > 0).then_some(slot_type.components)
}
