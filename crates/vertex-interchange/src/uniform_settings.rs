//! Named uniform values backed by a CPU-side copy of the uniform block

use crate::{
    color::Color,
    error::RenderError,
    shader_program::{ShaderProgram, UniformFieldLayout, UniformLayout},
};

/// Uniform values of one program, addressed by WGSL member name
///
/// Values start at the defaults recorded in the program manifest. Every write
/// marks the block dirty so the owner knows to re-upload it before drawing.
#[derive(Debug, Clone)]
pub struct UniformSettings {
    program: &'static str,
    layout: Option<UniformLayout>,
    /// Block contents as f32 words, padded to the GPU buffer size
    words: Vec<f32>,
    dirty: bool,
}

impl UniformSettings {
    pub fn new(program: &ShaderProgram) -> Self {
        let words = match &program.uniform {
            Some(layout) => {
                let mut words = vec![0.0; layout.buffer_size() as usize / 4];
                for field in layout.fields {
                    let start = field.offset as usize / 4;
                    words[start..start + field.components as usize].fill(field.default);
                }
                words
            }
            None => Vec::new(),
        };

        Self {
            program: program.id,
            layout: program.uniform,
            words,
            dirty: true,
        }
    }

    fn field(&self, name: &str) -> Result<&'static UniformFieldLayout, RenderError> {
        let layout = self.layout.as_ref().ok_or(RenderError::NoUniforms(self.program))?;
        layout.fields.iter().find(|field| field.name == name).ok_or_else(|| RenderError::UnknownUniform {
            program: self.program,
            name: name.to_string(),
        })
    }

    /// Returns true if the program declares a uniform with this name
    pub fn has(&self, name: &str) -> bool {
        self.field(name).is_ok()
    }

    /// Current components of a uniform
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        let field = self.field(name).ok()?;
        let start = field.offset as usize / 4;
        Some(&self.words[start..start + field.components as usize])
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), RenderError> {
        self.set_floats(name, &[value])
    }

    /// Writes every component of a uniform
    pub fn set_floats(&mut self, name: &str, values: &[f32]) -> Result<(), RenderError> {
        let field = self.field(name)?;
        if values.len() != field.components as usize {
            return Err(RenderError::UniformComponentMismatch {
                name: name.to_string(),
                expected: field.components,
                actual: values.len(),
            });
        }

        let start = field.offset as usize / 4;
        self.words[start..start + values.len()].copy_from_slice(values);
        self.dirty = true;
        tracing::trace!(program = self.program, uniform = name, ?values, "Uniform updated");
        Ok(())
    }

    /// Writes a color into a `vec3` (alpha dropped) or `vec4` uniform
    pub fn set_color(&mut self, name: &str, color: Color) -> Result<(), RenderError> {
        match self.field(name)?.components {
            3 => self.set_floats(name, &color.to_array()),
            _ => self.set_floats(name, &color.to_array_with_alpha()),
        }
    }

    /// Writes a `mat3x3<f32>` uniform, `matrix[i]` becoming column `i`
    ///
    /// Columns are padded to four words as WGSL lays them out.
    pub fn set_matrix3x3(&mut self, name: &str, matrix: &[[f32; 3]; 3]) -> Result<(), RenderError> {
        let mut words = [0.0; 12];
        for (column, values) in words.chunks_exact_mut(4).zip(matrix) {
            column[..3].copy_from_slice(values);
        }
        self.set_floats(name, &words)
    }

    /// Writes a `mat4x4<f32>` uniform, `matrix[i]` becoming column `i`
    pub fn set_matrix4x4(&mut self, name: &str, matrix: &[[f32; 4]; 4]) -> Result<(), RenderError> {
        self.set_floats(name, matrix.as_flattened())
    }

    /// Block contents in the byte layout of the WGSL struct
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    /// Clears the dirty flag, returning whether the block changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
