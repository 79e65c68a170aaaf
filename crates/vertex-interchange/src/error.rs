/// Errors raised while configuring or recording a [`RenderOperation`](crate::RenderOperation)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Program '{program}' takes {expected} input texture(s), got {actual}")]
    InputCountMismatch { program: &'static str, expected: u32, actual: usize },
    #[error("Program '{0}' has no uniforms")]
    NoUniforms(&'static str),
    #[error("Program '{program}' has no uniform named '{name}'")]
    UnknownUniform { program: &'static str, name: String },
    #[error("Uniform '{name}' has {expected} component(s), got {actual}")]
    UniformComponentMismatch { name: String, expected: u32, actual: usize },
    #[error("Program '{program}' cannot be built for {format:?} targets: {reason}")]
    PipelineCreation {
        program: &'static str,
        format: wgpu::TextureFormat,
        reason: String,
    },
}
