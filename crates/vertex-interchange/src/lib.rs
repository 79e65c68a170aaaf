//! Vertex interchange format for GPU image-processing operations
//!
//! This crate defines the fixed-layout records a vertex stage hands to a
//! fragment stage (`SingleInputVertexIO`, `TwoInputVertexIO`) and the shared
//! `LUMINANCE_WEIGHTING` constant, both as a WGSL header included by every
//! operation shader and as host-side Rust mirrors. Operation programs are
//! compiled and linkage-checked at build time and can be rendered with
//! [`RenderOperation`].

mod color;
mod error;
mod luminance;
mod orientation;
mod quad;
mod render_operation;
pub(crate) mod shader_program;
mod uniform_settings;
mod vertex_io;

pub mod programs;

pub use color::Color;
pub use error::RenderError;
pub use luminance::{LUMINANCE_WEIGHTING, LUMINANCE_WEIGHTING_F32, luminance};
pub use orientation::{ImageOrientation, Rotation};
pub use quad::{STANDARD_IMAGE_VERTICES, aspect_ratio, coordinate_limits, output_size, single_input_quad, texture_coordinates, two_input_quad};
pub use render_operation::{ASPECT_RATIO_UNIFORM, InputTexture, RenderOperation, create_render_target, supports_render_target};
pub use shader_program::{ShaderProgram, UniformFieldLayout, UniformLayout};
pub use uniform_settings::UniformSettings;
pub use vertex_io::{FieldLayout, Semantic, SingleInputVertexIO, TwoInputVertexIO, VertexRecord};

/// WGSL source of the interchange header, for shaders compiled outside this crate
pub const OPERATION_SHADER_TYPES_WGSL: &str = include_str!("../wgsl/operation_shader_types.wgsl");
