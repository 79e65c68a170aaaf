//! Host-side mirrors of the interchange records
//!
//! The WGSL header declares `SingleInputVertexIO` and `TwoInputVertexIO` as
//! vertex outputs / fragment inputs. These `#[repr(C)]` types carry the same
//! fields in the same order, so host code can build, inspect and upload the
//! records a vertex stage would emit.
//!
//! ```text
//! SingleInputVertexIO (24 bytes)       TwoInputVertexIO (32 bytes)
//! ┌──────────────┬────────────────┐    ┌──────────────┬────────────────┬─────────────────┐
//! │ position     │ texture_coord  │    │ position     │ texture_coord  │ texture_coord2  │
//! │ [f32; 4]     │ [f32; 2]       │    │ [f32; 4]     │ [f32; 2]       │ [f32; 2]        │
//! │ offset 0     │ offset 16      │    │ offset 0     │ offset 16      │ offset 24       │
//! │ position     │ location(0)    │    │ position     │ location(0)    │ location(1)     │
//! └──────────────┴────────────────┘    └──────────────┴────────────────┴─────────────────┘
//! ```

use bytemuck::{Pod, Zeroable};

/// Role tag binding a record field to the rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantic {
    /// Clip-space position
    Position,
    /// User-defined interpolated slot with its tag and WGSL location
    User { tag: &'static str, location: u32 },
}

/// Layout of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    /// Field name, identical in WGSL and Rust
    pub name: &'static str,
    /// Role tag
    pub semantic: Semantic,
    /// Number of f32 components
    pub components: u32,
    /// Byte offset in the host record
    pub offset: u64,
}

/// An interchange record that can also be fed to a vertex stage as a vertex buffer
///
/// When uploaded, field `i` is exposed at shader location `i`.
pub trait VertexRecord: Pod {
    /// WGSL struct name
    const NAME: &'static str;
    /// Fields in declaration order
    const FIELDS: &'static [FieldLayout];
    /// Vertex attribute descriptors for wgpu
    const ATTRIBUTES: &'static [wgpu::VertexAttribute];
    /// Complete vertex buffer layout descriptor
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: Self::ATTRIBUTES,
        array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
    };
}

/// Record produced for a fragment stage that samples one texture
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SingleInputVertexIO {
    /// Clip-space position
    pub position: [f32; 4],
    /// Normalized coordinates into the input texture
    pub texture_coordinate: [f32; 2],
}

impl SingleInputVertexIO {
    pub const fn new(position: [f32; 4], texture_coordinate: [f32; 2]) -> Self {
        Self { position, texture_coordinate }
    }
}

impl VertexRecord for SingleInputVertexIO {
    const NAME: &'static str = "SingleInputVertexIO";
    const FIELDS: &'static [FieldLayout] = &[
        FieldLayout {
            name: "position",
            semantic: Semantic::Position,
            components: 4,
            offset: std::mem::offset_of!(SingleInputVertexIO, position) as u64,
        },
        FieldLayout {
            name: "texture_coordinate",
            semantic: Semantic::User { tag: "texturecoord", location: 0 },
            components: 2,
            offset: std::mem::offset_of!(SingleInputVertexIO, texture_coordinate) as u64,
        },
    ];
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x2];
}

/// Record produced for a fragment stage that samples two textures
///
/// The two coordinate fields are independent; the inputs may differ in size
/// and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TwoInputVertexIO {
    /// Clip-space position
    pub position: [f32; 4],
    /// Normalized coordinates into the first input texture
    pub texture_coordinate: [f32; 2],
    /// Normalized coordinates into the second input texture
    pub texture_coordinate2: [f32; 2],
}

impl TwoInputVertexIO {
    pub const fn new(position: [f32; 4], texture_coordinate: [f32; 2], texture_coordinate2: [f32; 2]) -> Self {
        Self {
            position,
            texture_coordinate,
            texture_coordinate2,
        }
    }
}

impl VertexRecord for TwoInputVertexIO {
    const NAME: &'static str = "TwoInputVertexIO";
    const FIELDS: &'static [FieldLayout] = &[
        FieldLayout {
            name: "position",
            semantic: Semantic::Position,
            components: 4,
            offset: std::mem::offset_of!(TwoInputVertexIO, position) as u64,
        },
        FieldLayout {
            name: "texture_coordinate",
            semantic: Semantic::User { tag: "texturecoord", location: 0 },
            components: 2,
            offset: std::mem::offset_of!(TwoInputVertexIO, texture_coordinate) as u64,
        },
        FieldLayout {
            name: "texture_coordinate2",
            semantic: Semantic::User { tag: "texturecoord2", location: 1 },
            components: 2,
            offset: std::mem::offset_of!(TwoInputVertexIO, texture_coordinate2) as u64,
        },
    ];
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x2, 2 => Float32x2];
}
