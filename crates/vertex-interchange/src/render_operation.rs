//! Host binding for operation programs
//!
//! A `RenderOperation` owns the wgpu render pipeline of one [`ShaderProgram`]
//! and draws it as a full-frame triangle strip. Vertex buffer 0 holds the quad
//! positions; buffer `1 + i` holds the texture coordinates of input `i`,
//! computed from that input's orientation.
//!
//! Programs declaring an `aspectRatio` uniform get it set from the first input
//! on every render.

use crate::{
    color::Color,
    error::RenderError,
    orientation::ImageOrientation,
    quad::{STANDARD_IMAGE_VERTICES, aspect_ratio, coordinate_limits, output_size, texture_coordinates},
    shader_program::ShaderProgram,
    uniform_settings::UniformSettings,
};
use wgpu::util::DeviceExt;

/// Highest number of inputs an operation can sample
const MAX_INPUTS: usize = 2;

/// Uniform filled with the first input's height over width
pub const ASPECT_RATIO_UNIFORM: &str = "aspectRatio";

static POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
static COORDINATE_ATTRIBUTES: [[wgpu::VertexAttribute; 1]; MAX_INPUTS] = [wgpu::vertex_attr_array![1 => Float32x2], wgpu::vertex_attr_array![2 => Float32x2]];

/// Layout of a buffer holding one `vec2<f32>` per quad corner
const fn vec2_buffer_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
    }
}

/// A texture fed to an operation together with its orientation
#[derive(Debug, Clone, Copy)]
pub struct InputTexture<'a> {
    pub texture: &'a wgpu::Texture,
    pub orientation: ImageOrientation,
}

impl<'a> InputTexture<'a> {
    pub fn new(texture: &'a wgpu::Texture, orientation: ImageOrientation) -> Self {
        Self { texture, orientation }
    }

    /// Size of this input once rotated to portrait
    pub fn oriented_size(&self) -> (u32, u32) {
        output_size(self.texture.width(), self.texture.height(), self.orientation)
    }

    pub fn aspect_ratio(&self) -> f32 {
        aspect_ratio(self.texture.width(), self.texture.height())
    }

    /// Texture coordinates of the quad corners when drawn in portrait
    pub fn texture_coordinates(&self, normalized: bool) -> [[f32; 2]; 4] {
        let rotation = self.orientation.rotation_needed(ImageOrientation::Portrait);
        let (x_limit, y_limit) = coordinate_limits(self.texture.width(), self.texture.height(), normalized);
        texture_coordinates(rotation, x_limit, y_limit)
    }
}

/// Returns true if the adapter can render into textures of `format`
///
/// Downlevel backends report fewer renderable formats than WebGPU guarantees,
/// `Rgba32Float` being the common case.
pub fn supports_render_target(adapter: &wgpu::Adapter, format: wgpu::TextureFormat) -> bool {
    adapter.get_texture_format_features(format).allowed_usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
}

/// Creates a texture an operation can render into and that can be sampled or read back afterwards
pub fn create_render_target(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Render target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// One operation program bound to a wgpu device
#[derive(Debug)]
pub struct RenderOperation {
    program: &'static ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    position_buffer: wgpu::Buffer,
    uniform_buffer: Option<wgpu::Buffer>,
    uniforms: UniformSettings,
    use_normalized_texture_coordinates: bool,
}

impl RenderOperation {
    /// Builds the render pipeline of `program` for targets of `target_format`
    ///
    /// # Arguments
    /// * `device` - The wgpu device for resource creation
    /// * `program` - A generated program from [`programs`](crate::programs)
    /// * `target_format` - Format of the textures this operation renders into
    ///
    /// # Returns
    /// The operation, or [`RenderError::PipelineCreation`] if the device rejects
    /// the pipeline, for example because `target_format` is not renderable
    pub fn new(device: &wgpu::Device, program: &'static ShaderProgram, target_format: wgpu::TextureFormat) -> Result<Self, RenderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader_module = program.create_shader_module(device);

        // Create explicit bind group layout from the reflected bindings
        let mut bind_group_layout_entries = Vec::new();

        for &binding in program.texture_bindings {
            bind_group_layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }

        if let Some(binding) = program.sampler_binding {
            bind_group_layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        if let Some(uniform) = &program.uniform {
            bind_group_layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: uniform.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        bind_group_layout_entries.sort_by_key(|entry| entry.binding);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(program.name),
            entries: &bind_group_layout_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(program.name),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mut vertex_buffers = vec![vec2_buffer_layout(&POSITION_ATTRIBUTES)];
        vertex_buffers.extend(COORDINATE_ATTRIBUTES.iter().take(program.inputs as usize).map(|attributes| vec2_buffer_layout(attributes)));

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.name),
            layout: Some(&pipeline_layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &shader_module,
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
                entry_point: Some(program.vertex_entry),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
                entry_point: Some(program.fragment_entry),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            depth_stencil: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::PipelineCreation {
                program: program.id,
                format: target_format,
                reason: error.to_string(),
            });
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(program.name),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad positions"),
            usage: wgpu::BufferUsages::VERTEX,
            contents: bytemuck::cast_slice(&STANDARD_IMAGE_VERTICES),
        });

        let mut uniforms = UniformSettings::new(program);
        let uniform_buffer = program.uniform.map(|_| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(program.name),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                contents: uniforms.as_bytes(),
            })
        });
        uniforms.take_dirty();

        tracing::debug!(program = program.id, inputs = program.inputs, ?target_format, "Render operation created");

        Ok(Self {
            program,
            pipeline,
            bind_group_layout,
            sampler,
            position_buffer,
            uniform_buffer,
            uniforms,
            use_normalized_texture_coordinates: true,
        })
    }

    pub fn program(&self) -> &'static ShaderProgram {
        self.program
    }

    pub fn uniforms(&self) -> &UniformSettings {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut UniformSettings {
        &mut self.uniforms
    }

    /// Sets a scalar uniform by name
    pub fn set_uniform(&mut self, name: &str, value: f32) -> Result<(), RenderError> {
        self.uniforms.set_float(name, value)
    }

    pub fn use_normalized_texture_coordinates(&self) -> bool {
        self.use_normalized_texture_coordinates
    }

    /// Switches input texture coordinates between 0..1 and texel units
    pub fn set_use_normalized_texture_coordinates(&mut self, normalized: bool) {
        self.use_normalized_texture_coordinates = normalized;
    }

    /// Size of the output for these inputs; the first input decides it
    pub fn output_size(&self, inputs: &[InputTexture]) -> Option<(u32, u32)> {
        inputs.first().map(InputTexture::oriented_size)
    }

    /// Records one draw of this operation into `encoder`
    ///
    /// The target is cleared to `clear_color` first. Pending uniform changes
    /// are written to the queue before the draw.
    ///
    /// # Arguments
    /// * `device` - The wgpu device for per-draw buffers and the bind group
    /// * `queue` - Queue used to upload changed uniforms
    /// * `encoder` - The command encoder to record the render pass into
    /// * `inputs` - One texture per program input, in binding order
    /// * `target` - View of a texture with the format given to [`RenderOperation::new`]
    /// * `clear_color` - Color of pixels outside the quad
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        inputs: &[InputTexture],
        target: &wgpu::TextureView,
        clear_color: Color,
    ) -> Result<(), RenderError> {
        if inputs.len() != self.program.inputs as usize {
            return Err(RenderError::InputCountMismatch {
                program: self.program.id,
                expected: self.program.inputs,
                actual: inputs.len(),
            });
        }

        if let Some(first) = inputs.first() {
            let aspect_ratio = first.aspect_ratio();
            if self.uniforms.has(ASPECT_RATIO_UNIFORM) && self.uniforms.get(ASPECT_RATIO_UNIFORM) != Some(&[aspect_ratio][..]) {
                self.uniforms.set_float(ASPECT_RATIO_UNIFORM, aspect_ratio)?;
            }
        }

        if let Some(uniform_buffer) = &self.uniform_buffer {
            if self.uniforms.take_dirty() {
                queue.write_buffer(uniform_buffer, 0, self.uniforms.as_bytes());
            }
        }

        let coordinate_buffers = inputs
            .iter()
            .map(|input| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Texture coordinates"),
                    usage: wgpu::BufferUsages::VERTEX,
                    contents: bytemuck::cast_slice(&input.texture_coordinates(self.use_normalized_texture_coordinates)),
                })
            })
            .collect::<Vec<_>>();

        let texture_views = inputs
            .iter()
            .map(|input| input.texture.create_view(&wgpu::TextureViewDescriptor::default()))
            .collect::<Vec<_>>();

        let mut bind_group_entries = Vec::new();

        for (&binding, texture_view) in self.program.texture_bindings.iter().zip(&texture_views) {
            bind_group_entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(texture_view),
            });
        }

        if let Some(binding) = self.program.sampler_binding {
            bind_group_entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });
        }

        if let (Some(uniform), Some(uniform_buffer)) = (&self.program.uniform, &self.uniform_buffer) {
            bind_group_entries.push(wgpu::BindGroupEntry {
                binding: uniform.binding,
                resource: uniform_buffer.as_entire_binding(),
            });
        }

        bind_group_entries.sort_by_key(|entry| entry.binding);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.program.name),
            layout: &self.bind_group_layout,
            entries: &bind_group_entries,
        });

        tracing::trace!(program = self.program.id, orientations = ?inputs.iter().map(|input| input.orientation).collect::<Vec<_>>(), "Rendering operation");

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.program.name),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color.into()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        for (index, coordinate_buffer) in coordinate_buffers.iter().enumerate() {
            render_pass.set_vertex_buffer(1 + index as u32, coordinate_buffer.slice(..));
        }
        render_pass.draw(0..STANDARD_IMAGE_VERTICES.len() as u32, 0..1);

        Ok(())
    }
}
