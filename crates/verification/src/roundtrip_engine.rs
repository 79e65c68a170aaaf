//! GPU round-trip engine
//!
//! Feeds host-built interchange records through probe programs and operation
//! programs on a real wgpu device, then reads the rendered pixels back.

use crate::wgpu_helpers::*;
use vertex_interchange::{Color, ImageOrientation, InputTexture, RenderOperation, ShaderProgram, VertexRecord, create_render_target, supports_render_target};
use wgpu::util::DeviceExt;

/// A linkage-checked probe program embedded by the build script
///
/// The vertex stage takes the record's fields as vertex attributes (field `i`
/// at location `i`) and returns them unchanged; the fragment stage writes what
/// it received to color target 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub id: &'static str,
    pub name: &'static str,
    pub shader: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    /// Number of texture coordinates in the probed record
    pub inputs: u32,
}

/// Float target formats in order of preference
///
/// 0, 0.25, 0.5, 0.75 and 1 are exact in both, so coordinates survive either.
const TARGET_FORMATS: [wgpu::TextureFormat; 2] = [wgpu::TextureFormat::Rgba32Float, wgpu::TextureFormat::Rgba16Float];

/// wgpu device and queue used for verification renders
pub struct RoundTripEngine {
    /// The wgpu device
    device: wgpu::Device,
    /// The wgpu command queue
    queue: wgpu::Queue,
    /// Float format every target is created with
    target_format: wgpu::TextureFormat,
}

impl RoundTripEngine {
    /// Creates a new engine on the default adapter
    ///
    /// # Returns
    /// A new engine instance or an error if no adapter or device is available
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Round Trip Engine"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: Default::default(),
            })
            .await?;

        let target_format = TARGET_FORMATS
            .into_iter()
            .find(|&format| supports_render_target(&adapter, format))
            .ok_or("Adapter cannot render into any float texture format")?;

        tracing::debug!(adapter = ?adapter.get_info(), ?target_format, "Round trip engine created");

        Ok(Self { device, queue, target_format })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Draws `record` as a single point through `probe` into a 1x1 target
    ///
    /// # Returns
    /// The RGBA value the probe's fragment stage wrote
    pub fn round_trip<R: VertexRecord + std::fmt::Debug>(&self, probe: &Probe, record: &R) -> Result<[f32; 4], Box<dyn std::error::Error>> {
        if R::FIELDS.len() != 1 + probe.inputs as usize {
            return Err(format!("Probe '{}' reads {} texture coordinate(s), {} carries {}", probe.id, probe.inputs, R::NAME, R::FIELDS.len() - 1).into());
        }

        let shader_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(probe.name),
            source: wgpu::ShaderSource::Wgsl(probe.shader.into()),
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(probe.name),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(probe.name),
            layout: Some(&pipeline_layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &shader_module,
                buffers: &[R::LAYOUT],
                compilation_options: Default::default(),
                entry_point: Some(probe.vertex_entry),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
                entry_point: Some(probe.fragment_entry),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
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

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(R::NAME),
            usage: wgpu::BufferUsages::VERTEX,
            contents: bytemuck::bytes_of(record),
        });

        let target = create_texture(&self.device, 1, 1, self.target_format, TEXTURE_USAGE_TARGET);
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(probe.name) });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(probe.name),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Color::TRANSPARENT.into()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });

            render_pass.set_pipeline(&pipeline);
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.draw(0..1, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));

        let image = save_texture_as_image(&self.device, &self.queue, &target)?;
        let pixel = image.get_pixel(0, 0).0;
        tracing::trace!(probe = probe.id, record = ?record, ?pixel, "Round trip finished");

        Ok(pixel)
    }

    /// Renders `program` over the given images and reads the result back
    ///
    /// Inputs are uploaded as Rgba8Unorm textures and the output is rendered
    /// into a float target sized by the first input's orientation.
    ///
    /// # Arguments
    /// * `program` - A generated operation program
    /// * `inputs` - One image and orientation per program input
    /// * `uniforms` - Scalar uniform values to set before rendering
    pub fn run_operation(
        &self,
        program: &'static ShaderProgram,
        inputs: &[(&image::DynamicImage, ImageOrientation)],
        uniforms: &[(&str, f32)],
    ) -> Result<image::Rgba32FImage, Box<dyn std::error::Error>> {
        self.run_configured_operation(program, inputs, |operation| {
            for (name, value) in uniforms {
                operation.set_uniform(name, *value)?;
            }
            Ok(())
        })
    }

    /// Like [`run_operation`](Self::run_operation), with `configure` applied to the operation before rendering
    pub fn run_configured_operation(
        &self,
        program: &'static ShaderProgram,
        inputs: &[(&image::DynamicImage, ImageOrientation)],
        configure: impl FnOnce(&mut RenderOperation) -> Result<(), vertex_interchange::RenderError>,
    ) -> Result<image::Rgba32FImage, Box<dyn std::error::Error>> {
        let textures = inputs
            .iter()
            .map(|(image, _)| load_image_as_texture(&self.device, &self.queue, image))
            .collect::<Vec<_>>();
        let input_textures = textures
            .iter()
            .zip(inputs)
            .map(|(texture, (_, orientation))| InputTexture::new(texture, *orientation))
            .collect::<Vec<_>>();

        let mut operation = RenderOperation::new(&self.device, program, self.target_format)?;
        configure(&mut operation)?;

        let (width, height) = operation.output_size(&input_textures).ok_or("Operation needs at least one input")?;
        let target = create_render_target(&self.device, width, height, self.target_format);
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(program.name) });
        operation.render(&self.device, &self.queue, &mut encoder, &input_textures, &target_view, Color::TRANSPARENT)?;
        self.queue.submit(Some(encoder.finish()));

        save_texture_as_image(&self.device, &self.queue, &target)
    }
}
