//! wgpu utility functions for verification tests
//!
//! This module provides helpers for creating textures, uploading images and
//! reading render targets back into RGBA32F images.

/// Texture usage flags for render targets that are read back
pub const TEXTURE_USAGE_TARGET: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT.union(wgpu::TextureUsages::COPY_SRC);

/// Texture usage flags for sampled input textures
pub const TEXTURE_USAGE_INPUT: wgpu::TextureUsages = wgpu::TextureUsages::TEXTURE_BINDING.union(wgpu::TextureUsages::COPY_DST);

/// Creates a 2D texture with the specified parameters
///
/// # Arguments
/// * `device` - The wgpu device to create the texture on
/// * `width` - Texture width in pixels
/// * `height` - Texture height in pixels
/// * `format` - Texture format
/// * `usage` - Texture usage flags
pub fn create_texture(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat, usage: wgpu::TextureUsages) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Verification Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

/// Loads an image into a filterable Rgba8Unorm texture
pub fn load_image_as_texture(device: &wgpu::Device, queue: &wgpu::Queue, image: &image::DynamicImage) -> wgpu::Texture {
    let rgba_image = image.to_rgba8();
    let (width, height) = rgba_image.dimensions();

    let texture = create_texture(device, width, height, wgpu::TextureFormat::Rgba8Unorm, TEXTURE_USAGE_INPUT);

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba_image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    texture
}

/// Converts one tightly packed row of texels to RGBA f32 components
fn decode_row(format: wgpu::TextureFormat, row: &[u8], output: &mut Vec<f32>) {
    match format {
        wgpu::TextureFormat::Rgba32Float => output.extend(row.chunks_exact(4).map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))),
        wgpu::TextureFormat::Rgba16Float => output.extend(row.chunks_exact(2).map(|bytes| half::f16::from_le_bytes([bytes[0], bytes[1]]).to_f32())),
        _ => output.extend(row.iter().map(|&value| value as f32 / 255.0)),
    }
}

/// Reads a wgpu texture back to an RGBA32F image
///
/// Supports `Rgba32Float`, `Rgba16Float` and `Rgba8Unorm` textures.
pub fn save_texture_as_image(device: &wgpu::Device, queue: &wgpu::Queue, texture: &wgpu::Texture) -> Result<image::Rgba32FImage, Box<dyn std::error::Error>> {
    let wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: _,
    } = texture.size();
    let format = texture.format();

    let bytes_per_texel = match format {
        wgpu::TextureFormat::Rgba32Float => 16,
        wgpu::TextureFormat::Rgba16Float => 8,
        wgpu::TextureFormat::Rgba8Unorm => 4,
        _ => return Err(format!("Unsupported texture format for saving: {format:?}").into()),
    };

    // Buffer rows must be aligned for texture-to-buffer copies
    let unpadded_bytes_per_row = width * bytes_per_texel;
    let bytes_per_row = unpadded_bytes_per_row.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: (bytes_per_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Copy Encoder") });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    // Map the buffer for reading (async operation)
    let buffer_slice = buffer.slice(..);
    let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |v| {
        sender.send(v).ok();
    });

    device.poll(wgpu::PollType::Wait)?;
    pollster::block_on(receiver.receive()).ok_or("Failed to map buffer for reading")??;

    let data = buffer_slice.get_mapped_range();
    let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
    for row in data.chunks_exact(bytes_per_row as usize) {
        decode_row(format, &row[..unpadded_bytes_per_row as usize], &mut rgba_data);
    }
    drop(data);
    buffer.unmap();

    let image = image::Rgba32FImage::from_raw(width, height, rgba_data).ok_or("Failed to create RGBA32F image from data")?;
    Ok(image)
}

/// Saves a read-back image as an 8-bit file, clamping channels to 0..1
///
/// The file format follows the extension of `output_path`.
pub fn save_image_file(image: image::Rgba32FImage, output_path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
    let image_rgba8 = image::DynamicImage::ImageRgba32F(image).to_rgba8();
    image_rgba8.save(output_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_row() {
        let mut output = Vec::new();
        decode_row(wgpu::TextureFormat::Rgba8Unorm, &[0, 255, 51, 255], &mut output);
        assert_eq!(output, [0.0, 1.0, 0.2, 1.0]);

        output.clear();
        let halves = [half::f16::from_f32(0.5), half::f16::ONE, half::f16::ZERO, half::f16::ONE];
        decode_row(wgpu::TextureFormat::Rgba16Float, bytemuck::cast_slice(&halves), &mut output);
        assert_eq!(output, [0.5, 1.0, 0.0, 1.0]);

        output.clear();
        decode_row(wgpu::TextureFormat::Rgba32Float, bytemuck::cast_slice(&[0.25f32, 0.75, 0.0, 1.0]), &mut output);
        assert_eq!(output, [0.25, 0.75, 0.0, 1.0]);
    }

    #[test]
    fn test_save_image_file() {
        let path = std::env::temp_dir().join(format!("vertex-interchange-save-{}.png", std::process::id()));
        let image = image::Rgba32FImage::from_raw(2, 1, vec![0.0, 1.0, 0.2, 1.0, 1.5, -0.5, 1.0, 0.0]).unwrap();

        save_image_file(image, &path).unwrap();
        let saved = image::open(&path).unwrap().to_rgba8();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(saved.dimensions(), (2, 1));
        assert_eq!(saved.get_pixel(0, 0).0, [0, 255, 51, 255]);
        assert_eq!(saved.get_pixel(1, 0).0, [255, 0, 255, 0]);
    }
}
