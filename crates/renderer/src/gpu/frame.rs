use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use wgpu::util::{DeviceExt, TextureDataOrder};

use super::context::GpuContext;

/// Format of uploaded frames and of filter pass outputs.
pub const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A GPU-resident video frame.
pub struct Frame {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Frame {
    /// Wraps an existing texture, e.g. one produced by an upstream source.
    pub fn from_texture(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Uploads an RGBA8 image.
    pub fn from_rgba(ctx: &GpuContext, image: &RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let max_dimension = ctx.max_texture_dimension();
        if width == 0 || height == 0 {
            anyhow::bail!("cannot upload an empty {width}x{height} frame");
        }
        if width > max_dimension || height > max_dimension {
            anyhow::bail!(
                "GPU max texture dimension is {max_dimension}, frame is {width}x{height}"
            );
        }

        let texture = ctx.device.create_texture_with_data(
            &ctx.queue,
            &wgpu::TextureDescriptor {
                label: Some("filter input frame"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FRAME_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_DST
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        Ok(Self::from_texture(texture))
    }

    /// Allocates an output texture a filter pass can draw into.
    pub(crate) fn render_target(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("filter output frame"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Self::from_texture(texture)
    }

    /// Copies the frame into a texture private to one filter pass. `None`
    /// when the source texture was not created with `COPY_SRC`.
    pub(crate) fn capture_copy(&self, ctx: &GpuContext) -> Option<Self> {
        if !self.texture.usage().contains(wgpu::TextureUsages::COPY_SRC) {
            return None;
        }
        let size = self.texture.size();
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("filter capture frame"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("filter capture encoder"),
            });
        encoder.copy_texture_to_texture(
            self.texture.as_image_copy(),
            texture.as_image_copy(),
            size,
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));
        Some(Self::from_texture(texture))
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    /// Copies the frame back to the CPU. Only 8-bit RGBA frames are supported.
    pub fn read_rgba(&self, ctx: &GpuContext) -> Result<RgbaImage> {
        if self.format() != FRAME_FORMAT {
            anyhow::bail!("cannot read back a {:?} frame", self.format());
        }
        let (width, height) = (self.width(), self.height());
        let unpadded_bytes_per_row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame readback"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| anyhow!("failed to wait for frame readback: {err}"))?;
        rx.recv()
            .context("frame readback callback was dropped")?
            .context("failed to map frame readback buffer")?;

        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded_bytes_per_row as usize) {
                pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
            }
        }
        buffer.unmap();

        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow!("readback size mismatch for {width}x{height} frame"))
    }
}

/// Formats a filter pass can sample without an intermediate conversion.
pub(crate) fn supports_direct_sampling(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Rgba8Unorm
            | wgpu::TextureFormat::Rgba8UnormSrgb
            | wgpu::TextureFormat::Bgra8Unorm
            | wgpu::TextureFormat::Bgra8UnormSrgb
            | wgpu::TextureFormat::Rgba16Float
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_formats_cannot_be_sampled_directly() {
        assert!(supports_direct_sampling(FRAME_FORMAT));
        assert!(supports_direct_sampling(wgpu::TextureFormat::Bgra8Unorm));
        assert!(!supports_direct_sampling(wgpu::TextureFormat::Rgba8Uint));
        assert!(!supports_direct_sampling(wgpu::TextureFormat::Depth32Float));
    }
}
