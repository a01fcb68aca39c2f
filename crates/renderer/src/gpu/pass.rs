use filter_host::{ColorFormat, DirectRendering, EffectHandle, ParamHandle, ParamValue, RenderContext};

use super::frame::{supports_direct_sampling, Frame};
use super::graphics::WgpuGraphics;

/// One filter invocation against one input frame.
///
/// The pass borrows the device for its whole lifetime, so the caller holds
/// the graphics context while the filter renders.
///
/// [`DirectRendering::Allow`] samples the input texture itself.
/// [`DirectRendering::NoDirect`] samples a private copy and declines inputs
/// that cannot be copied. The requested [`ColorFormat`] is advisory: the
/// input is sampled in its own format and the output is always
/// [`FRAME_FORMAT`](super::frame::FRAME_FORMAT).
pub struct FilterPass<'a> {
    graphics: &'a mut WgpuGraphics,
    input: Option<&'a Frame>,
    target_size: (u32, u32),
    began: bool,
    captured: Option<Frame>,
    output: Option<Frame>,
}

impl<'a> FilterPass<'a> {
    /// `input` is `None` when the upstream source produced no frame.
    pub fn new(graphics: &'a mut WgpuGraphics, input: Option<&'a Frame>) -> Self {
        let target_size = input.map_or((0, 0), |frame| (frame.width(), frame.height()));
        Self {
            graphics,
            input,
            target_size,
            began: false,
            captured: None,
            output: None,
        }
    }

    /// The frame drawn by `process_filter_end`, if the filter rendered.
    pub fn into_output(self) -> Option<Frame> {
        self.output
    }

    fn draw(&self, effect: EffectHandle, input: &Frame, width: u32, height: u32) -> Option<Frame> {
        let Some(compiled) = self.graphics.effect(effect) else {
            tracing::warn!(effect = effect.0, "filter drew with an unknown effect");
            return None;
        };
        let ctx = &self.graphics.ctx;
        ctx.queue
            .write_buffer(&compiled.uniform_buffer, 0, compiled.params.bytes());

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("effect bind group"),
            layout: &self.graphics.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: compiled.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&input.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.graphics.sampler),
                },
            ],
        });

        let output = Frame::render_target(&ctx.device, width, height);
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("filter pass encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("filter pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&compiled.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
        Some(output)
    }
}

impl RenderContext for FilterPass<'_> {
    fn target_base_size(&self) -> (u32, u32) {
        self.target_size
    }

    fn process_filter_begin(&mut self, format: ColorFormat, direct: DirectRendering) -> bool {
        let Some(input) = self.input else {
            tracing::trace!("no input frame; skipping filter");
            return false;
        };
        if input.width() == 0 || input.height() == 0 {
            tracing::trace!("empty input frame; skipping filter");
            return false;
        }
        if !supports_direct_sampling(input.format()) {
            tracing::debug!(format = ?input.format(), "input format cannot be sampled; skipping filter");
            return false;
        }
        if direct == DirectRendering::NoDirect {
            let Some(copy) = input.capture_copy(&self.graphics.ctx) else {
                tracing::debug!("input frame cannot be copied for indirect capture; skipping filter");
                return false;
            };
            self.captured = Some(copy);
        }
        tracing::trace!(?format, ?direct, "captured filter input");
        self.began = true;
        true
    }

    fn set_param(&mut self, param: ParamHandle, value: ParamValue) {
        self.graphics.set_param(param, value);
    }

    fn process_filter_end(&mut self, effect: EffectHandle, width: u32, height: u32) {
        if !self.began {
            tracing::warn!(effect = effect.0, "filter ended a pass it never began");
            return;
        }
        self.began = false;
        let captured = self.captured.take();
        let Some(input) = captured.as_ref().or(self.input) else {
            return;
        };
        let width = if width == 0 { self.target_size.0 } else { width };
        let height = if height == 0 { self.target_size.1 } else { height };
        if width == 0 || height == 0 {
            tracing::debug!("zero-sized filter target; nothing drawn");
            return;
        }
        self.output = self.draw(effect, input, width, height);
    }
}
