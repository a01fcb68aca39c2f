use std::collections::HashMap;
use std::path::{Path, PathBuf};

use filter_host::{EffectError, EffectHandle, GraphicsDevice, ParamHandle, ParamValue};

use super::context::GpuContext;
use super::frame::FRAME_FORMAT;
use super::pipeline::{create_effect_pipeline, effect_bind_group_layout};
use super::uniforms::ParamBlock;
use crate::compile::{compile_fragment_shader, compile_vertex_shader, parse_effect, wrap_effect_fragment};

pub(crate) struct CompiledEffect {
    pub pipeline: wgpu::RenderPipeline,
    pub params: ParamBlock,
    pub uniform_buffer: wgpu::Buffer,
    pub path: PathBuf,
}

/// wgpu implementation of [`GraphicsDevice`].
///
/// Effects are compiled into render pipelines targeting [`FRAME_FORMAT`] and
/// kept until destroyed. Parameter writes land in a CPU-side block that is
/// uploaded when the effect next draws.
pub struct WgpuGraphics {
    pub(crate) ctx: GpuContext,
    vertex_module: wgpu::ShaderModule,
    pub(crate) bind_group_layout: wgpu::BindGroupLayout,
    pub(crate) sampler: wgpu::Sampler,
    effects: HashMap<EffectHandle, CompiledEffect>,
    next_id: u64,
}

impl WgpuGraphics {
    pub fn new(ctx: GpuContext) -> Self {
        let vertex_module = compile_vertex_shader(&ctx.device);
        let bind_group_layout = effect_bind_group_layout(&ctx.device);
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("effect image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            ctx,
            vertex_module,
            bind_group_layout,
            sampler,
            effects: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Number of effects currently alive on the device.
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Stages a parameter value. Writes to unknown effects or with the wrong
    /// value type are logged and dropped.
    pub fn set_param(&mut self, param: ParamHandle, value: ParamValue) {
        let Some(effect) = self.effects.get_mut(&param.effect) else {
            tracing::debug!(effect = param.effect.0, "parameter write for unknown effect");
            return;
        };
        if let Err(err) = effect.params.write(param.index as usize, value) {
            tracing::debug!(
                effect = param.effect.0,
                path = %effect.path.display(),
                error = %err,
                "ignoring parameter write"
            );
        }
    }

    pub(crate) fn effect(&self, handle: EffectHandle) -> Option<&CompiledEffect> {
        self.effects.get(&handle)
    }

    fn compile(&self, path: &Path, source: &str) -> Result<CompiledEffect, EffectError> {
        let effect = parse_effect(source).map_err(|message| EffectError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        let params = ParamBlock::new(effect.layout());
        let wrapped = wrap_effect_fragment(&effect);
        let label = path.display().to_string();

        let device = &self.ctx.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let fragment_module = compile_fragment_shader(device, &label, wrapped);
        let pipeline = create_effect_pipeline(
            device,
            &self.bind_group_layout,
            &self.vertex_module,
            &fragment_module,
            FRAME_FORMAT,
        );
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(EffectError::Compile {
                path: path.to_path_buf(),
                message: err.to_string(),
            });
        }

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("effect parameters"),
            size: u64::from(params.layout().size),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(CompiledEffect {
            pipeline,
            params,
            uniform_buffer,
            path: path.to_path_buf(),
        })
    }
}

impl GraphicsDevice for WgpuGraphics {
    fn create_effect_from_file(&mut self, path: &Path) -> Result<EffectHandle, EffectError> {
        let source = std::fs::read_to_string(path).map_err(|source| EffectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let compiled = self.compile(path, &source)?;

        let handle = EffectHandle(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            effect = handle.0,
            path = %path.display(),
            params = compiled.params.layout().slots.len(),
            "compiled effect"
        );
        self.effects.insert(handle, compiled);
        Ok(handle)
    }

    fn effect_param_by_name(&self, effect: EffectHandle, name: &str) -> Option<ParamHandle> {
        let index = self.effects.get(&effect)?.params.layout().index_of(name)?;
        Some(ParamHandle {
            effect,
            index: index as u32,
        })
    }

    fn destroy_effect(&mut self, effect: EffectHandle) {
        if self.effects.remove(&effect).is_none() {
            tracing::debug!(effect = effect.0, "destroy requested for unknown effect");
        }
    }
}
