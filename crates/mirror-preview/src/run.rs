use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use filter_host::{
    EffectError, EffectHandle, GraphicsContext, GraphicsDevice, Locale, Module, ParamHandle,
    Settings, SharedGraphics, SourceRegistry,
};
use mirror_filter::{SETTING_SWITCH_LEFT_TO_RIGHT, SOURCE_ID};
use renderer::{FilterPass, Frame, GpuContext, GpuOptions, WgpuGraphics};
use tracing_subscriber::EnvFilter;

use crate::cli::{ModuleArgs, RenderArgs};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn render(args: RenderArgs) -> Result<()> {
    let mut user_settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::new(),
    };
    if let Some(value) = args.switch_left_to_right {
        user_settings.set_bool(SETTING_SWITCH_LEFT_TO_RIGHT, value);
    }

    let input = image::open(&args.input)
        .with_context(|| format!("failed to read input image {}", args.input.display()))?
        .to_rgba8();

    let ctx = GpuContext::headless(GpuOptions {
        power: args.gpu_power.into(),
        memory: args.gpu_memory.into(),
        allow_fallback: true,
    })?;
    tracing::info!(
        adapter = %ctx.adapter_profile.name,
        backend = ?ctx.adapter_profile.backend,
        "using GPU adapter"
    );
    let graphics = Arc::new(GraphicsContext::new(WgpuGraphics::new(ctx)));
    let module = load_module(&args.module, graphics.clone())?;
    let registry = registry()?;

    let mut source = registry
        .create_filter(SOURCE_ID, &module, &user_settings)?
        .with_context(|| format!("filter '{SOURCE_ID}' could not be created"))?;
    tracing::debug!(settings = %source.settings().to_json_string(), "created filter");

    let output = {
        let mut gfx = graphics.enter();
        let frame = Frame::from_rgba(gfx.context(), &input)?;
        let mut pass = FilterPass::new(&mut gfx, Some(&frame));
        source.render(&mut pass);
        match pass.into_output() {
            Some(rendered) => rendered.read_rgba(gfx.context())?,
            None => {
                tracing::info!("filter skipped the frame; writing input unchanged");
                input.clone()
            }
        }
    };
    source.destroy();

    output
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(
        output = %args.output.display(),
        width = output.width(),
        height = output.height(),
        "wrote filtered frame"
    );
    Ok(())
}

pub fn print_defaults() -> Result<()> {
    let settings = registry()?.defaults(SOURCE_ID)?;
    println!("{}", settings.to_effective_json_pretty());
    Ok(())
}

pub fn print_properties(args: &ModuleArgs) -> Result<()> {
    let registry = registry()?;
    let module = load_module(args, Arc::new(GraphicsContext::new(NoDevice)))?;
    let definition = registry
        .definition(SOURCE_ID)
        .with_context(|| format!("filter '{SOURCE_ID}' is not registered"))?;

    let schema = serde_json::json!({
        "id": definition.id(),
        "name": definition.name(&module),
        "properties": definition.properties(&module),
    });
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn registry() -> Result<SourceRegistry> {
    let mut registry = SourceRegistry::new();
    mirror_filter::register(&mut registry)?;
    Ok(registry)
}

fn load_module(args: &ModuleArgs, graphics: SharedGraphics) -> Result<Module> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(mirror_filter::bundled_data_dir);
    let locale = Locale::load(&data_dir, &args.locale)?;
    tracing::debug!(data_dir = %data_dir.display(), locale = %args.locale, "loaded module data");
    Ok(Module::new("mirror-filter", data_dir, locale, graphics))
}

/// Stand-in device for commands that only read the filter's metadata.
struct NoDevice;

impl GraphicsDevice for NoDevice {
    fn create_effect_from_file(&mut self, path: &Path) -> Result<EffectHandle, EffectError> {
        Err(EffectError::Compile {
            path: PathBuf::from(path),
            message: "no GPU device is available to this command".into(),
        })
    }

    fn effect_param_by_name(&self, _effect: EffectHandle, _name: &str) -> Option<ParamHandle> {
        None
    }

    fn destroy_effect(&mut self, _effect: EffectHandle) {}
}
