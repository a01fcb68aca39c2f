use std::path::PathBuf;

use filter_host::{
    ColorFormat, DirectRendering, EffectError, FilterInstance, Module, OwnedEffect, ParamHandle,
    ParamValue, Properties, RenderContext, Settings,
};

/// Settings key of the mirror toggle.
pub const SETTING_SWITCH_LEFT_TO_RIGHT: &str = "SwitchLeftToRight";
/// Bundled effect, resolved against the module data directory.
pub const EFFECT_FILE: &str = "gbihf_filter.effect";

const TEXT_SWITCH_LEFT_TO_RIGHT: &str = "SwitchLeftToRight";
const PARAM_SWITCH_LEFT_TO_RIGHT: &str = "switchLeftToRight";
const PARAM_PIXEL_SIZE: &str = "pixel_size";

#[derive(Debug, thiserror::Error)]
pub enum MirrorFilterError {
    #[error("failed to load mirror effect from {path}")]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: EffectError,
    },
}

/// Left/right mirror filter state.
#[derive(Debug)]
pub struct MirrorFilter {
    effect: OwnedEffect,
    switch_param: Option<ParamHandle>,
    pixel_size_param: Option<ParamHandle>,
    switch_left_to_right: bool,
}

impl MirrorFilter {
    pub fn create(settings: &Settings, module: &Module) -> Result<Self, MirrorFilterError> {
        let path = module.module_file(EFFECT_FILE);

        let (handle, switch_param, pixel_size_param) = {
            let mut gfx = module.graphics().enter();
            let handle = gfx
                .create_effect_from_file(&path)
                .map_err(|source| MirrorFilterError::ShaderLoad {
                    path: path.clone(),
                    source,
                })?;
            (
                handle,
                gfx.effect_param_by_name(handle, PARAM_SWITCH_LEFT_TO_RIGHT),
                gfx.effect_param_by_name(handle, PARAM_PIXEL_SIZE),
            )
        };
        let effect = OwnedEffect::new(handle, module.graphics().clone());

        for (name, param) in [
            (PARAM_SWITCH_LEFT_TO_RIGHT, switch_param),
            (PARAM_PIXEL_SIZE, pixel_size_param),
        ] {
            if param.is_none() {
                tracing::debug!(
                    param = name,
                    effect = %path.display(),
                    "effect parameter missing; updates to it will be skipped"
                );
            }
        }

        let mut filter = Self {
            effect,
            switch_param,
            pixel_size_param,
            switch_left_to_right: false,
        };
        filter.update(settings);
        Ok(filter)
    }

    pub fn update(&mut self, settings: &Settings) {
        self.switch_left_to_right = settings.get_bool(SETTING_SWITCH_LEFT_TO_RIGHT);
    }

    pub fn switch_left_to_right(&self) -> bool {
        self.switch_left_to_right
    }

    /// Handle of the effect's mirror toggle, if the effect declares it.
    pub fn switch_param(&self) -> Option<ParamHandle> {
        self.switch_param
    }

    pub fn pixel_size_param(&self) -> Option<ParamHandle> {
        self.pixel_size_param
    }

    pub fn render(&mut self, ctx: &mut dyn RenderContext) {
        if !ctx.process_filter_begin(ColorFormat::Rgba, DirectRendering::Allow) {
            tracing::trace!("host declined filter pass; skipping frame");
            return;
        }

        let (width, height) = ctx.target_base_size();
        let pixel_size = pixel_size(width, height);

        if let Some(param) = self.pixel_size_param {
            ctx.set_param(param, ParamValue::Vec2(pixel_size));
        }
        if let Some(param) = self.switch_param {
            ctx.set_param(param, ParamValue::Bool(self.switch_left_to_right));
        }

        ctx.process_filter_end(self.effect.handle(), 0, 0);
    }
}

impl FilterInstance for MirrorFilter {
    fn update(&mut self, settings: &Settings) {
        MirrorFilter::update(self, settings);
    }

    fn render(&mut self, ctx: &mut dyn RenderContext) {
        MirrorFilter::render(self, ctx);
    }
}

/// Size of one source texel in UV units.
pub fn pixel_size(width: u32, height: u32) -> [f32; 2] {
    [1.0 / width as f32, 1.0 / height as f32]
}

pub fn properties(module: &Module) -> Properties {
    let mut props = Properties::new();
    props.add_bool(
        SETTING_SWITCH_LEFT_TO_RIGHT,
        module.text(TEXT_SWITCH_LEFT_TO_RIGHT),
    );
    props
}

pub fn defaults(settings: &mut Settings) {
    settings.set_default_bool(SETTING_SWITCH_LEFT_TO_RIGHT, false);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;
    use std::sync::Arc;

    use filter_host::{EffectHandle, GraphicsContext, GraphicsDevice, Locale, SharedGraphics};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(PathBuf),
        Destroy(EffectHandle),
    }

    #[derive(Default)]
    struct FakeDevice {
        calls: Vec<Call>,
        lookups: Cell<usize>,
        fail_load: bool,
        params: Vec<&'static str>,
    }

    impl GraphicsDevice for FakeDevice {
        fn create_effect_from_file(&mut self, path: &Path) -> Result<EffectHandle, EffectError> {
            self.calls.push(Call::Create(path.to_path_buf()));
            if self.fail_load {
                return Err(EffectError::Compile {
                    path: path.to_path_buf(),
                    message: "syntax error".into(),
                });
            }
            Ok(EffectHandle(7))
        }

        fn effect_param_by_name(&self, effect: EffectHandle, name: &str) -> Option<ParamHandle> {
            self.lookups.set(self.lookups.get() + 1);
            self.params
                .iter()
                .position(|param| *param == name)
                .map(|index| ParamHandle {
                    effect,
                    index: index as u32,
                })
        }

        fn destroy_effect(&mut self, effect: EffectHandle) {
            self.calls.push(Call::Destroy(effect));
        }
    }

    fn module_with(device: FakeDevice) -> (Module, Arc<GraphicsContext<FakeDevice>>) {
        let concrete = Arc::new(GraphicsContext::new(device));
        let shared: SharedGraphics = concrete.clone();
        let module = Module::new(
            "mirror-filter",
            "/plugin/data",
            Locale::parse("SwitchLeftToRight=\"Switch Left To Right\"\n"),
            shared,
        );
        (module, concrete)
    }

    #[test]
    fn defaults_then_create_leaves_switch_off() {
        let (module, device) = module_with(FakeDevice {
            params: vec![PARAM_SWITCH_LEFT_TO_RIGHT, PARAM_PIXEL_SIZE],
            ..FakeDevice::default()
        });
        let mut settings = Settings::new();
        defaults(&mut settings);

        let filter = MirrorFilter::create(&settings, &module).unwrap();
        assert_eq!(device.enter().lookups.get(), 2);
        assert!(!filter.switch_left_to_right());
        assert!(filter.switch_param.is_some());
        assert!(filter.pixel_size_param.is_some());
    }

    #[test]
    fn loads_effect_from_module_data_dir() {
        let (module, device) = module_with(FakeDevice::default());
        let filter = MirrorFilter::create(&Settings::new(), &module).unwrap();
        assert_eq!(
            device.enter().calls,
            vec![Call::Create(PathBuf::from("/plugin/data/gbihf_filter.effect"))]
        );

        drop(filter);
        assert_eq!(
            device.enter().calls.last(),
            Some(&Call::Destroy(EffectHandle(7)))
        );
    }

    #[test]
    fn unloadable_effect_yields_no_instance() {
        let (module, device) = module_with(FakeDevice {
            fail_load: true,
            ..FakeDevice::default()
        });

        let err = MirrorFilter::create(&Settings::new(), &module).unwrap_err();
        assert!(matches!(err, MirrorFilterError::ShaderLoad { .. }));
        let gfx = device.enter();
        assert_eq!(gfx.lookups.get(), 0);
        assert_eq!(
            gfx.calls,
            vec![Call::Create(PathBuf::from("/plugin/data/gbihf_filter.effect"))]
        );
    }

    #[test]
    fn update_is_idempotent() {
        let (module, _device) = module_with(FakeDevice::default());
        let mut settings = Settings::new();
        settings.set_bool(SETTING_SWITCH_LEFT_TO_RIGHT, true);

        let mut filter = MirrorFilter::create(&Settings::new(), &module).unwrap();
        filter.update(&settings);
        let once = filter.switch_left_to_right();
        filter.update(&settings);
        assert_eq!(filter.switch_left_to_right(), once);
        assert!(once);
    }

    #[test]
    fn pixel_size_is_reciprocal_of_dimensions() {
        assert_eq!(pixel_size(1920, 1080), [1.0 / 1920.0, 1.0 / 1080.0]);
        assert_eq!(pixel_size(1, 1), [1.0, 1.0]);
        let [x, y] = pixel_size(3, 7);
        assert_eq!(x, 1.0_f32 / 3.0_f32);
        assert_eq!(y, 1.0_f32 / 7.0_f32);
    }

    #[test]
    fn properties_expose_single_localized_toggle() {
        let (module, _device) = module_with(FakeDevice::default());
        let props = properties(&module);
        assert_eq!(props.len(), 1);
        let prop = props.get(SETTING_SWITCH_LEFT_TO_RIGHT).unwrap();
        assert_eq!(prop.description, "Switch Left To Right");
        assert_eq!(prop.kind, filter_host::PropertyKind::Bool);
    }
}
