//! Left/right mirror video filter.
//!
//! Each frame the filter asks the host to capture its input, writes the
//! texel size and the mirror toggle into the bundled effect's parameters and
//! lets the host draw the input through the effect. The effect samples
//! `image` at `(1 - u, v)` when the toggle is on and at `(u, v)` otherwise.
//!
//! The crate ships its effect and locale files under `data/`; hosts pass that
//! directory to [`filter_host::Module`].

mod filter;

use std::path::PathBuf;
use std::sync::Arc;

use filter_host::{
    FilterDefinition, FilterInstance, Module, OutputFlags, Properties, RegistryError, Settings,
    SourceKind, SourceRegistry,
};

pub use filter::{
    defaults, pixel_size, properties, MirrorFilter, MirrorFilterError, EFFECT_FILE,
    SETTING_SWITCH_LEFT_TO_RIGHT,
};

/// Registration id; persisted scenes refer to the filter by this name.
pub const SOURCE_ID: &str = "gbihf_filter";
const TEXT_NAME: &str = "GBIHFFilter";

/// Host callback table for the mirror filter.
#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorFilterDefinition;

impl FilterDefinition for MirrorFilterDefinition {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Filter
    }

    fn output_flags(&self) -> OutputFlags {
        OutputFlags::VIDEO
    }

    fn name(&self, module: &Module) -> String {
        module.text(TEXT_NAME).to_string()
    }

    fn create(
        &self,
        settings: &Settings,
        module: &Module,
    ) -> anyhow::Result<Box<dyn FilterInstance>> {
        Ok(Box::new(MirrorFilter::create(settings, module)?))
    }

    fn properties(&self, module: &Module) -> Properties {
        properties(module)
    }

    fn defaults(&self, settings: &mut Settings) {
        defaults(settings);
    }
}

/// Adds the mirror filter to a host registry.
pub fn register(registry: &mut SourceRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(MirrorFilterDefinition))
}

/// Directory holding the bundled effect and locale files.
pub fn bundled_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}
