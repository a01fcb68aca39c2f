//! Plugin registration table and host-side filter instances.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::module::Module;
use crate::properties::Properties;
use crate::render::RenderContext;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Input,
    Filter,
    Transition,
}

/// Output capabilities a source advertises to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputFlags(u32);

impl OutputFlags {
    pub const VIDEO: Self = Self(1 << 0);
    pub const AUDIO: Self = Self(1 << 1);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Static description of a filter type: the host's callback table.
pub trait FilterDefinition: Send + Sync {
    fn id(&self) -> &'static str;

    fn kind(&self) -> SourceKind {
        SourceKind::Filter
    }

    fn output_flags(&self) -> OutputFlags;

    /// Localized display name.
    fn name(&self, module: &Module) -> String;

    /// Builds an instance from fully defaulted settings.
    fn create(&self, settings: &Settings, module: &Module) -> anyhow::Result<Box<dyn FilterInstance>>;

    /// Settings schema for host-generated UI.
    fn properties(&self, module: &Module) -> Properties;

    /// Registers default values on a settings object.
    fn defaults(&self, settings: &mut Settings);
}

/// A live filter. Dropping it is the host's `destroy` callback.
pub trait FilterInstance: Send {
    fn update(&mut self, settings: &Settings);

    fn render(&mut self, ctx: &mut dyn RenderContext);
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("a source with id '{0}' is already registered")]
    Duplicate(&'static str),
    #[error("no source registered with id '{0}'")]
    Unknown(String),
}

#[derive(Default)]
pub struct SourceRegistry {
    definitions: BTreeMap<&'static str, Arc<dyn FilterDefinition>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: Arc<dyn FilterDefinition>) -> Result<(), RegistryError> {
        let id = definition.id();
        if self.definitions.contains_key(id) {
            return Err(RegistryError::Duplicate(id));
        }
        tracing::debug!(id, kind = ?definition.kind(), "registered source");
        self.definitions.insert(id, definition);
        Ok(())
    }

    pub fn definition(&self, id: &str) -> Option<&Arc<dyn FilterDefinition>> {
        self.definitions.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.keys().copied()
    }

    /// Settings pre-populated with the definition's defaults.
    pub fn defaults(&self, id: &str) -> Result<Settings, RegistryError> {
        let definition = self
            .definition(id)
            .ok_or_else(|| RegistryError::Unknown(id.to_string()))?;
        let mut settings = Settings::new();
        definition.defaults(&mut settings);
        Ok(settings)
    }

    /// Instantiates a filter. A definition that fails to construct yields
    /// `Ok(None)`, the null instance; the failure is logged.
    pub fn create_filter(
        &self,
        id: &str,
        module: &Module,
        user_settings: &Settings,
    ) -> Result<Option<FilterSource>, RegistryError> {
        let definition = self
            .definition(id)
            .ok_or_else(|| RegistryError::Unknown(id.to_string()))?
            .clone();
        let mut settings = Settings::new();
        definition.defaults(&mut settings);
        settings.apply(user_settings);

        match definition.create(&settings, module) {
            Ok(instance) => {
                tracing::debug!(id, "created filter");
                Ok(Some(FilterSource {
                    definition,
                    settings,
                    instance,
                }))
            }
            Err(err) => {
                tracing::warn!(
                    id,
                    error = %err,
                    cause = %err.root_cause(),
                    "failed to create filter"
                );
                Ok(None)
            }
        }
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.definitions.keys()).finish()
    }
}

/// Host-side handle pairing a filter instance with its settings object.
pub struct FilterSource {
    definition: Arc<dyn FilterDefinition>,
    settings: Settings,
    instance: Box<dyn FilterInstance>,
}

impl FilterSource {
    pub fn id(&self) -> &'static str {
        self.definition.id()
    }

    pub fn name(&self, module: &Module) -> String {
        self.definition.name(module)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn properties(&self, module: &Module) -> Properties {
        self.definition.properties(module)
    }

    /// Applies user changes to the settings object and notifies the filter.
    pub fn update(&mut self, changes: &Settings) {
        self.settings.apply(changes);
        self.instance.update(&self.settings);
    }

    pub fn render(&mut self, ctx: &mut dyn RenderContext) {
        self.instance.render(ctx);
    }

    pub fn destroy(self) {
        tracing::debug!(id = self.definition.id(), "destroying filter");
        drop(self.instance);
    }
}

impl fmt::Debug for FilterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSource")
            .field("id", &self.definition.id())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
