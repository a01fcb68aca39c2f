//! Host contract for compositing filter plugins.
//!
//! A plugin describes itself with a [`FilterDefinition`] (the host callback
//! table) registered in a [`SourceRegistry`]. The host builds a [`Settings`]
//! object from the definition's defaults plus persisted user values, asks the
//! definition to create a [`FilterInstance`], and then drives it:
//!
//! ```text
//!   defaults ─▶ create ─▶ (update)* ─▶ render per frame ─▶ drop
//!                  │                        │
//!                  ▼                        ▼
//!           GraphicsContext          RenderContext (borrowed)
//! ```
//!
//! GPU resources are only touched inside a [`GraphicsContext`] scope, which is
//! shared by every plugin and released when its guard drops.

pub mod graphics;
pub mod locale;
pub mod module;
pub mod properties;
pub mod registry;
pub mod render;
pub mod settings;

pub use graphics::{
    EffectError, EffectHandle, GraphicsContext, GraphicsDevice, GraphicsGuard, OwnedEffect,
    ParamHandle, ParamValue, SharedGraphics,
};
pub use locale::{Locale, DEFAULT_LOCALE};
pub use module::Module;
pub use properties::{Properties, Property, PropertyKind};
pub use registry::{
    FilterDefinition, FilterInstance, FilterSource, OutputFlags, RegistryError, SourceKind,
    SourceRegistry,
};
pub use render::{ColorFormat, DirectRendering, RenderContext};
pub use settings::{Settings, SettingsError};
