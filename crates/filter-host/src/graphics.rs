//! Scoped access to the shared graphics device.
//!
//! Every plugin creates and destroys GPU resources through the same
//! [`GraphicsContext`]. Entering it locks the device for the lifetime of the
//! returned [`GraphicsGuard`]; dropping the guard leaves the context on every
//! exit path, including early returns and unwinding.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque identifier of a compiled effect owned by the graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(pub u64);

/// Handle to one named parameter in an effect's parameter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamHandle {
    pub effect: EffectHandle,
    pub index: u32,
}

/// Value written into an effect parameter slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Uint(_) => "uint",
            ParamValue::Float(_) => "float",
            ParamValue::Vec2(_) => "vec2",
            ParamValue::Vec3(_) => "vec3",
            ParamValue::Vec4(_) => "vec4",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("failed to read effect file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid effect {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to compile effect {path}: {message}")]
    Compile { path: PathBuf, message: String },
}

/// Device-side operations a plugin may perform while inside the graphics context.
pub trait GraphicsDevice: Send {
    /// Loads and compiles an effect file.
    fn create_effect_from_file(&mut self, path: &Path) -> Result<EffectHandle, EffectError>;

    /// Resolves a named parameter; `None` when the effect does not declare it.
    fn effect_param_by_name(&self, effect: EffectHandle, name: &str) -> Option<ParamHandle>;

    /// Releases an effect. Unknown handles are ignored.
    fn destroy_effect(&mut self, effect: EffectHandle);
}

/// Process-wide graphics lock shared by every plugin using the GPU device.
pub struct GraphicsContext<D: ?Sized = dyn GraphicsDevice> {
    device: Mutex<D>,
}

/// The type-erased context handed to plugins.
pub type SharedGraphics = Arc<GraphicsContext>;

impl<D: GraphicsDevice> GraphicsContext<D> {
    pub fn new(device: D) -> Self {
        Self {
            device: Mutex::new(device),
        }
    }
}

impl<D: ?Sized + GraphicsDevice> GraphicsContext<D> {
    /// Enters the graphics context, blocking until no other caller holds it.
    pub fn enter(&self) -> GraphicsGuard<'_, D> {
        let inner = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!("entered graphics context");
        GraphicsGuard { inner }
    }
}

impl<D: ?Sized> fmt::Debug for GraphicsContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsContext").finish_non_exhaustive()
    }
}

/// Live graphics-context scope; leaves the context when dropped.
pub struct GraphicsGuard<'a, D: ?Sized = dyn GraphicsDevice> {
    inner: MutexGuard<'a, D>,
}

impl<D: ?Sized> Deref for GraphicsGuard<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.inner
    }
}

impl<D: ?Sized> DerefMut for GraphicsGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.inner
    }
}

impl<D: ?Sized> Drop for GraphicsGuard<'_, D> {
    fn drop(&mut self) {
        tracing::trace!("left graphics context");
    }
}

/// Exclusive owner of a compiled effect.
///
/// Dropping it enters the graphics context and destroys the effect, so it
/// must not be dropped while the same thread is inside the context.
pub struct OwnedEffect {
    handle: EffectHandle,
    graphics: SharedGraphics,
}

impl OwnedEffect {
    pub fn new(handle: EffectHandle, graphics: SharedGraphics) -> Self {
        Self { handle, graphics }
    }

    pub fn handle(&self) -> EffectHandle {
        self.handle
    }
}

impl fmt::Debug for OwnedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedEffect")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Drop for OwnedEffect {
    fn drop(&mut self) {
        let mut gfx = self.graphics.enter();
        gfx.destroy_effect(self.handle);
        tracing::debug!(effect = self.handle.0, "destroyed effect");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingDevice {
        created: u64,
        destroyed: Vec<EffectHandle>,
    }

    impl GraphicsDevice for CountingDevice {
        fn create_effect_from_file(&mut self, _path: &Path) -> Result<EffectHandle, EffectError> {
            self.created += 1;
            Ok(EffectHandle(self.created))
        }

        fn effect_param_by_name(&self, _effect: EffectHandle, _name: &str) -> Option<ParamHandle> {
            None
        }

        fn destroy_effect(&mut self, effect: EffectHandle) {
            self.destroyed.push(effect);
        }
    }

    #[test]
    fn owned_effect_destroys_on_drop() {
        let concrete = Arc::new(GraphicsContext::new(CountingDevice::default()));
        let shared: SharedGraphics = concrete.clone();

        let handle = shared
            .enter()
            .create_effect_from_file(Path::new("a.effect"))
            .unwrap();
        let effect = OwnedEffect::new(handle, shared.clone());
        assert!(concrete.enter().destroyed.is_empty());

        drop(effect);
        assert_eq!(concrete.enter().destroyed, vec![EffectHandle(1)]);
    }

    #[test]
    fn guard_releases_after_panic() {
        let graphics: SharedGraphics = Arc::new(GraphicsContext::new(CountingDevice::default()));
        let cloned = graphics.clone();
        let result = std::thread::spawn(move || {
            let _gfx = cloned.enter();
            panic!("plugin failure while inside graphics");
        })
        .join();
        assert!(result.is_err());

        let handle = graphics
            .enter()
            .create_effect_from_file(Path::new("b.effect"))
            .unwrap();
        assert_eq!(handle, EffectHandle(1));
    }
}
