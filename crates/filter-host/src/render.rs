use crate::graphics::{EffectHandle, ParamHandle, ParamValue};

/// Color format a filter asks the host to capture its input in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Rgba,
    Bgra,
    Rgba16F,
}

/// Whether the host may let the filter sample the upstream output directly
/// instead of rendering it into an intermediate texture first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectRendering {
    Allow,
    NoDirect,
}

/// Per-frame capability the host lends a filter while it renders.
///
/// The filter never stores this; it only borrows it for one `render` call.
pub trait RenderContext {
    /// Base dimensions of the filter's target, the next stage up the chain.
    fn target_base_size(&self) -> (u32, u32);

    /// Starts capturing the filter input. Returns `false` when the host cannot
    /// process this frame, in which case the filter must not render.
    fn process_filter_begin(&mut self, format: ColorFormat, direct: DirectRendering) -> bool;

    /// Writes a parameter value; applied when the effect next draws.
    fn set_param(&mut self, param: ParamHandle, value: ParamValue);

    /// Draws the captured input through `effect`. A zero `width` or `height`
    /// means the target's base size.
    fn process_filter_end(&mut self, effect: EffectHandle, width: u32, height: u32);
}
