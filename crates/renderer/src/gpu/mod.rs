//! Off-screen GPU host for filter plugins.
//!
//! - `context` selects an adapter and creates a headless device.
//! - `graphics` implements the plugin-facing device: effect files become
//!   render pipelines with a parameter block each.
//! - `pass` lends a filter the per-frame begin/set/end capability.
//! - `frame` moves frames between the CPU and GPU.
//! - `pipeline` and `uniforms` hold the shared bind group layout and the
//!   std140 parameter packing.

mod context;
mod frame;
mod graphics;
mod pass;
mod pipeline;
pub(crate) mod uniforms;

pub use context::GpuContext;
pub use frame::{Frame, FRAME_FORMAT};
pub use graphics::WgpuGraphics;
pub use pass::FilterPass;
