//! wgpu reference host for filter plugins.
//!
//! The crate supplies the two host capabilities a filter needs: a
//! [`GraphicsDevice`](filter_host::GraphicsDevice) that compiles effect files
//! ([`WgpuGraphics`]) and a per-frame
//! [`RenderContext`](filter_host::RenderContext) that runs them against an
//! input texture ([`FilterPass`]).
//!
//! ```text
//!  RgbaImage --Frame::from_rgba--> Frame --FilterPass--> Frame --read_rgba--> RgbaImage
//!                                           |
//!                                  filter.render(&mut pass)
//! ```
//!
//! Effect files are GLSL fragments. Top-level `uniform <type> <name>;`
//! declarations become entries of a std140 parameter block, `image` names the
//! captured input and the effect defines `vec4 mainImage(vec2 uv)` with `uv`
//! running from the top-left corner.

mod compile;
mod gpu;
mod types;

pub use gpu::{FilterPass, Frame, GpuContext, WgpuGraphics, FRAME_FORMAT};
pub use types::{AdapterProfile, GpuMemoryMode, GpuOptions, GpuPowerPreference};
