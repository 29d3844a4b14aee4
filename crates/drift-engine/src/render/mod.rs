//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers, textures) and
//! record into the frame's encoder through `RenderTarget`.

mod ctx;
pub mod plane;

pub use ctx::{RenderCtx, RenderTarget};
