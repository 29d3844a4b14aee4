//! Coordinate and geometry types shared by the runtime and the gallery.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left of the viewport
//! - +X right, +Y down
//!
//! World space (camera space) lives in `glam` types and is centered on the
//! viewport with +Y up; conversion happens at the gallery layer.

mod rect;
mod viewport;

pub use rect::Rect;
pub use viewport::Viewport;
