//! Paint model shared between the gallery and renderers.
//!
//! Colors are linear premultiplied RGBA; the plane shader premultiplies texels
//! itself so only clear colors flow through here.

pub mod color;

pub use color::Color;
