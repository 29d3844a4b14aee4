//! Textured plane rendering.
//!
//! Every plane shares one subdivided unit-square geometry; per-plane state
//! (model matrix, alpha, offset) travels as instance data and the image is
//! bound per draw. The camera's view-projection arrives as a uniform, so the
//! vertex shader works in world units rather than logical pixels.

mod geometry;
mod renderer;
mod texture;

pub use geometry::{PlaneGeometry, PlaneVertex};
pub use renderer::{CameraUniform, PlaneRenderer};
pub use texture::TextureUploadError;
