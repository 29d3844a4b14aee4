//! Drift engine crate.
//!
//! Platform + GPU runtime pieces used by the gallery layer: a winit window
//! driven by a continuous redraw cycle, a wgpu device/surface, input
//! translation, frame timing, and the textured plane renderer.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
