//! Drift gallery: images rendered as GPU planes that follow an eased scroll.
//!
//! The page lays images out as an ordinary document; every frame the
//! [`RenderLoop`] eases the scroll position, re-reads where each image sits
//! on screen and moves its plane there.
//!
//! ```rust,ignore
//! use drift_gallery::Gallery;
//!
//! Gallery::new()
//!     .title("Drift")
//!     .images(["a.jpg", "b.png"])
//!     .run()?;
//! ```

pub mod app;
pub mod camera;
pub mod config;
pub mod document;
pub mod layout_mirror;
pub mod page;
pub mod render_loop;
pub mod scroll;
pub mod surface;
pub mod texture_loader;

pub use app::Gallery;
pub use camera::{Camera, CameraError};
pub use config::{CameraConfig, GalleryConfig, PageLayoutConfig};
pub use document::{Document, ElementId};
pub use layout_mirror::LayoutMirror;
pub use page::Page;
pub use render_loop::{GalleryFrame, RenderLoop, StopHandle};
pub use scroll::{lerp, InertialScroll, ScrollState};
pub use surface::{world_transform, PlaneUniforms, SurfaceBinding, SurfaceMesh, TextureHandle, TextureStatus};
pub use texture_loader::{DecodedImage, TextureEvent, TextureLoadError, TextureLoader, TextureRequests};
