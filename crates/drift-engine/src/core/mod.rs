//! Core engine-facing contracts.
//!
//! Stable interface between the runtime (platform loop) and the gallery. The
//! runtime owns the window, GPU and input; the app only sees `FrameCtx`.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};

pub(crate) use ctx::logical_viewport;
