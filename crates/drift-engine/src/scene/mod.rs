//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic plane draws for one frame
//! - keep paint order deterministic (insertion order, back-to-front)

mod list;
mod plane;

pub use list::PlaneList;
pub use plane::{PlaneDraw, TextureId};
