use std::path::Path;

use drift_engine::coords::{Rect, Viewport};

/// Stable identifier of an element inside a [`Document`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// The layout the gallery mirrors.
///
/// A document has a body whose height bounds the native scroll range, and a
/// content carrier pinned to the viewport that holds every tracked image.
/// Scrolling never moves the carrier by itself: the gallery applies the
/// eased offset to it as a visual translation, and element rectangles
/// reported here include that translation.
pub trait Document {
    /// Tracked image elements in document order.
    fn tracked_elements(&self) -> Vec<ElementId>;

    /// Current rectangle of `id` relative to the viewport's top-left corner,
    /// or `None` if the element no longer exists.
    fn element_rect(&self, id: ElementId) -> Option<Rect>;

    /// Where the element's image comes from.
    fn image_source(&self, id: ElementId) -> Option<&Path>;

    /// Height of the carrier's content, ignoring any translation.
    fn carrier_natural_height(&self) -> f32;

    /// Sets the body height and with it the native scroll range.
    fn set_body_height(&mut self, height: f32);

    /// Vertical visual translation of the carrier (negative moves content up).
    fn set_carrier_translation(&mut self, y: f32);

    /// Native (un-eased) vertical scroll offset.
    fn scroll_offset(&self) -> f32;

    /// Informs the document of the window size it is laid out in.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Returns `true` once after the carrier's natural height may have
    /// changed (an image finished loading, content was added).
    fn take_reflow(&mut self) -> bool {
        false
    }
}
