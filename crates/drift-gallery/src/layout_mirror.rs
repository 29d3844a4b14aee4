use crate::document::Document;

/// Keeps the native scroll range equal to the carrier's content height.
///
/// The carrier is pinned to the viewport, so it contributes nothing to the
/// body's height on its own; mirroring its natural height onto the body is
/// what makes the native scroll offset span the real content.
pub struct LayoutMirror;

impl LayoutMirror {
    /// Copies the carrier's natural height onto the body. Returns the height.
    pub fn initialize<D: Document + ?Sized>(doc: &mut D) -> f32 {
        let height = doc.carrier_natural_height();
        doc.set_body_height(height);
        log::debug!("body height mirrored: {height}px");
        height
    }
}
