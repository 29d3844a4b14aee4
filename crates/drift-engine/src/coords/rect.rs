/// Axis-aligned rectangle in logical pixels, measured from the viewport's
/// top-left corner (the shape of a DOM bounding client rect).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Returns the rectangle shifted by `(dx, dy)`.
    #[inline]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translated_keeps_size() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0).translated(0.0, -500.0);
        assert_eq!(r, Rect::new(10.0, -480.0, 30.0, 40.0));
    }

    #[test]
    fn zero_sized_is_empty() {
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(Rect::new(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
        assert!(Rect::default().is_empty());
    }

    #[test]
    fn nan_edges_are_not_finite() {
        assert!(Rect::new(0.0, 0.0, 10.0, 10.0).is_finite());
        assert!(!Rect::new(f32::NAN, 0.0, 10.0, 10.0).is_finite());
        assert!(!Rect::new(0.0, 0.0, f32::INFINITY, 10.0).is_finite());
    }
}
