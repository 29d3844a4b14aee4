/// Viewport size in logical pixels.
///
/// Mirrors the window's inner size. The physical surface may be larger by the
/// window scale factor; everything above the device layer works in logical px.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height, or `None` while the viewport is degenerate.
    #[inline]
    pub fn aspect_ratio(self) -> Option<f32> {
        self.is_valid().then(|| self.width / self.height)
    }

    /// Half extents, i.e. the offset from the top-left corner to the center.
    #[inline]
    pub fn half(self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_of_landscape_viewport() {
        let vp = Viewport::new(1000.0, 800.0);
        assert_eq!(vp.aspect_ratio(), Some(1.25));
    }

    #[test]
    fn zero_height_has_no_aspect_ratio() {
        assert!(Viewport::new(1000.0, 0.0).aspect_ratio().is_none());
        assert!(Viewport::new(0.0, 0.0).aspect_ratio().is_none());
    }

    #[test]
    fn non_finite_is_invalid() {
        assert!(!Viewport::new(f32::INFINITY, 10.0).is_valid());
        assert!(!Viewport::new(10.0, f32::NAN).is_valid());
    }

    #[test]
    fn half_extents() {
        assert_eq!(Viewport::new(1200.0, 900.0).half(), (600.0, 450.0));
    }
}
