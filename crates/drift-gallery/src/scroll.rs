use crate::document::Document;

/// Linear interpolation: `a·(1 - t) + b·t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Raw and eased scroll positions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollState {
    /// Native scroll offset read this tick.
    pub raw_offset: f32,
    /// Eased offset actually applied to the content.
    pub smoothed_offset: f32,
    /// Share of the remaining distance covered per tick, in `(0, 1]`.
    pub easing_factor: f32,
}

impl ScrollState {
    /// How far the eased position trails the native one.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.raw_offset - self.smoothed_offset
    }
}

/// Replaces the native instantaneous scroll with an eased one.
///
/// Each tick reads the native offset, moves the smoothed offset a fixed
/// fraction of the way towards it, and translates the carrier by the
/// smoothed amount. The smoothed offset never overshoots and is not clamped
/// at the document bounds beyond what the native offset already is.
#[derive(Debug, Clone)]
pub struct InertialScroll {
    state: ScrollState,
}

impl InertialScroll {
    pub fn new(easing_factor: f32) -> Self {
        Self {
            state: ScrollState {
                raw_offset: 0.0,
                smoothed_offset: 0.0,
                easing_factor,
            },
        }
    }

    /// Advances one tick against `doc`.
    pub fn tick<D: Document + ?Sized>(&mut self, doc: &mut D) -> ScrollState {
        let s = &mut self.state;
        s.raw_offset = doc.scroll_offset();
        s.smoothed_offset = lerp(s.smoothed_offset, s.raw_offset, s.easing_factor);
        doc.set_carrier_translation(-s.smoothed_offset);
        log::trace!("scroll raw={:.2} smoothed={:.2}", s.raw_offset, s.smoothed_offset);
        *s
    }

    /// Snapshot of the current positions.
    #[inline]
    pub fn state(&self) -> ScrollState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use drift_engine::coords::{Rect, Viewport};

    use super::*;
    use crate::document::ElementId;

    /// Document with nothing but a scroll offset and a carrier.
    #[derive(Default)]
    struct Bare {
        scroll: f32,
        translation: f32,
    }

    impl Document for Bare {
        fn tracked_elements(&self) -> Vec<ElementId> {
            Vec::new()
        }
        fn element_rect(&self, _: ElementId) -> Option<Rect> {
            None
        }
        fn image_source(&self, _: ElementId) -> Option<&Path> {
            None
        }
        fn carrier_natural_height(&self) -> f32 {
            0.0
        }
        fn set_body_height(&mut self, _: f32) {}
        fn set_carrier_translation(&mut self, y: f32) {
            self.translation = y;
        }
        fn scroll_offset(&self) -> f32 {
            self.scroll
        }
        fn set_viewport(&mut self, _: Viewport) {}
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1.0e-3
    }

    // ── lerp ──────────────────────────────────────────────────────────────

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(-4.0, 4.0, 0.5), 0.0);
    }

    // ── easing ────────────────────────────────────────────────────────────

    #[test]
    fn single_tick_follows_step_law() {
        let mut doc = Bare { scroll: 500.0, ..Default::default() };
        let mut s = InertialScroll::new(0.075);
        let st = s.tick(&mut doc);
        assert!(approx(st.smoothed_offset, 37.5));
        assert_eq!(st.raw_offset, 500.0);
        assert!(approx(doc.translation, -37.5));
    }

    #[test]
    fn converges_monotonically_without_overshoot() {
        let mut doc = Bare { scroll: 500.0, ..Default::default() };
        let mut s = InertialScroll::new(0.075);
        let mut prev_gap = f32::INFINITY;
        for _ in 0..400 {
            let st = s.tick(&mut doc);
            let gap = (st.raw_offset - st.smoothed_offset).abs();
            assert!(st.smoothed_offset <= 500.0 + 1.0e-3);
            assert!(gap <= prev_gap + 1.0e-4);
            prev_gap = gap;
        }
        assert!(s.state().delta().abs() <= 1.0e-2);
    }

    #[test]
    fn gap_shrinks_by_one_minus_k_per_tick() {
        let mut doc = Bare { scroll: 1000.0, ..Default::default() };
        let mut s = InertialScroll::new(0.2);
        s.tick(&mut doc);
        let before = s.state().delta();
        s.tick(&mut doc);
        assert!(approx(s.state().delta(), before * 0.8));
    }

    #[test]
    fn unit_easing_snaps_in_one_tick() {
        let mut doc = Bare { scroll: 320.0, ..Default::default() };
        let mut s = InertialScroll::new(1.0);
        let st = s.tick(&mut doc);
        assert_eq!(st.smoothed_offset, 320.0);
        assert_eq!(s.state().delta(), 0.0);
        assert_eq!(doc.translation, -320.0);
    }

    #[test]
    fn follows_scroll_back_up() {
        let mut doc = Bare { scroll: 200.0, ..Default::default() };
        let mut s = InertialScroll::new(1.0);
        s.tick(&mut doc);
        doc.scroll = 0.0;
        let mut s = InertialScroll { state: ScrollState { easing_factor: 0.5, ..s.state() } };
        let st = s.tick(&mut doc);
        assert_eq!(st.smoothed_offset, 100.0);
        assert!(st.delta() < 0.0);
    }
}
