use super::PlaneDraw;

/// Recorded plane stream for a frame.
///
/// Paint order is insertion order: the first plane pushed is drawn first
/// (furthest back). `clear()` keeps capacity so steady-state frames do not
/// allocate.
#[derive(Debug, Default)]
pub struct PlaneList {
    items: Vec<PlaneDraw>,
}

impl PlaneList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, plane: PlaneDraw) {
        self.items.push(plane);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Planes in paint order (back-to-front).
    #[inline]
    pub fn items(&self) -> &[PlaneDraw] {
        &self.items
    }

    /// Iterates planes that cover area, in paint order.
    pub fn iter_visible(&self) -> impl Iterator<Item = &PlaneDraw> {
        self.items.iter().filter(|p| !p.is_degenerate())
    }
}
