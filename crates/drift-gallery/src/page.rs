use std::path::{Path, PathBuf};

use drift_engine::coords::{Rect, Viewport};
use drift_engine::input::{InputFrame, InputState, Key};

use crate::config::PageLayoutConfig;
use crate::document::{Document, ElementId};

/// Share of the viewport height moved by PageUp/PageDown/Space.
const PAGE_STEP_FRACTION: f32 = 0.875;

#[derive(Debug, Clone)]
struct ImageBlock {
    source: PathBuf,
    /// Pixel size of the decoded image; unknown until it has loaded.
    intrinsic: Option<(u32, u32)>,
    /// Position inside the carrier, before translation.
    flow: Rect,
}

/// Native document: image blocks stacked in a centered column.
///
/// Blocks take the column width and keep their image's aspect ratio. A block
/// whose image has not loaded yet has zero height, the way an unsized image
/// element does, and grows once [`Page::set_intrinsic_size`] is called.
///
/// The page owns the native scroll offset, bounded by the body height that
/// the gallery mirrors from the carrier.
#[derive(Debug, Clone)]
pub struct Page {
    config: PageLayoutConfig,
    viewport: Viewport,
    blocks: Vec<ImageBlock>,

    natural_height: f32,
    body_height: f32,
    scroll: f32,
    carrier_translation: f32,

    reflow_pending: bool,
}

impl Page {
    pub fn new(config: PageLayoutConfig) -> Self {
        let mut page = Self {
            config,
            viewport: Viewport::default(),
            blocks: Vec::new(),
            natural_height: 0.0,
            body_height: 0.0,
            scroll: 0.0,
            carrier_translation: 0.0,
            reflow_pending: false,
        };
        page.relayout();
        page
    }

    /// Appends an image block and returns its element id.
    pub fn push_image(&mut self, source: impl Into<PathBuf>) -> ElementId {
        let id = ElementId(self.blocks.len());
        self.blocks.push(ImageBlock {
            source: source.into(),
            intrinsic: None,
            flow: Rect::default(),
        });
        self.relayout();
        id
    }

    /// Records the decoded size of an image. Returns `false` for unknown ids.
    pub fn set_intrinsic_size(&mut self, id: ElementId, width: u32, height: u32) -> bool {
        let Some(block) = self.blocks.get_mut(id.0) else {
            return false;
        };
        block.intrinsic = Some((width, height));
        self.relayout();
        true
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn body_height(&self) -> f32 {
        self.body_height
    }

    pub fn carrier_translation(&self) -> f32 {
        self.carrier_translation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Width of the image column for the current viewport.
    pub fn column_width(&self) -> f32 {
        let preferred = self.config.column_width.max(0.0);
        if self.viewport.is_valid() {
            preferred.min(self.viewport.width * self.config.max_column_fraction)
        } else {
            preferred
        }
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f32 {
        (self.body_height - self.viewport.height).max(0.0)
    }

    pub fn scroll_to(&mut self, offset: f32) {
        if offset.is_finite() {
            self.scroll = offset.clamp(0.0, self.max_scroll());
        }
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.scroll + delta);
    }

    /// Applies this frame's wheel and navigation keys to the scroll offset.
    pub fn handle_input(&mut self, input: &InputState, frame: &InputFrame) {
        // Wheel y is positive when scrolling up, i.e. towards offset 0.
        let wheel = frame.wheel_delta_px(self.config.line_height);
        if wheel != 0.0 {
            self.scroll_by(-wheel);
        }

        let line = self.config.line_height;
        let page = self.viewport.height * PAGE_STEP_FRACTION;
        for key in &frame.keys_pressed {
            match key {
                Key::ArrowDown => self.scroll_by(line),
                Key::ArrowUp => self.scroll_by(-line),
                Key::PageDown => self.scroll_by(page),
                Key::PageUp => self.scroll_by(-page),
                Key::Space if input.modifiers.shift => self.scroll_by(-page),
                Key::Space => self.scroll_by(page),
                Key::Home => self.scroll_to(0.0),
                Key::End => self.scroll_to(self.max_scroll()),
                _ => {}
            }
        }
    }

    fn relayout(&mut self) {
        let column = self.column_width();
        let left = if self.viewport.is_valid() {
            (self.viewport.width - column) * 0.5
        } else {
            0.0
        };

        let mut y = self.config.padding_top;
        let count = self.blocks.len();
        for (i, block) in self.blocks.iter_mut().enumerate() {
            let height = match block.intrinsic {
                Some((w, h)) if w > 0 => column * h as f32 / w as f32,
                _ => 0.0,
            };
            block.flow = Rect::new(left, y, column, height);
            y += height;
            if i + 1 < count {
                y += self.config.gap;
            }
        }

        let natural = y + self.config.padding_bottom;
        if natural != self.natural_height {
            self.natural_height = natural;
            self.reflow_pending = true;
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(PageLayoutConfig::default())
    }
}

impl Document for Page {
    fn tracked_elements(&self) -> Vec<ElementId> {
        (0..self.blocks.len()).map(ElementId).collect()
    }

    fn element_rect(&self, id: ElementId) -> Option<Rect> {
        // The carrier is pinned to the viewport, so only its translation moves blocks.
        self.blocks
            .get(id.0)
            .map(|b| b.flow.translated(0.0, self.carrier_translation))
    }

    fn image_source(&self, id: ElementId) -> Option<&Path> {
        self.blocks.get(id.0).map(|b| b.source.as_path())
    }

    fn carrier_natural_height(&self) -> f32 {
        self.natural_height
    }

    fn set_body_height(&mut self, height: f32) {
        self.body_height = height.max(0.0);
        self.scroll_to(self.scroll);
    }

    fn set_carrier_translation(&mut self, y: f32) {
        self.carrier_translation = y;
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.relayout();
            self.scroll_to(self.scroll);
        }
    }

    fn take_reflow(&mut self) -> bool {
        std::mem::take(&mut self.reflow_pending)
    }
}

#[cfg(test)]
mod tests {
    use drift_engine::input::{InputEvent, KeyState, Modifiers, MouseWheelDelta};

    use super::*;

    fn config() -> PageLayoutConfig {
        PageLayoutConfig {
            column_width: 400.0,
            max_column_fraction: 0.5,
            padding_top: 100.0,
            padding_bottom: 50.0,
            gap: 20.0,
            line_height: 40.0,
        }
    }

    fn page_with(sizes: &[(u32, u32)]) -> Page {
        let mut page = Page::new(config());
        page.set_viewport(Viewport::new(1000.0, 800.0));
        for (i, &(w, h)) in sizes.iter().enumerate() {
            let id = page.push_image(format!("img{i}.png"));
            page.set_intrinsic_size(id, w, h);
        }
        let natural = page.carrier_natural_height();
        page.set_body_height(natural);
        page
    }

    fn press(input: &mut InputState, frame: &mut InputFrame, key: Key) {
        input.apply_event(
            frame,
            InputEvent::Key { key, state: KeyState::Pressed, modifiers: input.modifiers, repeat: false },
        );
        input.apply_event(
            frame,
            InputEvent::Key { key, state: KeyState::Released, modifiers: input.modifiers, repeat: false },
        );
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn blocks_stack_in_a_centered_column() {
        let page = page_with(&[(800, 400), (400, 400)]);
        assert_eq!(page.column_width(), 400.0);

        let a = page.element_rect(ElementId(0)).unwrap();
        let b = page.element_rect(ElementId(1)).unwrap();
        assert_eq!(a, Rect::new(300.0, 100.0, 400.0, 200.0));
        assert_eq!(b, Rect::new(300.0, 320.0, 400.0, 400.0));
        assert_eq!(page.carrier_natural_height(), 100.0 + 200.0 + 20.0 + 400.0 + 50.0);
    }

    #[test]
    fn column_is_capped_by_viewport_fraction() {
        let mut page = Page::new(config());
        page.set_viewport(Viewport::new(600.0, 800.0));
        assert_eq!(page.column_width(), 300.0);
    }

    #[test]
    fn unloaded_image_has_zero_height_until_sized() {
        let mut page = Page::new(config());
        page.set_viewport(Viewport::new(1000.0, 800.0));
        let id = page.push_image("late.jpg");
        page.take_reflow();

        assert_eq!(page.element_rect(id).unwrap().height, 0.0);
        assert!(page.set_intrinsic_size(id, 200, 100));
        assert_eq!(page.element_rect(id).unwrap().height, 200.0);
        assert!(page.take_reflow());
        assert!(!page.take_reflow());
    }

    #[test]
    fn unknown_element_has_no_rect() {
        let mut page = page_with(&[(100, 100)]);
        assert!(page.element_rect(ElementId(7)).is_none());
        assert!(!page.set_intrinsic_size(ElementId(7), 1, 1));
    }

    #[test]
    fn carrier_translation_moves_rects() {
        let mut page = page_with(&[(400, 200)]);
        page.set_carrier_translation(-150.0);
        assert_eq!(page.element_rect(ElementId(0)).unwrap().top, -50.0);
    }

    // ── scrolling ─────────────────────────────────────────────────────────

    #[test]
    fn scroll_is_clamped_to_body_range() {
        let mut page = page_with(&[(400, 2000)]);
        // 100 + 2000 + 50 body, 800 viewport.
        assert_eq!(page.max_scroll(), 1350.0);
        page.scroll_to(5000.0);
        assert_eq!(page.scroll_offset(), 1350.0);
        page.scroll_by(-9000.0);
        assert_eq!(page.scroll_offset(), 0.0);
    }

    #[test]
    fn shrinking_body_clamps_scroll() {
        let mut page = page_with(&[(400, 2000)]);
        page.scroll_to(1000.0);
        page.set_body_height(900.0);
        assert_eq!(page.scroll_offset(), 100.0);
    }

    #[test]
    fn wheel_down_scrolls_towards_the_end() {
        let mut page = page_with(&[(400, 2000)]);
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        input.apply_event(
            &mut frame,
            InputEvent::MouseWheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: -3.0 },
                modifiers: Modifiers::default(),
            },
        );
        page.handle_input(&input, &frame);
        assert_eq!(page.scroll_offset(), 120.0);
    }

    #[test]
    fn navigation_keys_move_scroll() {
        let mut page = page_with(&[(400, 4000)]);
        let mut input = InputState::default();

        let mut frame = InputFrame::default();
        press(&mut input, &mut frame, Key::PageDown);
        press(&mut input, &mut frame, Key::ArrowDown);
        page.handle_input(&input, &frame);
        assert_eq!(page.scroll_offset(), 700.0 + 40.0);

        let mut frame = InputFrame::default();
        press(&mut input, &mut frame, Key::End);
        page.handle_input(&input, &frame);
        assert_eq!(page.scroll_offset(), page.max_scroll());

        let mut frame = InputFrame::default();
        press(&mut input, &mut frame, Key::Home);
        page.handle_input(&input, &frame);
        assert_eq!(page.scroll_offset(), 0.0);
    }
}
