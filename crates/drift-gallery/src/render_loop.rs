use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use drift_engine::coords::Viewport;
use drift_engine::paint::Color;
use drift_engine::render::plane::{CameraUniform, PlaneGeometry};
use drift_engine::scene::{PlaneList, TextureId};

use crate::camera::Camera;
use crate::config::GalleryConfig;
use crate::document::{Document, ElementId};
use crate::layout_mirror::LayoutMirror;
use crate::scroll::{InertialScroll, ScrollState};
use crate::surface::{SurfaceBinding, TextureStatus};
use crate::texture_loader::TextureRequests;

/// Cloneable cancellation flag for a [`RenderLoop`].
///
/// Checked before every reschedule; once set the loop produces no more frames.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything the renderer needs for one frame.
pub struct GalleryFrame<'a> {
    pub camera: CameraUniform,
    pub geometry: &'a PlaneGeometry,
    pub planes: &'a PlaneList,
    pub clear_color: Color,
}

/// Drives the eased scroll and every surface binding, one tick per frame.
pub struct RenderLoop {
    config: GalleryConfig,
    scroll: InertialScroll,
    camera: Camera,
    viewport: Viewport,
    geometry: Rc<PlaneGeometry>,
    bindings: Vec<SurfaceBinding>,
    planes: PlaneList,
    running: bool,
    stop: StopHandle,
}

impl RenderLoop {
    pub fn new(config: GalleryConfig) -> Self {
        let config = config.sanitized();
        Self {
            scroll: InertialScroll::new(config.easing_factor),
            camera: Camera::new(config.camera),
            viewport: Viewport::default(),
            geometry: Rc::new(PlaneGeometry::grid(config.grid_segments)),
            bindings: Vec::new(),
            planes: PlaneList::new(),
            running: false,
            stop: StopHandle::default(),
            config,
        }
    }

    /// Mirrors the layout and binds one plane per tracked element, in
    /// document order.
    pub fn start<D, T>(&mut self, doc: &mut D, textures: &mut T)
    where
        D: Document + ?Sized,
        T: TextureRequests + ?Sized,
    {
        if self.running {
            log::warn!("render loop already started");
            return;
        }

        LayoutMirror::initialize(doc);
        let scroll = self.scroll.state();
        self.bindings = doc
            .tracked_elements()
            .into_iter()
            .map(|element| {
                SurfaceBinding::initialize(
                    &*doc,
                    element,
                    Rc::clone(&self.geometry),
                    textures,
                    self.viewport,
                    &scroll,
                    self.config.offset_coefficient,
                )
            })
            .collect();

        self.running = true;
        log::info!("render loop started with {} planes", self.bindings.len());
    }

    /// One frame: ease the scroll, then move every plane onto its element.
    ///
    /// Returns `None` when nothing should be drawn: before `start`, after a
    /// stop, or while the viewport has no area.
    pub fn tick<D: Document + ?Sized>(&mut self, doc: &mut D) -> Option<GalleryFrame<'_>> {
        if !self.is_running() {
            return None;
        }

        if doc.take_reflow() {
            LayoutMirror::initialize(doc);
        }

        let scroll = self.scroll.tick(doc);
        for binding in &mut self.bindings {
            binding.update(&*doc, self.viewport, &scroll, self.config.offset_coefficient);
        }

        let camera = self.camera.uniform()?;

        self.planes.clear();
        for binding in &self.bindings {
            self.planes.push(binding.mesh().draw());
        }

        Some(GalleryFrame {
            camera,
            geometry: &self.geometry,
            planes: &self.planes,
            clear_color: self.config.clear_color,
        })
    }

    /// Applies a new viewport before the next tick.
    pub fn resize<D: Document + ?Sized>(&mut self, doc: &mut D, viewport: Viewport) {
        self.viewport = viewport;
        doc.set_viewport(viewport);
        LayoutMirror::initialize(doc);

        match self.camera.calibrate(viewport) {
            Ok(()) => log::info!(
                "camera calibrated: fov {:.3}° aspect {:.3}",
                self.camera.vertical_fov_degrees,
                self.camera.aspect_ratio
            ),
            Err(e) => log::debug!("{e}; frames skipped until resized"),
        }
    }

    /// Marks texture `id` as uploaded. Returns the elements that show it.
    pub fn texture_ready(&mut self, id: TextureId) -> Vec<ElementId> {
        self.set_texture_status(id, TextureStatus::Ready)
    }

    /// Marks texture `id` as failed; its planes keep the placeholder.
    pub fn texture_failed(&mut self, id: TextureId) -> Vec<ElementId> {
        self.set_texture_status(id, TextureStatus::Failed)
    }

    fn set_texture_status(&mut self, id: TextureId, status: TextureStatus) -> Vec<ElementId> {
        self.bindings
            .iter_mut()
            .filter_map(|b| b.set_texture_status(id, status).then(|| b.element()))
            .collect()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.stop.is_stopped()
    }

    pub fn bindings(&self) -> &[SurfaceBinding] {
        &self.bindings
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use glam::{Vec2, Vec3};

    use super::*;
    use crate::config::PageLayoutConfig;
    use crate::page::Page;

    #[derive(Default)]
    struct Ids(u32);

    impl TextureRequests for Ids {
        fn request(&mut self, _: &Path) -> TextureId {
            let id = TextureId(self.0);
            self.0 += 1;
            id
        }
    }

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    /// Three 400×400 blocks, tops at 100, 600 and 1100 in a 1000×800 window.
    fn three_block_page() -> Page {
        let mut page = Page::new(PageLayoutConfig {
            column_width: 400.0,
            max_column_fraction: 1.0,
            padding_top: 100.0,
            padding_bottom: 100.0,
            gap: 100.0,
            line_height: 40.0,
        });
        for name in ["a.png", "b.png", "c.png"] {
            let id = page.push_image(name);
            page.set_intrinsic_size(id, 400, 400);
        }
        page
    }

    fn started(config: GalleryConfig) -> (RenderLoop, Page) {
        let mut page = three_block_page();
        let mut rl = RenderLoop::new(config);
        rl.resize(&mut page, Viewport::new(1000.0, 800.0));
        rl.start(&mut page, &mut Ids::default());
        (rl, page)
    }

    fn world_y(rl: &RenderLoop) -> Vec<f32> {
        rl.bindings().iter().map(|b| b.mesh().position.y).collect()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn tick_before_start_draws_nothing() {
        let mut page = three_block_page();
        let mut rl = RenderLoop::new(GalleryConfig::default());
        rl.resize(&mut page, Viewport::new(1000.0, 800.0));
        assert!(rl.tick(&mut page).is_none());
    }

    #[test]
    fn start_binds_elements_in_document_order() {
        let (rl, page) = started(GalleryConfig::default());
        let elements: Vec<_> = rl.bindings().iter().map(|b| b.element()).collect();
        assert_eq!(elements, vec![ElementId(0), ElementId(1), ElementId(2)]);
        assert_eq!(page.body_height(), 100.0 + 3.0 * 400.0 + 2.0 * 100.0 + 100.0);
        assert_eq!(world_y(&rl), vec![100.0, -400.0, -900.0]);
    }

    #[test]
    fn tick_builds_one_plane_per_binding() {
        let (mut rl, mut page) = started(GalleryConfig::default());
        let frame = rl.tick(&mut page).unwrap();
        assert_eq!(frame.planes.len(), 3);
        assert_eq!(frame.geometry.segments(), 100);
        assert_eq!(frame.planes.items()[0].scale, Vec3::new(400.0, 400.0, 1.0));
    }

    #[test]
    fn stop_handle_ends_the_loop() {
        let (mut rl, mut page) = started(GalleryConfig::default());
        let handle = rl.stop_handle();
        assert!(rl.is_running());
        handle.clone().stop();
        assert!(handle.is_stopped());
        assert!(!rl.is_running());
        assert!(rl.tick(&mut page).is_none());
    }

    #[test]
    fn zero_viewport_skips_the_draw() {
        let (mut rl, mut page) = started(GalleryConfig::default());
        page.scroll_to(100.0);
        rl.resize(&mut page, Viewport::new(0.0, 0.0));
        assert!(rl.tick(&mut page).is_none());

        rl.resize(&mut page, Viewport::new(1000.0, 800.0));
        assert!(rl.tick(&mut page).is_some());
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_recalibrates_camera_and_planes() {
        let (mut rl, mut page) = started(GalleryConfig::default());
        rl.tick(&mut page);
        let before = world_y(&rl);

        rl.resize(&mut page, Viewport::new(1200.0, 900.0));
        let expected_fov = (2.0 * (450.0f32 / 1000.0).atan()).to_degrees();
        assert!(approx(rl.camera().vertical_fov_degrees, expected_fov, 1.0e-4));
        assert!(approx(rl.camera().aspect_ratio, 1200.0 / 900.0, 1.0e-6));

        rl.tick(&mut page);
        let after = world_y(&rl);
        for (b, a) in before.iter().zip(&after) {
            // Half the height grew by 50.
            assert!(approx(a - b, 50.0, 1.0e-3));
        }
        assert_eq!(rl.bindings()[0].mesh().position.x, 0.0);
    }

    #[test]
    fn reflow_extends_body_on_next_tick() {
        let (mut rl, mut page) = started(GalleryConfig::default());
        let id = page.push_image("late.png");
        page.set_intrinsic_size(id, 400, 800);
        let body = page.body_height();

        rl.tick(&mut page);
        assert_eq!(page.body_height(), body + 100.0 + 800.0);
    }

    #[test]
    fn texture_status_reaches_bindings() {
        let (mut rl, _) = started(GalleryConfig::default());
        assert_eq!(rl.texture_ready(TextureId(1)), vec![ElementId(1)]);
        assert_eq!(rl.texture_failed(TextureId(2)), vec![ElementId(2)]);
        assert!(rl.texture_ready(TextureId(99)).is_empty());
    }

    // ── scroll scenario ───────────────────────────────────────────────────

    #[test]
    fn planes_glide_with_eased_scroll() {
        let (mut rl, mut page) = started(GalleryConfig::default());
        let start = world_y(&rl);
        page.scroll_to(500.0);

        let mut prev = start.clone();
        let mut prev_step = f32::INFINITY;
        for tick in 0..300 {
            rl.tick(&mut page);
            let now = world_y(&rl);
            let step = now[0] - prev[0];
            if tick == 0 {
                assert!(approx(step, 37.5, 1.0e-3));
            }
            assert!(step >= -1.0e-3);
            assert!(step <= prev_step + 1.0e-3);
            // Planes move together.
            for i in 1..now.len() {
                assert!(approx(now[i] - start[i], now[0] - start[0], 1.0e-2));
            }
            prev_step = step;
            prev = now;
        }

        assert!(approx(prev[0] - start[0], 500.0, 1.0e-2));
        assert!(approx(rl.scroll_state().smoothed_offset, 500.0, 1.0e-2));
        assert_eq!(page.carrier_translation(), -rl.scroll_state().smoothed_offset);
    }

    #[test]
    fn unit_easing_jumps_in_one_tick() {
        let (mut rl, mut page) = started(GalleryConfig::default().with_easing_factor(1.0));
        let start = world_y(&rl);
        page.scroll_to(500.0);
        rl.tick(&mut page);
        assert_eq!(world_y(&rl)[0] - start[0], 500.0);
        assert_eq!(rl.scroll_state().delta(), 0.0);
    }

    #[test]
    fn offset_coefficient_bends_planes_by_scroll_lag() {
        let (mut rl, mut page) = started(GalleryConfig::default().with_offset_coefficient(0.0003));
        page.scroll_to(500.0);
        let frame = rl.tick(&mut page).unwrap();
        assert_eq!(frame.planes.len(), 3);
        // (500 - 37.5) * 0.0003
        for plane in frame.planes.items() {
            assert_eq!(plane.offset.x, 0.0);
            assert!(approx(plane.offset.y, 0.13875, 1.0e-5));
        }
    }

    #[test]
    fn default_coefficient_keeps_planes_flat() {
        let (mut rl, mut page) = started(GalleryConfig::default());
        page.scroll_to(500.0);
        let frame = rl.tick(&mut page).unwrap();
        assert!(frame.planes.items().iter().all(|p| p.offset == Vec2::ZERO));
    }
}
