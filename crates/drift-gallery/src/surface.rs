use std::rc::Rc;

use drift_engine::coords::{Rect, Viewport};
use drift_engine::render::plane::PlaneGeometry;
use drift_engine::scene::{PlaneDraw, TextureId};
use glam::{Vec2, Vec3};

use crate::document::{Document, ElementId};
use crate::scroll::ScrollState;
use crate::texture_loader::TextureRequests;

/// Load state of a plane's image.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureStatus {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureHandle {
    pub id: TextureId,
    pub status: TextureStatus,
}

/// Per-plane values handed to the shader.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaneUniforms {
    pub alpha: f32,
    pub offset: Vec2,
    /// `None` when the element has no image source.
    pub texture: Option<TextureHandle>,
}

/// A textured plane placed in world space.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    pub position: Vec3,
    pub scale: Vec3,
    pub uniforms: PlaneUniforms,
    /// Grid shared by every plane of the loop.
    pub geometry: Rc<PlaneGeometry>,
}

impl SurfaceMesh {
    /// True when the mesh covers no area this frame.
    pub fn is_degenerate(&self) -> bool {
        self.scale.x == 0.0 || self.scale.y == 0.0
    }

    pub fn draw(&self) -> PlaneDraw {
        PlaneDraw {
            position: self.position,
            scale: self.scale,
            alpha: self.uniforms.alpha,
            offset: self.uniforms.offset,
            texture: self
                .uniforms
                .texture
                .filter(|t| t.status != TextureStatus::Failed)
                .map(|t| t.id),
        }
    }
}

/// Maps a viewport-relative rectangle (y down, origin top-left) to the
/// center and size of a plane in world space (y up, origin at the viewport
/// center), one unit per logical pixel.
///
/// Empty or non-finite rectangles yield a zero-area scale.
pub fn world_transform(rect: Rect, viewport: Viewport) -> (Vec3, Vec3) {
    if !rect.is_finite() || rect.is_empty() {
        return (Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
    }
    let (half_w, half_h) = viewport.half();
    let x = rect.left - half_w + rect.width / 2.0;
    let y = -rect.top + half_h - rect.height / 2.0;
    (Vec3::new(x, y, 0.0), Vec3::new(rect.width, rect.height, 1.0))
}

/// Keeps one plane in lockstep with one document element.
#[derive(Debug, Clone)]
pub struct SurfaceBinding {
    element: ElementId,
    /// Last rectangle read from the document; `None` if the element vanished.
    rect: Option<Rect>,
    mesh: SurfaceMesh,
}

impl SurfaceBinding {
    /// Creates the plane for `element`, requests its image and places it.
    pub fn initialize<D, T>(
        doc: &D,
        element: ElementId,
        geometry: Rc<PlaneGeometry>,
        textures: &mut T,
        viewport: Viewport,
        scroll: &ScrollState,
        offset_coefficient: f32,
    ) -> Self
    where
        D: Document + ?Sized,
        T: TextureRequests + ?Sized,
    {
        let texture = doc.image_source(element).map(|src| TextureHandle {
            id: textures.request(src),
            status: TextureStatus::Pending,
        });
        if texture.is_none() {
            log::warn!("element {element:?} has no image source");
        }

        let mut binding = Self {
            element,
            rect: None,
            mesh: SurfaceMesh {
                position: Vec3::ZERO,
                scale: Vec3::new(0.0, 0.0, 1.0),
                uniforms: PlaneUniforms {
                    alpha: 1.0,
                    offset: Vec2::ZERO,
                    texture,
                },
                geometry,
            },
        };
        binding.update(doc, viewport, scroll, offset_coefficient);
        log::debug!(
            "bound element {element:?} at {:?} size {:?}",
            binding.mesh.position,
            binding.mesh.scale
        );
        binding
    }

    /// Re-reads the element rectangle and moves the plane onto it.
    ///
    /// Pure with respect to its inputs: calling it twice without changes in
    /// between produces the same mesh.
    pub fn update<D: Document + ?Sized>(
        &mut self,
        doc: &D,
        viewport: Viewport,
        scroll: &ScrollState,
        offset_coefficient: f32,
    ) {
        self.rect = doc.element_rect(self.element);
        let (position, scale) = match self.rect {
            Some(rect) => world_transform(rect, viewport),
            None => (Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)),
        };
        self.mesh.position = position;
        self.mesh.scale = scale;
        self.mesh.uniforms.offset = Vec2::new(0.0, scroll.delta() * offset_coefficient);
    }

    /// Marks the texture `id` loaded or failed. Returns `true` if this plane uses it.
    pub fn set_texture_status(&mut self, id: TextureId, status: TextureStatus) -> bool {
        match self.mesh.uniforms.texture.as_mut() {
            Some(handle) if handle.id == id => {
                handle.status = status;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn element(&self) -> ElementId {
        self.element
    }

    #[inline]
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    #[inline]
    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::PageLayoutConfig;
    use crate::page::Page;

    /// Hands out sequential ids without loading anything.
    #[derive(Default)]
    struct Ids(u32);

    impl TextureRequests for Ids {
        fn request(&mut self, _: &Path) -> TextureId {
            self.0 += 1;
            TextureId(self.0)
        }
    }

    fn scroll(raw: f32, smoothed: f32) -> ScrollState {
        ScrollState { raw_offset: raw, smoothed_offset: smoothed, easing_factor: 0.075 }
    }

    fn page_1000x800() -> (Page, ElementId) {
        let mut page = Page::new(PageLayoutConfig {
            column_width: 200.0,
            max_column_fraction: 1.0,
            padding_top: 50.0,
            padding_bottom: 0.0,
            gap: 0.0,
            line_height: 40.0,
        });
        page.set_viewport(Viewport::new(1000.0, 800.0));
        let id = page.push_image("a.png");
        page.set_intrinsic_size(id, 400, 200);
        (page, id)
    }

    // ── world transform ───────────────────────────────────────────────────

    #[test]
    fn rect_maps_to_centered_world_space() {
        let (pos, scale) = world_transform(Rect::new(300.0, 50.0, 200.0, 100.0), Viewport::new(1000.0, 800.0));
        assert_eq!(pos, Vec3::new(-100.0, 300.0, 0.0));
        assert_eq!(scale, Vec3::new(200.0, 100.0, 1.0));
    }

    #[test]
    fn viewport_filling_rect_sits_at_origin() {
        let (pos, scale) = world_transform(Rect::new(0.0, 0.0, 1000.0, 800.0), Viewport::new(1000.0, 800.0));
        assert_eq!(pos, Vec3::ZERO);
        assert_eq!(scale, Vec3::new(1000.0, 800.0, 1.0));
    }

    #[test]
    fn empty_rect_is_zero_area() {
        let (_, scale) = world_transform(Rect::new(10.0, 10.0, 0.0, 50.0), Viewport::new(1000.0, 800.0));
        assert_eq!(scale.x * scale.y, 0.0);
        let (_, scale) = world_transform(Rect::new(f32::NAN, 0.0, 10.0, 10.0), Viewport::new(1000.0, 800.0));
        assert_eq!(scale.x * scale.y, 0.0);
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn initialize_requests_texture_and_places_plane() {
        let (page, id) = page_1000x800();
        let mut ids = Ids::default();
        let geometry = Rc::new(PlaneGeometry::grid(4));
        let b = SurfaceBinding::initialize(
            &page, id, geometry, &mut ids, Viewport::new(1000.0, 800.0), &scroll(0.0, 0.0), 0.0,
        );

        // Column of 200 centered in 1000: left 400, top 50, height 100.
        let mesh = b.mesh();
        assert_eq!(mesh.position, Vec3::new(0.0, 300.0, 0.0));
        assert_eq!(mesh.scale, Vec3::new(200.0, 100.0, 1.0));
        assert_eq!(mesh.uniforms.alpha, 1.0);
        assert_eq!(mesh.uniforms.offset, Vec2::ZERO);
        assert_eq!(
            mesh.uniforms.texture,
            Some(TextureHandle { id: TextureId(1), status: TextureStatus::Pending })
        );
    }

    #[test]
    fn update_is_idempotent() {
        let (page, id) = page_1000x800();
        let vp = Viewport::new(1000.0, 800.0);
        let s = scroll(10.0, 4.0);
        let mut b = SurfaceBinding::initialize(&page, id, Rc::new(PlaneGeometry::grid(1)), &mut Ids::default(), vp, &s, 0.5);

        b.update(&page, vp, &s, 0.5);
        let once = (b.mesh().position, b.mesh().scale, b.mesh().uniforms);
        b.update(&page, vp, &s, 0.5);
        assert_eq!(once, (b.mesh().position, b.mesh().scale, b.mesh().uniforms));
        assert_eq!(b.mesh().uniforms.offset, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn zero_coefficient_keeps_offset_flat() {
        let (page, id) = page_1000x800();
        let vp = Viewport::new(1000.0, 800.0);
        let mut b = SurfaceBinding::initialize(&page, id, Rc::new(PlaneGeometry::grid(1)), &mut Ids::default(), vp, &scroll(0.0, 0.0), 0.0);
        b.update(&page, vp, &scroll(900.0, 10.0), 0.0);
        assert_eq!(b.mesh().uniforms.offset, Vec2::ZERO);
    }

    #[test]
    fn missing_element_degenerates_then_heals() {
        let mut page = Page::new(PageLayoutConfig::default());
        page.set_viewport(Viewport::new(1000.0, 800.0));
        let vp = page.viewport();
        let id = page.push_image("slow.jpg");

        let mut b = SurfaceBinding::initialize(&page, id, Rc::new(PlaneGeometry::grid(1)), &mut Ids::default(), vp, &scroll(0.0, 0.0), 0.0);
        assert!(b.mesh().is_degenerate());

        page.set_intrinsic_size(id, 640, 480);
        b.update(&page, vp, &scroll(0.0, 0.0), 0.0);
        assert!(!b.mesh().is_degenerate());

        let mut gone = SurfaceBinding::initialize(&page, ElementId(42), Rc::new(PlaneGeometry::grid(1)), &mut Ids::default(), vp, &scroll(0.0, 0.0), 0.0);
        gone.update(&page, vp, &scroll(0.0, 0.0), 0.0);
        assert!(gone.mesh().is_degenerate());
        assert!(gone.mesh().uniforms.texture.is_none());
    }

    #[test]
    fn failed_texture_draws_placeholder() {
        let (page, id) = page_1000x800();
        let vp = Viewport::new(1000.0, 800.0);
        let mut b = SurfaceBinding::initialize(&page, id, Rc::new(PlaneGeometry::grid(1)), &mut Ids::default(), vp, &scroll(0.0, 0.0), 0.0);
        assert_eq!(b.mesh().draw().texture, Some(TextureId(1)));

        assert!(!b.set_texture_status(TextureId(9), TextureStatus::Ready));
        assert!(b.set_texture_status(TextureId(1), TextureStatus::Failed));
        assert_eq!(b.mesh().draw().texture, None);
    }
}
