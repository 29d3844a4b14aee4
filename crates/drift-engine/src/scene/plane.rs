use glam::{Mat4, Quat, Vec2, Vec3};

/// Opaque handle to an image texture owned by the plane renderer.
///
/// Handles are allocated by the caller (the gallery's texture loader) so a
/// plane can reference its texture before the pixels have arrived.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// One textured plane for the current frame, in world units.
///
/// The plane geometry is a unit square centered on the origin, so `scale`
/// carries the on-screen size and `position` the center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaneDraw {
    pub position: Vec3,
    pub scale: Vec3,
    pub alpha: f32,
    /// Scroll-velocity offset fed to the vertex shader.
    pub offset: Vec2,
    /// `None` (or a texture that has not been uploaded yet) draws the placeholder.
    pub texture: Option<TextureId>,
}

impl PlaneDraw {
    /// Model matrix: scale, then translate. Planes are never rotated.
    #[inline]
    pub fn model(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
    }

    /// True when the plane covers no area and can be skipped.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.scale.x == 0.0 || self.scale.y == 0.0 || self.alpha <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(position: Vec3, scale: Vec3) -> PlaneDraw {
        PlaneDraw { position, scale, alpha: 1.0, offset: Vec2::ZERO, texture: None }
    }

    #[test]
    fn model_maps_unit_square_corners_to_pixels() {
        let p = plane(Vec3::new(-100.0, 300.0, 0.0), Vec3::new(200.0, 100.0, 1.0));
        let m = p.model();
        let top_left = m.transform_point3(Vec3::new(-0.5, 0.5, 0.0));
        let bottom_right = m.transform_point3(Vec3::new(0.5, -0.5, 0.0));
        assert_eq!(top_left, Vec3::new(-200.0, 350.0, 0.0));
        assert_eq!(bottom_right, Vec3::new(0.0, 250.0, 0.0));
    }

    #[test]
    fn zero_scale_is_degenerate() {
        assert!(plane(Vec3::ZERO, Vec3::new(0.0, 10.0, 1.0)).is_degenerate());
        assert!(plane(Vec3::ZERO, Vec3::new(10.0, 0.0, 1.0)).is_degenerate());
        assert!(!plane(Vec3::ZERO, Vec3::new(10.0, 10.0, 1.0)).is_degenerate());
    }
}
