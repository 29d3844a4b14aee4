use std::fmt;

use drift_engine::coords::Viewport;
use drift_engine::render::plane::CameraUniform;
use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// The camera cannot be calibrated against the given viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraError {
    ZeroViewport { width: f32, height: f32 },
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::ZeroViewport { width, height } => {
                write!(f, "cannot calibrate camera for a {width}x{height} viewport")
            }
        }
    }
}

impl std::error::Error for CameraError {}

/// Vertical field of view (degrees) at which a camera `distance` units away
/// sees exactly `height` units of the z = 0 plane.
#[inline]
pub fn pixel_perfect_fov(height: f32, distance: f32) -> f32 {
    (2.0 * (height / 2.0 / distance).atan()).to_degrees()
}

/// Perspective camera on the +Z axis looking at the origin.
///
/// Calibrated so that one world unit equals one logical pixel at z = 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub vertical_fov_degrees: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub distance_from_origin: f32,
    calibrated: bool,
}

impl Camera {
    /// Creates an uncalibrated camera; call [`Camera::calibrate`] before use.
    pub fn new(config: CameraConfig) -> Self {
        Self {
            vertical_fov_degrees: 0.0,
            aspect_ratio: 1.0,
            near: config.near,
            far: config.far,
            distance_from_origin: config.distance,
            calibrated: false,
        }
    }

    /// Recomputes field of view and aspect ratio for `viewport`.
    ///
    /// A degenerate viewport leaves the camera uncalibrated.
    pub fn calibrate(&mut self, viewport: Viewport) -> Result<(), CameraError> {
        let Some(aspect) = viewport.aspect_ratio() else {
            self.calibrated = false;
            return Err(CameraError::ZeroViewport {
                width: viewport.width,
                height: viewport.height,
            });
        };
        self.aspect_ratio = aspect;
        self.vertical_fov_degrees = pixel_perfect_fov(viewport.height, self.distance_from_origin);
        self.calibrated = true;
        Ok(())
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.vertical_fov_degrees.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance_from_origin), Vec3::ZERO, Vec3::Y)
    }

    /// World → clip transform, or `None` while uncalibrated.
    pub fn view_proj(&self) -> Option<Mat4> {
        self.is_calibrated().then(|| self.projection() * self.view())
    }

    pub fn uniform(&self) -> Option<CameraUniform> {
        self.view_proj().map(CameraUniform::from_mat4)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn fov_follows_height_and_distance() {
        let mut cam = Camera::new(CameraConfig::default());
        cam.calibrate(Viewport::new(1000.0, 800.0)).unwrap();
        let expected = (2.0 * (400.0f32 / 1000.0).atan()).to_degrees();
        assert!(approx(cam.vertical_fov_degrees, expected, 1.0e-4));
        assert!(approx(cam.aspect_ratio, 1.25, 1.0e-6));
    }

    #[test]
    fn recalibration_tracks_resize() {
        let mut cam = Camera::new(CameraConfig::default());
        cam.calibrate(Viewport::new(1000.0, 800.0)).unwrap();
        cam.calibrate(Viewport::new(1200.0, 900.0)).unwrap();
        let expected = (2.0 * (450.0f32 / 1000.0).atan()).to_degrees();
        assert!(approx(cam.vertical_fov_degrees, expected, 1.0e-4));
        assert!(approx(cam.aspect_ratio, 4.0 / 3.0, 1.0e-6));
    }

    #[test]
    fn zero_viewport_is_rejected() {
        let mut cam = Camera::new(CameraConfig::default());
        cam.calibrate(Viewport::new(1000.0, 800.0)).unwrap();
        let err = cam.calibrate(Viewport::new(0.0, 800.0)).unwrap_err();
        assert_eq!(err, CameraError::ZeroViewport { width: 0.0, height: 800.0 });
        assert!(cam.view_proj().is_none());
        assert!(cam.uniform().is_none());
    }

    #[test]
    fn viewport_edges_land_on_clip_edges() {
        let mut cam = Camera::new(CameraConfig::default());
        cam.calibrate(Viewport::new(1000.0, 800.0)).unwrap();
        let vp = cam.view_proj().unwrap();

        let top_right = vp * Vec4::new(500.0, 400.0, 0.0, 1.0);
        let ndc = top_right / top_right.w;
        assert!(approx(ndc.x, 1.0, 1.0e-4));
        assert!(approx(ndc.y, 1.0, 1.0e-4));
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
