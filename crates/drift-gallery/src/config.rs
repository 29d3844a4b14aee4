use drift_engine::paint::Color;

/// Smallest accepted easing factor. Zero would freeze the smoothed offset.
const MIN_EASING: f32 = 1.0e-3;

/// Perspective camera placement.
///
/// `distance` is how far the camera sits from the z = 0 plane on +Z; the
/// field of view is derived from it so that one world unit is one logical
/// pixel at z = 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            near: 1.0,
            // Beyond `distance` so planes at z = 0 are not clipped.
            far: 2000.0,
            distance: 1000.0,
        }
    }
}

/// Layout parameters of the native single-column page.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PageLayoutConfig {
    /// Preferred column width in logical pixels.
    pub column_width: f32,
    /// Upper bound on the column width as a fraction of the viewport width.
    pub max_column_fraction: f32,
    pub padding_top: f32,
    pub padding_bottom: f32,
    /// Vertical space between image blocks.
    pub gap: f32,
    /// Pixels scrolled per wheel line and per arrow key.
    pub line_height: f32,
}

impl Default for PageLayoutConfig {
    fn default() -> Self {
        Self {
            column_width: 640.0,
            max_column_fraction: 0.8,
            padding_top: 120.0,
            padding_bottom: 120.0,
            gap: 96.0,
            line_height: 40.0,
        }
    }
}

/// Gallery configuration.
///
/// All values have working defaults; builder methods sanitize their input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Fraction of the remaining distance the smoothed scroll covers per tick.
    pub easing_factor: f32,
    /// Subdivisions per side of the shared plane grid.
    pub grid_segments: u32,
    /// Scale applied to `raw - smoothed` before it reaches the plane's
    /// offset uniform. Zero keeps planes flat.
    pub offset_coefficient: f32,
    pub camera: CameraConfig,
    pub clear_color: Color,
    pub page: PageLayoutConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            easing_factor: 0.075,
            grid_segments: 100,
            offset_coefficient: 0.0,
            camera: CameraConfig::default(),
            clear_color: Color::from_srgb_u8(18, 18, 20, 255),
            page: PageLayoutConfig::default(),
        }
    }
}

impl GalleryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the easing factor, clamped into `(0, 1]`.
    pub fn with_easing_factor(mut self, k: f32) -> Self {
        self.easing_factor = sanitize_easing(k);
        self
    }

    pub fn with_grid_segments(mut self, segments: u32) -> Self {
        self.grid_segments = segments.max(1);
        self
    }

    pub fn with_offset_coefficient(mut self, coefficient: f32) -> Self {
        self.offset_coefficient = if coefficient.is_finite() { coefficient } else { 0.0 };
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_page(mut self, page: PageLayoutConfig) -> Self {
        self.page = page;
        self
    }

    /// Returns a copy with every field forced into its valid range.
    ///
    /// Fields are public, so values set directly bypass the builders.
    pub fn sanitized(mut self) -> Self {
        self.easing_factor = sanitize_easing(self.easing_factor);
        self.grid_segments = self.grid_segments.max(1);
        if !self.offset_coefficient.is_finite() {
            self.offset_coefficient = 0.0;
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near && self.camera.distance > 0.0) {
            log::warn!("invalid camera config {:?}; using defaults", self.camera);
            self.camera = CameraConfig::default();
        }
        if !self.clear_color.is_finite() {
            log::warn!("clear color {:?} is not finite; using default", self.clear_color);
            self.clear_color = GalleryConfig::default().clear_color;
        }
        self
    }
}

fn sanitize_easing(k: f32) -> f32 {
    if !k.is_finite() {
        log::warn!("easing factor {k} is not finite; using default");
        return GalleryConfig::default().easing_factor;
    }
    let clamped = k.clamp(MIN_EASING, 1.0);
    if clamped != k {
        log::warn!("easing factor {k} clamped to {clamped}");
    }
    clamped
}
