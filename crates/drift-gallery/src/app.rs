use std::path::PathBuf;

use anyhow::Result;

use drift_engine::coords::Viewport;
use drift_engine::core::{App as EngineApp, AppControl, FrameCtx};
use drift_engine::device::GpuInit;
use drift_engine::input::Key;
use drift_engine::render::plane::PlaneRenderer;
use drift_engine::window::{Runtime, RuntimeConfig};

use crate::config::GalleryConfig;
use crate::page::Page;
use crate::render_loop::{RenderLoop, StopHandle};
use crate::texture_loader::{DecodedImage, TextureEvent, TextureLoader};

/// Frames between two frame-timing trace lines.
const TIMING_LOG_INTERVAL: u64 = 600;

// ── Gallery ───────────────────────────────────────────────────────────────

/// Top-level gallery builder.
///
/// ```rust,ignore
/// Gallery::new()
///     .title("Drift")
///     .size(1280.0, 800.0)
///     .config(GalleryConfig::default().with_easing_factor(0.1))
///     .images(paths)
///     .run()?;
/// ```
pub struct Gallery {
    title: String,
    width: f64,
    height: f64,
    config: GalleryConfig,
    gpu: GpuInit,
    images: Vec<PathBuf>,
}

impl Gallery {
    pub fn new() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            title: runtime.title,
            width: runtime.initial_size.width,
            height: runtime.initial_size.height,
            config: GalleryConfig::default(),
            gpu: GpuInit::default(),
            images: Vec::new(),
        }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn config(mut self, config: GalleryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    /// Append one image to the page.
    pub fn image(mut self, path: impl Into<PathBuf>) -> Self {
        self.images.push(path.into());
        self
    }

    /// Append images to the page, in order.
    pub fn images<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.images.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Opens the window and runs until it is closed or Escape is pressed.
    pub fn run(self) -> Result<()> {
        let runtime = RuntimeConfig::default()
            .with_title(self.title.clone())
            .with_size(self.width, self.height);
        let gpu = self.gpu.clone();
        let app = GalleryApp::new(self)?;
        Runtime::run(runtime, gpu, app)
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

// ── GalleryApp ────────────────────────────────────────────────────────────

/// Engine-facing state: page, render loop, decoder and renderer.
struct GalleryApp {
    page: Page,
    render_loop: RenderLoop,
    loader: TextureLoader,
    renderer: PlaneRenderer,

    /// Decoded images waiting for a frame to upload them in.
    pending: Vec<DecodedImage>,
    started: bool,
    stop: StopHandle,
}

impl GalleryApp {
    fn new(gallery: Gallery) -> Result<Self> {
        let config = gallery.config.sanitized();
        let mut page = Page::new(config.page);
        for path in gallery.images {
            page.push_image(path);
        }
        if page.is_empty() {
            log::warn!("gallery has no images");
        }

        let render_loop = RenderLoop::new(config);
        let stop = render_loop.stop_handle();

        Ok(Self {
            page,
            render_loop,
            loader: TextureLoader::spawn()?,
            renderer: PlaneRenderer::new(),
            pending: Vec::new(),
            started: false,
            stop,
        })
    }

    fn collect_textures(&mut self) {
        for event in self.loader.poll() {
            match event {
                TextureEvent::Ready(image) => self.pending.push(image),
                TextureEvent::Failed { id, error } => {
                    log::warn!("{error}");
                    self.render_loop.texture_failed(id);
                }
            }
        }
    }
}

impl EngineApp for GalleryApp {
    fn on_resize(&mut self, viewport: Viewport) {
        self.render_loop.resize(&mut self.page, viewport);
        if !self.started {
            self.render_loop.start(&mut self.page, &mut self.loader);
            self.started = true;
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.keys_pressed.contains(&Key::Escape) {
            self.stop.stop();
            return AppControl::Continue;
        }

        self.page.handle_input(ctx.input, ctx.input_frame);
        self.collect_textures();

        let Some(frame) = self.render_loop.tick(&mut self.page) else {
            return AppControl::Continue;
        };

        let renderer = &mut self.renderer;
        let pending = &mut self.pending;
        let mut uploaded = Vec::new();
        let mut rejected = Vec::new();

        let control = ctx.render(frame.clear_color, |rctx, target| {
            for image in pending.drain(..) {
                match renderer.upload_texture(rctx, image.id, image.width, image.height, &image.pixels) {
                    Ok(()) => uploaded.push((image.id, image.width, image.height)),
                    Err(e) => {
                        log::warn!("texture {:?} rejected: {e}", image.id);
                        rejected.push(image.id);
                    }
                }
            }
            renderer.render(rctx, target, frame.camera, frame.geometry, frame.planes);
        });

        for (id, width, height) in uploaded {
            for element in self.render_loop.texture_ready(id) {
                // The block gains its height; the next tick re-mirrors the body.
                self.page.set_intrinsic_size(element, width, height);
            }
            log::info!("texture {id:?} ready ({width}x{height})");
        }
        for id in rejected {
            self.render_loop.texture_failed(id);
        }

        if ctx.time.frame_index % TIMING_LOG_INTERVAL == 0 {
            log::trace!(
                "frame {} avg {:.2} ms ({:.1} fps)",
                ctx.time.frame_index,
                ctx.time.avg_dt * 1000.0,
                ctx.time.fps()
            );
        }

        control
    }

    fn keep_running(&self) -> bool {
        !self.stop.is_stopped()
    }
}
