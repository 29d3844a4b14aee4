use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use drift_engine::scene::TextureId;

/// Why an image could not be turned into texture pixels.
#[derive(Debug)]
pub enum TextureLoadError {
    Io { path: PathBuf, source: io::Error },
    Decode { path: PathBuf, source: image::ImageError },
    Empty { path: PathBuf },
    /// The decode worker is gone.
    WorkerUnavailable { path: PathBuf },
}

impl fmt::Display for TextureLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureLoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            TextureLoadError::Decode { path, source } => {
                write!(f, "failed to decode {}: {source}", path.display())
            }
            TextureLoadError::Empty { path } => write!(f, "{} has no pixels", path.display()),
            TextureLoadError::WorkerUnavailable { path } => {
                write!(f, "decode worker unavailable for {}", path.display())
            }
        }
    }
}

impl std::error::Error for TextureLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureLoadError::Io { source, .. } => Some(source),
            TextureLoadError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Decoded RGBA8 pixels (straight alpha, sRGB) ready for upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Outcome of one texture request.
#[derive(Debug)]
pub enum TextureEvent {
    Ready(DecodedImage),
    Failed { id: TextureId, error: TextureLoadError },
}

impl TextureEvent {
    pub fn id(&self) -> TextureId {
        match self {
            TextureEvent::Ready(img) => img.id,
            TextureEvent::Failed { id, .. } => *id,
        }
    }
}

/// Something that can start loading an image and hand out its texture id.
///
/// The id is valid immediately; pixels arrive later.
pub trait TextureRequests {
    fn request(&mut self, source: &Path) -> TextureId;
}

struct Job {
    id: TextureId,
    path: PathBuf,
}

/// Decodes images on a background thread.
///
/// Requests are queued in order; results are collected without blocking via
/// [`TextureLoader::poll`]. Dropping the loader stops the worker after the
/// job in progress.
pub struct TextureLoader {
    next_id: u32,
    jobs: Option<Sender<Job>>,
    events: Receiver<TextureEvent>,
    /// Failures detected on the requesting side.
    local: Vec<TextureEvent>,
    worker: Option<JoinHandle<()>>,
}

impl TextureLoader {
    pub fn spawn() -> Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel::<TextureEvent>();

        let worker = std::thread::Builder::new()
            .name("drift-decode".to_string())
            .spawn(move || {
                for job in job_rx {
                    let event = match decode_file(&job.path) {
                        Ok((width, height, pixels)) => {
                            log::debug!("decoded {} ({width}x{height})", job.path.display());
                            TextureEvent::Ready(DecodedImage { id: job.id, width, height, pixels })
                        }
                        Err(error) => TextureEvent::Failed { id: job.id, error },
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
            })
            .context("failed to spawn image decode thread")?;

        Ok(Self {
            next_id: 0,
            jobs: Some(job_tx),
            events: event_rx,
            local: Vec::new(),
            worker: Some(worker),
        })
    }

    /// Drains every finished request without blocking.
    pub fn poll(&mut self) -> Vec<TextureEvent> {
        let mut out = std::mem::take(&mut self.local);
        out.extend(self.events.try_iter());
        out
    }

    /// Blocks up to `timeout` for the next finished request.
    pub fn wait(&mut self, timeout: Duration) -> Option<TextureEvent> {
        if !self.local.is_empty() {
            return Some(self.local.remove(0));
        }
        match self.events.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl TextureRequests for TextureLoader {
    fn request(&mut self, source: &Path) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let job = Job { id, path: source.to_path_buf() };
        let sent = self.jobs.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            self.local.push(TextureEvent::Failed {
                id,
                error: TextureLoadError::WorkerUnavailable { path: source.to_path_buf() },
            });
        }
        id
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("image decode thread panicked");
            }
        }
    }
}

/// Reads and decodes one image file into RGBA8 pixels.
pub fn decode_file(path: &Path) -> Result<(u32, u32, Vec<u8>), TextureLoadError> {
    let bytes = std::fs::read(path).map_err(|source| TextureLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = image::load_from_memory(&bytes)
        .map_err(|source| TextureLoadError::Decode { path: path.to_path_buf(), source })?
        .to_rgba8();

    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureLoadError::Empty { path: path.to_path_buf() });
    }
    Ok((width, height, rgba.into_raw()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_png(dir: &TempDir, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.path().join(name);
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 128]));
        img.save(&path).unwrap();
        path
    }

    // ── decode ────────────────────────────────────────────────────────────

    #[test]
    fn decodes_png_to_rgba8() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "decode.png", 3, 2);
        let (w, h, pixels) = decode_file(&path).unwrap();
        assert_eq!((w, h), (3, 2));
        assert_eq!(pixels.len(), 3 * 2 * 4);
        assert_eq!(&pixels[..4], &[255, 0, 0, 128]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = decode_file(&dir.path().join("here.png")).unwrap_err();
        assert!(matches!(err, TextureLoadError::Io { .. }));
        assert!(err.to_string().contains("here.png"));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"not an image at all").unwrap();
        let err = decode_file(&path).unwrap_err();
        assert!(matches!(err, TextureLoadError::Decode { .. }));
    }

    // ── worker ────────────────────────────────────────────────────────────

    #[test]
    fn worker_reports_in_request_order() {
        let dir = TempDir::new().unwrap();
        let good = write_png(&dir, "worker.png", 4, 4);
        let mut loader = TextureLoader::spawn().unwrap();

        let a = loader.request(&good);
        let b = loader.request(&dir.path().join("missing.png"));
        assert_ne!(a, b);

        let first = loader.wait(Duration::from_secs(10)).unwrap();
        let second = loader.wait(Duration::from_secs(10)).unwrap();
        assert_eq!(first.id(), a);
        assert_eq!(second.id(), b);
        match first {
            TextureEvent::Ready(img) => assert_eq!((img.width, img.height), (4, 4)),
            other => panic!("expected ready, got {other:?}"),
        }
        assert!(matches!(second, TextureEvent::Failed { .. }));
    }

    #[test]
    fn poll_is_empty_without_requests() {
        let mut loader = TextureLoader::spawn().unwrap();
        assert!(loader.poll().is_empty());
    }
}
