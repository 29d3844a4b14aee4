use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use drift_engine::device::GpuInit;
use drift_engine::logging::{init_logging, LoggingConfig};
use drift_gallery::{Gallery, GalleryConfig};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

#[derive(Parser, Debug)]
#[command(
    name = "drift-studio",
    about = "Scroll through images rendered as GPU planes",
    after_help = "keys: wheel / arrows / PageUp / PageDown / Space / Home / End scroll, Esc quits"
)]
struct Cli {
    /// Share of the remaining scroll distance eased per frame (0 < K <= 1)
    #[arg(long, value_name = "K", default_value_t = 0.075)]
    easing: f32,

    /// Scroll-lag bend applied to planes (0 disables)
    #[arg(long, value_name = "C", default_value_t = 0.0)]
    offset: f32,

    /// MSAA samples per pixel (1 disables; unsupported counts step down)
    #[arg(long, value_name = "N", default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=16))]
    msaa: u32,

    /// Image files or directories of images
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

impl Cli {
    fn config(&self) -> GalleryConfig {
        GalleryConfig::default()
            .with_easing_factor(self.easing)
            .with_offset_coefficient(self.offset)
    }

    fn gpu(&self) -> GpuInit {
        GpuInit {
            sample_count: self.msaa,
            ..GpuInit::default()
        }
    }

    fn images(&self) -> Result<Vec<PathBuf>> {
        let mut images = Vec::new();
        for path in &self.paths {
            collect_images(path, &mut images)?;
        }
        if images.is_empty() {
            bail!("no images found");
        }
        Ok(images)
    }
}

fn main() {
    init_logging(LoggingConfig::default());

    let cli = Cli::parse();
    let images = match cli.images() {
        Ok(images) => images,
        Err(e) => {
            eprintln!("drift-studio: {e:#}");
            std::process::exit(1);
        }
    };

    log::info!("opening {} images", images.len());

    if let Err(e) = Gallery::new()
        .title("Drift Studio")
        .config(cli.config())
        .gpu(cli.gpu())
        .images(images)
        .run()
    {
        log::error!("drift runtime error: {e:#}");
        std::process::exit(1);
    }
}

/// Files are taken as given; directories contribute their images sorted by name.
fn collect_images(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_dir() {
        let mut found: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("failed to read directory {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_image_extension(p))
            .collect();
        found.sort();
        if found.is_empty() {
            log::warn!("no images in {}", path.display());
        }
        out.extend(found);
    } else if path.is_file() {
        out.push(path.to_path_buf());
    } else {
        bail!("{} does not exist", path.display());
    }
    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
}
