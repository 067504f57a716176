use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dome_gallery::config::{self, GalleryConfig};
use dome_gallery::style::FitBasis;
use dome_gallery::viewer::Viewer;
use dome_gallery::{GalleryError, ImageEntry, Result};

/// Spin a dome of images in the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Image references; replaces the images from the config file
    images: Vec<String>,

    /// YAML config file (defaults to ./dome-gallery.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of sphere columns
    #[arg(short, long)]
    segments: Option<usize>,

    /// Pixels of drag per degree of rotation
    #[arg(long)]
    sensitivity: Option<f64>,

    /// Inertia dampening, 0 (short coast) to 1 (long coast)
    #[arg(long)]
    dampening: Option<f64>,

    /// Maximum pitch in degrees
    #[arg(long)]
    max_pitch: Option<f64>,

    /// Radius as a fraction of the fit basis
    #[arg(long)]
    fit: Option<f64>,

    #[arg(long, value_enum)]
    fit_basis: Option<FitBasis>,

    #[arg(long)]
    min_radius: Option<f64>,

    #[arg(long)]
    max_radius: Option<f64>,

    /// Show images in colour instead of grayscale
    #[arg(long)]
    color: bool,

    /// Start with the debug overlay shown
    #[arg(short, long)]
    debug: bool,

    /// Write logs here (the terminal is taken by the viewer)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, mut cfg: GalleryConfig) -> GalleryConfig {
        if !self.images.is_empty() {
            cfg.images = self.images.iter().cloned().map(ImageEntry::from).collect();
        }
        if let Some(segments) = self.segments {
            cfg.segments = segments;
        }
        if let Some(sensitivity) = self.sensitivity {
            cfg.drag_sensitivity = sensitivity;
        }
        if let Some(dampening) = self.dampening {
            cfg.drag_dampening = dampening;
        }
        if let Some(max_pitch) = self.max_pitch {
            cfg.max_vertical_rotation_deg = max_pitch;
        }
        if let Some(fit) = self.fit {
            cfg.fit = fit;
        }
        if let Some(fit_basis) = self.fit_basis {
            cfg.fit_basis = fit_basis;
        }
        if let Some(min_radius) = self.min_radius {
            cfg.min_radius = min_radius;
        }
        if self.max_radius.is_some() {
            cfg.max_radius = self.max_radius;
        }
        if self.color {
            cfg.grayscale = false;
        }
        cfg.normalized()
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| GalleryError::Logging(e.to_string()))
}

/// Main function
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let cfg = args.apply(config::load(args.config.as_deref())?);
    tracing::info!(
        images = cfg.images.len(),
        segments = cfg.segments,
        "starting dome gallery"
    );

    Viewer::new(cfg, args.debug).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config() {
        let args = Args::parse_from([
            "dome-gallery",
            "a.jpg",
            "b.jpg",
            "--segments",
            "12",
            "--fit-basis",
            "height",
            "--color",
        ]);
        let cfg = args.apply(GalleryConfig::default());
        assert_eq!(cfg.images.len(), 2);
        assert_eq!(cfg.segments, 12);
        assert_eq!(cfg.fit_basis, FitBasis::Height);
        assert!(!cfg.grayscale);
    }

    #[test]
    fn cli_bad_values_are_normalized() {
        let args = Args::parse_from(["dome-gallery", "--sensitivity", "0"]);
        let cfg = args.apply(GalleryConfig::default());
        assert_eq!(cfg.drag_sensitivity, 20.0);
    }

    #[test]
    fn without_images_config_images_stay() {
        let args = Args::parse_from(["dome-gallery"]);
        let cfg = args.apply(GalleryConfig {
            images: vec!["kept.jpg".into()],
            ..Default::default()
        });
        assert_eq!(cfg.images, vec![ImageEntry::from("kept.jpg")]);
    }
}
