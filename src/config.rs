use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GalleryError, Result};
use crate::layout::{data_number, ImageEntry};
use crate::math::clamp;
use crate::style::FitBasis;

/// Config file picked up from the working directory when none is named.
pub const DEFAULT_CONFIG_PATH: &str = "dome-gallery.yaml";

const DEFAULT_SEGMENTS: usize = 35;
const DEFAULT_FIT: f64 = 0.5;
const DEFAULT_MIN_RADIUS: f64 = 600.0;
const DEFAULT_PAD_FACTOR: f64 = 0.25;
const DEFAULT_MAX_PITCH: f64 = 5.0;
const DEFAULT_SENSITIVITY: f64 = 20.0;
const DEFAULT_DAMPENING: f64 = 2.0;
const DEFAULT_TILE_RADIUS_PX: f64 = 12.0;
const DEFAULT_OPENED_SIZE_PX: f64 = 400.0;

/// Everything a caller can tune about a gallery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub images: Vec<ImageEntry>,
    pub segments: usize,
    pub fit: f64,
    pub fit_basis: FitBasis,
    pub min_radius: f64,
    /// `None` leaves the radius unbounded above.
    pub max_radius: Option<f64>,
    pub pad_factor: f64,
    pub overlay_blur_color: String,
    pub max_vertical_rotation_deg: f64,
    pub drag_sensitivity: f64,
    pub enlarge_transition_ms: u64,
    /// Used clamped into `[0, 1]`, see [`GalleryConfig::dampening`].
    pub drag_dampening: f64,
    pub opened_image_width: String,
    pub opened_image_height: String,
    pub image_border_radius: String,
    pub opened_image_border_radius: String,
    pub grayscale: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            segments: DEFAULT_SEGMENTS,
            fit: DEFAULT_FIT,
            fit_basis: FitBasis::Auto,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: None,
            pad_factor: DEFAULT_PAD_FACTOR,
            overlay_blur_color: "#060010".to_string(),
            max_vertical_rotation_deg: DEFAULT_MAX_PITCH,
            drag_sensitivity: DEFAULT_SENSITIVITY,
            enlarge_transition_ms: 300,
            drag_dampening: DEFAULT_DAMPENING,
            opened_image_width: "400px".to_string(),
            opened_image_height: "400px".to_string(),
            image_border_radius: "30px".to_string(),
            opened_image_border_radius: "30px".to_string(),
            grayscale: true,
        }
    }
}

impl GalleryConfig {
    /// Replaces out-of-range numeric options with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.segments == 0 {
            warn!("segments must be at least 1; using {DEFAULT_SEGMENTS}");
            self.segments = DEFAULT_SEGMENTS;
        }
        self.fit = positive_or(self.fit, DEFAULT_FIT, "fit");
        self.min_radius = non_negative_or(self.min_radius, DEFAULT_MIN_RADIUS, "min_radius");
        self.max_radius = self.max_radius.filter(|r| r.is_finite() && *r > 0.0);
        self.pad_factor = non_negative_or(self.pad_factor, DEFAULT_PAD_FACTOR, "pad_factor");
        self.max_vertical_rotation_deg = non_negative_or(
            self.max_vertical_rotation_deg,
            DEFAULT_MAX_PITCH,
            "max_vertical_rotation_deg",
        );
        self.drag_sensitivity =
            positive_or(self.drag_sensitivity, DEFAULT_SENSITIVITY, "drag_sensitivity");
        if !self.drag_dampening.is_finite() {
            self.drag_dampening = DEFAULT_DAMPENING;
        }
        self
    }

    /// Inertia dampening in `[0, 1]`.
    pub fn dampening(&self) -> f64 {
        clamp(self.drag_dampening, 0.0, 1.0)
    }

    pub fn max_radius_or_unbounded(&self) -> f64 {
        self.max_radius.unwrap_or(f64::INFINITY)
    }

    pub fn tile_radius_px(&self) -> f64 {
        data_number(Some(&self.image_border_radius), DEFAULT_TILE_RADIUS_PX)
    }

    pub fn enlarge_radius_px(&self) -> f64 {
        data_number(Some(&self.opened_image_border_radius), DEFAULT_TILE_RADIUS_PX)
    }

    /// Target size of the enlarged tile, in pixels.
    pub fn opened_size_px(&self) -> [f64; 2] {
        [
            data_number(Some(&self.opened_image_width), DEFAULT_OPENED_SIZE_PX),
            data_number(Some(&self.opened_image_height), DEFAULT_OPENED_SIZE_PX),
        ]
    }
}

fn positive_or(value: f64, fallback: f64, name: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("{name} = {value} is not a positive number; using {fallback}");
        fallback
    }
}

fn non_negative_or(value: f64, fallback: f64, name: &str) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("{name} = {value} is not a non-negative number; using {fallback}");
        fallback
    }
}

/// Parses a YAML gallery config.
pub fn from_yaml(contents: &str, path: &Path) -> Result<GalleryConfig> {
    serde_yaml::from_str::<GalleryConfig>(contents)
        .map(GalleryConfig::normalized)
        .map_err(|source| GalleryError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the gallery config.
///
/// An explicitly named file must exist and parse. Without one, the default
/// path is tried and any problem with it falls back to defaults.
pub fn load(explicit: Option<&Path>) -> Result<GalleryConfig> {
    if let Some(path) = explicit {
        let contents =
            std::fs::read_to_string(path).map_err(|source| GalleryError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        return from_yaml(&contents, path);
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if !path.exists() {
        debug!("no {DEFAULT_CONFIG_PATH}; using defaults");
        return Ok(GalleryConfig::default());
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match from_yaml(&contents, path) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                warn!("{e}; using defaults");
                Ok(GalleryConfig::default())
            }
        },
        Err(e) => {
            warn!("failed to read {DEFAULT_CONFIG_PATH}: {e}; using defaults");
            Ok(GalleryConfig::default())
        }
    }
}
