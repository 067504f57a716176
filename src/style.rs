//! Presentation variables derived from the container size.

use serde::Deserialize;
use tracing::debug;

use crate::config::GalleryConfig;
use crate::math::clamp;

/// Which container dimension the sphere radius scales with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitBasis {
    Min,
    Max,
    Width,
    Height,
    /// Width on wide containers (aspect >= 1.3), otherwise the smaller side
    #[default]
    Auto,
}

/// Filter applied to tile images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    None,
    Grayscale,
}

impl ImageFilter {
    pub fn css(self) -> &'static str {
        match self {
            ImageFilter::None => "none",
            ImageFilter::Grayscale => "grayscale(1)",
        }
    }
}

/// Shared style state written on every container resize and read by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleVars {
    /// Sphere radius in whole pixels
    pub radius: f64,
    pub viewer_pad: f64,
    pub tile_radius: f64,
    pub enlarge_radius: f64,
    pub image_filter: ImageFilter,
    pub overlay_blur_color: String,
}

/// Sphere radius for a container of `width` x `height` pixels.
///
/// The height guard (1.35 x height) is applied before the min/max clamp, so a
/// large `min_radius` still wins on short containers.
pub fn compute_radius(
    width: f64,
    height: f64,
    fit: f64,
    basis: FitBasis,
    min_radius: f64,
    max_radius: f64,
) -> f64 {
    let w = width.max(1.0);
    let h = height.max(1.0);
    let min_dim = w.min(h);
    let max_dim = w.max(h);
    let basis = match basis {
        FitBasis::Min => min_dim,
        FitBasis::Max => max_dim,
        FitBasis::Width => w,
        FitBasis::Height => h,
        FitBasis::Auto => {
            if w / h >= 1.3 {
                w
            } else {
                min_dim
            }
        }
    };
    let radius = (basis * fit).min(h * 1.35);
    clamp(radius, min_radius, max_radius).round()
}

impl StyleVars {
    /// Recomputes every variable for a container of `width` x `height` pixels.
    pub fn for_container(config: &GalleryConfig, width: f64, height: f64) -> Self {
        let radius = compute_radius(
            width,
            height,
            config.fit,
            config.fit_basis,
            config.min_radius,
            config.max_radius_or_unbounded(),
        );
        let min_dim = width.max(1.0).min(height.max(1.0));
        let viewer_pad = (min_dim * config.pad_factor).round().max(8.0);
        debug!(width, height, radius, viewer_pad, "container resized");
        Self {
            radius,
            viewer_pad,
            tile_radius: config.tile_radius_px(),
            enlarge_radius: config.enlarge_radius_px(),
            image_filter: if config.grayscale {
                ImageFilter::Grayscale
            } else {
                ImageFilter::None
            },
            overlay_blur_color: config.overlay_blur_color.clone(),
        }
    }

    /// The variables as CSS custom properties, for hosts that render through CSS.
    pub fn css_properties(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--radius", format!("{}px", self.radius)),
            ("--viewer-pad", format!("{}px", self.viewer_pad)),
            ("--overlay-blur-color", self.overlay_blur_color.clone()),
            ("--tile-radius", format!("{}px", self.tile_radius)),
            ("--enlarge-radius", format!("{}px", self.enlarge_radius)),
            ("--image-filter", self.image_filter.css().to_string()),
        ]
    }
}
