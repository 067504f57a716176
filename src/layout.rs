//! Sphere layout: a fixed brick grid of tiles, filled cyclically from the
//! caller's image pool.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rows per column. Every column holds exactly this many tiles.
pub const ROWS_PER_COLUMN: usize = 5;

/// Tile extent in grid units, both axes.
pub const TILE_SIZE: i32 = 2;

const EVEN_COLUMN_YS: [i32; ROWS_PER_COLUMN] = [-4, -2, 0, 2, 4];
const ODD_COLUMN_YS: [i32; ROWS_PER_COLUMN] = [-3, -1, 1, 3, 5];

/// One image as supplied by the caller: a bare reference or an object with
/// optional label and arbitrary extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    Bare(String),
    Detailed(ImageSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&str> for ImageEntry {
    fn from(src: &str) -> Self {
        ImageEntry::Bare(src.to_string())
    }
}

impl From<String> for ImageEntry {
    fn from(src: String) -> Self {
        ImageEntry::Bare(src)
    }
}

/// An image entry after normalization: always has `src` and `alt`, possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
struct NormalizedImage {
    src: String,
    alt: String,
    extra: Map<String, Value>,
}

impl From<&ImageEntry> for NormalizedImage {
    fn from(entry: &ImageEntry) -> Self {
        match entry {
            ImageEntry::Bare(src) => NormalizedImage {
                src: src.clone(),
                ..Default::default()
            },
            ImageEntry::Detailed(spec) => NormalizedImage {
                src: spec.src.clone().unwrap_or_default(),
                alt: spec.alt.clone().unwrap_or_default(),
                extra: spec.extra.clone(),
            },
        }
    }
}

/// A cell of the sphere grid, independent of image content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
}

/// A tile: grid placement plus the image assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryItem {
    pub sphere_x: i32,
    pub sphere_y: i32,
    pub size_x: i32,
    pub size_y: i32,
    pub src: String,
    pub alt: String,
    /// Caller-supplied fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GalleryItem {
    /// Tiles with an empty image reference render as placeholders.
    pub fn is_placeholder(&self) -> bool {
        self.src.is_empty()
    }
}

/// Generates the brick grid for `segments` columns.
///
/// Columns are centred on zero in steps of two units; even and odd columns use
/// interleaved row offsets.
pub fn grid_coordinates(segments: usize) -> Vec<GridCoordinate> {
    let first = -(segments as i32 - 1);
    (0..segments)
        .flat_map(|column| {
            let x = first + column as i32 * 2;
            let ys = if column % 2 == 0 {
                EVEN_COLUMN_YS
            } else {
                ODD_COLUMN_YS
            };
            ys.into_iter().map(move |y| GridCoordinate { x, y })
        })
        .collect()
}

/// Assigns the image pool to every grid cell.
///
/// The pool is cycled to fill all `segments * 5` cells, then a single forward
/// pass swaps a cell with the nearest later cell holding a different image
/// whenever it repeats its predecessor. The pass is best-effort and the whole
/// function is deterministic.
pub fn build_items(images: &[ImageEntry], segments: usize) -> Vec<GalleryItem> {
    let coords = grid_coordinates(segments);

    if images.is_empty() {
        return coords
            .into_iter()
            .map(|c| place(c, NormalizedImage::default()))
            .collect();
    }

    let pool: Vec<NormalizedImage> = images.iter().map(NormalizedImage::from).collect();
    let mut used: Vec<&NormalizedImage> = (0..coords.len()).map(|i| &pool[i % pool.len()]).collect();

    for i in 1..used.len() {
        if used[i].src == used[i - 1].src {
            if let Some(j) = (i + 1..used.len()).find(|&j| used[j].src != used[i].src) {
                used.swap(i, j);
            }
        }
    }

    coords
        .into_iter()
        .zip(used)
        .map(|(c, image)| place(c, image.clone()))
        .collect()
}

fn place(coord: GridCoordinate, image: NormalizedImage) -> GalleryItem {
    GalleryItem {
        sphere_x: coord.x,
        sphere_y: coord.y,
        size_x: TILE_SIZE,
        size_y: TILE_SIZE,
        src: image.src,
        alt: image.alt,
        extra: image.extra,
    }
}

/// Reads a numeric attribute such as `"30px"` or `"0.5"`.
///
/// Parses the longest numeric prefix; anything missing, unparsable or
/// non-finite yields `fallback`.
pub fn data_number(attr: Option<&str>, fallback: f64) -> f64 {
    let Some(raw) = attr else {
        return fallback;
    };
    let trimmed = raw.trim_start();
    let prefix_len = trimmed
        .char_indices()
        .take_while(|&(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    (1..=prefix_len)
        .rev()
        .find_map(|end| trimmed[..end].parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(fallback)
}
