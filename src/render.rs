//! Rasterises a gallery frame into a [`Canvas`].

use crate::canvas::{Canvas, CanvasVertex, Cell, Rgb};
use crate::gallery::DomeGallery;
use crate::layout::GalleryItem;
use crate::math::calculate_light_intensity;
use crate::projection::ProjectedTile;
use crate::style::ImageFilter;

const PLACEHOLDER: Rgb = Rgb(17, 17, 17);
const EDGE: f64 = 0.06;

/// Stable colour for an image reference (FNV-1a over the bytes).
pub fn image_color(src: &str) -> Rgb {
    let hash = src
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
    let channel = |shift: u32| 64 + ((hash >> shift) & 0xff) as u8 / 2 + 32;
    Rgb(channel(0), channel(16), channel(32))
}

/// Short caption for a tile: its label, else the file name of its source.
pub fn caption(item: &GalleryItem) -> &str {
    if !item.alt.is_empty() {
        item.alt.as_str()
    } else {
        item.src.rsplit('/').next().unwrap_or(&item.src)
    }
}

/// Draws every visible tile. `cell_px` is the pixel size of one character cell.
pub fn draw_gallery(gallery: &DomeGallery, canvas: &mut Canvas, cell_px: [f64; 2], background: Rgb) {
    canvas.clear(background);
    let projector = gallery.projector();
    let style = gallery.style();
    let light = [0.0, -style.radius, projector.perspective()];
    let tiles = gallery.visible_tiles();

    for tile in &tiles {
        let item = &gallery.items()[tile.index];
        let [w, h] = projector.tile_extent(item.size_x, item.size_y);
        let corner = [
            (style.tile_radius / w.max(1.0)).min(0.5),
            (style.tile_radius / h.max(1.0)).min(0.5),
        ];
        let centre = tile_centre(tile);
        let intensity = calculate_light_intensity(&tile.normal, &centre, &light);
        let base = if item.is_placeholder() {
            PLACEHOLDER
        } else {
            image_color(&item.src)
        };
        let base = match style.image_filter {
            ImageFilter::Grayscale => base.grayscale(),
            ImageFilter::None => base,
        };
        let fill = base.scaled(intensity);
        let edge = fill.scaled(0.55);
        let placeholder = item.is_placeholder();

        let shade = |uv: [f64; 2]| -> Option<Cell> {
            if outside_rounded_corner(uv, corner) {
                return None;
            }
            let on_edge = uv[0] < EDGE || uv[0] > 1.0 - EDGE || uv[1] < EDGE || uv[1] > 1.0 - EDGE;
            Some(Cell {
                ch: if placeholder && !on_edge { '·' } else { ' ' },
                fg: Rgb(90, 90, 90),
                bg: if on_edge { edge } else { fill },
            })
        };

        let v = cell_vertices(tile, cell_px);
        canvas.fill_triangle(&v[0], &v[1], &v[2], shade);
        canvas.fill_triangle(&v[0], &v[2], &v[3], shade);

        let label = caption(item);
        if !label.is_empty() {
            let cx = (v.iter().map(|p| p.position[0]).sum::<f64>() / 4.0).floor() as isize;
            let cy = (v.iter().map(|p| p.position[1]).sum::<f64>() / 4.0).floor() as isize;
            let width = (v[1].position[0] - v[0].position[0]).abs().floor() as usize;
            if width >= 4 {
                let text: String = label.chars().take(width.saturating_sub(2)).collect();
                let x = cx - text.chars().count() as isize / 2;
                canvas.overlay_text(x, cy, &text, Rgb::WHITE);
            }
        }
    }
}

fn tile_centre(tile: &ProjectedTile) -> [f64; 3] {
    let mut centre = [0.0; 3];
    for corner in &tile.corners_3d {
        for axis in 0..3 {
            centre[axis] += corner[axis] / 4.0;
        }
    }
    centre
}

fn cell_vertices(tile: &ProjectedTile, cell_px: [f64; 2]) -> [CanvasVertex; 4] {
    const UV: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    std::array::from_fn(|i| CanvasVertex {
        position: [
            tile.corners[i][0] / cell_px[0],
            tile.corners[i][1] / cell_px[1],
        ],
        depth: tile.corners_3d[i][2],
        uv: UV[i],
    })
}

/// Whether `uv` falls in the cut-away part of a rounded corner with
/// radii `corner` (as fractions of the tile).
fn outside_rounded_corner(uv: [f64; 2], corner: [f64; 2]) -> bool {
    let [ru, rv] = corner;
    if ru <= 0.0 || rv <= 0.0 {
        return false;
    }
    let du = if uv[0] < ru {
        ru - uv[0]
    } else if uv[0] > 1.0 - ru {
        uv[0] - (1.0 - ru)
    } else {
        return false;
    };
    let dv = if uv[1] < rv {
        rv - uv[1]
    } else if uv[1] > 1.0 - rv {
        uv[1] - (1.0 - rv)
    } else {
        return false;
    };
    (du / ru).powi(2) + (dv / rv).powi(2) > 1.0
}
