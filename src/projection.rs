//! Tile placement on the sphere and perspective projection onto the viewport.
//!
//! Composition follows CSS transform order: a tile is `rotateY rotateX
//! translateZ(radius)` inside a sphere that is `translateZ(-radius) rotateX
//! rotateY`, viewed with a perspective of twice the radius.

use crate::layout::GalleryItem;
use crate::math::{multiply_matrices, multiply_matrix_vector, point_in_triangle, rotation_x, rotation_y};
use crate::state::RotationState;

/// Gap between a tile's box and its image, in pixels.
pub const IMAGE_INSET_PX: f64 = 10.0;

/// Approximation of pi used for the tile circumference.
const CIRCUMFERENCE_FACTOR: f64 = 3.14;

/// A tile's static orientation on the sphere, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRotation {
    pub rotate_x: f64,
    pub rotate_y: f64,
}

impl TileRotation {
    pub fn css(&self, radius: f64) -> String {
        format!(
            "rotateY({}deg) rotateX({}deg) translateZ({}px)",
            self.rotate_y, self.rotate_x, radius
        )
    }
}

/// Base rotation for a tile at `(offset_x, offset_y)` spanning `size_x` x `size_y` cells.
pub fn base_rotation(
    offset_x: i32,
    offset_y: i32,
    size_x: i32,
    size_y: i32,
    segments: usize,
) -> TileRotation {
    let unit = 180.0 / segments.max(1) as f64;
    TileRotation {
        rotate_y: unit * (offset_x as f64 + (size_x as f64 - 1.0) / 2.0),
        rotate_x: unit * (offset_y as f64 - (size_y as f64 - 1.0) / 2.0),
    }
}

pub fn item_rotation(item: &GalleryItem, segments: usize) -> TileRotation {
    base_rotation(item.sphere_x, item.sphere_y, item.size_x, item.size_y, segments)
}

/// Whole-sphere transform, applied once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereTransform {
    pub radius: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
}

impl SphereTransform {
    pub fn new(radius: f64, rotation: &RotationState) -> Self {
        Self {
            radius,
            pitch_deg: rotation.pitch_deg(),
            yaw_deg: rotation.yaw_deg(),
        }
    }

    pub fn css(&self) -> String {
        format!(
            "translateZ({}px) rotateX({}deg) rotateY({}deg)",
            -self.radius, self.pitch_deg, self.yaw_deg
        )
    }

    fn matrix(&self) -> [[f64; 3]; 3] {
        multiply_matrices(&rotation_x(self.pitch_deg), &rotation_y(self.yaw_deg))
    }
}

/// A tile after projection, in viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedTile {
    /// Index into the gallery's item list
    pub index: usize,
    /// Screen corners: top-left, top-right, bottom-right, bottom-left
    pub corners: [[f64; 2]; 4],
    /// View-space position of each corner
    pub corners_3d: [[f64; 3]; 4],
    /// Outward normal in view space
    pub normal: [f64; 3],
    /// View-space z of the tile centre; larger is closer
    pub depth: f64,
}

/// Projects sphere tiles for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    pub sphere: SphereTransform,
    pub segments: usize,
    /// Viewport size in pixels
    pub viewport: [f64; 2],
}

impl Projector {
    pub fn perspective(&self) -> f64 {
        self.sphere.radius * 2.0
    }

    /// Tile box extent in pixels for a tile spanning `size_x` x `size_y` cells.
    pub fn tile_extent(&self, size_x: i32, size_y: i32) -> [f64; 2] {
        let cell = self.sphere.radius * CIRCUMFERENCE_FACTOR / self.segments.max(1) as f64;
        [cell * size_x as f64, cell * size_y as f64]
    }

    fn to_screen(&self, p: [f64; 3]) -> Option<[f64; 2]> {
        let distance = self.perspective() - p[2];
        if distance <= 1e-6 {
            return None;
        }
        let scale = self.perspective() / distance;
        Some([
            self.viewport[0] / 2.0 + p[0] * scale,
            self.viewport[1] / 2.0 + p[1] * scale,
        ])
    }

    /// Projects one item. `None` when the tile faces away or crosses the eye plane.
    pub fn project(&self, index: usize, item: &GalleryItem) -> Option<ProjectedTile> {
        let radius = self.sphere.radius;
        let rot = item_rotation(item, self.segments);
        let tile_matrix = multiply_matrices(&rotation_y(rot.rotate_y), &rotation_x(rot.rotate_x));
        let matrix = multiply_matrices(&self.sphere.matrix(), &tile_matrix);

        let to_view = |local: [f64; 3]| {
            let rotated = multiply_matrix_vector(&matrix, &[local[0], local[1], local[2] + radius]);
            [rotated[0], rotated[1], rotated[2] - radius]
        };

        let normal = multiply_matrix_vector(&matrix, &[0.0, 0.0, 1.0]);
        let centre = to_view([0.0, 0.0, 0.0]);
        let eye = [0.0, 0.0, self.perspective()];
        let to_eye = [eye[0] - centre[0], eye[1] - centre[1], eye[2] - centre[2]];
        let facing = normal[0] * to_eye[0] + normal[1] * to_eye[1] + normal[2] * to_eye[2];
        if facing <= 0.0 {
            return None;
        }

        let [w, h] = self.tile_extent(item.size_x, item.size_y);
        let hw = (w / 2.0 - IMAGE_INSET_PX).max(1.0);
        let hh = (h / 2.0 - IMAGE_INSET_PX).max(1.0);
        let corners_3d = [
            to_view([-hw, -hh, 0.0]),
            to_view([hw, -hh, 0.0]),
            to_view([hw, hh, 0.0]),
            to_view([-hw, hh, 0.0]),
        ];
        let corners = [
            self.to_screen(corners_3d[0])?,
            self.to_screen(corners_3d[1])?,
            self.to_screen(corners_3d[2])?,
            self.to_screen(corners_3d[3])?,
        ];

        Some(ProjectedTile {
            index,
            corners,
            corners_3d,
            normal,
            depth: centre[2],
        })
    }

    /// Visible tiles, ordered back to front.
    pub fn project_all(&self, items: &[GalleryItem]) -> Vec<ProjectedTile> {
        let mut tiles: Vec<ProjectedTile> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.project(i, item))
            .collect();
        tiles.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        tiles
    }
}

impl ProjectedTile {
    pub fn contains(&self, point: [f64; 2]) -> bool {
        let [a, b, c, d] = self.corners;
        point_in_triangle(point, a, b, c) || point_in_triangle(point, a, c, d)
    }
}

/// Front-most tile under `point`, from a back-to-front list.
pub fn tile_at(tiles: &[ProjectedTile], point: [f64; 2]) -> Option<usize> {
    tiles
        .iter()
        .rev()
        .find(|tile| tile.contains(point))
        .map(|tile| tile.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::build_items;

    fn item(x: i32, y: i32) -> GalleryItem {
        GalleryItem {
            sphere_x: x,
            sphere_y: y,
            size_x: 2,
            size_y: 2,
            src: "a.jpg".into(),
            alt: String::new(),
            extra: Default::default(),
        }
    }

    #[test]
    fn base_rotation_uses_half_turn_unit() {
        let rot = base_rotation(2, 4, 2, 2, 36);
        assert!((rot.rotate_y - 12.5).abs() < 1e-9);
        assert!((rot.rotate_x - 17.5).abs() < 1e-9);
    }

    #[test]
    fn css_strings() {
        let sphere = SphereTransform::new(600.0, &RotationState::new(2.0, -30.0));
        assert_eq!(sphere.css(), "translateZ(-600px) rotateX(2deg) rotateY(-30deg)");
        let tile = TileRotation {
            rotate_x: 5.0,
            rotate_y: 10.0,
        };
        assert_eq!(tile.css(600.0), "rotateY(10deg) rotateX(5deg) translateZ(600px)");
    }

    /// Rotation that brings tile (-1, 0) straight in front of the viewer.
    fn facing_projector(segments: usize) -> Projector {
        let unit = 180.0 / segments as f64;
        Projector {
            sphere: SphereTransform::new(600.0, &RotationState::new(unit * 0.5, unit * 0.5)),
            segments,
            viewport: [800.0, 600.0],
        }
    }

    #[test]
    fn facing_tile_sits_at_viewport_centre() {
        let projector = facing_projector(20);
        let tile = projector.project(0, &item(-1, 0)).expect("tile should face viewer");
        let cx = tile.corners.iter().map(|c| c[0]).sum::<f64>() / 4.0;
        let cy = tile.corners.iter().map(|c| c[1]).sum::<f64>() / 4.0;
        assert!((cx - 400.0).abs() < 1e-6);
        assert!((cy - 300.0).abs() < 1e-6);
        assert!(tile.depth.abs() < 1e-6);
    }

    #[test]
    fn back_tiles_are_culled() {
        let projector = facing_projector(20);
        // Half a turn away from the facing tile.
        assert!(projector.project(0, &item(19, 0)).is_none());
    }

    #[test]
    fn tile_at_finds_front_tile() {
        let projector = facing_projector(20);
        let items = vec![item(19, 0), item(-1, 0)];
        let tiles = projector.project_all(&items);
        assert_eq!(tile_at(&tiles, [400.0, 300.0]), Some(1));
        assert_eq!(tile_at(&tiles, [0.0, 0.0]), None);
    }

    #[test]
    fn project_all_sorts_back_to_front() {
        let projector = facing_projector(20);
        let items = build_items(&["a".into(), "b".into()], 20);
        let tiles = projector.project_all(&items);
        assert!(!tiles.is_empty());
        assert!(tiles.windows(2).all(|w| w[0].depth <= w[1].depth));
    }
}
