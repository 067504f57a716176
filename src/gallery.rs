use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::GalleryConfig;
use crate::gesture::{GestureController, GestureSettings, PointerKind, Release};
use crate::layout::{build_items, GalleryItem, ImageEntry};
use crate::projection::{item_rotation, tile_at, ProjectedTile, Projector, SphereTransform, TileRotation};
use crate::state::RotationState;
use crate::style::StyleVars;

/// Invoked with the originating item on a qualifying tap.
pub type TapCallback = Box<dyn FnMut(&GalleryItem) + Send>;

/// The dome gallery widget: layout, style and gesture state for one sphere.
pub struct DomeGallery {
    config: GalleryConfig,
    items: Vec<GalleryItem>,
    style: StyleVars,
    /// Container size in pixels
    container: [f64; 2],
    controller: GestureController,
    on_tap: Option<TapCallback>,
    /// Tile under the pointer when the current drag started
    tap_target: Option<usize>,
}

impl fmt::Debug for DomeGallery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomeGallery")
            .field("items", &self.items.len())
            .field("container", &self.container)
            .field("rotation", self.controller.rotation())
            .field("has_tap_callback", &self.on_tap.is_some())
            .finish()
    }
}

impl DomeGallery {
    pub fn new(config: GalleryConfig) -> Self {
        let config = config.normalized();
        let items = build_items(&config.images, config.segments);
        let container = [1.0, 1.0];
        let style = StyleVars::for_container(&config, container[0], container[1]);
        let controller = GestureController::new(GestureSettings::from(&config));
        Self {
            config,
            items,
            style,
            container,
            controller,
            on_tap: None,
            tap_target: None,
        }
    }

    pub fn with_tap_callback(mut self, callback: impl FnMut(&GalleryItem) + Send + 'static) -> Self {
        self.on_tap = Some(Box::new(callback));
        self
    }

    pub fn set_tap_callback(&mut self, callback: Option<TapCallback>) {
        self.on_tap = callback;
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn style(&self) -> &StyleVars {
        &self.style
    }

    pub fn container(&self) -> [f64; 2] {
        self.container
    }

    pub fn rotation(&self) -> &RotationState {
        self.controller.rotation()
    }

    pub fn controller(&self) -> &GestureController {
        &self.controller
    }

    /// Swaps in a new configuration. Items, style and gesture tuning all
    /// follow it; the current rotation is kept.
    pub fn set_config(&mut self, config: GalleryConfig) {
        self.config = config.normalized();
        self.controller.set_settings(GestureSettings::from(&self.config));
        self.rebuild();
        self.restyle();
    }

    /// Replaces the image pool; the grid is rebuilt, rotation is kept.
    pub fn set_images(&mut self, images: Vec<ImageEntry>) {
        self.config.images = images;
        self.rebuild();
    }

    pub fn set_segments(&mut self, segments: usize) {
        self.config.segments = segments;
        self.config = std::mem::take(&mut self.config).normalized();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.items = build_items(&self.config.images, self.config.segments);
        self.tap_target = None;
        debug!(items = self.items.len(), segments = self.config.segments, "items rebuilt");
    }

    pub fn set_grayscale(&mut self, grayscale: bool) {
        self.config.grayscale = grayscale;
        self.restyle();
    }

    /// Container resize: recomputes radius and the other style variables.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.container = [width, height];
        self.restyle();
        info!(width, height, radius = self.style.radius, "gallery resized");
    }

    fn restyle(&mut self) {
        self.style = StyleVars::for_container(&self.config, self.container[0], self.container[1]);
    }

    pub fn sphere_transform(&self) -> SphereTransform {
        SphereTransform::new(self.style.radius, self.controller.rotation())
    }

    /// Static per-tile rotations, in item order.
    pub fn tile_rotations(&self) -> Vec<TileRotation> {
        self.items
            .iter()
            .map(|item| item_rotation(item, self.config.segments))
            .collect()
    }

    pub fn projector(&self) -> Projector {
        Projector {
            sphere: self.sphere_transform(),
            segments: self.config.segments,
            viewport: self.container,
        }
    }

    /// Tiles facing the viewer, back to front.
    pub fn visible_tiles(&self) -> Vec<ProjectedTile> {
        self.projector().project_all(&self.items)
    }

    pub fn tile_at(&self, point: [f64; 2]) -> Option<usize> {
        tile_at(&self.visible_tiles(), point)
    }

    pub fn pointer_down(&mut self, pos: [f64; 2], kind: PointerKind, now: Instant) -> bool {
        let target = self.tile_at(pos);
        let accepted = self.controller.pointer_down(pos, kind, now);
        if accepted {
            self.tap_target = target;
        }
        accepted
    }

    pub fn pointer_move(&mut self, pos: [f64; 2], now: Instant) {
        self.controller.pointer_move(pos, now);
    }

    /// Ends a drag; a tap on a tile reaches the tap callback unless guarded.
    pub fn pointer_up(&mut self, pos: [f64; 2], now: Instant) -> Release {
        let release = self.controller.pointer_up(pos, now);
        let target = self.tap_target.take();
        if let Release::Tap { guarded: false, .. } = release {
            if let Some(index) = target {
                self.dispatch(index);
            }
        }
        release
    }

    /// Click/activation of a tile outside the drag path (keyboard, host UI).
    /// Returns whether the tap callback was reached.
    pub fn click(&mut self, index: usize, now: Instant) -> bool {
        if index >= self.items.len() || self.controller.is_focused() {
            return false;
        }
        if !self.controller.click_allowed(now) {
            debug!(index, "click suppressed after drag");
            return false;
        }
        self.dispatch(index)
    }

    fn dispatch(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };
        match self.on_tap.as_mut() {
            Some(callback) => {
                info!(index, src = %item.src, "tile tapped");
                callback(item);
                true
            }
            None => {
                Self::open_internal(index, item);
                false
            }
        }
    }

    /// Legacy in-widget expand; only records the request.
    fn open_internal(index: usize, item: &GalleryItem) {
        debug!(index, src = %item.src, "internal open requested; no tap callback registered");
    }

    /// Advances inertia by one display frame. `true` while coasting.
    pub fn tick(&mut self) -> bool {
        self.controller.tick()
    }

    /// The host shows (or hides) an enlarged tile; pointer input is ignored while shown.
    pub fn set_focused(&mut self, focused: bool) {
        self.controller.set_focused(focused);
    }

    pub fn set_enlarging(&mut self, enlarging: bool) {
        self.controller.set_enlarging(enlarging);
    }

    pub fn nudge(&mut self, dx: f64, dy: f64) {
        self.controller.nudge(dx, dy);
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.tap_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn gallery_with_log(images: &[&str]) -> (DomeGallery, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let config = GalleryConfig {
            images: images.iter().map(|s| ImageEntry::from(*s)).collect(),
            segments: 20,
            min_radius: 300.0,
            ..Default::default()
        };
        let mut gallery = DomeGallery::new(config)
            .with_tap_callback(move |item| sink.lock().unwrap().push(item.src.clone()));
        gallery.resize(800.0, 600.0);
        (gallery, log)
    }

    /// A point inside the front-most tile.
    fn tile_point(gallery: &DomeGallery) -> ([f64; 2], usize) {
        let tiles = gallery.visible_tiles();
        let front = tiles.last().expect("at least one visible tile");
        let cx = front.corners.iter().map(|c| c[0]).sum::<f64>() / 4.0;
        let cy = front.corners.iter().map(|c| c[1]).sum::<f64>() / 4.0;
        ([cx, cy], front.index)
    }

    #[test]
    fn tap_dispatches_tile_under_pointer() {
        let (mut gallery, log) = gallery_with_log(&["a.jpg", "b.jpg", "c.jpg"]);
        let (point, index) = tile_point(&gallery);
        let expected = gallery.items()[index].src.clone();
        let t0 = Instant::now();

        gallery.pointer_down(point, PointerKind::Mouse, t0);
        let release = gallery.pointer_up([point[0] + 2.0, point[1]], t0);

        assert!(matches!(release, Release::Tap { .. }));
        assert_eq!(*log.lock().unwrap(), vec![expected]);
        assert_eq!(*gallery.rotation(), RotationState::default());
    }

    #[test]
    fn drag_does_not_dispatch() {
        let (mut gallery, log) = gallery_with_log(&["a.jpg"]);
        let (point, _) = tile_point(&gallery);
        let t0 = Instant::now();
        gallery.pointer_down(point, PointerKind::Mouse, t0);
        gallery.pointer_move([point[0] + 60.0, point[1]], t0 + std::time::Duration::from_millis(40));
        gallery.pointer_up([point[0] + 60.0, point[1]], t0 + std::time::Duration::from_millis(40));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn click_is_guarded_after_drag() {
        let (mut gallery, log) = gallery_with_log(&["a.jpg"]);
        let t0 = Instant::now();
        gallery.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        gallery.pointer_move([200.0, 0.0], t0 + std::time::Duration::from_millis(100));
        gallery.pointer_up([200.0, 0.0], t0 + std::time::Duration::from_millis(100));

        assert!(!gallery.click(0, t0 + std::time::Duration::from_millis(150)));
        assert!(gallery.click(0, t0 + std::time::Duration::from_millis(400)));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn focused_gallery_ignores_taps() {
        let (mut gallery, log) = gallery_with_log(&["a.jpg"]);
        let (point, _) = tile_point(&gallery);
        gallery.set_focused(true);
        let t0 = Instant::now();
        assert!(!gallery.pointer_down(point, PointerKind::Mouse, t0));
        gallery.pointer_up(point, t0);
        assert!(!gallery.click(0, t0));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn without_callback_tap_is_harmless() {
        let mut gallery = DomeGallery::new(GalleryConfig {
            images: vec!["a.jpg".into()],
            ..Default::default()
        });
        gallery.resize(800.0, 600.0);
        assert!(!gallery.click(0, Instant::now()));
    }

    #[test]
    fn resize_recomputes_radius_only() {
        let (mut gallery, _) = gallery_with_log(&["a.jpg"]);
        let items_before = gallery.items().to_vec();
        gallery.resize(2000.0, 1000.0);
        assert_eq!(gallery.style().radius, 1000.0);
        assert_eq!(gallery.items(), items_before.as_slice());
    }

    #[test]
    fn set_config_retunes_gestures() {
        let (mut gallery, _) = gallery_with_log(&["a.jpg"]);
        gallery.set_config(GalleryConfig {
            images: vec!["a.jpg".into(), "b.jpg".into()],
            segments: 4,
            drag_sensitivity: 10.0,
            max_vertical_rotation_deg: 0.0,
            ..Default::default()
        });
        assert_eq!(gallery.items().len(), 20);
        assert_eq!(gallery.controller().settings().sensitivity, 10.0);

        let t0 = Instant::now();
        gallery.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        gallery.pointer_move([50.0, 50.0], t0 + std::time::Duration::from_millis(16));
        assert_eq!(gallery.rotation().yaw_deg(), 5.0);
        assert_eq!(gallery.rotation().pitch_deg(), 0.0);
    }

    #[test]
    fn set_segments_rebuilds_grid() {
        let (mut gallery, _) = gallery_with_log(&["a.jpg", "b.jpg"]);
        gallery.set_segments(6);
        assert_eq!(gallery.items().len(), 30);
        assert_eq!(gallery.tile_rotations().len(), 30);
        gallery.set_segments(0);
        assert_eq!(gallery.items().len(), 35 * 5);
    }

    #[test]
    fn set_images_keeps_rotation() {
        let (mut gallery, _) = gallery_with_log(&["a.jpg"]);
        gallery.nudge(200.0, 0.0);
        let before = *gallery.rotation();
        gallery.set_images(vec!["x.png".into(), "y.png".into()]);
        assert_eq!(*gallery.rotation(), before);
        assert_eq!(gallery.items()[1].src, "y.png");
    }
}
