//! A spherical image gallery: tiles laid out on a dome, spun by dragging,
//! coasting to a stop after release, and tapped to open.
//!
//! [`DomeGallery`] is the programmatic entry point. The [`viewer`] module hosts
//! it in a terminal.

pub mod canvas;
pub mod config;
pub mod error;
pub mod gallery;
pub mod gesture;
pub mod layout;
pub mod math;
pub mod projection;
pub mod render;
pub mod state;
pub mod style;
pub mod viewer;

pub use config::GalleryConfig;
pub use error::{GalleryError, Result};
pub use gallery::DomeGallery;
pub use gesture::{GestureController, GesturePhase, PointerKind, Release};
pub use layout::{build_items, GalleryItem, GridCoordinate, ImageEntry};
pub use state::RotationState;
