//! Rendering: text placement, rasterization and compositing

pub mod layout;
pub mod paint;
pub mod raster;

use image::RgbaImage;
use sha2::{Digest, Sha256};

pub use layout::{BoundingBox, Placement, Point};
pub use paint::{composite_onto_background, render, render_to_transparent_layer, PaintCommand};

/// An RGBA pixel buffer: a background, a final canvas or a transient layer.
pub type Surface = RgbaImage;

/// Hex SHA-256 of a surface's dimensions and raw pixels.
///
/// Stable across runs, so it can address golden images and detect duplicates.
pub fn pixel_digest(surface: &Surface) -> String {
    let mut hasher = Sha256::new();
    hasher.update(surface.width().to_le_bytes());
    hasher.update(surface.height().to_le_bytes());
    hasher.update(surface.as_raw());
    hex::encode(hasher.finalize())
}
