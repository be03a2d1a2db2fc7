//! Quotegram
//!
//! Generates quote images for social posts: wraps quote text to fit an inner
//! box of a background photo, centers it, signs it with the author's name in
//! the bottom-right corner and composites both with a soft drop shadow.
//!
//! # Features
//!
//! - **Layout core**: measuring, greedy wrapping, placement and compositing
//!   over in-memory RGBA surfaces
//! - **Pluggable faces**: TrueType fonts through `ab_glyph`, or a metric-only
//!   block face for previews without font files
//! - **Posting** (`http`, default): multipart upload to a configurable endpoint
//!
//! # Example
//!
//! ```
//! use image::Rgba;
//! use quotegram::rendering::{render, BoundingBox, Placement, Surface};
//! use quotegram::{FontHandle, Shadow, StyledText};
//!
//! let background = Surface::from_pixel(400, 300, Rgba([240, 240, 230, 255]));
//! let inner = BoundingBox::new(20, 20, 380, 280);
//!
//! let text = StyledText::new("Less is more", FontHandle::block(12, 24))
//!     .with_color(Rgba([0, 0, 0, 193]))
//!     .with_shadow(Some(Shadow::new(Rgba([0, 0, 0, 76]), -4, 4)))
//!     .wrapped(inner.width() as u32);
//! let at = Placement::CenterLeft.position(text.size(), &inner);
//!
//! let image = render(&text, at, &background).unwrap();
//! assert_eq!(image.dimensions(), (400, 300));
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod font;
pub mod generator;
pub mod hashtags;
pub mod output;
pub mod publish;
pub mod quotes;
pub mod rendering;
pub mod style;
pub mod wrap;

pub use font::{FontHandle, TextSize, Typeface};
pub use generator::QuoteImageGenerator;
pub use rendering::layout::BoundingBox;
pub use style::{signature_text, Shadow, StyledText, TextStyle};

/// Configuration for quote image generation
///
/// Defaults reproduce the stock look: a 1080px portrait background whose
/// visible inner box is `(115, 134)-(966, 1159)`, a script quote font at
/// 140px and a brush signature at 86px, both black at 76% opacity with a
/// 30% shadow offset by `(-4, 4)`.
///
/// # Examples
///
/// ```
/// let cfg = quotegram::GeneratorConfig::default();
/// assert_eq!(cfg.inner_box.width(), 851);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Region of the background where text may be placed
    pub inner_box: BoundingBox,
    /// Style of the quote body
    pub quote_style: TextStyle,
    /// Style of the author signature
    pub author_style: TextStyle,
    /// Background images, used in rotation
    pub backgrounds: Vec<PathBuf>,
    /// How many consecutive quotes share one background
    pub per_background: usize,
    /// Where rendered images are written
    pub output_dir: PathBuf,
    /// Where images are moved once posted
    pub posted_dir: PathBuf,
    /// Tags added to every caption
    pub hashtags: Vec<String>,
    /// Posting endpoint and credentials
    pub publisher: publish::PublisherConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            inner_box: BoundingBox::new(115, 134, 966, 1159),
            quote_style: TextStyle::quote(),
            author_style: TextStyle::signature(),
            backgrounds: vec![
                PathBuf::from("static/bg_green.jpeg"),
                PathBuf::from("static/bg_blue.jpeg"),
            ],
            per_background: 2,
            output_dir: PathBuf::from("out"),
            posted_dir: PathBuf::from("out/posted"),
            hashtags: vec!["#qotd".to_string()],
            publisher: publish::PublisherConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.inner_box.width() <= 0 || self.inner_box.height() <= 0 {
            return Err(Error::ConfigError(format!(
                "inner box {:?} has no area",
                self.inner_box
            )));
        }
        if self.per_background == 0 {
            return Err(Error::ConfigError("per_background must be at least 1".to_string()));
        }
        for (name, style) in [("quote", &self.quote_style), ("author", &self.author_style)] {
            if !style.font_size.is_finite() || style.font_size <= 0.0 {
                return Err(Error::ConfigError(format!(
                    "{name} font size must be positive, got {}",
                    style.font_size
                )));
            }
        }
        Ok(())
    }
}
