//! Font handles and text measurement.
//!
//! A [`FontHandle`] is a cheap, clonable reference to a typeface at a fixed
//! pixel size. Measurement and rasterization go through the [`Typeface`]
//! trait so that layout can run against a real TrueType face or against a
//! metric-only [`BlockFace`] (previews without font files, benchmarks, tests).

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::GrayImage;

use crate::{Error, Result};

/// Pixel dimensions of measured text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSize {
    pub width: u32,
    pub height: u32,
}

/// A typeface at a fixed size: single-line metrics plus coverage rasterization.
///
/// Implementations must be deterministic: the same line always measures and
/// rasterizes to the same pixels.
pub trait Typeface: Send + Sync {
    /// Advance width of a single line (no `'\n'`) in whole pixels
    fn line_width(&self, line: &str) -> u32;

    /// Height of one line of text in whole pixels
    fn line_height(&self) -> u32;

    /// Rasterize a single line with its top-left corner at `(left, top)`.
    ///
    /// Coverage is max-combined into `mask`; pixels outside the mask are
    /// clipped silently.
    fn rasterize_line(&self, line: &str, left: f32, top: f32, mask: &mut GrayImage);
}

/// Writes `value` into the mask unless a stronger coverage is already there.
fn cover(mask: &mut GrayImage, x: i64, y: i64, value: u8) {
    if x < 0 || y < 0 || x >= mask.width() as i64 || y >= mask.height() as i64 {
        return;
    }
    let px = mask.get_pixel_mut(x as u32, y as u32);
    if value > px.0[0] {
        px.0[0] = value;
    }
}

/// TrueType/OpenType face rendered through `ab_glyph`
#[derive(Clone)]
pub struct TrueTypeFace {
    font: FontArc,
    scale: PxScale,
}

impl TrueTypeFace {
    pub fn from_bytes(data: Vec<u8>, size: f32) -> Result<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(Error::FontError(format!("invalid font size {size}")));
        }
        let font = FontArc::try_from_vec(data)
            .map_err(|e| Error::FontError(format!("invalid font data: {e}")))?;
        Ok(Self {
            font,
            scale: PxScale::from(size),
        })
    }
}

impl fmt::Debug for TrueTypeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeFace")
            .field("scale", &self.scale.y)
            .finish()
    }
}

impl Typeface for TrueTypeFace {
    fn line_width(&self, line: &str) -> u32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut caret = 0.0f32;
        let mut last: Option<GlyphId> = None;
        for c in line.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            caret += scaled.h_advance(id);
            last = Some(id);
        }
        caret.max(0.0).ceil() as u32
    }

    fn line_height(&self) -> u32 {
        self.font.as_scaled(self.scale).height().ceil() as u32
    }

    fn rasterize_line(&self, line: &str, left: f32, top: f32, mask: &mut GrayImage) {
        let scaled = self.font.as_scaled(self.scale);
        let baseline = top + scaled.ascent();
        let mut caret = left;
        let mut last: Option<GlyphId> = None;

        for c in line.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(self.scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            last = Some(id);

            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                cover(mask, x, y, value);
            });
        }
    }
}

/// Metric-only face: every character advances by a fixed width and every
/// non-whitespace character paints a solid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFace {
    pub advance: u32,
    pub line_height: u32,
}

impl Typeface for BlockFace {
    fn line_width(&self, line: &str) -> u32 {
        line.chars().count() as u32 * self.advance
    }

    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn rasterize_line(&self, line: &str, left: f32, top: f32, mask: &mut GrayImage) {
        let left = left.floor() as i64;
        let top = top.floor() as i64;
        for (i, c) in line.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x0 = left + i as i64 * self.advance as i64;
            for y in top..top + self.line_height as i64 {
                for x in x0..x0 + self.advance as i64 {
                    cover(mask, x, y, 255);
                }
            }
        }
    }
}

/// Shared, read-only handle to a face at a fixed size.
#[derive(Clone)]
pub struct FontHandle {
    family: String,
    size: f32,
    face: Arc<dyn Typeface>,
}

impl FontHandle {
    pub fn new(family: impl Into<String>, size: f32, face: impl Typeface + 'static) -> Self {
        Self {
            family: family.into(),
            size,
            face: Arc::new(face),
        }
    }

    /// Load a TrueType/OpenType font from disk. The family name is the file stem.
    pub fn load(path: impl AsRef<Path>, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::FontError(format!("cannot read {}: {e}", path.display())))?;
        let family = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(family, data, size)
    }

    pub fn from_bytes(family: impl Into<String>, data: Vec<u8>, size: f32) -> Result<Self> {
        let face = TrueTypeFace::from_bytes(data, size)?;
        Ok(Self::new(family, size, face))
    }

    /// A [`BlockFace`] handle, sized by its line height
    pub fn block(advance: u32, line_height: u32) -> Self {
        Self::new(
            "block",
            line_height as f32,
            BlockFace {
                advance,
                line_height,
            },
        )
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn line_width(&self, line: &str) -> u32 {
        self.face.line_width(line)
    }

    pub fn line_height(&self) -> u32 {
        self.face.line_height()
    }

    /// Measure possibly multi-line text.
    ///
    /// Width is the widest line; height is `n * line_height + (n - 1) * line_spacing`.
    pub fn measure(&self, text: &str, line_spacing: i32) -> TextSize {
        if text.is_empty() {
            return TextSize::default();
        }
        let mut lines = 0i64;
        let mut width = 0u32;
        for line in text.split('\n') {
            lines += 1;
            width = width.max(self.face.line_width(line));
        }
        let height = lines * self.face.line_height() as i64 + (lines - 1) * line_spacing as i64;
        TextSize {
            width,
            height: height.clamp(0, u32::MAX as i64) as u32,
        }
    }

    /// Rasterize multi-line text with its top-left corner at `(left, top)`.
    pub(crate) fn rasterize(
        &self,
        text: &str,
        left: i32,
        top: i32,
        line_spacing: i32,
        mask: &mut GrayImage,
    ) {
        let step = self.face.line_height() as i64 + line_spacing as i64;
        for (i, line) in text.split('\n').enumerate() {
            let line_top = top as i64 + i as i64 * step;
            self.face
                .rasterize_line(line, left as f32, line_top as f32, mask);
        }
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("family", &self.family)
            .field("size", &self.size)
            .finish()
    }
}
