//! Styled text values and the style configuration they are built from.

use std::path::PathBuf;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::font::{FontHandle, TextSize};
use crate::rendering::layout::Placement;
use crate::wrap::wrap;

/// Blurred, offset duplicate of the text drawn beneath it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadow {
    pub color: Rgba<u8>,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Shadow {
    pub fn new(color: Rgba<u8>, offset_x: i32, offset_y: i32) -> Self {
        Self {
            color,
            offset_x,
            offset_y,
        }
    }
}

/// Style options for one kind of text (quote body, signature, ...).
///
/// `font_family` is the path of the font file; it is loaded by the caller
/// and paired with the style in [`StyledText::from_style`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_family: PathBuf,
    pub font_size: f32,
    /// RGBA
    pub color: [u8; 4],
    pub stroke_width: u32,
    pub spacing: i32,
    pub shadow_color: Option<[u8; 4]>,
    pub shadow_offset: Option<(i32, i32)>,
    pub placement: Placement,
}

impl TextStyle {
    /// Quote body: semi-bold script, black at 76% opacity, soft shadow
    pub fn quote() -> Self {
        Self {
            font_family: PathBuf::from("DancingScript-SemiBold.ttf"),
            font_size: 140.0,
            color: [0, 0, 0, 193],
            stroke_width: 1,
            spacing: 0,
            shadow_color: Some([0, 0, 0, 76]),
            shadow_offset: Some((-4, 4)),
            placement: Placement::CenterLeft,
        }
    }

    /// Author signature in the bottom-right corner
    pub fn signature() -> Self {
        Self {
            font_family: PathBuf::from("Brush Script.ttf"),
            font_size: 86.0,
            placement: Placement::BottomRight,
            ..Self::quote()
        }
    }

    pub fn shadow(&self) -> Option<Shadow> {
        match (self.shadow_color, self.shadow_offset) {
            (Some(color), Some((x, y))) => Some(Shadow::new(Rgba(color), x, y)),
            _ => None,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::quote()
    }
}

/// Text plus everything needed to render it
#[derive(Debug, Clone)]
pub struct StyledText {
    content: String,
    color: Rgba<u8>,
    font: FontHandle,
    stroke_width: u32,
    line_spacing: i32,
    shadow: Option<Shadow>,
}

impl StyledText {
    /// Opaque black, no stroke, no extra spacing, no shadow
    pub fn new(content: impl Into<String>, font: FontHandle) -> Self {
        Self {
            content: content.into(),
            color: Rgba([0, 0, 0, 255]),
            font,
            stroke_width: 0,
            line_spacing: 0,
            shadow: None,
        }
    }

    pub fn from_style(content: impl Into<String>, style: &TextStyle, font: FontHandle) -> Self {
        Self::new(content, font)
            .with_color(Rgba(style.color))
            .with_stroke_width(style.stroke_width)
            .with_line_spacing(style.spacing)
            .with_shadow(style.shadow())
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: i32) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_shadow(mut self, shadow: Option<Shadow>) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn font(&self) -> &FontHandle {
        &self.font
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    pub fn line_spacing(&self) -> i32 {
        self.line_spacing
    }

    pub fn shadow(&self) -> Option<Shadow> {
        self.shadow
    }

    /// Size of the inked area, stroke included on every side
    pub fn size(&self) -> TextSize {
        if self.content.is_empty() {
            return TextSize::default();
        }
        let inner = self.font.measure(&self.content, self.line_spacing);
        let pad = self.stroke_width.saturating_mul(2);
        TextSize {
            width: inner.width.saturating_add(pad),
            height: inner.height.saturating_add(pad),
        }
    }

    pub fn width(&self) -> u32 {
        self.size().width
    }

    pub fn height(&self) -> u32 {
        self.size().height
    }

    /// Wrap the content so each line, stroke included, fits `max_width`.
    ///
    /// Call this once, on the original unwrapped content.
    pub fn wrapped(mut self, max_width: u32) -> Self {
        let pad = self.stroke_width.saturating_mul(2);
        let font = &self.font;
        self.content = wrap(&self.content, max_width, |line| {
            font.line_width(line).saturating_add(pad)
        });
        self
    }
}

/// Format an author name as a signature: `"Einstein"` becomes `"-Einstein"`.
///
/// Names already starting with `-` are returned unchanged.
pub fn signature_text(author: &str) -> String {
    if author.starts_with('-') {
        author.to_string()
    } else {
        format!("-{author}")
    }
}
