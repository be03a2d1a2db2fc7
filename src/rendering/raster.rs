/// Coverage masks: rasterized text, stroke dilation, blur and colorizing

use image::{GrayImage, Rgba, RgbaImage};
use imageproc::morphology::{grayscale_dilate, Mask};

use crate::rendering::layout::Point;
use crate::style::StyledText;

/// Gaussian sigma used for every shadow, a softness close to a 5x5 blur kernel
pub const SHADOW_BLUR_SIGMA: f32 = 2.0;

/// Rasterize `text` with the top-left of its inked area at `position`.
///
/// Glyphs are drawn `stroke_width` pixels in from `position` and then
/// dilated by the stroke, so the stroke lands inside the measured size.
pub fn text_mask(text: &StyledText, position: Point, width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let stroke = text.stroke_width().min(i32::MAX as u32) as i32;
    text.font().rasterize(
        text.content(),
        position.x.saturating_add(stroke),
        position.y.saturating_add(stroke),
        text.line_spacing(),
        &mut mask,
    );
    if stroke > 0 {
        dilate(&mask, text.stroke_width())
    } else {
        mask
    }
}

/// Grayscale dilation with a disk of `radius` pixels (at most 255)
pub fn dilate(mask: &GrayImage, radius: u32) -> GrayImage {
    let radius = radius.min(u8::MAX as u32) as u8;
    grayscale_dilate(mask, &Mask::disk(radius))
}

pub fn blur(mask: &GrayImage) -> GrayImage {
    imageproc::filter::gaussian_blur_f32(mask, SHADOW_BLUR_SIGMA)
}

/// Paint `color` through `mask`: coverage scales the color's alpha.
pub fn colorize(mask: &GrayImage, color: Rgba<u8>) -> RgbaImage {
    let mut layer = RgbaImage::new(mask.width(), mask.height());
    for (src, dst) in mask.pixels().zip(layer.pixels_mut()) {
        let coverage = src.0[0] as u32;
        let alpha = (color.0[3] as u32 * coverage + 127) / 255;
        if alpha > 0 {
            *dst = Rgba([color.0[0], color.0[1], color.0[2], alpha as u8]);
        }
    }
    layer
}
