/// Layer painting and alpha compositing

use image::{Rgba, RgbaImage};
use log::debug;

use crate::rendering::layout::{shadow_position, Point};
use crate::rendering::raster::{blur, colorize, text_mask};
use crate::rendering::Surface;
use crate::style::StyledText;
use crate::{Error, Result};

/// One transparent layer to paint, in back-to-front order
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Blurred copy of the text in the shadow color
    Shadow { at: Point, color: Rgba<u8> },
    /// The text itself, unblurred
    Text { at: Point, color: Rgba<u8> },
}

/// Layers needed to draw `text` at `position`; the shadow, if any, comes first.
pub fn paint_commands(text: &StyledText, position: Point) -> Vec<PaintCommand> {
    let mut commands = Vec::with_capacity(2);
    if let Some(shadow) = text.shadow() {
        commands.push(PaintCommand::Shadow {
            at: shadow_position(position, &shadow),
            color: shadow.color,
        });
    }
    commands.push(PaintCommand::Text {
        at: position,
        color: text.color(),
    });
    commands
}

/// Paint a single command onto a fresh transparent layer.
pub fn paint_layer(text: &StyledText, command: &PaintCommand, width: u32, height: u32) -> Surface {
    match *command {
        PaintCommand::Shadow { at, color } => colorize(&blur(&text_mask(text, at, width, height)), color),
        PaintCommand::Text { at, color } => colorize(&text_mask(text, at, width, height), color),
    }
}

/// Render `text` (and its shadow) onto a transparent surface of the given size.
///
/// Text falling outside the surface is clipped.
pub fn render_to_transparent_layer(
    text: &StyledText,
    position: Point,
    width: u32,
    height: u32,
) -> Result<Surface> {
    if width == 0 || height == 0 {
        return Err(Error::SurfaceError(format!(
            "cannot render onto an empty {width}x{height} surface"
        )));
    }
    if text.content().is_empty() {
        return Err(Error::PreconditionError("text to render is empty".to_string()));
    }

    let mut working = RgbaImage::new(width, height);
    for command in paint_commands(text, position) {
        debug!("painting {:?} for {:?}", command, text.content());
        let layer = paint_layer(text, &command, width, height);
        alpha_composite(&mut working, &layer)?;
    }
    Ok(working)
}

/// Composite `layer` over `background`, returning a new surface.
pub fn composite_onto_background(background: &Surface, layer: &Surface) -> Result<Surface> {
    let mut out = background.clone();
    alpha_composite(&mut out, layer)?;
    Ok(out)
}

/// Render `text` at `position` and composite it onto `target`.
pub fn render(text: &StyledText, position: Point, target: &Surface) -> Result<Surface> {
    let layer = render_to_transparent_layer(text, position, target.width(), target.height())?;
    composite_onto_background(target, &layer)
}

/// Porter-Duff "over" of `src` onto `dst`, in place
pub fn alpha_composite(dst: &mut Surface, src: &Surface) -> Result<()> {
    if dst.dimensions() != src.dimensions() {
        return Err(Error::SurfaceError(format!(
            "layer is {:?} but background is {:?}",
            src.dimensions(),
            dst.dimensions()
        )));
    }
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        *d = over(*d, *s);
    }
    Ok(())
}

fn over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src.0[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }
    let sa = src.0[3] as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| -> u8 {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src.0[0], dst.0[0]),
        channel(src.0[1], dst.0[1]),
        channel(src.0[2], dst.0[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontHandle;
    use crate::style::Shadow;

    fn gradient(width: u32, height: u32) -> Surface {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    fn sample(shadow: Option<Shadow>) -> StyledText {
        StyledText::new("Hi there", FontHandle::block(10, 20))
            .with_color(Rgba([200, 30, 30, 255]))
            .with_stroke_width(1)
            .with_shadow(shadow)
    }

    #[test]
    fn shadow_is_painted_beneath_text() {
        let text = sample(Some(Shadow::new(Rgba([0, 0, 0, 76]), -4, 4)));
        let commands = paint_commands(&text, Point::new(100, 100));
        assert_eq!(
            commands,
            vec![
                PaintCommand::Shadow { at: Point::new(96, 104), color: Rgba([0, 0, 0, 76]) },
                PaintCommand::Text { at: Point::new(100, 100), color: Rgba([200, 30, 30, 255]) },
            ]
        );
    }

    #[test]
    fn no_shadow_means_a_single_layer() {
        let commands = paint_commands(&sample(None), Point::new(0, 0));
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn fully_transparent_shadow_changes_nothing() {
        let bg = gradient(160, 90);
        let plain = render(&sample(None), Point::new(10, 20), &bg).unwrap();
        let ghost = render(
            &sample(Some(Shadow::new(Rgba([0, 0, 0, 0]), -4, 4))),
            Point::new(10, 20),
            &bg,
        )
        .unwrap();
        assert_eq!(plain.as_raw(), ghost.as_raw());
    }

    #[test]
    fn opaque_text_covers_its_shadow() {
        let text = sample(Some(Shadow::new(Rgba([0, 0, 0, 200]), 3, 3)));
        let bg = RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]));
        let out = render(&text, Point::new(10, 10), &bg).unwrap();
        assert_eq!(*out.get_pixel(15, 15), Rgba([200, 30, 30, 255]));
        // below the text only the shadow shows
        let below = out.get_pixel(15, 33);
        assert!(below.0[0] < 255 && below.0[0] == below.0[1]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let text = sample(Some(Shadow::new(Rgba([0, 0, 0, 76]), -4, 4)));
        let bg = gradient(120, 80);
        let a = render(&text, Point::new(5, 30), &bg).unwrap();
        let b = render(&text, Point::new(5, 30), &bg).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn off_canvas_text_is_clipped_silently() {
        let bg = gradient(64, 64);
        let text = sample(Some(Shadow::new(Rgba([0, 0, 0, 76]), -4, 4)));
        let out = render(&text, Point::new(-5000, 9000), &bg).unwrap();
        assert_eq!(out.as_raw(), bg.as_raw());
    }

    #[test]
    fn transparent_layer_leaves_background_untouched_elsewhere() {
        let layer = render_to_transparent_layer(&sample(None), Point::new(0, 0), 300, 60).unwrap();
        assert_eq!(*layer.get_pixel(299, 59), Rgba([0, 0, 0, 0]));
        assert_eq!(layer.get_pixel(5, 5).0[3], 255);
    }

    #[test]
    fn empty_surface_is_rejected() {
        let err = render_to_transparent_layer(&sample(None), Point::new(0, 0), 0, 10).unwrap_err();
        assert!(matches!(err, Error::SurfaceError(_)));
    }

    #[test]
    fn empty_text_is_a_precondition_error() {
        let text = StyledText::new("", FontHandle::block(10, 20));
        let err = render(&text, Point::new(0, 0), &gradient(10, 10)).unwrap_err();
        assert!(matches!(err, Error::PreconditionError(_)));
    }

    #[test]
    fn mismatched_layer_is_a_surface_error() {
        let err = composite_onto_background(&gradient(10, 10), &gradient(10, 11)).unwrap_err();
        assert!(matches!(err, Error::SurfaceError(_)));
    }

    #[test]
    fn over_blends_partial_alpha() {
        let out = over(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        assert_eq!(out, Rgba([128, 128, 128, 255]));

        let out = over(Rgba([0, 0, 0, 0]), Rgba([10, 20, 30, 40]));
        assert_eq!(out, Rgba([10, 20, 30, 40]));
    }
}
