//! Quote image pipeline: style, wrap, place and render a quote and its
//! signature, then write date-named images in batches.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::font::FontHandle;
use crate::hashtags::caption;
use crate::output::{output_file_name, write_sidecar, CaptionSidecar};
use crate::quotes::QuoteEntry;
use crate::rendering::{pixel_digest, render, Surface};
use crate::style::{signature_text, StyledText};
use crate::{Error, GeneratorConfig, Result};

/// Load a background photo as an RGBA surface.
pub fn load_background(path: impl AsRef<Path>) -> Result<Surface> {
    let path = path.as_ref();
    let image = image::open(path)?;
    debug!("loaded background {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image.to_rgba8())
}

/// Picks a background per quote: each background serves `per_background`
/// consecutive quotes, then the next one takes over, wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundRotation {
    count: usize,
    per_background: usize,
}

impl BackgroundRotation {
    pub fn new(count: usize, per_background: usize) -> Self {
        Self {
            count: count.max(1),
            per_background: per_background.max(1),
        }
    }

    pub fn index_for(&self, n: usize) -> usize {
        (n / self.per_background) % self.count
    }
}

/// Outcome of [`QuoteImageGenerator::generate_batch`]
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(NaiveDate, String)>,
}

pub struct QuoteImageGenerator {
    config: GeneratorConfig,
    quote_font: FontHandle,
    author_font: FontHandle,
}

impl QuoteImageGenerator {
    pub fn new(config: GeneratorConfig, quote_font: FontHandle, author_font: FontHandle) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            quote_font,
            author_font,
        })
    }

    /// Load both fonts from the paths named in the styles.
    pub fn from_config(config: GeneratorConfig) -> Result<Self> {
        let quote_font = FontHandle::load(&config.quote_style.font_family, config.quote_style.font_size)?;
        let author_font =
            FontHandle::load(&config.author_style.font_family, config.author_style.font_size)?;
        Self::new(config, quote_font, author_font)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Quote styled and wrapped to the inner box width
    pub fn quote_text(&self, quote: &str) -> StyledText {
        let max_width = self.config.inner_box.width().max(0) as u32;
        StyledText::from_style(quote, &self.config.quote_style, self.quote_font.clone()).wrapped(max_width)
    }

    pub fn signature(&self, author: &str) -> StyledText {
        StyledText::from_style(signature_text(author), &self.config.author_style, self.author_font.clone())
    }

    /// Render `quote` and its signature onto a copy of `background`.
    ///
    /// An empty author leaves the image unsigned.
    pub fn compose(&self, quote: &str, author: &str, background: &Surface) -> Result<Surface> {
        if quote.trim().is_empty() {
            return Err(Error::PreconditionError("quote text is empty".to_string()));
        }
        let inner = &self.config.inner_box;

        let text = self.quote_text(quote.trim());
        let size = text.size();
        if !inner.contains_size(size) {
            warn!(
                "quote {}x{} overflows the {}x{} inner box",
                size.width,
                size.height,
                inner.width(),
                inner.height()
            );
        }
        let at = self.config.quote_style.placement.position(size, inner);
        debug!("quote at {:?}, {} lines", at, text.content().lines().count());
        let image = render(&text, at, background)?;

        let author = author.trim();
        if author.is_empty() {
            return Ok(image);
        }
        let signature = self.signature(author);
        let at = self.config.author_style.placement.position(signature.size(), inner);
        debug!("signature {:?} at {:?}", signature.content(), at);
        render(&signature, at, &image)
    }

    /// Render one entry to `out_dir/<post date>.png` with its caption sidecar.
    pub fn generate_one(&self, entry: &QuoteEntry, background: &Surface, out_dir: &Path) -> Result<PathBuf> {
        let image = self.compose(&entry.quote, &entry.author, background)?;
        let path = out_dir.join(output_file_name(entry.post_date));
        image.save(&path)?;

        let sidecar = CaptionSidecar {
            quote: entry.quote.clone(),
            author: signature_text(entry.author.trim()),
            caption: caption(&self.config.hashtags, Some(&entry.author)),
            digest: pixel_digest(&image),
        };
        write_sidecar(&path, &sidecar)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Render every entry, spreading the work over `jobs` threads.
    ///
    /// Backgrounds rotate by entry order. A failed entry is logged and
    /// reported; it does not stop the others.
    pub fn generate_batch(
        &self,
        entries: &[QuoteEntry],
        backgrounds: &[Surface],
        out_dir: &Path,
        jobs: usize,
    ) -> Result<BatchReport> {
        if backgrounds.is_empty() {
            return Err(Error::ConfigError("no background images".to_string()));
        }
        fs::create_dir_all(out_dir)?;

        let rotation = BackgroundRotation::new(backgrounds.len(), self.config.per_background);
        let jobs = jobs.clamp(1, entries.len().max(1));
        debug!("rendering {} quotes on {} threads", entries.len(), jobs);

        let mut results: Vec<(usize, Result<PathBuf>)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..jobs)
                .map(|worker| {
                    scope.spawn(move || {
                        (worker..entries.len())
                            .step_by(jobs)
                            .map(|i| {
                                let background = &backgrounds[rotation.index_for(i)];
                                (i, self.generate_one(&entries[i], background, out_dir))
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .flat_map(|(worker, h)| {
                    h.join().unwrap_or_else(|_| {
                        warn!("render worker {worker} panicked");
                        // everything it owned is unaccounted for
                        (worker..entries.len())
                            .step_by(jobs)
                            .map(|i| (i, Err(Error::WorkerError(format!("worker {worker} panicked")))))
                            .collect()
                    })
                })
                .collect()
        });
        results.sort_by_key(|(i, _)| *i);

        let mut report = BatchReport::default();
        for (i, result) in results {
            match result {
                Ok(path) => report.written.push(path),
                Err(e) => {
                    let date = entries[i].post_date;
                    warn!("quote for {date} failed: {e}");
                    report.failed.push((date, e.to_string()));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Typeface;
    use crate::rendering::BoundingBox;
    use crate::TextStyle;
    use image::Rgba;

    fn generator() -> QuoteImageGenerator {
        let config = GeneratorConfig {
            inner_box: BoundingBox::new(20, 20, 220, 180),
            quote_style: TextStyle {
                font_size: 20.0,
                ..TextStyle::quote()
            },
            author_style: TextStyle {
                font_size: 10.0,
                ..TextStyle::signature()
            },
            ..GeneratorConfig::default()
        };
        QuoteImageGenerator::new(config, FontHandle::block(10, 20), FontHandle::block(5, 10)).unwrap()
    }

    fn white(width: u32, height: u32) -> Surface {
        Surface::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn rotation_uses_each_background_twice() {
        let rotation = BackgroundRotation::new(2, 2);
        let picks: Vec<usize> = (0..6).map(|n| rotation.index_for(n)).collect();
        assert_eq!(picks, vec![0, 0, 1, 1, 0, 0]);
    }

    #[test]
    fn quote_is_wrapped_to_the_inner_box() {
        let gen = generator();
        let text = gen.quote_text("one two three four five six seven");
        for line in text.content().lines() {
            assert!(text.font().line_width(line) + 2 <= 200, "{line:?}");
        }
        assert!(text.content().contains('\n'));
    }

    #[test]
    fn signature_sits_in_the_bottom_right_corner() {
        let gen = generator();
        let image = gen.compose("hello", "Einstein", &white(240, 200)).unwrap();
        let signature = gen.signature("Einstein");
        assert_eq!(signature.content(), "-Einstein");

        // the signature's last glyph cell ends one stroke width inside the corner
        assert_ne!(*image.get_pixel(218, 178), Rgba([255, 255, 255, 255]));
        assert_eq!(*image.get_pixel(230, 190), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn empty_quote_is_rejected() {
        let err = generator().compose("  ", "x", &white(240, 200)).unwrap_err();
        assert!(matches!(err, Error::PreconditionError(_)));
    }

    #[test]
    fn unsigned_quote_renders_without_signature() {
        let gen = generator();
        let image = gen.compose("hello", "", &white(240, 200)).unwrap();
        assert_eq!(*image.get_pixel(218, 178), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn batch_writes_date_named_images() {
        let dir = tempfile::tempdir().unwrap();
        let entries: Vec<QuoteEntry> = (1..=3)
            .map(|d| QuoteEntry {
                quote: format!("quote number {d}"),
                author: "Anon".to_string(),
                post_date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            })
            .collect();
        let backgrounds = vec![white(240, 200), Surface::from_pixel(240, 200, Rgba([0, 80, 0, 255]))];

        let report = generator()
            .generate_batch(&entries, &backgrounds, dir.path(), 2)
            .unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(
            report.written,
            vec![
                dir.path().join("2024-06-01.png"),
                dir.path().join("2024-06-02.png"),
                dir.path().join("2024-06-03.png"),
            ]
        );
        let sidecar = crate::output::read_sidecar(&report.written[0]).unwrap().unwrap();
        assert_eq!(sidecar.caption, "#qotd #anon");
        assert_eq!(sidecar.author, "-Anon");

        // third quote starts the second background
        let third = image::open(&report.written[2]).unwrap().to_rgba8();
        assert_eq!(*third.get_pixel(0, 0), Rgba([0, 80, 0, 255]));
    }

    #[test]
    fn batch_reports_failures_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            QuoteEntry {
                quote: " ".to_string(),
                author: "Anon".to_string(),
                post_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            },
            QuoteEntry {
                quote: "fine".to_string(),
                author: "Anon".to_string(),
                post_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            },
        ];
        let report = generator()
            .generate_batch(&entries, &[white(240, 200)], dir.path(), 4)
            .unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failed.len(), 1);
    }

    /// Block metrics, but panics on any line containing "boom"
    struct FragileFace;

    impl Typeface for FragileFace {
        fn line_width(&self, line: &str) -> u32 {
            assert!(!line.contains("boom"), "fragile face hit {line:?}");
            10 * line.chars().count() as u32
        }

        fn line_height(&self) -> u32 {
            20
        }

        fn rasterize_line(&self, _line: &str, _left: f32, _top: f32, _mask: &mut image::GrayImage) {}
    }

    #[test]
    fn panicked_worker_entries_are_reported_failed() {
        let dir = tempfile::tempdir().unwrap();
        let entries: Vec<QuoteEntry> = ["boom", "one", "two", "three"]
            .iter()
            .zip(1..)
            .map(|(q, d)| QuoteEntry {
                quote: q.to_string(),
                author: "Anon".to_string(),
                post_date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            })
            .collect();
        let gen = QuoteImageGenerator::new(
            generator().config().clone(),
            FontHandle::new("fragile", 20.0, FragileFace),
            FontHandle::block(5, 10),
        )
        .unwrap();

        // worker 0 owns entries 0 and 2 and dies on the first
        let report = gen.generate_batch(&entries, &[white(240, 200)], dir.path(), 2).unwrap();
        assert_eq!(
            report.written,
            vec![dir.path().join("2024-06-02.png"), dir.path().join("2024-06-04.png")]
        );
        let failed: Vec<NaiveDate> = report.failed.iter().map(|(date, _)| *date).collect();
        assert_eq!(
            failed,
            vec![
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            ]
        );
        assert!(report.failed[0].1.contains("panicked"));
    }

    #[test]
    fn batch_needs_a_background() {
        let dir = tempfile::tempdir().unwrap();
        let err = generator().generate_batch(&[], &[], dir.path(), 1).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
