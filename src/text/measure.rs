use ab_glyph::{Font, FontArc, PxScale, Rect, ScaleFont, point};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_text_mut, text_size};

/// Width per character of the last-resort estimate.
pub const HEURISTIC_CHAR_WIDTH: u32 = 8;
/// Height of the last-resort estimate.
pub const HEURISTIC_LINE_HEIGHT: u32 = 16;

/// Character used to check whether a font has drawable outlines.
const PROBE_CHAR: char = '0';
/// Padding around text on the scratch canvas.
const PROBE_PAD: u32 = 4;
/// Largest scratch canvas the probe will allocate.
const MAX_PROBE_PIXELS: u64 = 4096 * 4096;

/// Pixel width and height of a piece of rendered text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

impl TextExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent of a `(left, top, right, bottom)` box; inverted boxes are empty.
    pub fn from_box(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let span = |lo: f32, hi: f32| (hi - lo).ceil().max(0.0) as u32;
        Self {
            width: span(left, right),
            height: span(top, bottom),
        }
    }
}

/// One way of measuring text.
///
/// A strategy may not work with every font; [`supports`](Self::supports) is
/// checked once when a [`TextMeasurer`] is built, and
/// [`measure`](Self::measure) may still return `None` for a particular text,
/// in which case the next strategy is tried.
pub trait MeasureStrategy {
    fn name(&self) -> &str;

    fn supports(&self, _font: &FontArc) -> bool {
        true
    }

    fn measure(&self, font: &FontArc, scale: PxScale, text: &str) -> Option<TextExtent>;
}

/// Union of the pixel bounding boxes of all outlined glyphs.
///
/// Glyphs are laid out on the same baseline the drawing routine uses, so the
/// box is the area the text will actually ink.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlyphBounds;

impl MeasureStrategy for GlyphBounds {
    fn name(&self) -> &str {
        "glyph bounds"
    }

    fn supports(&self, font: &FontArc) -> bool {
        font.outline(font.glyph_id(PROBE_CHAR)).is_some()
    }

    fn measure(&self, font: &FontArc, scale: PxScale, text: &str) -> Option<TextExtent> {
        if text.is_empty() {
            return Some(TextExtent::default());
        }

        let scaled = font.as_scaled(scale);
        let mut caret = 0.0f32;
        let mut prev = None;
        let mut bounds: Option<Rect> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let b = outlined.px_bounds();
            bounds = Some(match bounds {
                None => b,
                Some(acc) => Rect {
                    min: point(acc.min.x.min(b.min.x), acc.min.y.min(b.min.y)),
                    max: point(acc.max.x.max(b.max.x), acc.max.y.max(b.max.y)),
                },
            });
        }

        let b = bounds?;
        Some(TextExtent::from_box(b.min.x, b.min.y, b.max.x, b.max.y))
    }
}

/// Advance widths and line height from the font tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontMetrics;

impl MeasureStrategy for FontMetrics {
    fn name(&self) -> &str {
        "font metrics"
    }

    fn supports(&self, font: &FontArc) -> bool {
        font.height_unscaled() > 0.0
    }

    fn measure(&self, font: &FontArc, scale: PxScale, text: &str) -> Option<TextExtent> {
        let (width, height) = text_size(scale, font, text);
        Some(TextExtent::new(width, height))
    }
}

/// Draws the text on a scratch canvas and measures the inked pixels.
#[derive(Debug, Default, Clone, Copy)]
pub struct CanvasProbe;

impl MeasureStrategy for CanvasProbe {
    fn name(&self) -> &str {
        "canvas probe"
    }

    fn measure(&self, font: &FontArc, scale: PxScale, text: &str) -> Option<TextExtent> {
        let scaled = font.as_scaled(scale);
        let advance: f32 = text.chars().map(|c| scaled.h_advance(scaled.glyph_id(c))).sum();
        let width = (advance + scale.x).ceil().max(0.0) as u32 + 2 * PROBE_PAD;
        let height = (scale.y * 2.0).ceil().max(0.0) as u32 + 2 * PROBE_PAD;
        if u64::from(width) * u64::from(height) > MAX_PROBE_PIXELS {
            return None;
        }

        let mut canvas = GrayImage::new(width, height);
        draw_text_mut(
            &mut canvas,
            Luma([255u8]),
            PROBE_PAD as i32,
            PROBE_PAD as i32,
            scale,
            font,
            text,
        );

        let mut ink: Option<(u32, u32, u32, u32)> = None;
        for (x, y, p) in canvas.enumerate_pixels() {
            if p[0] == 0 {
                continue;
            }
            ink = Some(match ink {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }

        let (x0, y0, x1, y1) = ink?;
        Some(TextExtent::new(x1 - x0 + 1, y1 - y0 + 1))
    }
}

/// Fixed-pitch estimate used when no strategy could measure the text.
pub fn heuristic_extent(text: &str) -> TextExtent {
    let chars = text.chars().count() as u32;
    TextExtent::new(HEURISTIC_CHAR_WIDTH.saturating_mul(chars), HEURISTIC_LINE_HEIGHT)
}

fn default_strategies() -> Vec<Box<dyn MeasureStrategy>> {
    vec![Box::new(GlyphBounds), Box::new(FontMetrics), Box::new(CanvasProbe)]
}

/// Measures text for one font through an ordered list of strategies.
///
/// Strategies the font cannot support are dropped when the measurer is
/// built. [`measure`](Self::measure) tries the rest in order and ends with
/// [`heuristic_extent`], so it always returns an extent.
///
/// ```rust
/// use ab_glyph::PxScale;
/// use exif_datemark::text::{TextMeasurer, default_font};
///
/// let measurer = TextMeasurer::new(default_font().unwrap());
/// let extent = measurer.measure(PxScale::from(32.0), "2022-07-04");
/// assert!(extent.width > 0 && extent.height > 0);
/// ```
pub struct TextMeasurer {
    font: FontArc,
    strategies: Vec<Box<dyn MeasureStrategy>>,
}

impl TextMeasurer {
    pub fn new(font: FontArc) -> Self {
        Self::with_strategies(font, default_strategies())
    }

    pub fn with_strategies(font: FontArc, strategies: Vec<Box<dyn MeasureStrategy>>) -> Self {
        let strategies = strategies
            .into_iter()
            .filter(|s| {
                let ok = s.supports(&font);
                if !ok {
                    log::debug!("Text measurement: {} unavailable for this font", s.name());
                }
                ok
            })
            .collect();
        Self { font, strategies }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Names of the strategies in use, in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn measure(&self, scale: PxScale, text: &str) -> TextExtent {
        for strategy in &self.strategies {
            if let Some(extent) = strategy.measure(&self.font, scale, text) {
                return extent;
            }
            log::debug!("Text measurement: {} gave no extent for {text:?}", strategy.name());
        }
        heuristic_extent(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::default_font;

    const DATE: &str = "2022-07-04";

    fn scale() -> PxScale {
        PxScale::from(32.0)
    }

    struct Failing;

    impl MeasureStrategy for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn measure(&self, _: &FontArc, _: PxScale, _: &str) -> Option<TextExtent> {
            None
        }
    }

    struct Unsupported;

    impl MeasureStrategy for Unsupported {
        fn name(&self) -> &str {
            "unsupported"
        }

        fn supports(&self, _: &FontArc) -> bool {
            false
        }

        fn measure(&self, _: &FontArc, _: PxScale, _: &str) -> Option<TextExtent> {
            Some(TextExtent::new(999, 999))
        }
    }

    struct Fixed(u32, u32);

    impl MeasureStrategy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn measure(&self, _: &FontArc, _: PxScale, _: &str) -> Option<TextExtent> {
            Some(TextExtent::new(self.0, self.1))
        }
    }

    // ── TextExtent ───────────────────────────────────────────────────

    #[test]
    fn extent_from_box() {
        assert_eq!(TextExtent::from_box(2.0, -3.0, 12.5, 7.0), TextExtent::new(11, 10));
        assert_eq!(TextExtent::from_box(5.0, 5.0, 1.0, 1.0), TextExtent::new(0, 0));
    }

    #[test]
    fn heuristic_counts_characters() {
        assert_eq!(heuristic_extent(DATE), TextExtent::new(80, 16));
        assert_eq!(heuristic_extent(""), TextExtent::new(0, 16));
        assert_eq!(heuristic_extent("日付"), TextExtent::new(16, 16));
    }

    // ── fallback chain ───────────────────────────────────────────────

    #[test]
    fn all_strategies_failing_uses_heuristic() {
        let measurer = TextMeasurer::with_strategies(
            default_font().unwrap(),
            vec![Box::new(Failing), Box::new(Unsupported), Box::new(Failing)],
        );
        assert_eq!(measurer.measure(scale(), DATE), TextExtent::new(80, 16));
    }

    #[test]
    fn empty_chain_uses_heuristic() {
        let measurer = TextMeasurer::with_strategies(default_font().unwrap(), Vec::new());
        assert_eq!(measurer.measure(scale(), "abc"), TextExtent::new(24, 16));
    }

    #[test]
    fn failing_strategy_falls_through() {
        let measurer = TextMeasurer::with_strategies(
            default_font().unwrap(),
            vec![Box::new(Failing), Box::new(Fixed(40, 12))],
        );
        assert_eq!(measurer.measure(scale(), DATE), TextExtent::new(40, 12));
    }

    #[test]
    fn unsupported_strategies_are_dropped_up_front() {
        let measurer = TextMeasurer::with_strategies(
            default_font().unwrap(),
            vec![Box::new(Unsupported), Box::new(Fixed(1, 2))],
        );
        assert_eq!(measurer.strategy_names(), ["fixed"]);
        assert_eq!(measurer.measure(scale(), DATE), TextExtent::new(1, 2));
    }

    #[test]
    fn default_font_supports_every_tier() {
        let measurer = TextMeasurer::new(default_font().unwrap());
        assert_eq!(
            measurer.strategy_names(),
            ["glyph bounds", "font metrics", "canvas probe"]
        );
    }

    // ── real measurements ────────────────────────────────────────────

    #[test]
    fn glyph_bounds_fit_within_advance() {
        let font = default_font().unwrap();
        let bounds = GlyphBounds.measure(&font, scale(), DATE).unwrap();
        let metrics = FontMetrics.measure(&font, scale(), DATE).unwrap();

        assert!(bounds.width > 0 && bounds.height > 0);
        assert!(bounds.width <= metrics.width + 2, "{bounds:?} vs {metrics:?}");
        assert!(bounds.width * 2 > metrics.width, "{bounds:?} vs {metrics:?}");
        assert!(bounds.height <= 40, "{bounds:?}");
    }

    #[test]
    fn canvas_probe_agrees_with_glyph_bounds() {
        let font = default_font().unwrap();
        let bounds = GlyphBounds.measure(&font, scale(), DATE).unwrap();
        let probe = CanvasProbe.measure(&font, scale(), DATE).unwrap();

        assert!(bounds.width.abs_diff(probe.width) <= 2, "{bounds:?} vs {probe:?}");
        assert!(bounds.height.abs_diff(probe.height) <= 2, "{bounds:?} vs {probe:?}");
    }

    #[test]
    fn empty_text_has_zero_extent() {
        let measurer = TextMeasurer::new(default_font().unwrap());
        assert_eq!(measurer.measure(scale(), ""), TextExtent::default());
    }

    #[test]
    fn whitespace_falls_through_to_metrics() {
        let font = default_font().unwrap();
        assert_eq!(GlyphBounds.measure(&font, scale(), "   "), None);

        let measurer = TextMeasurer::new(font.clone());
        let extent = measurer.measure(scale(), "   ");
        assert_eq!(extent, FontMetrics.measure(&font, scale(), "   ").unwrap());
    }

    #[test]
    fn canvas_probe_sees_no_ink_in_whitespace() {
        let font = default_font().unwrap();
        assert_eq!(CanvasProbe.measure(&font, scale(), " "), None);
    }

    #[test]
    fn larger_scale_measures_larger() {
        let measurer = TextMeasurer::new(default_font().unwrap());
        let small = measurer.measure(PxScale::from(12.0), DATE);
        let large = measurer.measure(PxScale::from(48.0), DATE);
        assert!(large.width > small.width && large.height > small.height);
    }
}
