use ab_glyph::PxScale;
use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::path::{Path, PathBuf};

use crate::color::{self, Rgb};
use crate::layout::{self, Anchor};
use crate::text::{self, FontSizeSpec, TextMeasurer};

/// Offsets at which the black outline copies of the text are drawn.
pub const OUTLINE_OFFSETS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Everything that controls how the date is drawn.
///
/// # Example
///
/// ```rust
/// use exif_datemark::layout::Anchor;
/// use exif_datemark::render::WatermarkStyle;
///
/// let style = WatermarkStyle {
///     anchor: Anchor::TopLeft,
///     ..WatermarkStyle::default()
/// };
/// assert_eq!(style.margin, 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkStyle {
    pub font_size: FontSizeSpec,
    pub color: Rgb,
    pub anchor: Anchor,
    /// TrueType/OpenType font file; the embedded font is used when unset.
    pub font_path: Option<PathBuf>,
    pub margin: i32,
    /// Floor for proportional font sizes.
    pub min_font_px: u32,
    /// Size used when the font size input is unusable.
    pub fallback_font_px: u32,
    /// Resolved sizes above this are refused.
    pub max_font_px: u32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font_size: FontSizeSpec::Proportion(0.04),
            color: color::WHITE,
            anchor: Anchor::BottomRight,
            font_path: None,
            margin: layout::DEFAULT_MARGIN,
            min_font_px: text::MIN_PROPORTIONAL_FONT_PX,
            fallback_font_px: text::FALLBACK_FONT_PX,
            max_font_px: text::MAX_FONT_PX,
        }
    }
}

impl WatermarkStyle {
    /// Pixel font size for an image `image_width` pixels wide.
    pub fn font_px(&self, image_width: u32) -> u32 {
        self.font_size
            .resolve_with(image_width, self.min_font_px, self.fallback_font_px)
    }
}

/// Draw `date_text` onto `image` with a one-pixel black outline.
///
/// The image is converted to RGBA first; callers saving to a format without
/// alpha flatten it again. A resolved font size above `style.max_font_px` is
/// an error and nothing is drawn.
pub fn render(image: DynamicImage, date_text: &str, style: &WatermarkStyle) -> Result<RgbaImage> {
    let (width, height) = (image.width(), image.height());
    let px = style.font_px(width);
    if px > style.max_font_px {
        anyhow::bail!(
            "Font size {px}px exceeds the {}px limit",
            style.max_font_px
        );
    }

    let mut canvas = image.into_rgba8();
    let scale = PxScale::from(px as f32);
    let font = text::load_font(style.font_path.as_deref())?;

    let measurer = TextMeasurer::new(font);
    let extent = measurer.measure(scale, date_text);
    let (x, y) = layout::place(
        style.anchor,
        (width, height),
        (extent.width, extent.height),
        style.margin,
    );
    log::debug!(
        "  Text {date_text:?}: {px}px, {}x{} at ({x}, {y}) [{}]",
        extent.width,
        extent.height,
        style.anchor
    );

    let font = measurer.font();
    for (dx, dy) in OUTLINE_OFFSETS {
        draw_text_mut(&mut canvas, OUTLINE_COLOR, x + dx, y + dy, scale, font, date_text);
    }
    let [r, g, b] = style.color;
    draw_text_mut(&mut canvas, Rgba([r, g, b, 255]), x, y, scale, font, date_text);

    Ok(canvas)
}

/// Open the image at `path` and [`render`] onto it.
pub fn render_file(path: &Path, date_text: &str, style: &WatermarkStyle) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;
    render(image, date_text, style)
}
