//! Font selection, font sizing and text measurement.
//!
//! - [`FontSizeSpec`] turns the user's size input into a pixel size
//! - [`load_font`] picks a custom font file or the embedded default
//! - [`TextMeasurer`] computes text extents through a chain of strategies

mod measure;

pub use measure::{
    CanvasProbe, FontMetrics, GlyphBounds, MeasureStrategy, TextExtent, TextMeasurer,
    heuristic_extent,
};

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use std::path::Path;

/// Pixel size used when the size input cannot be interpreted.
pub const FALLBACK_FONT_PX: u32 = 36;
/// Smallest pixel size a proportional size input may resolve to.
pub const MIN_PROPORTIONAL_FONT_PX: u32 = 12;
/// Largest pixel size [`render`](crate::render::render) will draw at.
pub const MAX_FONT_PX: u32 = 4096;

/// DejaVu Sans Mono, shipped so rendering works without any font installed.
static DEFAULT_FONT: &[u8] = include_bytes!("../../assets/DejaVuSansMono.ttf");

/// A font size as entered by the user.
///
/// - `"24"` → 24 px
/// - `"0.04"` → 4% of the image width
/// - anything else → the fallback size
///
/// ```rust
/// use exif_datemark::text::FontSizeSpec;
///
/// assert_eq!(FontSizeSpec::parse("0.5").resolve(100), 50);
/// assert_eq!(FontSizeSpec::parse("20").resolve(100), 20);
/// assert_eq!(FontSizeSpec::parse("abc").resolve(100), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontSizeSpec {
    Pixels(u32),
    Proportion(f64),
    Fallback,
}

impl FontSizeSpec {
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 1.0 => Self::Pixels(v.min(u32::MAX as f64) as u32),
            Ok(v) if v > 0.0 && v < 1.0 => Self::Proportion(v),
            _ => Self::Fallback,
        }
    }

    /// Pixel size for an image `image_width` pixels wide, with the default
    /// floor and fallback.
    pub fn resolve(self, image_width: u32) -> u32 {
        self.resolve_with(image_width, MIN_PROPORTIONAL_FONT_PX, FALLBACK_FONT_PX)
    }

    pub fn resolve_with(self, image_width: u32, min_px: u32, fallback_px: u32) -> u32 {
        match self {
            Self::Pixels(px) => px,
            Self::Proportion(p) => ((image_width as f64 * p) as u32).max(min_px),
            Self::Fallback => fallback_px,
        }
    }
}

/// The embedded default font.
pub fn default_font() -> Result<FontArc> {
    FontArc::try_from_slice(DEFAULT_FONT).context("Embedded default font is unreadable")
}

/// Load `font_path` if it names an existing file, otherwise the default font.
///
/// A custom font that fails to load is logged and replaced by the default
/// font rather than reported as an error.
pub fn load_font(font_path: Option<&Path>) -> Result<FontArc> {
    let Some(path) = font_path.filter(|p| p.is_file()) else {
        if let Some(p) = font_path {
            log::debug!("Font file {} not found, using default font", p.display());
        }
        return default_font();
    };

    match read_font(path) {
        Ok(font) => Ok(font),
        Err(e) => {
            log::warn!("Could not load font {}: {e:#}. Using default font", path.display());
            default_font()
        }
    }
}

fn read_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).context("Failed to read font file")?;
    FontArc::try_from_vec(bytes).context("Not a usable TrueType/OpenType font")
}
