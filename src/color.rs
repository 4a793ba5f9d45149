//! Watermark color parsing.

/// An RGB triple.
pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];
pub const BLACK: Rgb = [0, 0, 0];

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("white", WHITE),
    ("black", BLACK),
    ("red", [255, 0, 0]),
    ("yellow", [255, 255, 0]),
    ("blue", [0, 0, 255]),
    ("green", [0, 128, 0]),
];

/// Parse `#RRGGBB` or one of the named colors (case-insensitive).
///
/// Anything else, malformed hex included, is white.
///
/// ```rust
/// use exif_datemark::color::parse_color;
///
/// assert_eq!(parse_color("#FF0000"), [255, 0, 0]);
/// assert_eq!(parse_color("Blue"), [0, 0, 255]);
/// assert_eq!(parse_color("mauve"), [255, 255, 255]);
/// ```
pub fn parse_color(input: &str) -> Rgb {
    let input = input.trim();

    if let Some(hex) = input.strip_prefix('#') {
        return parse_hex(hex).unwrap_or_else(|| {
            log::warn!("Invalid color {input:?}, using white");
            WHITE
        });
    }

    let lower = input.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| *rgb)
        .unwrap_or_else(|| {
            log::warn!("Unknown color {input:?}, using white");
            WHITE
        })
}

/// Names accepted by [`parse_color`].
pub fn color_names() -> impl Iterator<Item = &'static str> {
    NAMED_COLORS.iter().map(|(name, _)| *name)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
