//! Watermark placement.

/// Distance in pixels between the text and the image edges.
pub const DEFAULT_MARGIN: i32 = 10;

/// Where on the image the watermark goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::Center,
    ];

    /// Look up an anchor by name. Unknown names mean bottom-right.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "top-left" => Self::TopLeft,
            "top-right" => Self::TopRight,
            "bottom-left" => Self::BottomLeft,
            "center" => Self::Center,
            "bottom-right" => Self::BottomRight,
            other => {
                log::debug!("Unknown position {other:?}, using bottom-right");
                Self::BottomRight
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-left corner for text of `text_size` anchored on an image of
/// `image_size`.
///
/// The result is not clamped: text larger than the image gets negative
/// coordinates and is drawn partly off-canvas.
///
/// ```rust
/// use exif_datemark::layout::{Anchor, place};
///
/// assert_eq!(place(Anchor::Center, (100, 50), (20, 10), 10), (40, 20));
/// assert_eq!(place(Anchor::TopRight, (100, 50), (20, 10), 10), (70, 10));
/// ```
pub fn place(anchor: Anchor, image_size: (u32, u32), text_size: (u32, u32), margin: i32) -> (i32, i32) {
    let (iw, ih) = (i64::from(image_size.0), i64::from(image_size.1));
    let (tw, th) = (i64::from(text_size.0), i64::from(text_size.1));
    let m = i64::from(margin);

    let (x, y) = match anchor {
        Anchor::TopLeft => (m, m),
        Anchor::TopRight => (iw - tw - m, m),
        Anchor::BottomLeft => (m, ih - th - m),
        // `/` on signed integers truncates toward zero
        Anchor::Center => ((iw - tw) / 2, (ih - th) / 2),
        Anchor::BottomRight => (iw - tw - m, ih - th - m),
    };
    (saturate(x), saturate(y))
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
