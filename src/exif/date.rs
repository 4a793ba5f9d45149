use chrono::NaiveDate;

/// Output format of every normalized date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The EXIF date tags the resolver knows about.
///
/// Each tag carries its ExifTool-style name and its numeric identifier, so
/// backends that expose tags by number and backends that expose them by name
/// can share one probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTag {
    /// `0x9003`: when the shutter fired.
    DateTimeOriginal,
    /// `0x0132`: last modification of the image (IFD0).
    DateTime,
    /// `0x9004`: when the image was digitized.
    DateTimeDigitized,
}

impl DateTag {
    pub const fn code(self) -> u16 {
        match self {
            Self::DateTimeOriginal => 0x9003,
            Self::DateTime => 0x0132,
            Self::DateTimeDigitized => 0x9004,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DateTimeOriginal => "DateTimeOriginal",
            Self::DateTime => "DateTime",
            Self::DateTimeDigitized => "DateTimeDigitized",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        [Self::DateTimeOriginal, Self::DateTime, Self::DateTimeDigitized]
            .into_iter()
            .find(|tag| tag.code() == code)
    }
}

/// A date value as it came out of a metadata backend, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDate {
    Text(String),
    Bytes(Vec<u8>),
    /// The tag is present but its value could not be read.
    Unreadable,
}

impl RawDate {
    /// Decode to text, dropping EXIF NUL padding and surrounding whitespace.
    ///
    /// Returns `None` for values that are empty after trimming and for
    /// [`RawDate::Unreadable`].
    pub fn decode(&self) -> Option<String> {
        let text = match self {
            Self::Text(s) => s.clone(),
            Self::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Self::Unreadable => return None,
        };
        let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

/// Normalize a raw EXIF date string to `YYYY-MM-DD`.
///
/// Accepts `YYYY:MM:DD HH:MM:SS`, `YYYY-MM-DD`, and anything else whose
/// first space-separated token splits on `:`/`-` into at least three numeric
/// parts forming a real calendar date. Anything else yields `None`.
///
/// ```rust
/// use exif_datemark::exif::normalize_exif_date;
///
/// assert_eq!(normalize_exif_date("2022:07:04 10:00:00").as_deref(), Some("2022-07-04"));
/// assert_eq!(normalize_exif_date("2023:13:40"), None);
/// ```
pub fn normalize_exif_date(raw: &str) -> Option<String> {
    parse_exif_date(raw).map(|d| d.format(DATE_FORMAT).to_string())
}

/// Parse the calendar part of a raw EXIF date string.
pub fn parse_exif_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split(' ').next()?;
    let unified = date_part.replace('-', ":");
    let parts: Vec<&str> = unified.split(':').collect();
    if parts.len() < 3 {
        return None;
    }

    let year: i32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let day: u32 = parts[2].trim().parse().ok()?;
    if !(1..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize the first tag in `order` that holds a non-empty value.
///
/// Only that first value decides the result: if it fails to normalize, later
/// tags are not consulted and the backend reports no date. An
/// [`RawDate::Unreadable`] value counts as present.
pub fn first_present<F>(order: &[DateTag], mut lookup: F) -> Option<String>
where
    F: FnMut(DateTag) -> Option<RawDate>,
{
    for &tag in order {
        let text = match lookup(tag) {
            None => continue,
            Some(RawDate::Unreadable) => {
                log::debug!("  {} present but unreadable", tag.name());
                return None;
            }
            Some(raw) => match raw.decode() {
                Some(text) => text,
                None => continue,
            },
        };
        log::debug!("  {} = {text:?}", tag.name());
        return normalize_exif_date(&text);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── normalize_exif_date: accepted shapes ─────────────────────────

    #[test]
    fn normalize_exif_datetime() {
        assert_eq!(normalize_exif_date("2022:07:04 10:00:00").as_deref(), Some("2022-07-04"));
    }

    #[test]
    fn normalize_iso_date() {
        assert_eq!(normalize_exif_date("2022-07-04").as_deref(), Some("2022-07-04"));
        assert_eq!(normalize_exif_date("2022-07-04 23:59:59").as_deref(), Some("2022-07-04"));
    }

    #[test]
    fn normalize_pads_single_digits() {
        assert_eq!(normalize_exif_date("2021:3:9").as_deref(), Some("2021-03-09"));
    }

    #[test]
    fn normalize_ignores_extra_components() {
        assert_eq!(normalize_exif_date("2020:02:29:17").as_deref(), Some("2020-02-29"));
    }

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(normalize_exif_date("  1999:12:31 00:00:00 ").as_deref(), Some("1999-12-31"));
    }

    // ── normalize_exif_date: rejected shapes ─────────────────────────

    #[test]
    fn normalize_rejects_out_of_range() {
        assert_eq!(normalize_exif_date("2023:13:40"), None);
        assert_eq!(normalize_exif_date("2023:02:30"), None);
        assert_eq!(normalize_exif_date("2021:02:29"), None);
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert_eq!(normalize_exif_date("not-a-date"), None);
        assert_eq!(normalize_exif_date(""), None);
        assert_eq!(normalize_exif_date("2022:07"), None);
        assert_eq!(normalize_exif_date("    :  :   "), None);
    }

    #[test]
    fn normalize_rejects_zero_year() {
        assert_eq!(normalize_exif_date("0000:00:00 00:00:00"), None);
    }

    // ── RawDate ──────────────────────────────────────────────────────

    #[test]
    fn raw_bytes_drop_nul_padding() {
        let raw = RawDate::Bytes(b"2022:07:04 10:00:00\0".to_vec());
        assert_eq!(raw.decode().as_deref(), Some("2022:07:04 10:00:00"));
    }

    #[test]
    fn raw_empty_values_decode_to_none() {
        assert_eq!(RawDate::Text(String::new()).decode(), None);
        assert_eq!(RawDate::Bytes(vec![0, 0]).decode(), None);
        assert_eq!(RawDate::Text("   ".into()).decode(), None);
    }

    // ── DateTag ──────────────────────────────────────────────────────

    #[test]
    fn tag_codes_round_trip() {
        for tag in [DateTag::DateTimeOriginal, DateTag::DateTime, DateTag::DateTimeDigitized] {
            assert_eq!(DateTag::from_code(tag.code()), Some(tag));
        }
        assert_eq!(DateTag::DateTimeDigitized.code(), 0x9004);
        assert_eq!(DateTag::from_code(0x010F), None);
    }

    // ── first_present ────────────────────────────────────────────────

    const ORDER: &[DateTag] = &[
        DateTag::DateTimeOriginal,
        DateTag::DateTime,
        DateTag::DateTimeDigitized,
    ];

    #[test]
    fn first_present_respects_order() {
        let got = first_present(ORDER, |tag| match tag {
            DateTag::DateTime => Some(RawDate::Text("2001:01:01 00:00:00".into())),
            DateTag::DateTimeDigitized => Some(RawDate::Text("2002:02:02 00:00:00".into())),
            DateTag::DateTimeOriginal => None,
        });
        assert_eq!(got.as_deref(), Some("2001-01-01"));
    }

    #[test]
    fn first_present_skips_empty_values() {
        let got = first_present(ORDER, |tag| match tag {
            DateTag::DateTimeOriginal => Some(RawDate::Bytes(b"\0".to_vec())),
            DateTag::DateTime => Some(RawDate::Text("2010:10:10".into())),
            DateTag::DateTimeDigitized => None,
        });
        assert_eq!(got.as_deref(), Some("2010-10-10"));
    }

    #[test]
    fn first_present_stops_at_first_malformed_value() {
        let got = first_present(ORDER, |tag| match tag {
            DateTag::DateTimeOriginal => Some(RawDate::Text("garbage".into())),
            _ => Some(RawDate::Text("2010:10:10".into())),
        });
        assert_eq!(got, None);
    }

    #[test]
    fn first_present_stops_at_unreadable_value() {
        let got = first_present(ORDER, |tag| match tag {
            DateTag::DateTimeOriginal => Some(RawDate::Unreadable),
            _ => Some(RawDate::Text("2010:10:10".into())),
        });
        assert_eq!(got, None);
        assert_eq!(RawDate::Unreadable.decode(), None);
    }
}
