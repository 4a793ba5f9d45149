use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use nom_exif::{EntryValue, ExifIter, MediaParser, MediaSource};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::date::{DATE_FORMAT, DateTag, RawDate, first_present};

/// Tags consulted by the structured (primary) backend.
pub const PRIMARY_ORDER: &[DateTag] = &[DateTag::DateTimeOriginal, DateTag::DateTime];

/// Tags consulted by the tag-dictionary (secondary) backend.
pub const SECONDARY_ORDER: &[DateTag] = &[
    DateTag::DateTimeOriginal,
    DateTag::DateTime,
    DateTag::DateTimeDigitized,
];

/// One tier of the date resolution chain.
///
/// Implement this trait to plug another metadata backend into
/// [`DateResolver`](super::DateResolver). The crate ships with
/// [`LittleExifSource`] (behind the `little-exif` feature),
/// [`NomExifSource`] and [`FileModifiedSource`].
///
/// `Ok(None)` means "this tier has no date"; `Err` means the tier broke while
/// trying. The resolver treats both the same way and moves on.
pub trait DateSource {
    /// Short name used in logs and reports (e.g. `"nom-exif"`).
    fn name(&self) -> &str;
    /// Try to produce a normalized `YYYY-MM-DD` date for `path`.
    fn try_extract(&self, path: &Path) -> Result<Option<String>>;
}

// ── little_exif ─────────────────────────────────────────────────────

/// Structured EXIF load through `little_exif`.
///
/// Looks at `DateTimeOriginal`, then the IFD0 `DateTime` (which little_exif
/// calls `ModifyDate`).
#[cfg(feature = "little-exif")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LittleExifSource;

#[cfg(feature = "little-exif")]
impl DateSource for LittleExifSource {
    fn name(&self) -> &str {
        "little_exif"
    }

    fn try_extract(&self, path: &Path) -> Result<Option<String>> {
        use little_exif::exif_tag::ExifTag;

        let metadata = load_little_exif(path)?;

        let mut original = None;
        let mut modified = None;
        for tag in metadata.data().iter() {
            match tag {
                ExifTag::DateTimeOriginal(value) if original.is_none() => {
                    original = Some(RawDate::Text(value.clone()));
                }
                ExifTag::ModifyDate(value) if modified.is_none() => {
                    modified = Some(RawDate::Text(value.clone()));
                }
                _ => {}
            }
        }

        Ok(first_present(PRIMARY_ORDER, |tag| match tag {
            DateTag::DateTimeOriginal => original.clone(),
            DateTag::DateTime => modified.clone(),
            DateTag::DateTimeDigitized => None,
        }))
    }
}

/// Load EXIF with little_exif, turning its panics on odd files into errors.
#[cfg(feature = "little-exif")]
fn load_little_exif(path: &Path) -> Result<little_exif::metadata::Metadata> {
    use little_exif::metadata::Metadata;

    let path_owned = path.to_path_buf();
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let result = std::panic::catch_unwind(move || Metadata::new_from_path(&path_owned));
    std::panic::set_hook(prev_hook);

    match result {
        Ok(Ok(m)) => Ok(m),
        Ok(Err(e)) => anyhow::bail!("little_exif could not parse EXIF: {e}"),
        Err(_) => anyhow::bail!("little_exif panicked parsing EXIF"),
    }
}

// ── nom-exif ────────────────────────────────────────────────────────

/// Tag-dictionary read through `nom-exif`.
///
/// Every parsed entry is keyed by its numeric tag code, then the date tags are
/// probed in [`SECONDARY_ORDER`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NomExifSource;

impl DateSource for NomExifSource {
    fn name(&self) -> &str {
        "nom-exif"
    }

    fn try_extract(&self, path: &Path) -> Result<Option<String>> {
        let fields = read_date_fields(path)?;
        Ok(first_present(SECONDARY_ORDER, |tag| {
            fields.get(&tag.code()).cloned()
        }))
    }
}

/// Collect the raw values of the known date tags, keyed by tag code.
///
/// When a tag appears in several IFDs the first occurrence (the primary
/// image) wins. nom-exif only accepts `YYYY:MM:DD HH:MM:SS`; for a date tag it
/// could not parse, the untouched ASCII text is read with [`read_ascii_dates`]
/// instead, and a value neither reader can produce is kept as
/// [`RawDate::Unreadable`].
pub fn read_date_fields(path: &Path) -> Result<HashMap<u16, RawDate>> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).context("Failed to open image file")?;
    let iter: ExifIter = parser.parse(ms).context("No EXIF data found")?;

    let mut fields = HashMap::new();
    let mut unparsed = Vec::new();
    for mut entry in iter {
        let code = entry.tag_code();
        if DateTag::from_code(code).is_none() || fields.contains_key(&code) || unparsed.contains(&code) {
            continue;
        }
        match entry.take_result() {
            Ok(value) => {
                fields.insert(code, entry_to_raw(&value));
            }
            Err(e) => {
                log::debug!("  nom-exif could not parse tag {code:#06x}: {e:?}");
                unparsed.push(code);
            }
        }
    }

    if !unparsed.is_empty() {
        let ascii = read_ascii_dates(path).unwrap_or_else(|e| {
            log::debug!("  Raw EXIF read failed: {e:#}");
            HashMap::new()
        });
        for code in unparsed {
            let raw = ascii.get(&code).cloned().unwrap_or(RawDate::Unreadable);
            fields.insert(code, raw);
        }
    }
    Ok(fields)
}

/// ASCII values of the date tags in the primary image, as stored.
pub fn read_ascii_dates(path: &Path) -> Result<HashMap<u16, RawDate>> {
    let file = File::open(path).context("Failed to open image file")?;
    let mut reader = BufReader::new(file);
    let exif = ::exif::Reader::new()
        .read_from_container(&mut reader)
        .context("No EXIF data found")?;

    let mut dates = HashMap::new();
    for &tag in SECONDARY_ORDER {
        let kamadak_tag = match tag {
            DateTag::DateTimeOriginal => ::exif::Tag::DateTimeOriginal,
            DateTag::DateTime => ::exif::Tag::DateTime,
            DateTag::DateTimeDigitized => ::exif::Tag::DateTimeDigitized,
        };
        let Some(field) = exif.get_field(kamadak_tag, ::exif::In::PRIMARY) else {
            continue;
        };
        if let ::exif::Value::Ascii(parts) = &field.value {
            if let Some(first) = parts.first() {
                dates.insert(tag.code(), RawDate::Bytes(first.clone()));
            }
        }
    }
    Ok(dates)
}

/// Convert a nom-exif value into raw date text.
///
/// nom-exif parses date tags into timestamps and renders them as RFC 3339
/// (`2022-07-04T10:00:00+08:00`); only the part before the `T` is kept.
fn entry_to_raw(value: &EntryValue) -> RawDate {
    let rendered = value.to_string();
    let text = rendered.trim().trim_matches('"');
    let text = match text.find('T') {
        Some(i) if i >= 8 => &text[..i],
        _ => text,
    };
    RawDate::Text(text.to_string())
}

// ── filesystem ──────────────────────────────────────────────────────

/// Last-modified time of the file, in local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileModifiedSource;

impl DateSource for FileModifiedSource {
    fn name(&self) -> &str {
        "file mtime"
    }

    fn try_extract(&self, path: &Path) -> Result<Option<String>> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read modification time of {}", path.display()))?;
        let local: DateTime<Local> = modified.into();
        Ok(Some(local.format(DATE_FORMAT).to_string()))
    }
}
