//! Capture-date resolution from embedded metadata.
//!
//! [`DateResolver`] walks a chain of [`DateSource`] tiers and returns the
//! first date one of them produces:
//!
//! | Tier | Source | Tags |
//! |------|--------|------|
//! | 1 | [`LittleExifSource`] (feature `little-exif`) | DateTimeOriginal, DateTime |
//! | 2 | [`NomExifSource`] | DateTimeOriginal, DateTime, DateTimeDigitized |
//! | 3 | [`FileModifiedSource`] | file modification time |
//!
//! Every value goes through [`normalize_exif_date`], which keeps only real
//! calendar dates and renders them as `YYYY-MM-DD`.

mod chain;
mod date;
mod reader;

pub use chain::{DateResolver, ResolvedDate, build_source_chain};
pub use date::{DATE_FORMAT, DateTag, RawDate, first_present, normalize_exif_date, parse_exif_date};
#[cfg(feature = "little-exif")]
pub use reader::LittleExifSource;
pub use reader::{
    DateSource, FileModifiedSource, NomExifSource, PRIMARY_ORDER, SECONDARY_ORDER, read_ascii_dates,
    read_date_fields,
};
