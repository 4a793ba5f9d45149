use std::path::Path;

use super::reader::{DateSource, FileModifiedSource, NomExifSource};

/// A date picked by the resolver, with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    /// Normalized `YYYY-MM-DD` text.
    pub date: String,
    /// [`DateSource::name`] of the tier that answered.
    pub source: String,
}

/// Build the default date source chain.
///
/// Order: little_exif (when the `little-exif` feature is enabled), nom-exif,
/// then the file modification time.
pub fn build_source_chain() -> Vec<Box<dyn DateSource>> {
    let mut sources: Vec<Box<dyn DateSource>> = Vec::new();

    #[cfg(feature = "little-exif")]
    sources.push(Box::new(super::reader::LittleExifSource));

    sources.push(Box::new(NomExifSource));
    sources.push(Box::new(FileModifiedSource));
    sources
}

/// Resolves the capture date of an image by walking a chain of
/// [`DateSource`]s in priority order.
///
/// Every tier is tried only if the ones before it produced nothing; errors
/// inside a tier are logged and treated as "no date from this tier".
///
/// # Example
///
/// ```rust,no_run
/// use exif_datemark::exif::DateResolver;
/// use std::path::Path;
///
/// let resolver = DateResolver::default();
/// match resolver.resolve(Path::new("photo.jpg")) {
///     Some(found) => println!("{} (from {})", found.date, found.source),
///     None => println!("no usable date"),
/// }
/// ```
pub struct DateResolver {
    sources: Vec<Box<dyn DateSource>>,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(build_source_chain())
    }
}

impl DateResolver {
    pub fn new(sources: Vec<Box<dyn DateSource>>) -> Self {
        Self { sources }
    }

    /// Names of the configured tiers, in the order they are tried.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Resolve the date for `path`, or `None` once every tier came up empty.
    pub fn resolve(&self, path: &Path) -> Option<ResolvedDate> {
        for source in &self.sources {
            match source.try_extract(path) {
                Ok(Some(date)) => {
                    log::debug!("  Date {date} from {}", source.name());
                    return Some(ResolvedDate {
                        date,
                        source: source.name().to_string(),
                    });
                }
                Ok(None) => {
                    log::debug!("  {}: no date", source.name());
                }
                Err(e) => {
                    log::debug!("  {} failed: {e:#}", source.name());
                }
            }
        }
        None
    }
}
