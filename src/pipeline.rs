use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::OutputConfig;
use crate::exif::DateResolver;
use crate::render::{self, WatermarkStyle};

/// Extensions (lowercase) of the images the tool picks up.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tiff"];

/// Outcome of watermarking one image.
///
/// `error` is set both for images that were skipped (no usable date) and for
/// images that failed to decode, render or save.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// Normalized `YYYY-MM-DD` date that was drawn.
    pub date: Option<String>,
    /// Date source tier that produced `date`.
    pub date_source: Option<String>,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.output_path.is_some()
    }
}

/// Check if a file has a supported image extension (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collect the images to process from a file or directory path.
///
/// An existing file is returned as given, whatever its extension. A directory
/// is listed one level deep, so an output directory created inside it is
/// never picked up again. Directory results are sorted by path.
///
/// ```rust,no_run
/// use exif_datemark::pipeline::collect_images;
/// use std::path::Path;
///
/// let images = collect_images(Path::new("./holiday"));
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if !is_supported_image(path) {
            log::debug!("Unlisted extension, trying to decode anyway: {}", path.display());
        }
        return vec![path.to_path_buf()];
    }

    if !path.is_dir() {
        log::warn!("Path does not exist: {}", path.display());
        return Vec::new();
    }

    let mut images: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_supported_image(p))
        .collect();
    images.sort();
    images
}

/// Output directory for an input path.
///
/// - file `a/b/photo.jpg` → `a/b/b<suffix>`
/// - directory `a/b` → `a/b/b<suffix>`
pub fn output_dir_for(input: &Path, suffix: &str) -> PathBuf {
    let base = if input.is_dir() {
        input
    } else {
        input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    };
    base.join(format!("{}{suffix}", dir_name(base)))
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "images".to_string())
}

/// `<out_dir>/<stem><suffix>.<ext>`, keeping the original extension.
pub fn output_path_for(image: &Path, out_dir: &Path, suffix: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match image.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    out_dir.join(name)
}

/// Encode `image` in the format implied by `path` and write it in one go.
///
/// JPEG output is flattened to RGB and encoded at `jpeg_quality`; other
/// formats use the encoder defaults.
pub fn save_image(image: &RgbaImage, path: &Path, jpeg_quality: u8) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("Unknown output format for {}", path.display()))?;

    let mut buf = Vec::new();
    if format == ImageFormat::Jpeg {
        let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
        JpegEncoder::new_with_quality(&mut buf, jpeg_quality)
            .encode_image(&rgb)
            .context("Failed to encode JPEG")?;
    } else {
        image
            .write_to(&mut Cursor::new(&mut buf), format)
            .with_context(|| format!("Failed to encode {format:?}"))?;
    }

    std::fs::write(path, &buf).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Resolve the date of one image, draw it and save the result in `out_dir`.
///
/// Never fails: problems end up in [`ProcessResult::error`] so a batch can
/// carry on with the next image.
///
/// ```rust,no_run
/// use exif_datemark::config::Config;
/// use exif_datemark::exif::DateResolver;
/// use exif_datemark::pipeline::{output_dir_for, process_image};
/// use std::path::Path;
///
/// let config = Config::default();
/// let photo = Path::new("photo.jpg");
/// let out_dir = output_dir_for(photo, &config.output.dir_suffix);
///
/// let result = process_image(photo, &out_dir, &DateResolver::default(), &config.style(), &config.output);
/// match result.error {
///     None => println!("Wrote {:?}", result.output_path),
///     Some(err) => eprintln!("{err}"),
/// }
/// ```
pub fn process_image(
    path: &Path,
    out_dir: &Path,
    resolver: &DateResolver,
    style: &WatermarkStyle,
    output: &OutputConfig,
) -> ProcessResult {
    let mut result = ProcessResult::new(path);

    let Some(found) = resolver.resolve(path) else {
        result.error = Some(format!("No usable date for {}, skipped", path.display()));
        return result;
    };
    log::info!("  Date: {} ({})", found.date, found.source);

    match render_and_save(path, &found.date, out_dir, style, output) {
        Ok(out) => result.output_path = Some(out),
        Err(e) => result.error = Some(format!("{e:#}")),
    }
    result.date = Some(found.date);
    result.date_source = Some(found.source);
    result
}

fn render_and_save(
    path: &Path,
    date: &str,
    out_dir: &Path,
    style: &WatermarkStyle,
    output: &OutputConfig,
) -> Result<PathBuf> {
    let rendered = render::render_file(path, date, style)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let out = output_path_for(path, out_dir, &output.file_suffix);
    save_image(&rendered, &out, output.jpeg_quality)?;
    Ok(out)
}
