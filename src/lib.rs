//! # exif-datemark
//!
//! Stamp the capture date of a photo onto the photo itself.
//!
//! The date comes from embedded EXIF metadata when there is any, and from the
//! file modification time otherwise. It is drawn with a thin black outline at
//! one of five anchor positions, and the result is written to a separate
//! output directory so the originals are never touched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_datemark::config::Config;
//! use exif_datemark::exif::DateResolver;
//! use exif_datemark::pipeline::{collect_images, output_dir_for, process_image};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let style = config.style();
//!     let resolver = DateResolver::default();
//!
//!     let input = Path::new("./photos");
//!     let out_dir = output_dir_for(input, &config.output.dir_suffix);
//!
//!     for path in collect_images(input) {
//!         let result = process_image(&path, &out_dir, &resolver, &style, &config.output);
//!         match result.error {
//!             None => println!("{} -> {:?}", path.display(), result.output_path),
//!             Some(err) => eprintln!("{err}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use exif_datemark::exif::DateResolver;
//! use exif_datemark::render::{WatermarkStyle, render_file};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let path = Path::new("photo.jpg");
//!     let date = DateResolver::default()
//!         .resolve(path)
//!         .map(|found| found.date)
//!         .unwrap_or_default();
//!
//!     let stamped = render_file(path, &date, &WatermarkStyle::default())?;
//!     stamped.save("photo_stamped.png")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`exif`]: capture-date resolution chain
//! - [`text`]: font sizing, font loading and text measurement
//! - [`layout`]: anchor placement
//! - [`render`]: outlined text drawing
//! - [`color`]: color parsing
//! - [`pipeline`]: image collection, output naming, per-image processing
//! - [`config`]: configuration types and loading/saving

pub mod color;
pub mod config;
pub mod exif;
pub mod layout;
pub mod pipeline;
pub mod render;
pub mod text;

#[cfg(test)]
pub(crate) mod test_helpers;
