//! Fixture builders shared by the unit tests.
//!
//! JPEG fixtures carry a hand-assembled EXIF APP1 segment so tests control
//! exactly which date tags are present, without depending on a metadata
//! writer.

use chrono::{Local, TimeZone};
use filetime::FileTime;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

use crate::exif::DateTag;

const TIFF_ASCII: u16 = 2;
const TIFF_LONG: u16 = 4;
const EXIF_IFD_POINTER: u16 = 0x8769;

struct IfdEntry {
    tag: u16,
    kind: u16,
    count: u32,
    value: [u8; 4],
}

fn ifd_len(entries: usize) -> usize {
    2 + 12 * entries + 4
}

/// Little-endian TIFF blob with the given ASCII tags in IFD0 and the Exif IFD.
pub fn exif_tiff(ifd0: &[(DateTag, &str)], exif: &[(DateTag, &str)]) -> Vec<u8> {
    let has_exif = !exif.is_empty();
    let exif_ifd_offset = 8 + ifd_len(ifd0.len() + usize::from(has_exif));
    let mut data_offset = exif_ifd_offset + if has_exif { ifd_len(exif.len()) } else { 0 };
    let mut data = Vec::new();

    let mut ascii = |tag: DateTag, text: &str| {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let mut value = [0u8; 4];
        if bytes.len() <= 4 {
            value[..bytes.len()].copy_from_slice(&bytes);
        } else {
            value = (data_offset as u32).to_le_bytes();
            data_offset += bytes.len();
            data.extend_from_slice(&bytes);
        }
        IfdEntry {
            tag: tag.code(),
            kind: TIFF_ASCII,
            count: bytes.len() as u32,
            value,
        }
    };

    let mut ifd0_entries: Vec<IfdEntry> = ifd0.iter().map(|(t, s)| ascii(*t, *s)).collect();
    let mut exif_entries: Vec<IfdEntry> = exif.iter().map(|(t, s)| ascii(*t, *s)).collect();
    if has_exif {
        ifd0_entries.push(IfdEntry {
            tag: EXIF_IFD_POINTER,
            kind: TIFF_LONG,
            count: 1,
            value: (exif_ifd_offset as u32).to_le_bytes(),
        });
    }
    ifd0_entries.sort_by_key(|e| e.tag);
    exif_entries.sort_by_key(|e| e.tag);

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());
    write_ifd(&mut out, &ifd0_entries);
    if has_exif {
        write_ifd(&mut out, &exif_entries);
    }
    out.extend_from_slice(&data);
    out
}

fn write_ifd(out: &mut Vec<u8>, entries: &[IfdEntry]) {
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for e in entries {
        out.extend_from_slice(&e.tag.to_le_bytes());
        out.extend_from_slice(&e.kind.to_le_bytes());
        out.extend_from_slice(&e.count.to_le_bytes());
        out.extend_from_slice(&e.value);
    }
    out.extend_from_slice(&0u32.to_le_bytes());
}

/// Encode a flat-colored JPEG in memory.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 120, 150]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

/// Write a JPEG whose APP1 segment holds the given date tags.
pub fn jpeg_with_exif_sized(
    path: &Path,
    width: u32,
    height: u32,
    ifd0: &[(DateTag, &str)],
    exif: &[(DateTag, &str)],
) {
    let jpeg = jpeg_bytes(width, height);
    let tiff = exif_tiff(ifd0, exif);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

pub fn jpeg_with_exif(path: &Path, ifd0: &[(DateTag, &str)], exif: &[(DateTag, &str)]) {
    jpeg_with_exif_sized(path, 64, 48, ifd0, exif);
}

/// Write a metadata-free PNG.
pub fn plain_png(path: &Path, width: u32, height: u32) {
    RgbImage::from_pixel(width, height, Rgb([200, 200, 200]))
        .save(path)
        .unwrap();
}

/// Pin the modification time to noon (local time) on the given day.
pub fn set_mtime(path: &Path, year: i32, month: u32, day: u32) {
    let ts = Local
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .unwrap()
        .timestamp();
    filetime::set_file_mtime(path, FileTime::from_unix_time(ts, 0)).unwrap();
}
