//! JPEG re-encoding with metadata removal.
//!
//! The source is decoded to plain 8-bit RGB, optionally shrunk, and encoded
//! again from pixels only, so EXIF, GPS, maker notes and copyright blocks
//! never reach the encoder. A second pass over the written file drops any
//! APPn (other than the JFIF header) or comment segment as a guarantee.

use std::path::Path;

use image::DynamicImage;

use crate::compressor::Compressor;
use crate::error::{Result, SqueezeError};
use crate::select::{FileKind, JPEG};

pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 95;

/// JPEG quality, always within `MIN_QUALITY..=MAX_QUALITY`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(MIN_QUALITY)..=i64::from(MAX_QUALITY)).contains(&value) {
            Ok(Quality(value as u8))
        } else {
            Err(SqueezeError::invalid(format!(
                "Invalid quality value: {value} (must be between {MIN_QUALITY} and {MAX_QUALITY})"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality(85)
    }
}

/// Upper bounds for the output dimensions. Unset bounds don't constrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeBounds {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl ResizeBounds {
    /// Largest size that fits the bounds with the same aspect ratio.
    /// Never larger than the input.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        let bound_w = self.max_width.unwrap_or(width).max(1);
        let bound_h = self.max_height.unwrap_or(height).max(1);

        if width <= bound_w && height <= bound_h {
            return (width, height);
        }

        let scale = (bound_w as f64 / width as f64).min(bound_h as f64 / height as f64);
        let new_w = ((width as f64 * scale).round() as u32).clamp(1, bound_w);
        let new_h = ((height as f64 * scale).round() as u32).clamp(1, bound_h);
        (new_w, new_h)
    }
}

/// Options for image compression
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageOptions {
    pub quality: Quality,
    pub bounds: ResizeBounds,
}

pub struct JpegCompressor {
    options: ImageOptions,
}

impl JpegCompressor {
    pub fn new(options: ImageOptions) -> Self {
        Self { options }
    }
}

impl Compressor for JpegCompressor {
    fn kind(&self) -> &FileKind {
        &JPEG
    }

    fn compress(&self, source: &Path, destination: &Path) -> Result<()> {
        let img = image::open(source).map_err(|e| {
            SqueezeError::ConversionFailure(format!("cannot decode {}: {e}", source.display()))
        })?;

        let (width, height) = (img.width(), img.height());
        let (target_w, target_h) = self.options.bounds.fit(width, height);
        let img = if (target_w, target_h) != (width, height) {
            tracing::debug!("Resizing from {}x{} to {}x{}", width, height, target_w, target_h);
            resample_image(&img, target_w, target_h)
        } else {
            img
        };

        let jpeg_bytes = encode_jpeg(&img, self.options.quality)?;
        std::fs::write(destination, &jpeg_bytes).map_err(|e| SqueezeError::path(destination, e))?;

        strip_jpeg_file(destination)
    }
}

/// Resample an image to target dimensions
fn resample_image(img: &DynamicImage, target_width: u32, target_height: u32) -> DynamicImage {
    img.resize_exact(
        target_width,
        target_height,
        image::imageops::FilterType::Lanczos3,
    )
}

/// Encode as a progressive RGB JPEG with optimized Huffman tables
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let too_large = || {
        SqueezeError::ConversionFailure(format!(
            "{width}x{height} exceeds the JPEG size limit of 65535 pixels per side"
        ))
    };
    let width16 = u16::try_from(width).map_err(|_| too_large())?;
    let height16 = u16::try_from(height).map_err(|_| too_large())?;

    let mut jpeg_bytes = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut jpeg_bytes, quality.get());
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder.set_sampling_factor(jpeg_encoder::SamplingFactor::R_4_2_0);
    encoder
        .encode(rgb.as_raw(), width16, height16, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| SqueezeError::ConversionFailure(format!("Failed to encode JPEG: {}", e)))?;

    Ok(jpeg_bytes)
}

/// Rewrite the JPEG at `path` without metadata segments.
pub fn strip_jpeg_file(path: &Path) -> Result<()> {
    let strip_err = |msg: String| {
        SqueezeError::MetadataStripFailure(format!("{}: {msg}", path.display()))
    };

    let data = std::fs::read(path).map_err(|e| strip_err(e.to_string()))?;
    let stripped = strip_jpeg_metadata(&data).map_err(strip_err)?;
    if stripped.len() != data.len() {
        std::fs::write(path, &stripped).map_err(|e| strip_err(e.to_string()))?;
    }
    Ok(())
}

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const COM: u8 = 0xFE;

fn is_metadata_marker(marker: u8) -> bool {
    // APP0 carries the JFIF header and stays
    matches!(marker, 0xE1..=0xEF | COM)
}

fn is_standalone_marker(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD7)
}

/// Drop APP1..APP15 and COM segments from the header of a JPEG stream.
///
/// Everything from the first start-of-scan onward is copied untouched.
pub fn strip_jpeg_metadata(data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err("not a JPEG stream (missing start-of-image marker)".to_string());
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&data[..2]);
    let mut pos = 2;

    loop {
        if pos >= data.len() {
            return Err("truncated JPEG stream before image data".to_string());
        }
        if data[pos] != 0xFF {
            return Err(format!("expected a marker at offset {pos}"));
        }

        // 0xFF fill bytes may precede a marker
        let mut marker_pos = pos;
        while marker_pos + 1 < data.len() && data[marker_pos + 1] == 0xFF {
            marker_pos += 1;
        }
        let marker = *data
            .get(marker_pos + 1)
            .ok_or_else(|| "truncated JPEG marker".to_string())?;

        if marker == EOI {
            out.extend_from_slice(&[0xFF, EOI]);
            return Ok(out);
        }
        if is_standalone_marker(marker) {
            out.extend_from_slice(&[0xFF, marker]);
            pos = marker_pos + 2;
            continue;
        }

        let len_pos = marker_pos + 2;
        if len_pos + 2 > data.len() {
            return Err(format!("truncated segment 0xFF{marker:02X}"));
        }
        let len = u16::from_be_bytes([data[len_pos], data[len_pos + 1]]) as usize;
        if len < 2 || len_pos + len > data.len() {
            return Err(format!("invalid length {len} for segment 0xFF{marker:02X}"));
        }
        let end = len_pos + len;

        if marker == SOS {
            out.extend_from_slice(&[0xFF, SOS]);
            out.extend_from_slice(&data[len_pos..]);
            return Ok(out);
        }

        if !is_metadata_marker(marker) {
            out.extend_from_slice(&[0xFF, marker]);
            out.extend_from_slice(&data[len_pos..end]);
        }
        pos = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut seg = vec![0xFF, marker];
        seg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        seg.extend_from_slice(payload);
        seg
    }

    #[test]
    fn quality_bounds_are_inclusive() {
        assert_eq!(Quality::new(1).unwrap().get(), 1);
        assert_eq!(Quality::new(95).unwrap().get(), 95);
        assert_eq!(Quality::default().get(), 85);
        for bad in [0, 96, 100, -5] {
            assert!(matches!(
                Quality::new(bad),
                Err(SqueezeError::InvalidArguments(_))
            ));
        }
    }

    #[test]
    fn fit_never_upscales() {
        let bounds = ResizeBounds {
            max_width: Some(5000),
            max_height: Some(5000),
        };
        assert_eq!(bounds.fit(800, 600), (800, 600));
        assert_eq!(ResizeBounds::default().fit(800, 600), (800, 600));
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        let width_only = ResizeBounds {
            max_width: Some(1000),
            max_height: None,
        };
        assert_eq!(width_only.fit(4000, 3000), (1000, 750));

        let height_only = ResizeBounds {
            max_width: None,
            max_height: Some(500),
        };
        assert_eq!(height_only.fit(4000, 3000), (667, 500));

        let both = ResizeBounds {
            max_width: Some(1000),
            max_height: Some(1000),
        };
        assert_eq!(both.fit(3000, 4000), (750, 1000));
        assert_eq!(both.fit(1200, 900), (1000, 750));
    }

    #[test]
    fn strips_exif_and_comments_but_keeps_jfif() {
        let mut jpeg = vec![0xFF, SOI];
        jpeg.extend(segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
        jpeg.extend(segment(0xE1, b"Exif\0\0GPS and camera"));
        jpeg.extend(segment(COM, b"(c) somebody"));
        jpeg.extend(segment(0xDB, &[0u8; 65]));
        jpeg.extend(segment(SOS, &[1, 1, 0, 0, 63, 0]));
        jpeg.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00, 0x56]);
        jpeg.extend_from_slice(&[0xFF, EOI]);

        let stripped = strip_jpeg_metadata(&jpeg).unwrap();

        let mut expected = vec![0xFF, SOI];
        expected.extend(segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
        expected.extend(segment(0xDB, &[0u8; 65]));
        expected.extend(segment(SOS, &[1, 1, 0, 0, 63, 0]));
        expected.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00, 0x56]);
        expected.extend_from_slice(&[0xFF, EOI]);
        assert_eq!(stripped, expected);
    }

    #[test]
    fn rejects_non_jpeg_and_truncated_streams() {
        assert!(strip_jpeg_metadata(b"%PDF-1.6").is_err());

        let mut truncated = vec![0xFF, SOI];
        truncated.extend_from_slice(&[0xFF, 0xE1, 0x40, 0x00, b'E']);
        assert!(strip_jpeg_metadata(&truncated).is_err());
    }

    #[test]
    fn encoded_output_has_no_metadata_segments() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(40, 30, |x, y| {
            image::Rgb([(x * 6) as u8, (y * 8) as u8, 128])
        }));
        let encoded = encode_jpeg(&img, Quality::default()).unwrap();
        let stripped = strip_jpeg_metadata(&encoded).unwrap();

        assert!(!stripped.windows(4).any(|w| w == b"Exif"));
        let decoded = image::load_from_memory(&stripped).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }
}
