//! Transformation actions.
//!
//! An action turns encoded source bytes into encoded output bytes for a
//! target geometry. Output keeps the source format when it can be encoded,
//! JPEG otherwise.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use thumbs_core::{Error, Geometry, Result};

pub const THUMBNAIL: &str = thumbs_core::geometry::THUMBNAIL;
pub const RESIZE: &str = "resize";

/// A named image transformation.
pub trait Action: Send + Sync {
    /// Transform encoded `source` bytes to fit `geometry`.
    fn apply(&self, source: &[u8], geometry: Geometry) -> Result<Vec<u8>>;
}

impl<F> Action for F
where
    F: Fn(&[u8], Geometry) -> Result<Vec<u8>> + Send + Sync,
{
    fn apply(&self, source: &[u8], geometry: Geometry) -> Result<Vec<u8>> {
        self(source, geometry)
    }
}

/// Resize to the clamped target box, then crop it from the top-left corner.
///
/// With one dimension given the other follows the source aspect ratio.
/// With both given the source is squeezed into the box as is. The crop is
/// anchored at the origin, never centered.
pub struct Thumbnail;

impl Action for Thumbnail {
    fn apply(&self, source: &[u8], geometry: Geometry) -> Result<Vec<u8>> {
        let (img, format) = decode(source)?;
        let (width, height) = thumbnail_box(img.width(), img.height(), geometry);
        check_output_size(width, height)?;

        let resized = img.resize_exact(width, height, FilterType::Lanczos3);
        encode(&resized.crop_imm(0, 0, width, height), format)
    }
}

/// Resize to exactly the target box, distorting if needed.
pub struct Resize;

impl Action for Resize {
    fn apply(&self, source: &[u8], geometry: Geometry) -> Result<Vec<u8>> {
        let (img, format) = decode(source)?;
        let (width, height) = match (geometry.width, geometry.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(side), None) | (None, Some(side)) => (side, side),
            (None, None) => (img.width(), img.height()),
        };
        check_output_size(width, height)?;

        encode(&img.resize_exact(width, height, FilterType::Lanczos3), format)
    }
}

/// Final thumbnail size, clamped to the source and filling a missing
/// dimension from the source aspect ratio.
pub fn thumbnail_box(source_w: u32, source_h: u32, geometry: Geometry) -> (u32, u32) {
    match (geometry.width, geometry.height) {
        (Some(w), Some(h)) => (w.min(source_w), h.min(source_h)),
        (Some(w), None) => {
            let w = w.min(source_w);
            (w, ratio(source_h, w, source_w))
        }
        (None, Some(h)) => {
            let h = h.min(source_h);
            (ratio(source_w, h, source_h), h)
        }
        (None, None) => (source_w, source_h),
    }
}

/// Largest output, in pixels, an action will allocate.
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

fn check_output_size(width: u32, height: u32) -> Result<()> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_OUTPUT_PIXELS {
        return Err(Error::TransformationFailure(format!(
            "Output {}x{} exceeds {} pixels",
            width, height, MAX_OUTPUT_PIXELS
        )));
    }
    Ok(())
}

fn ratio(other: u32, requested: u32, known: u32) -> u32 {
    ((u64::from(other) * u64::from(requested) / u64::from(known)) as u32).max(1)
}

fn decode(source: &[u8]) -> Result<(DynamicImage, ImageFormat)> {
    let format = image::guess_format(source)
        .map_err(|e| Error::TransformationFailure(format!("Unknown image format: {}", e)))?;
    let img = image::load_from_memory_with_format(source, format)
        .map_err(|e| Error::TransformationFailure(format!("Decode failed: {}", e)))?;
    Ok((img, format))
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    let result = match format {
        ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut out, format)
        }
        _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut out, ImageFormat::Jpeg),
    };

    result.map_err(|e| Error::TransformationFailure(format!("Encode failed: {}", e)))?;
    Ok(out.into_inner())
}

/// Content type of encoded image bytes, defaulting to JPEG.
pub fn content_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("image/jpeg")
}
