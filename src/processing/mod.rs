//! The resampling composite behind the `resize-image` operation:
//! decode, scale, flatten onto white, re-encode as JPEG.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::common::THUMBNAIL_MAX_DIMENSION;

pub struct RenderedThumbnail {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Uniform scale factor mapping the larger dimension onto
/// `max_dimension`. Both dimensions are floor-rounded, preserving the
/// aspect ratio within one pixel.
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scale = (max_dimension as f32 / width as f32).min(max_dimension as f32 / height as f32);
    let scaled_width = ((width as f32 * scale) as u32).max(1);
    let scaled_height = ((height as f32 * scale) as u32).max(1);
    (scaled_width, scaled_height)
}

/// Decode the source bytes, resample with bilinear filtering onto an
/// opaque white background, and encode as JPEG regardless of the input
/// format.
pub fn render_thumbnail(source: &[u8]) -> Result<RenderedThumbnail> {
    let source_image = image::load_from_memory(source).context("failed to decode source image")?;
    let (width, height) = scaled_dimensions(
        source_image.width(),
        source_image.height(),
        THUMBNAIL_MAX_DIMENSION,
    );

    let resized = source_image
        .resize_exact(width, height, FilterType::Triangle)
        .into_rgba8();

    // Transparent source pixels land on white in the JPEG output.
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut canvas, &resized, 0, 0);

    let flattened = DynamicImage::ImageRgba8(canvas).into_rgb8();
    let mut bytes = Vec::new();
    flattened
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .context("failed to encode JPEG thumbnail")?;

    Ok(RenderedThumbnail {
        bytes,
        width,
        height,
    })
}
