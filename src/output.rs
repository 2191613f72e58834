//! Image output
//!
//! Maps a finished pixel buffer to RGBA and writes it as PNG. Empty pixels
//! take the background color; everything is written fully opaque.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::rasterizer::{Color, PixelBuffer, PixelRecord};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("buffer of {width}x{height} cannot be encoded as an image")]
    Dimensions { width: usize, height: usize },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convert the buffer to an RGBA image
pub fn to_image(buffer: &PixelBuffer, background: Color) -> Result<RgbaImage, OutputError> {
    let dims = || OutputError::Dimensions {
        width: buffer.width(),
        height: buffer.height(),
    };
    let width = u32::try_from(buffer.width()).map_err(|_| dims())?;
    let height = u32::try_from(buffer.height()).map_err(|_| dims())?;
    if width == 0 || height == 0 {
        return Err(dims());
    }

    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let color = match buffer.get(x as usize, y as usize) {
            Some(PixelRecord::Occupied { color, .. }) => color,
            _ => background,
        };
        Rgba(color.to_rgba())
    }))
}

/// Write the buffer to a PNG file
pub fn save_png<P: AsRef<Path>>(
    buffer: &PixelBuffer,
    background: Color,
    path: P,
) -> Result<(), OutputError> {
    let path = path.as_ref();
    to_image(buffer, background)?.save_with_format(path, ImageFormat::Png)?;
    log::info!(
        "wrote {}x{} image to {}",
        buffer.width(),
        buffer.height(),
        path.display()
    );
    Ok(())
}
