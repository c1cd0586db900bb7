//! PNG dumps of images, for debugging.

use std::path::Path;

use image::RgbaImage;
use log::debug;

use crate::error::{Error, Result};
use crate::graphics::Graphics;
use crate::types::ImageId;

/// Reads back `id` and encodes it as an RGBA8 PNG at `path`.
///
/// Pixels are written as stored: premultiplied, first row at the image
/// origin.
///
/// # Errors
///
/// [`Error::InvalidImage`] for unknown ids, [`Error::Dump`] when encoding or
/// writing fails.
pub fn save_png(graphics: &mut Graphics, id: ImageId, path: &Path) -> Result<()> {
    let image = to_rgba_image(graphics, id)?;
    image.save(path)?;
    debug!(
        "dumped image {id} ({}x{}) to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

/// Reads back `id` into an [`RgbaImage`].
///
/// # Errors
///
/// [`Error::InvalidImage`] for unknown ids.
pub fn to_rgba_image(graphics: &mut Graphics, id: ImageId) -> Result<RgbaImage> {
    let (width, height) = graphics.image_size(id)?;
    let pixels = graphics.pixels(id)?;
    RgbaImage::from_raw(width, height, pixels).ok_or(Error::PixelsLength {
        expected: 4 * width as usize * height as usize,
        got: 0,
    })
}
