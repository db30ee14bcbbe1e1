use crate::core::color::unpack_rgb;
use image::{ImageBuffer, Rgb, RgbImage};
use log::info;
use std::path::Path;

/// Converts a row-major 0x00RRGGBB buffer into an RGB image.
///
/// Returns `None` if `pixels` is shorter than `width * height`.
pub fn to_rgb_image(pixels: &[u32], width: usize, height: usize) -> Option<RgbImage> {
    if pixels.len() < width * height {
        return None;
    }
    Some(ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let c = unpack_rgb(pixels[y as usize * width + x as usize]);
        Rgb([c.x as u8, c.y as u8, c.z as u8])
    }))
}

/// Saves a 0x00RRGGBB buffer as an image; the format follows the file extension.
pub fn save_buffer_to_image<P: AsRef<Path>>(
    pixels: &[u32],
    width: usize,
    height: usize,
    path: P,
) -> Result<(), String> {
    let path = path.as_ref();
    let image = to_rgb_image(pixels, width, height).ok_or_else(|| {
        format!(
            "Pixel buffer holds {} pixels, {}x{} required",
            pixels.len(),
            width,
            height
        )
    })?;
    image
        .save(path)
        .map_err(|e| format!("Failed to save image to '{}': {}", path.display(), e))?;
    info!("Saved {}x{} frame to '{}'", width, height, path.display());
    Ok(())
}
