//! RGB image decoding into channel-first floats.

use std::path::Path;

use crate::error::{MvsIoError, Result};

/// A decoded view image, CHW layout with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageChw {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// `3 * height * width` values, red plane first.
    pub data: Vec<f32>,
}

impl ImageChw {
    /// Shape as `[channels, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        [3, self.height, self.width]
    }
}

/// Decode an 8-bit image as RGB and scale it to `[0, 1]`.
pub fn load_image(path: &Path) -> Result<ImageChw> {
    let rgb = image::open(path)
        .map_err(|source| MvsIoError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();

    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let plane = width * height;
    let mut data = vec![0.0f32; 3 * plane];
    for (i, pixel) in rgb.pixels().enumerate() {
        for c in 0..3 {
            data[c * plane + i] = pixel[c] as f32 / 255.0;
        }
    }

    Ok(ImageChw {
        width,
        height,
        data,
    })
}
