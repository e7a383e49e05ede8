//! Row-major single-channel rasters.

use crate::error::{MvsCoreError, Result};

/// A depth map with per-pixel depth values.
///
/// Zero marks pixels without a measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: usize,
    height: usize,
    /// Depth values (row-major, `[y * width + x]`).
    data: Vec<f32>,
}

impl DepthMap {
    /// Create a zero-filled depth map.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap a row-major buffer, checking its length.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(MvsCoreError::RasterSize {
                width,
                height,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get depth at pixel (x, y), or 0 outside the raster.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            0.0
        }
    }

    /// Set depth at pixel (x, y); writes outside the raster are ignored.
    pub fn set(&mut self, x: usize, y: usize, depth: f32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = depth;
        }
    }

    /// Raw row-major values.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume into the raw values.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// 0/1 supervision mask, same resolution as the depth it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityMask {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ValidityMask {
    pub(crate) fn from_values(width: usize, height: usize, data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether pixel (x, y) is supervised.
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x] > 0.5
    }

    /// Number of supervised pixels.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&m| m > 0.5).count()
    }

    /// Raw row-major 0/1 values.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
