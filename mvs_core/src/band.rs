//! Supervised depth band.
//!
//! A ground-truth pixel is supervised only when its depth lies strictly inside
//! `(depth_min + interval, depth_min + (ndepths - 2) · interval)`. Pixels
//! outside carry no usable ground truth (zero means "no measurement") or are
//! too far for any hypothesis to represent. Both bounds are excluded.

use crate::raster::{DepthMap, ValidityMask};

/// Open interval of depths that receive supervision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBand {
    lower: f32,
    upper: f32,
}

impl DepthBand {
    /// Band for a hypothesis set of `ndepths` planes starting at `depth_min`.
    ///
    /// `depth_interval` is the raw world-unit interval; it is not rescaled with
    /// image resolution.
    pub fn new(depth_min: f32, depth_interval: f32, ndepths: usize) -> Self {
        Self {
            lower: depth_min + depth_interval,
            upper: depth_min + (ndepths as f32 - 2.0) * depth_interval,
        }
    }

    /// Exclusive lower bound.
    #[inline]
    pub fn lower(&self) -> f32 {
        self.lower
    }

    /// Exclusive upper bound.
    #[inline]
    pub fn upper(&self) -> f32 {
        self.upper
    }

    /// Whether `depth` is supervised.
    #[inline]
    pub fn contains(&self, depth: f32) -> bool {
        depth > self.lower && depth < self.upper
    }

    /// Per-pixel 0/1 mask over a depth map.
    pub fn mask(&self, depth: &DepthMap) -> ValidityMask {
        let values = depth
            .as_slice()
            .iter()
            .map(|&d| if self.contains(d) { 1.0 } else { 0.0 })
            .collect();
        ValidityMask::from_values(depth.width(), depth.height(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let band = DepthBand::new(425.0, 2.5, 192);
        assert_eq!(band.lower(), 427.5);
        assert_eq!(band.upper(), 425.0 + 190.0 * 2.5);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let band = DepthBand::new(10.0, 1.0, 8);
        assert!(!band.contains(11.0));
        assert!(!band.contains(16.0));
        assert!(band.contains(11.001));
        assert!(band.contains(15.999));
        assert!(!band.contains(0.0));
        assert!(!band.contains(f32::NAN));
    }

    #[test]
    fn test_mask_counts() {
        let depth = DepthMap::from_vec(3, 2, vec![0.0, 12.0, 13.0, 20.0, 14.0, 11.0]).unwrap();
        let mask = DepthBand::new(10.0, 1.0, 8).mask(&depth);
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.height(), 2);
        assert_eq!(mask.valid_count(), 3);
        assert!(mask.is_valid(1, 0));
        assert!(!mask.is_valid(0, 1));
    }
}
