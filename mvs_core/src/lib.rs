//! # mvs_core
//!
//! Pure mathematical building blocks for multi-view stereo depth supervision.
//!
//! This crate holds everything that is independent of files and of the compute
//! device: it never opens a file and never touches a tensor backend.
//!
//! ## Modules
//!
//! - [`camera`]: Per-view calibration (`CameraParams`) and the fused world→pixel
//!   projection operator consumed by the model's warping step
//! - [`hypotheses`]: Discretized depth-hypothesis sets in linear or inverse spacing
//! - [`band`]: The depth band that decides which ground-truth pixels are supervised
//! - [`raster`]: Row-major single-channel rasters (`DepthMap`, `ValidityMask`)
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```ignore
//! use mvs_core::prelude::*;
//!
//! let hypotheses = generate_hypotheses(425.0, 2.65, 192, DepthMode::Inverse)?;
//! let band = DepthBand::new(425.0, 2.65, 192);
//! let mask = band.mask(&depth_map);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod band;
pub mod camera;
pub mod error;
pub mod hypotheses;
pub mod raster;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::band::DepthBand;
    pub use crate::camera::{CameraParams, ProjectionOperator};
    pub use crate::error::{MvsCoreError, Result};
    pub use crate::hypotheses::{generate_hypotheses, DepthHypotheses, DepthMode};
    pub use crate::raster::{DepthMap, ValidityMask};
}

pub use band::DepthBand;
pub use camera::{CameraParams, ProjectionOperator};
pub use error::{MvsCoreError, Result};
pub use hypotheses::{generate_hypotheses, DepthHypotheses, DepthMode};
pub use raster::{DepthMap, ValidityMask};
