//! mvs_io - file formats and sample assembly for multi-view stereo datasets.
//!
//! This crate turns a dataset directory into training samples. It reads the
//! view-pair table, per-view calibration text, PFM depth maps and RGB images,
//! and combines them with the math in `mvs_core`.
//!
//! # Core Types
//!
//! - [`ScanIndex`]: Every (scan, lighting, reference view) training unit
//! - [`MvsDataset`]: Sample assembler over a [`DatasetLayout`]
//! - [`Sample`]: Images, projections, hypotheses, depth and mask for one unit
//! - [`SampleSource`]: Anything that yields samples by index, with parallel
//!   batch assembly
//!
//! # Example
//!
//! ```ignore
//! use mvs_io::{DatasetConfig, InsufficientViewsPolicy, MvsDataset, SampleSource};
//!
//! let dataset = MvsDataset::open_dtu(
//!     Path::new("/data/dtu"),
//!     Path::new("lists/train.txt"),
//!     DatasetConfig::default().with_view_count(3),
//! )?;
//!
//! let batch = dataset.assemble_batch(&[0, 1, 2, 3], InsufficientViewsPolicy::Fail)?;
//! assert_eq!(batch[0].view_count(), 3);
//! ```
//!
//! # Crate Features
//!
//! - `rayon` (default): Assemble batch samples on the rayon thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod camera;
pub mod config;
pub mod dataset;
pub mod error;
pub mod image;
pub mod index;
pub mod layout;
pub mod pair;
pub mod pfm;

pub use camera::{load_camera, parse_camera};
pub use config::DatasetConfig;
pub use dataset::{InsufficientViewsPolicy, MvsDataset, Sample, SampleSource};
pub use error::{MvsIoError, Result};
pub use crate::image::{load_image, ImageChw};
pub use index::{read_scan_list, LightingSelector, ScanIndex, ViewMeta};
pub use layout::{DatasetLayout, DtuLayout};
pub use pair::{parse_view_pairs, read_view_pairs, ViewPair};
pub use pfm::{decode_pfm, encode_pfm, read_pfm, write_pfm, PfmEndian};

pub use mvs_core;
