//! Error types for mvs_io operations.

use std::path::{Path, PathBuf};

use mvs_core::MvsCoreError;
use thiserror::Error;

/// Errors that can occur while reading datasets and assembling samples.
#[derive(Error, Debug)]
pub enum MvsIoError {
    /// Invalid configuration or malformed index input (pair table, scan list).
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Calibration file is malformed or describes an invalid camera.
    #[error("calibration error in {path:?}: {message}")]
    Calibration {
        /// The calibration file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// A reference view lists fewer neighbors than the sample needs.
    #[error("scan {scan} view {ref_view}: {available} neighbors available, {required} required")]
    InsufficientViews {
        /// Scan of the reference view.
        scan: String,
        /// Reference view id.
        ref_view: u32,
        /// Neighbors listed in the pair table.
        available: usize,
        /// Neighbors required by `view_count - 1`.
        required: usize,
    },

    /// Binary or text file does not follow its format.
    #[error("invalid format in {path:?}: {message}")]
    InvalidFormat {
        /// The offending file.
        path: PathBuf,
        /// Description of the format error.
        message: String,
    },

    /// Underlying file system error.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Image could not be decoded.
    #[error("image error in {path:?}: {source}")]
    Image {
        /// The image file.
        path: PathBuf,
        /// The decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Views of one sample disagree in resolution.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Sample index past the end of the dataset.
    #[error("sample index {index} out of range for dataset of {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Dataset length.
        len: usize,
    },

    /// Error from the math layer.
    #[error(transparent)]
    Core(#[from] MvsCoreError),
}

impl MvsIoError {
    /// Shorthand for [`MvsIoError::InvalidConfig`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error is a [`MvsIoError::InsufficientViews`].
    pub fn is_insufficient_views(&self) -> bool {
        matches!(self, Self::InsufficientViews { .. })
    }
}

/// Map an `std::io::Error` to [`MvsIoError::Io`] for `path`.
pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MvsIoError + '_ {
    move |source| MvsIoError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Result type alias for mvs_io operations.
pub type Result<T> = std::result::Result<T, MvsIoError>;
