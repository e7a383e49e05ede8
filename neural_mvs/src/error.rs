//! Error types for neural_mvs.

use std::path::PathBuf;

use burn::record::RecorderError;
use thiserror::Error;

/// Errors that can occur during supervision, training and export.
#[derive(Error, Debug)]
pub enum NeuralMvsError {
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Metric keys differ from the ones the aggregator was started with.
    #[error("metric keys changed: expected {expected:?}, got {got:?}")]
    MetricKeyMismatch {
        /// Keys of the first update.
        expected: Vec<String>,
        /// Keys of the offending update.
        got: Vec<String>,
    },

    /// Resume requested but no complete checkpoint exists.
    #[error("no checkpoint found in {dir:?}")]
    NoCheckpoint {
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// Checkpoint exists but cannot be used.
    #[error("checkpoint error in {path:?}: {message}")]
    Checkpoint {
        /// The checkpoint directory or file.
        path: PathBuf,
        /// Description of the error.
        message: String,
    },

    /// File system error outside the dataset.
    #[error("file system error on {path:?}: {source}")]
    Filesystem {
        /// File or directory being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error from mvs_io.
    #[error("I/O error: {0}")]
    IoError(#[from] mvs_io::MvsIoError),

    /// Model or optimizer record could not be written or read.
    #[error("record error: {0}")]
    Recorder(#[from] RecorderError),

    /// Invalid or corrupted data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl NeuralMvsError {
    /// Shorthand for [`NeuralMvsError::InvalidConfig`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<mvs_core::MvsCoreError> for NeuralMvsError {
    fn from(err: mvs_core::MvsCoreError) -> Self {
        Self::IoError(err.into())
    }
}

/// Result type for neural_mvs operations.
pub type Result<T> = std::result::Result<T, NeuralMvsError>;
