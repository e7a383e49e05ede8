//! Error types for mvs_core operations.

use thiserror::Error;

/// Errors that can occur in the pure math layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MvsCoreError {
    /// Invalid or contradictory configuration (e.g. inverse spacing with a
    /// non-positive minimum depth).
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// A depth interval that is zero, negative or not finite.
    #[error("depth interval must be positive and finite, got {value}")]
    InvalidInterval {
        /// The offending interval.
        value: f32,
    },

    /// Raster payload length does not match its declared dimensions.
    #[error("raster of {width}x{height} needs {expected} values, got {got}")]
    RasterSize {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Number of values required.
        expected: usize,
        /// Number of values provided.
        got: usize,
    },
}

impl MvsCoreError {
    /// Shorthand for [`MvsCoreError::InvalidConfig`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type alias for mvs_core operations.
pub type Result<T> = std::result::Result<T, MvsCoreError>;
