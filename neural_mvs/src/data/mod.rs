//! Moving samples onto the compute device.
//!
//! - [`BatchLoader`]: epoch order and batch assembly over a sample source
//! - [`MvsBatch`]: a batch of samples stacked into tensors

mod batch;
mod loader;

pub use batch::MvsBatch;
pub use loader::BatchLoader;
