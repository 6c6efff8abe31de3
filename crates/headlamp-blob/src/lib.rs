#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// blob detection driver and decision stream.
pub mod detect;

/// Error types for the blob detection stages.
pub mod error;

/// LoG window evaluation module.
pub mod filter;

/// signed fixed-point arithmetic.
pub mod fixed;

/// LoG kernel and calibrated constants.
pub mod kernel;

/// module containing parallization utilities.
pub mod parallel;

/// window sources over binary images.
pub mod source;

/// operations to binarize images.
pub mod threshold;

/// binary window type and ring indexing.
pub mod window;

pub use crate::detect::{blob_centers, detect_blobs, BlobCenter, BlobStream};
pub use crate::error::BlobError;
pub use crate::filter::LogBlobFilter;
pub use crate::fixed::Fixed;
pub use crate::kernel::LogKernel;
pub use crate::parallel::ExecutionStrategy;
pub use crate::source::{PaddedWindowSource, RingWindowSource, WindowRef, WindowSource};
pub use crate::window::Window;
