#![deny(missing_docs)]
//! Image types used by the headlamp detection stages

/// image representation for the detection stages.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
