use headlamp_image::{ImageError, ImageSize};

use crate::parallel::ParallelError;

/// Errors that can occur while configuring or running the blob detector.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BlobError {
    /// Error related to image.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Error related to parallel execution.
    #[error(transparent)]
    ParallelError(#[from] ParallelError),

    /// The value does not fit the fixed-point range.
    #[error("Value {0} does not fit the fixed-point range [-2, 2)")]
    FixedPointOverflow(f64),

    /// The kernel has no taps.
    #[error("The kernel must have at least one tap")]
    EmptyKernel,

    /// The number of kernel weights does not match the kernel size.
    #[error("Kernel data length ({0}) does not match the kernel size ({1})")]
    KernelDataLength(usize, usize),

    /// A kernel weight lies outside [-1, 1].
    #[error("Kernel weight {value} at ({row}, {col}) lies outside [-1, 1]")]
    WeightOutOfRange {
        /// Kernel row of the weight.
        row: usize,
        /// Kernel column of the weight.
        col: usize,
        /// The offending weight.
        value: f64,
    },

    /// The kernel can produce a response outside the fixed-point range.
    #[error("Kernel responses span [{negative}, {positive}] which exceeds the fixed-point range")]
    KernelResponseOverflow {
        /// Sum of the positive weights.
        positive: f64,
        /// Sum of the negative weights.
        negative: f64,
    },

    /// The window data length does not match its dimensions.
    #[error("Window data length ({0}) does not match the window size ({1})")]
    WindowDataLength(usize, usize),

    /// The rows given to build a window have different lengths.
    #[error("Window row {row} has {len} pixels, expected {expected}")]
    RaggedWindow {
        /// Index of the offending row.
        row: usize,
        /// Length of the offending row.
        len: usize,
        /// Length of the first row.
        expected: usize,
    },

    /// A pixel is neither 0 nor 1.
    #[error("Pixel at ({row}, {col}) has value {value}, expected 0 or 1")]
    InvalidPixelValue {
        /// Row of the pixel.
        row: usize,
        /// Column of the pixel.
        col: usize,
        /// The offending value.
        value: u8,
    },

    /// The window shape does not match the kernel.
    #[error("Window shape ({rows}x{cols}) does not match the {expected}x{expected} kernel")]
    WindowShapeMismatch {
        /// Rows of the window.
        rows: usize,
        /// Columns of the window.
        cols: usize,
        /// Kernel size.
        expected: usize,
    },

    /// The ring start offsets are outside [0, K).
    #[error("Start offsets ({start_row}, {start_col}) must be smaller than the kernel size {size}")]
    StartOffsetOutOfRange {
        /// Start row offset.
        start_row: usize,
        /// Start column offset.
        start_col: usize,
        /// Kernel size.
        size: usize,
    },

    /// The window source and the filter do not share the same window size.
    #[error("Window source size ({0}) does not match the kernel size ({1})")]
    KernelSizeMismatch(usize, usize),

    /// A window was requested for a coordinate outside the image.
    #[error("Coordinate ({row}, {col}) is outside the image {size}")]
    CoordinateOutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Size of the image.
        size: ImageSize,
    },

    /// The window size must be at least one pixel.
    #[error("The window size must be greater than zero")]
    ZeroWindowSize,
}
