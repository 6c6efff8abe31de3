use headlamp_image::{Image, ImageError, ImageSize};
use log::debug;

use crate::{
    error::BlobError,
    filter::LogBlobFilter,
    parallel::{self, ExecutionStrategy},
    source::{check_binary, RingWindowSource, WindowSource},
};

/// Image coordinate of a detected blob centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobCenter {
    /// Row of the centre.
    pub row: usize,
    /// Column of the centre.
    pub col: usize,
}

/// Stream of blob decisions, one per pixel, in raster order.
///
/// Each item evaluates the window fetched for the next coordinate. An error
/// is yielded once and ends the stream.
///
/// # Examples
///
/// ```
/// use headlamp_blob::{detect::BlobStream, filter::LogBlobFilter, source::RingWindowSource};
/// use headlamp_image::{Image, ImageSize};
///
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 3 }, 0).unwrap();
/// let filter = LogBlobFilter::headlight().unwrap();
/// let source = RingWindowSource::new(&image, filter.size()).unwrap();
///
/// let decisions = BlobStream::new(source, &filter)
///     .unwrap()
///     .collect::<Result<Vec<bool>, _>>()
///     .unwrap();
///
/// assert_eq!(decisions.len(), 12);
/// assert!(decisions.iter().all(|&d| !d));
/// ```
pub struct BlobStream<'f, S> {
    source: S,
    filter: &'f LogBlobFilter,
    size: ImageSize,
    next: usize,
    done: bool,
}

impl<'f, S: WindowSource> BlobStream<'f, S> {
    /// Create a stream over every coordinate of the source image.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::KernelSizeMismatch`] if the source and the filter
    /// disagree on the window size.
    pub fn new(source: S, filter: &'f LogBlobFilter) -> Result<Self, BlobError> {
        if source.window_size() != filter.size() {
            return Err(BlobError::KernelSizeMismatch(
                source.window_size(),
                filter.size(),
            ));
        }

        let size = source.image_size();
        Ok(Self {
            source,
            filter,
            size,
            next: 0,
            done: false,
        })
    }

    /// The coordinate of the next decision, or `None` once the stream is over.
    pub fn next_position(&self) -> Option<BlobCenter> {
        if self.done || self.next >= self.size.area() {
            return None;
        }
        Some(BlobCenter {
            row: self.next / self.size.width,
            col: self.next % self.size.width,
        })
    }

    /// Consume the stream and return its window source.
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: WindowSource> Iterator for BlobStream<'_, S> {
    type Item = Result<bool, BlobError>;

    fn next(&mut self) -> Option<Self::Item> {
        let BlobCenter { row, col } = self.next_position()?;
        self.next += 1;

        let filter = self.filter;
        let decision = self
            .source
            .fetch(row, col)
            .and_then(|w| filter.evaluate(w.window, w.start_row, w.start_col));

        if decision.is_err() {
            self.done = true;
        }
        Some(decision)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = self.size.area().saturating_sub(self.next);
        (0, Some(remaining))
    }
}

/// Detect the blob centres of a binary image.
///
/// Every pixel of `dst` is set to 1 where the filter window centred on it is a
/// blob, and to 0 elsewhere. Windows come from a [`RingWindowSource`], so pixels
/// outside the image read as 0.
///
/// # Arguments
///
/// * `src` - The binary input image, pixels 0 or 1.
/// * `dst` - The output decisions, same size as `src`.
/// * `filter` - The LoG filter of the scale to detect.
/// * `strategy` - How the rows are scheduled.
///
/// # Errors
///
/// Fails if the sizes differ, a pixel is not 0 or 1, or the thread pool
/// cannot be built.
pub fn detect_blobs(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    filter: &LogBlobFilter,
    strategy: ExecutionStrategy,
) -> Result<(), BlobError> {
    if src.size() != dst.size() {
        return Err(
            ImageError::InvalidImageSize(src.cols(), src.rows(), dst.cols(), dst.rows()).into(),
        );
    }

    check_binary(src)?;

    debug!(
        "detecting blobs in {} with a {k}x{k} kernel ({strategy:?})",
        src.size(),
        k = filter.size()
    );

    match strategy {
        // a single source walks the whole raster, one new line per row
        ExecutionStrategy::Serial => {
            let source = RingWindowSource::from_binary(src, filter.size())?;
            let stream = BlobStream::new(source, filter)?;
            for (out, decision) in dst.as_slice_mut().iter_mut().zip(stream) {
                *out = decision? as u8;
            }
        }
        // every row primes its own source
        ExecutionStrategy::ParallelRows | ExecutionStrategy::Fixed(_) => {
            parallel::try_for_each_row(dst.as_slice_mut(), src.width(), strategy, |row, out| {
                let mut source = RingWindowSource::from_binary(src, filter.size())?;
                for (col, px) in out.iter_mut().enumerate() {
                    let w = source.fetch(row, col)?;
                    *px = filter.evaluate(w.window, w.start_row, w.start_col)? as u8;
                }
                Ok::<(), BlobError>(())
            })?;
        }
    }

    Ok(())
}

/// Coordinates of every blob centre of a binary image, in raster order.
///
/// # Errors
///
/// Same as [`detect_blobs`].
pub fn blob_centers(
    src: &Image<u8, 1>,
    filter: &LogBlobFilter,
    strategy: ExecutionStrategy,
) -> Result<Vec<BlobCenter>, BlobError> {
    let mut decisions = Image::from_size_val(src.size(), 0u8)?;
    detect_blobs(src, &mut decisions, filter, strategy)?;

    let width = src.width();
    let centers = decisions
        .as_slice()
        .iter()
        .enumerate()
        .filter(|(_, d)| **d != 0)
        .map(|(idx, _)| BlobCenter {
            row: idx / width,
            col: idx % width,
        })
        .collect::<Vec<_>>();

    debug!("found {} blob centres", centers.len());

    Ok(centers)
}
