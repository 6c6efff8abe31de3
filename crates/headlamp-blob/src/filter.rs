use crate::{
    error::BlobError,
    fixed::Fixed,
    kernel::{LogKernel, HEADLIGHT_THRESHOLD},
    window::{ring_index, Window},
};

/// Laplacian-of-Gaussian blob filter for binary windows.
///
/// The response of a window is the sum of the kernel weights at the set
/// pixels, so the convolution needs additions only. A window is a blob
/// centre when its response reaches the threshold.
///
/// The filter is immutable; build it once per scale and share it.
///
/// # Examples
///
/// ```
/// use headlamp_blob::{filter::LogBlobFilter, window::Window};
///
/// let filter = LogBlobFilter::headlight().unwrap();
///
/// // centre plus the 4-connected cross
/// let window = Window::from_fn(5, 5, |r, c| {
///     (r == 2 && (1..=3).contains(&c)) || (c == 2 && (1..=3).contains(&r))
/// });
///
/// assert!(filter.evaluate(&window, 0, 0).unwrap());
/// assert!(!filter.evaluate(&Window::zeros(5), 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogBlobFilter {
    kernel: LogKernel,
    threshold: Fixed,
}

impl LogBlobFilter {
    /// Create a filter from a kernel and a response threshold.
    pub fn new(kernel: LogKernel, threshold: Fixed) -> Self {
        Self { kernel, threshold }
    }

    /// The 5x5 headlight filter with its `0.490` threshold.
    pub fn headlight() -> Result<Self, BlobError> {
        Ok(Self::new(
            LogKernel::headlight()?,
            Fixed::from_f64(HEADLIGHT_THRESHOLD)?,
        ))
    }

    /// The filter kernel.
    #[inline]
    pub fn kernel(&self) -> &LogKernel {
        &self.kernel
    }

    /// The response threshold.
    #[inline]
    pub fn threshold(&self) -> Fixed {
        self.threshold
    }

    /// The window size the filter expects.
    #[inline]
    pub fn size(&self) -> usize {
        self.kernel.size()
    }

    /// Compute the LoG response of a window.
    ///
    /// Kernel tap `(i, j)` reads window pixel
    /// `((start_row + i) mod K, (start_col + j) mod K)`, which lets the
    /// caller keep the window in a ring buffer instead of re-copying it.
    ///
    /// # Arguments
    ///
    /// * `window` - The KxK binary window.
    /// * `start_row` - Ring offset of the first kernel row, in `[0, K)`.
    /// * `start_col` - Ring offset of the first kernel column, in `[0, K)`.
    ///
    /// # Errors
    ///
    /// Fails if the window is not KxK or an offset is not smaller than K.
    pub fn response(
        &self,
        window: &Window,
        start_row: usize,
        start_col: usize,
    ) -> Result<Fixed, BlobError> {
        self.check_input(window, start_row, start_col)?;
        Ok(self.response_unchecked(window, start_row, start_col))
    }

    /// Decide whether the window is centred on a blob of this filter's scale.
    ///
    /// # Errors
    ///
    /// Same as [`LogBlobFilter::response`].
    pub fn evaluate(
        &self,
        window: &Window,
        start_row: usize,
        start_col: usize,
    ) -> Result<bool, BlobError> {
        Ok(self.response(window, start_row, start_col)? >= self.threshold)
    }

    fn check_input(
        &self,
        window: &Window,
        start_row: usize,
        start_col: usize,
    ) -> Result<(), BlobError> {
        let size = self.size();

        if window.rows() != size || window.cols() != size {
            return Err(BlobError::WindowShapeMismatch {
                rows: window.rows(),
                cols: window.cols(),
                expected: size,
            });
        }

        if start_row >= size || start_col >= size {
            return Err(BlobError::StartOffsetOutOfRange {
                start_row,
                start_col,
                size,
            });
        }

        Ok(())
    }

    fn response_unchecked(&self, window: &Window, start_row: usize, start_col: usize) -> Fixed {
        let size = self.size();
        let mut response = Fixed::ZERO;

        for i in 0..size {
            let row = ring_index(start_row, i, size);
            for (j, &weight) in self.kernel.row(i).iter().enumerate() {
                let col = ring_index(start_col, j, size);
                if window.is_set(row, col) {
                    response += weight;
                }
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::HEADLIGHT_KERNEL_SIZE;

    const K: usize = HEADLIGHT_KERNEL_SIZE;

    fn peak_window() -> Window {
        Window::from_fn(K, K, |r, c| {
            (r == 2 && (1..=3).contains(&c)) || (c == 2 && (1..=3).contains(&r))
        })
    }

    #[test]
    fn test_all_zero_window() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;
        let window = Window::zeros(K);

        for start_row in 0..K {
            for start_col in 0..K {
                assert_eq!(filter.response(&window, start_row, start_col)?, Fixed::ZERO);
                assert!(!filter.evaluate(&window, start_row, start_col)?);
            }
        }

        Ok(())
    }

    #[test]
    fn test_peak_match_window() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;
        let window = peak_window();

        let response = filter.response(&window, 0, 0)?;
        // 0.3182 + 4 * 0.0923, with truncated weights
        assert_eq!(response.raw(), 20853 + 4 * 6048);
        assert!((response.to_f64() - 0.6874).abs() < 1e-3);
        assert!(filter.evaluate(&window, 0, 0)?);

        Ok(())
    }

    #[test]
    fn test_full_window_is_not_a_blob() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;
        let window = Window::from_fn(K, K, |_, _| true);

        let response = filter.response(&window, 0, 0)?;
        assert_eq!(response, filter.kernel().sum());
        assert_eq!(response.raw(), -27);
        assert!(!filter.evaluate(&window, 0, 0)?);

        Ok(())
    }

    #[test]
    fn test_threshold_is_inclusive() -> Result<(), BlobError> {
        let window = peak_window();
        let kernel = LogKernel::headlight()?;

        let at_response = LogBlobFilter::new(kernel.clone(), Fixed::from_raw(45045)?);
        assert!(at_response.evaluate(&window, 0, 0)?);

        let above_response = LogBlobFilter::new(kernel, Fixed::from_raw(45046)?);
        assert!(!above_response.evaluate(&window, 0, 0)?);

        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;
        let window = Window::from_fn(K, K, |r, c| (r * 7 + c * 3) % 4 == 0);

        let first = filter.response(&window, 2, 1)?;
        for _ in 0..10 {
            assert_eq!(filter.response(&window, 2, 1)?, first);
        }

        Ok(())
    }

    #[test]
    fn test_monotonic_in_weight_sign() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;
        let base = Window::from_fn(K, K, |r, c| (r + c) % 3 == 0);
        let base_response = filter.response(&base, 0, 0)?;

        for row in 0..K {
            for col in 0..K {
                if base.is_set(row, col) {
                    continue;
                }
                let grown =
                    Window::from_fn(K, K, |r, c| base.is_set(r, c) || (r, c) == (row, col));
                let grown_response = filter.response(&grown, 0, 0)?;

                let weight = filter.kernel().weights()[row * K + col];
                if weight >= Fixed::ZERO {
                    assert!(grown_response >= base_response);
                } else {
                    assert!(grown_response < base_response);
                }
            }
        }

        Ok(())
    }

    #[test]
    fn test_wrapped_reads() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;

        // with start_row = 3: tap (0, j) reads row 3, tap (1, j) row 4, tap (2, j) row 0
        let window = Window::from_fn(K, K, |r, c| {
            matches!((r, c), (3, 0) | (0, 0) | (0, 2) | (4, 2))
        });

        let response = filter.response(&window, 3, 0)?;
        // (3,0) <- tap (0,0), (0,0) <- tap (2,0), (0,2) <- tap (2,2), (4,2) <- tap (1,2)
        assert_eq!(response.raw(), -1567 - 3271 + 20853 + 6048);

        // unrotated, the same pixels hit (3,0), (0,0), (0,2), (4,2)
        let response = filter.response(&window, 0, 0)?;
        assert_eq!(response.raw(), -3015 - 1567 - 3271 - 3271);

        Ok(())
    }

    #[test]
    fn test_rotation_matches_rolled_window() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;
        let logical = peak_window();

        for start_row in 0..K {
            for start_col in 0..K {
                // store logical pixel (i, j) at ((start_row + i) % K, (start_col + j) % K)
                let rolled = Window::from_fn(K, K, |r, c| {
                    logical.is_set((r + K - start_row) % K, (c + K - start_col) % K)
                });
                assert_eq!(
                    filter.response(&rolled, start_row, start_col)?,
                    filter.response(&logical, 0, 0)?
                );
            }
        }

        Ok(())
    }

    #[test]
    fn test_asymmetric_kernel() -> Result<(), BlobError> {
        #[rustfmt::skip]
        let kernel = LogKernel::new(3, &[
            0.5, 0.0, 0.0,
            0.0, 0.0, 0.0,
            0.0, 0.0, -0.25,
        ])?;
        let filter = LogBlobFilter::new(kernel, Fixed::from_f64(0.5)?);
        let window = Window::from_rows(&[[1, 0, 0], [0, 0, 0], [0, 0, 0]])?;

        assert_eq!(filter.response(&window, 0, 0)?, Fixed::from_f64(0.5)?);
        assert!(filter.evaluate(&window, 0, 0)?);
        // rotated by one in both axes, tap (2, 2) now reads pixel (0, 0)
        assert_eq!(filter.response(&window, 1, 1)?, Fixed::from_f64(-0.25)?);
        assert!(!filter.evaluate(&window, 1, 1)?);

        Ok(())
    }

    #[test]
    fn test_rejects_invalid_input() -> Result<(), BlobError> {
        let filter = LogBlobFilter::headlight()?;

        assert_eq!(
            filter.evaluate(&Window::zeros(4), 0, 0),
            Err(BlobError::WindowShapeMismatch {
                rows: 4,
                cols: 4,
                expected: K
            })
        );
        assert!(matches!(
            filter.evaluate(&Window::from_fn(5, 6, |_, _| false), 0, 0),
            Err(BlobError::WindowShapeMismatch { rows: 5, cols: 6, .. })
        ));
        assert_eq!(
            filter.evaluate(&Window::zeros(K), K, 0),
            Err(BlobError::StartOffsetOutOfRange {
                start_row: K,
                start_col: 0,
                size: K
            })
        );
        assert!(filter.response(&Window::zeros(K), 0, K).is_err());

        Ok(())
    }
}
