use crate::{error::BlobError, fixed::Fixed};

/// Size of the headlight LoG kernel.
pub const HEADLIGHT_KERNEL_SIZE: usize = 5;

/// LoG kernel tuned for circular or elliptical light blobs, row-major.
#[rustfmt::skip]
pub const HEADLIGHT_LOG_KERNEL: [[f64; HEADLIGHT_KERNEL_SIZE]; HEADLIGHT_KERNEL_SIZE] = [
    [-0.0239, -0.0460, -0.0499, -0.0460, -0.0239],
    [-0.0460, -0.0061,  0.0923, -0.0061, -0.0460],
    [-0.0499,  0.0923,  0.3182,  0.0923, -0.0499],
    [-0.0460, -0.0061,  0.0923, -0.0061, -0.0460],
    [-0.0239, -0.0460, -0.0499, -0.0460, -0.0239],
];

/// Response threshold of the headlight LoG kernel.
pub const HEADLIGHT_THRESHOLD: f64 = 0.490;

/// A square LoG kernel of fixed-point weights.
///
/// Every weight lies in `[-1, 1]`, and the positive and negative weights
/// respectively sum to less than `2` and at least `-2`. Any sum over a subset
/// of the taps therefore fits the [`Fixed`] range, which is what a binary
/// window produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LogKernel {
    size: usize,
    weights: Vec<Fixed>,
}

impl LogKernel {
    /// Create a kernel from row-major weights.
    ///
    /// # Arguments
    ///
    /// * `size` - The number of rows and columns of the kernel.
    /// * `weights` - The `size * size` weights in row-major order.
    ///
    /// # Errors
    ///
    /// Fails if the kernel is empty, the weights do not match the size, a
    /// weight is outside `[-1, 1]` or the kernel could overflow the response.
    ///
    /// # Examples
    ///
    /// ```
    /// use headlamp_blob::kernel::LogKernel;
    ///
    /// let kernel = LogKernel::new(3, &[
    ///     -0.1, -0.1, -0.1,
    ///     -0.1,  0.8, -0.1,
    ///     -0.1, -0.1, -0.1,
    /// ]).unwrap();
    ///
    /// assert_eq!(kernel.size(), 3);
    /// ```
    pub fn new(size: usize, weights: &[f64]) -> Result<Self, BlobError> {
        if size == 0 {
            return Err(BlobError::EmptyKernel);
        }

        if weights.len() != size * size {
            return Err(BlobError::KernelDataLength(weights.len(), size * size));
        }

        let mut fixed_weights = Vec::with_capacity(weights.len());
        for (idx, &value) in weights.iter().enumerate() {
            if !(-1.0..=1.0).contains(&value) {
                return Err(BlobError::WeightOutOfRange {
                    row: idx / size,
                    col: idx % size,
                    value,
                });
            }
            fixed_weights.push(Fixed::from_f64(value)?);
        }

        let kernel = Self {
            size,
            weights: fixed_weights,
        };

        let (positive, negative) = kernel.partial_sums();
        if positive > i64::from(Fixed::MAX.raw()) || negative < i64::from(Fixed::MIN.raw()) {
            return Err(BlobError::KernelResponseOverflow {
                positive: raw_to_f64(positive),
                negative: raw_to_f64(negative),
            });
        }

        Ok(kernel)
    }

    /// Create a kernel from its rows.
    ///
    /// # Errors
    ///
    /// Same as [`LogKernel::new`]; additionally the number of rows must match
    /// the length of every row.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, BlobError> {
        let size = rows.len();
        let weights = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect::<Vec<_>>();

        if rows.iter().any(|row| row.as_ref().len() != size) {
            return Err(BlobError::KernelDataLength(weights.len(), size * size));
        }

        Self::new(size, &weights)
    }

    /// The 5x5 headlight kernel, see [`HEADLIGHT_LOG_KERNEL`].
    pub fn headlight() -> Result<Self, BlobError> {
        Self::from_rows(&HEADLIGHT_LOG_KERNEL)
    }

    /// The number of rows (and columns) of the kernel.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The weights in row-major order.
    #[inline]
    pub fn weights(&self) -> &[Fixed] {
        &self.weights
    }

    /// The weight of tap `(row, col)`, or `None` when out of bounds.
    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> Option<Fixed> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(self.weights[row * self.size + col])
    }

    /// The weights of kernel row `row`.
    #[inline]
    pub(crate) fn row(&self, row: usize) -> &[Fixed] {
        &self.weights[row * self.size..(row + 1) * self.size]
    }

    /// Largest response the kernel can produce: the sum of its positive weights.
    pub fn positive_sum(&self) -> Fixed {
        self.weights.iter().filter(|w| w.raw() > 0).copied().sum()
    }

    /// Smallest response the kernel can produce: the sum of its negative weights.
    pub fn negative_sum(&self) -> Fixed {
        self.weights.iter().filter(|w| w.raw() < 0).copied().sum()
    }

    /// Response of a fully set window: the sum of all weights.
    pub fn sum(&self) -> Fixed {
        self.weights.iter().copied().sum()
    }

    fn partial_sums(&self) -> (i64, i64) {
        self.weights.iter().fold((0i64, 0i64), |(pos, neg), w| {
            let raw = i64::from(w.raw());
            if raw > 0 {
                (pos + raw, neg)
            } else {
                (pos, neg + raw)
            }
        })
    }
}

fn raw_to_f64(raw: i64) -> f64 {
    raw as f64 / Fixed::ONE.raw() as f64
}
