use crate::error::BlobError;

/// A neighborhood of binary pixels around a query coordinate.
///
/// Pixels are stored row-major and are always 0 or 1. The window is usually
/// square with the size of the kernel it is evaluated against; any other
/// shape is rejected by the filter, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Window {
    /// Create a window from row-major pixel data.
    ///
    /// # Errors
    ///
    /// Fails if the data length does not match `rows * cols` or a pixel is not 0 or 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use headlamp_blob::window::Window;
    ///
    /// let window = Window::new(2, 2, vec![0, 1, 1, 0]).unwrap();
    /// assert!(window.is_set(0, 1));
    /// assert!(!window.is_set(1, 1));
    /// ```
    pub fn new(rows: usize, cols: usize, data: Vec<u8>) -> Result<Self, BlobError> {
        if data.len() != rows * cols {
            return Err(BlobError::WindowDataLength(data.len(), rows * cols));
        }

        if let Some(idx) = data.iter().position(|&px| px > 1) {
            return Err(BlobError::InvalidPixelValue {
                row: idx / cols,
                col: idx % cols,
                value: data[idx],
            });
        }

        Ok(Self { rows, cols, data })
    }

    /// Create a window from its rows.
    ///
    /// # Errors
    ///
    /// Fails if the rows have different lengths or a pixel is not 0 or 1.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, BlobError> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(BlobError::RaggedWindow {
                    row: idx,
                    len: row.len(),
                    expected: cols,
                });
            }
            data.extend_from_slice(row);
        }

        Self::new(rows.len(), cols, data)
    }

    /// Create a window by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let data = (0..rows * cols)
            .map(|idx| f(idx / cols, idx % cols) as u8)
            .collect();
        Self { rows, cols, data }
    }

    /// Create a square window with every pixel cleared.
    pub fn zeros(size: usize) -> Self {
        Self {
            rows: size,
            cols: size,
            data: vec![0; size * size],
        }
    }

    /// Number of rows of the window.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns of the window.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The pixels in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The pixel at `(row, col)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Whether the pixel at `(row, col)` is set.
    ///
    /// # Panics
    ///
    /// If `(row, col)` is outside the window.
    #[inline]
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        self.data[row * self.cols + col] != 0
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&px| px != 0).count()
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, on: bool) {
        self.data[row * self.cols + col] = on as u8;
    }
}

/// Index `start + offset` in a ring of `len` slots.
///
/// Both `start` and `offset` must be smaller than `len`, so a single
/// conditional subtraction replaces the modulo.
#[inline]
pub(crate) fn ring_index(start: usize, offset: usize, len: usize) -> usize {
    debug_assert!(start < len && offset < len);
    let idx = start + offset;
    if idx < len {
        idx
    } else {
        idx - len
    }
}

/// Slot following `idx` in a ring of `len` slots.
#[inline]
pub(crate) fn ring_next(idx: usize, len: usize) -> usize {
    if idx + 1 < len {
        idx + 1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_new() -> Result<(), BlobError> {
        #[rustfmt::skip]
        let window = Window::new(3, 3, vec![
            0, 1, 0,
            1, 1, 1,
            0, 1, 0,
        ])?;

        assert_eq!(window.rows(), 3);
        assert_eq!(window.cols(), 3);
        assert_eq!(window.count_set(), 5);
        assert_eq!(window.get(1, 2), Some(1));
        assert_eq!(window.get(0, 0), Some(0));
        assert_eq!(window.get(3, 0), None);

        Ok(())
    }

    #[test]
    fn test_window_rejects_invalid_input() {
        assert_eq!(
            Window::new(2, 2, vec![0, 1, 0]),
            Err(BlobError::WindowDataLength(3, 4))
        );
        assert_eq!(
            Window::new(2, 2, vec![0, 1, 0, 255]),
            Err(BlobError::InvalidPixelValue {
                row: 1,
                col: 1,
                value: 255
            })
        );
        assert_eq!(
            Window::from_rows(&[vec![0, 1], vec![1]]),
            Err(BlobError::RaggedWindow {
                row: 1,
                len: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn test_window_from_fn_matches_from_rows() -> Result<(), BlobError> {
        let diagonal = Window::from_fn(3, 3, |r, c| r == c);
        let expected = Window::from_rows(&[[1, 0, 0], [0, 1, 0], [0, 0, 1]])?;
        assert_eq!(diagonal, expected);
        assert_eq!(Window::zeros(3).count_set(), 0);
        Ok(())
    }

    #[test]
    fn test_ring_index() {
        assert_eq!(ring_index(0, 4, 5), 4);
        assert_eq!(ring_index(3, 1, 5), 4);
        assert_eq!(ring_index(3, 2, 5), 0);
        assert_eq!(ring_index(4, 4, 5), 3);
        assert_eq!(ring_next(3, 5), 4);
        assert_eq!(ring_next(4, 5), 0);
        assert_eq!(ring_next(0, 1), 0);
    }
}
