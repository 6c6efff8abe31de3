use headlamp_image::{Image, ImageSize};
use log::trace;

use crate::{
    error::BlobError,
    window::{ring_next, Window},
};

/// A window handed out by a [`WindowSource`], with its ring start offsets.
#[derive(Debug, Clone, Copy)]
pub struct WindowRef<'a> {
    /// The window buffer.
    pub window: &'a Window,
    /// Buffer row holding the first logical window row.
    pub start_row: usize,
    /// Buffer column holding the first logical window column.
    pub start_col: usize,
}

/// Produces the KxK binary neighborhood of an image coordinate.
///
/// The bundled sources anchor pixel `(row, col)` at window position
/// `(K / 2, K / 2)` and read pixels outside the image as 0.
pub trait WindowSource {
    /// The window size K.
    fn window_size(&self) -> usize;

    /// The size of the image the windows are taken from.
    fn image_size(&self) -> ImageSize;

    /// Fetch the window for image coordinate `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::CoordinateOutOfBounds`] outside the image.
    fn fetch(&mut self, row: usize, col: usize) -> Result<WindowRef<'_>, BlobError>;
}

/// Check that every pixel of the image is 0 or 1.
pub(crate) fn check_binary(image: &Image<u8, 1>) -> Result<(), BlobError> {
    match image.as_slice().iter().position(|&px| px > 1) {
        Some(idx) => Err(BlobError::InvalidPixelValue {
            row: idx / image.width(),
            col: idx % image.width(),
            value: image.as_slice()[idx],
        }),
        None => Ok(()),
    }
}

fn check_window_size(window_size: usize) -> Result<(), BlobError> {
    if window_size == 0 {
        return Err(BlobError::ZeroWindowSize);
    }
    Ok(())
}

fn check_coordinate(size: ImageSize, row: usize, col: usize) -> Result<(), BlobError> {
    if row >= size.height || col >= size.width {
        return Err(BlobError::CoordinateOutOfBounds { row, col, size });
    }
    Ok(())
}

/// Zero-padded pixel lookup at a possibly out-of-image coordinate.
#[inline]
fn pixel_or_zero(image: &Image<u8, 1>, row: isize, col: isize) -> bool {
    if row < 0 || col < 0 {
        return false;
    }
    image
        .get([row as usize, col as usize, 0])
        .is_some_and(|&px| px != 0)
}

/// Window source that copies the full neighborhood on every fetch.
///
/// The window is always handed out in logical order, i.e. with
/// `start_row = start_col = 0`.
pub struct PaddedWindowSource<'a> {
    image: &'a Image<u8, 1>,
    window: Window,
}

impl<'a> PaddedWindowSource<'a> {
    /// Create a source over a binary image.
    ///
    /// # Errors
    ///
    /// Fails if `window_size` is zero or a pixel is not 0 or 1.
    pub fn new(image: &'a Image<u8, 1>, window_size: usize) -> Result<Self, BlobError> {
        check_window_size(window_size)?;
        check_binary(image)?;
        Ok(Self {
            image,
            window: Window::zeros(window_size),
        })
    }
}

impl WindowSource for PaddedWindowSource<'_> {
    fn window_size(&self) -> usize {
        self.window.rows()
    }

    fn image_size(&self) -> ImageSize {
        self.image.size()
    }

    fn fetch(&mut self, row: usize, col: usize) -> Result<WindowRef<'_>, BlobError> {
        check_coordinate(self.image.size(), row, col)?;

        let size = self.window.rows();
        let top = row as isize - (size / 2) as isize;
        let left = col as isize - (size / 2) as isize;

        for i in 0..size {
            for j in 0..size {
                let on = pixel_or_zero(self.image, top + i as isize, left + j as isize);
                self.window.set(i, j, on);
            }
        }

        Ok(WindowRef {
            window: &self.window,
            start_row: 0,
            start_col: 0,
        })
    }
}

/// Window source backed by a line buffer and a ring window.
///
/// The source keeps the K image lines under the window in a ring and the
/// window itself as a ring of columns. When fetches follow raster order, a
/// step to the right copies a single window column and a step to the next
/// image row copies a single image line; the rotation is reported through
/// the start offsets of the returned [`WindowRef`]. Any other access pattern
/// reloads both buffers.
pub struct RingWindowSource<'a> {
    image: &'a Image<u8, 1>,
    size: usize,
    // `size` lines of `image.width()` pixels, logical line 0 at `line_start`
    lines: Vec<u8>,
    line_start: usize,
    // buffer row `p` of the window mirrors line `p`
    window: Window,
    col_start: usize,
    cursor: Option<(usize, usize)>,
}

impl<'a> RingWindowSource<'a> {
    /// Create a source over a binary image.
    ///
    /// # Errors
    ///
    /// Fails if `window_size` is zero or a pixel is not 0 or 1.
    pub fn new(image: &'a Image<u8, 1>, window_size: usize) -> Result<Self, BlobError> {
        check_binary(image)?;
        Self::from_binary(image, window_size)
    }

    /// Create a source over an image already checked with [`check_binary`].
    pub(crate) fn from_binary(
        image: &'a Image<u8, 1>,
        window_size: usize,
    ) -> Result<Self, BlobError> {
        check_window_size(window_size)?;
        Ok(Self {
            image,
            size: window_size,
            lines: vec![0; window_size * image.width()],
            line_start: 0,
            window: Window::zeros(window_size),
            col_start: 0,
            cursor: None,
        })
    }

    fn anchor(&self) -> isize {
        (self.size / 2) as isize
    }

    fn load_line(&mut self, slot: usize, image_row: isize) {
        let image = self.image;
        let width = image.width();
        let line = &mut self.lines[slot * width..(slot + 1) * width];
        match usize::try_from(image_row).ok().and_then(|r| image.row(r)) {
            Some(src) => line.copy_from_slice(src),
            None => line.fill(0),
        }
    }

    #[inline]
    fn line_pixel(&self, slot: usize, image_col: isize) -> bool {
        let width = self.image.width();
        match usize::try_from(image_col) {
            Ok(c) if c < width => self.lines[slot * width + c] != 0,
            _ => false,
        }
    }

    /// Load the K lines around `row` from scratch.
    fn prime_lines(&mut self, row: usize) {
        let top = row as isize - self.anchor();
        self.line_start = 0;
        for slot in 0..self.size {
            self.load_line(slot, top + slot as isize);
        }
    }

    /// Move the line ring down by one image row, `row` being the new centre.
    fn advance_line(&mut self, row: usize) {
        let bottom = row as isize - self.anchor() + self.size as isize - 1;
        let oldest = self.line_start;
        self.load_line(oldest, bottom);
        self.line_start = ring_next(oldest, self.size);
    }

    /// Fill the whole window from the line ring for centre column `col`.
    fn fill_window(&mut self, col: usize) {
        let left = col as isize - self.anchor();
        self.col_start = 0;
        for slot in 0..self.size {
            for j in 0..self.size {
                let on = self.line_pixel(slot, left + j as isize);
                self.window.set(slot, j, on);
            }
        }
    }

    /// Slide the window right by one column, `col` being the new centre.
    fn slide_right(&mut self, col: usize) {
        let right = col as isize - self.anchor() + self.size as isize - 1;
        let oldest = self.col_start;
        for slot in 0..self.size {
            let on = self.line_pixel(slot, right);
            self.window.set(slot, oldest, on);
        }
        self.col_start = ring_next(oldest, self.size);
    }
}

impl WindowSource for RingWindowSource<'_> {
    fn window_size(&self) -> usize {
        self.size
    }

    fn image_size(&self) -> ImageSize {
        self.image.size()
    }

    fn fetch(&mut self, row: usize, col: usize) -> Result<WindowRef<'_>, BlobError> {
        check_coordinate(self.image.size(), row, col)?;

        let cursor = self.cursor;
        match cursor {
            Some((r, c)) if r == row && c == col => {}
            Some((r, c)) if r == row && c + 1 == col => self.slide_right(col),
            Some((r, _)) if r + 1 == row && col == 0 => {
                self.advance_line(row);
                self.fill_window(col);
            }
            _ => {
                trace!("priming ring window source at ({row}, {col})");
                self.prime_lines(row);
                self.fill_window(col);
            }
        }
        self.cursor = Some((row, col));

        Ok(WindowRef {
            window: &self.window,
            start_row: self.line_start,
            start_col: self.col_start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::ring_index;

    #[rustfmt::skip]
    fn test_image() -> Result<Image<u8, 1>, BlobError> {
        Ok(Image::new(
            ImageSize { width: 4, height: 3 },
            vec![
                1, 0, 0, 1,
                0, 1, 1, 0,
                1, 1, 0, 0,
            ],
        )?)
    }

    /// Read a fetched window back in logical order.
    fn logical(window: WindowRef<'_>) -> Vec<u8> {
        let size = window.window.rows();
        let mut out = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                let r = ring_index(window.start_row, i, size);
                let c = ring_index(window.start_col, j, size);
                out.push(window.window.is_set(r, c) as u8);
            }
        }
        out
    }

    #[test]
    fn test_padded_source_centered_window() -> Result<(), BlobError> {
        let image = test_image()?;
        let mut source = PaddedWindowSource::new(&image, 3)?;
        assert_eq!(source.window_size(), 3);
        assert_eq!(source.image_size(), image.size());

        let window = source.fetch(0, 0)?;
        assert_eq!((window.start_row, window.start_col), (0, 0));
        #[rustfmt::skip]
        assert_eq!(window.window.as_slice(), &[
            0, 0, 0,
            0, 1, 0,
            0, 0, 1,
        ]);

        let window = source.fetch(1, 2)?;
        #[rustfmt::skip]
        assert_eq!(window.window.as_slice(), &[
            0, 0, 1,
            1, 1, 0,
            1, 0, 0,
        ]);

        Ok(())
    }

    #[test]
    fn test_ring_source_rotates_offsets() -> Result<(), BlobError> {
        let image = test_image()?;
        let mut source = RingWindowSource::new(&image, 3)?;

        let window = source.fetch(0, 0)?;
        assert_eq!((window.start_row, window.start_col), (0, 0));

        let window = source.fetch(0, 1)?;
        assert_eq!((window.start_row, window.start_col), (0, 1));

        let window = source.fetch(0, 2)?;
        assert_eq!((window.start_row, window.start_col), (0, 2));

        let window = source.fetch(0, 3)?;
        assert_eq!((window.start_row, window.start_col), (0, 0));

        let window = source.fetch(1, 0)?;
        assert_eq!((window.start_row, window.start_col), (1, 0));

        Ok(())
    }

    #[test]
    fn test_ring_source_matches_padded_source() -> Result<(), BlobError> {
        let image = test_image()?;
        for size in 1..=5 {
            let mut padded = PaddedWindowSource::new(&image, size)?;
            let mut ring = RingWindowSource::new(&image, size)?;

            for row in 0..image.height() {
                for col in 0..image.width() {
                    let expected = logical(padded.fetch(row, col)?);
                    assert_eq!(logical(ring.fetch(row, col)?), expected, "({row}, {col})");
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_ring_source_random_access() -> Result<(), BlobError> {
        let image = test_image()?;
        let mut padded = PaddedWindowSource::new(&image, 3)?;
        let mut ring = RingWindowSource::new(&image, 3)?;

        for (row, col) in [(2, 3), (0, 1), (0, 1), (1, 3), (2, 0), (2, 1), (0, 0)] {
            let expected = logical(padded.fetch(row, col)?);
            assert_eq!(logical(ring.fetch(row, col)?), expected, "({row}, {col})");
        }
        Ok(())
    }

    #[test]
    fn test_source_errors() -> Result<(), BlobError> {
        let image = test_image()?;

        let mut source = RingWindowSource::new(&image, 3)?;
        assert_eq!(
            source.fetch(3, 0).map(|_| ()),
            Err(BlobError::CoordinateOutOfBounds {
                row: 3,
                col: 0,
                size: image.size()
            })
        );
        assert!(PaddedWindowSource::new(&image, 3)?.fetch(0, 4).is_err());

        assert!(matches!(
            RingWindowSource::new(&image, 0),
            Err(BlobError::ZeroWindowSize)
        ));

        let grey = Image::<u8, 1>::new(ImageSize { width: 2, height: 1 }, vec![0, 7])?;
        assert!(matches!(
            PaddedWindowSource::new(&grey, 3),
            Err(BlobError::InvalidPixelValue { row: 0, col: 1, value: 7 })
        ));

        Ok(())
    }
}
