use headlamp_image::{Image, ImageError};

use crate::{
    error::BlobError,
    parallel::{self, ExecutionStrategy},
};

/// Binarize a grayscale image into the 0/1 monochrome input of the detector.
///
/// # Arguments
///
/// * `src` - The grayscale input image.
/// * `dst` - The binary output image, 1 where `src > threshold`, 0 elsewhere.
/// * `threshold` - The intensity threshold.
/// * `strategy` - How the rows are scheduled.
///
/// # Examples
///
/// ```
/// use headlamp_blob::{parallel::ExecutionStrategy, threshold::binarize};
/// use headlamp_image::{Image, ImageSize};
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut mono = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// binarize(&image, &mut mono, 100, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(mono.as_slice(), &[0, 1, 0, 1, 1, 1]);
/// ```
pub fn binarize(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    threshold: u8,
    strategy: ExecutionStrategy,
) -> Result<(), BlobError> {
    if src.size() != dst.size() {
        return Err(
            ImageError::InvalidImageSize(src.cols(), src.rows(), dst.cols(), dst.rows()).into(),
        );
    }

    parallel::try_for_each_row(dst.as_slice_mut(), src.width(), strategy, |y, dst_row| {
        let src_row = src
            .row(y)
            .ok_or(ImageError::PixelIndexOutOfBounds(0, y, src.cols(), src.rows()))?;
        dst_row
            .iter_mut()
            .zip(src_row)
            .for_each(|(dst_px, &src_px)| *dst_px = (src_px > threshold) as u8);
        Ok::<(), BlobError>(())
    })
}
