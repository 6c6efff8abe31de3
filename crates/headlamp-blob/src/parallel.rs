use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how a raster operation is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process image rows in parallel.
    #[default]
    ParallelRows,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

/// Run a fallible operation on every row of `dst` with the given strategy.
///
/// The closure receives the row index and the mutable row slice, so rows keep
/// their raster position whatever order they are processed in. The first error
/// stops the remaining work and is returned.
///
/// # Arguments
///
/// * `dst` - The destination buffer, `stride` elements per row.
/// * `stride` - The number of elements per row.
/// * `strategy` - The execution strategy.
/// * `op` - The operation to run on each `(row index, row)` pair.
pub fn try_for_each_row<T, E, F>(
    dst: &mut [T],
    stride: usize,
    strategy: ExecutionStrategy,
    op: F,
) -> Result<(), E>
where
    T: Send,
    E: From<ParallelError> + Send,
    F: Fn(usize, &mut [T]) -> Result<(), E> + Sync + Send,
{
    if let ExecutionStrategy::Fixed(0) = strategy {
        return Err(ParallelError::InvalidThreadCount(0).into());
    }

    // nothing to split, also guards the zero-width case
    if dst.is_empty() || stride == 0 {
        return Ok(());
    }

    match strategy {
        ExecutionStrategy::Serial => dst
            .chunks_exact_mut(stride)
            .enumerate()
            .try_for_each(|(y, row)| op(y, row)),
        ExecutionStrategy::ParallelRows => dst
            .par_chunks_exact_mut(stride)
            .enumerate()
            .try_for_each(|(y, row)| op(y, row)),
        ExecutionStrategy::Fixed(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_exact_mut(stride)
                    .enumerate()
                    .try_for_each(|(y, row)| op(y, row))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_with_row_index(strategy: ExecutionStrategy) -> Result<Vec<usize>, ParallelError> {
        let mut dst = vec![0usize; 12];
        try_for_each_row(&mut dst, 3, strategy, |y, row| {
            row.iter_mut()
                .enumerate()
                .for_each(|(x, px)| *px = y * 10 + x);
            Ok::<(), ParallelError>(())
        })?;
        Ok(dst)
    }

    #[test]
    fn test_execute_serial() -> Result<(), ParallelError> {
        let dst = fill_with_row_index(ExecutionStrategy::Serial)?;
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12, 20, 21, 22, 30, 31, 32]);
        Ok(())
    }

    #[test]
    fn test_execute_parallel_rows() -> Result<(), ParallelError> {
        let dst = fill_with_row_index(ExecutionStrategy::ParallelRows)?;
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12, 20, 21, 22, 30, 31, 32]);
        Ok(())
    }

    #[test]
    fn test_execute_fixed_success() -> Result<(), ParallelError> {
        let dst = fill_with_row_index(ExecutionStrategy::Fixed(2))?;
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12, 20, 21, 22, 30, 31, 32]);
        Ok(())
    }

    #[test]
    fn test_execute_fixed_error() {
        let res = fill_with_row_index(ExecutionStrategy::Fixed(0));
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }

    #[test]
    fn test_execute_propagates_row_error() {
        let mut dst = vec![0u8; 6];
        let res = try_for_each_row(&mut dst, 2, ExecutionStrategy::ParallelRows, |y, _| {
            if y == 1 {
                Err(ParallelError::BuildError("row 1".to_string()))
            } else {
                Ok(())
            }
        });
        assert_eq!(res, Err(ParallelError::BuildError("row 1".to_string())));
    }

    #[test]
    fn test_execute_fixed_error_on_empty() {
        let mut dst: Vec<u8> = vec![];
        let res = try_for_each_row(&mut dst, 0, ExecutionStrategy::Fixed(0), |_, _| {
            Ok::<(), ParallelError>(())
        });
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }

    #[test]
    fn test_execute_empty() -> Result<(), ParallelError> {
        let mut dst: Vec<u8> = vec![];
        try_for_each_row(&mut dst, 0, ExecutionStrategy::Serial, |_, _| {
            Err(ParallelError::InvalidThreadCount(0))
        })?;
        Ok(())
    }
}
