//! Geometric forward pooling.
//!
//! Recomputes clipped window bounds for every pooled position and
//! reduces the valid cells with max or mean. Depth slices are
//! processed one after another and never mixed.

use strata_core::{Element, PoolError, PoolMethod};

use crate::geometry::{WindowBounds, WindowGeometry};

/// In-slice offset of the first maximal cell in the window.
///
/// Scan order is rows outer, columns inner; a later cell only wins if
/// it is strictly greater, so ties resolve to the earliest cell. The
/// running maximum starts at `-inf`, so NaN cells never win. The
/// backward pass calls this same function to route gradients.
pub(crate) fn window_argmax<T: Element>(
    slice: &[T],
    width: usize,
    bounds: &WindowBounds,
) -> usize {
    let mut best = bounds.y_start * width + bounds.x_start;
    let mut best_value = T::neg_infinity();
    for offset in bounds.offsets(width) {
        let value = slice[offset];
        if value > best_value {
            best = offset;
            best_value = value;
        }
    }
    best
}

/// Mean over the valid cells of the window, summed in scan order.
pub(crate) fn window_mean<T: Element>(slice: &[T], width: usize, bounds: &WindowBounds) -> T {
    let sum = bounds
        .offsets(width)
        .fold(T::zero(), |acc, offset| acc + slice[offset]);
    sum / T::from_count(bounds.area())
}

/// Check buffer lengths for a forward call.
pub(crate) fn check(
    pooled: usize,
    data: usize,
    geometry: &WindowGeometry,
) -> Result<(), PoolError> {
    PoolError::check_len("data", geometry.shape().len(), data)?;
    PoolError::check_len("pooled", geometry.pooled_shape().len(), pooled)
}

/// Pool every depth slice present in `data` into `pooled`.
///
/// Lengths must already be checked; the slice count is taken from the
/// buffers so callers can pass any contiguous channel range.
pub(crate) fn run<T: Element>(
    pooled: &mut [T],
    data: &[T],
    method: PoolMethod,
    geometry: &WindowGeometry,
) {
    let width = geometry.shape().width;
    let slice_len = geometry.shape().slice_len();
    let pooled_len = geometry.pooled_slice_len();

    for (src, dst) in data
        .chunks_exact(slice_len)
        .zip(pooled.chunks_exact_mut(pooled_len))
    {
        for (p, bounds) in geometry.windows() {
            dst[p] = match method {
                PoolMethod::Max => src[window_argmax(src, width, &bounds)],
                PoolMethod::Avg => window_mean(src, width, &bounds),
            };
        }
    }
}
