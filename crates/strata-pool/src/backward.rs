//! Geometric backward pooling (gradient scatter).
//!
//! Redistributes each pooled gradient onto the input cells that fed
//! its window. Overlapping windows hit the same input cell more than
//! once, so every write is an accumulation into `dzdx`; the caller
//! zeroes `dzdx` before the first call.

use strata_core::{Element, PoolError, PoolMethod};

use crate::forward::window_argmax;
use crate::geometry::WindowGeometry;

/// Check buffer lengths for a backward call.
pub(crate) fn check(
    dzdx: usize,
    data: usize,
    dzdy: usize,
    geometry: &WindowGeometry,
) -> Result<(), PoolError> {
    let input_len = geometry.shape().len();
    PoolError::check_len("data", input_len, data)?;
    PoolError::check_len("dzdx", input_len, dzdx)?;
    PoolError::check_len("dzdy", geometry.pooled_shape().len(), dzdy)
}

/// Scatter-add `dzdy` into `dzdx` for every depth slice present.
///
/// MAX sends the whole gradient to the first maximal input cell of
/// the window (the one the forward pass selected). AVG sends
/// `gradient / area` to every valid cell.
pub(crate) fn run<T: Element>(
    dzdx: &mut [T],
    data: &[T],
    dzdy: &[T],
    method: PoolMethod,
    geometry: &WindowGeometry,
) {
    let width = geometry.shape().width;
    let slice_len = geometry.shape().slice_len();
    let pooled_len = geometry.pooled_slice_len();

    let slices = dzdx
        .chunks_exact_mut(slice_len)
        .zip(data.chunks_exact(slice_len))
        .zip(dzdy.chunks_exact(pooled_len));
    for ((grad_in, src), grad_out) in slices {
        for (p, bounds) in geometry.windows() {
            let g = grad_out[p];
            match method {
                PoolMethod::Max => {
                    let best = window_argmax(src, width, &bounds);
                    grad_in[best] = grad_in[best] + g;
                }
                PoolMethod::Avg => {
                    let share = g / T::from_count(bounds.area());
                    for offset in bounds.offsets(width) {
                        grad_in[offset] = grad_in[offset] + share;
                    }
                }
            }
        }
    }
}
