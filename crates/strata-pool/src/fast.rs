//! Indexed (fast) forward and backward pooling.
//!
//! Same reductions as the geometric kernels, but each pooled position
//! reads its cells from a [`PoolIndex`] instead of recomputing clipped
//! bounds. `None` slots are skipped. Reductions run in slot order, so
//! a single-stage index gives bit-identical results to the geometric
//! path.

use strata_core::{Element, PoolError, PoolMethod};

use crate::index::PoolIndex;

/// First maximal valid offset in `slots`, seeded at `-inf` like the
/// geometric argmax.
fn slot_argmax<T: Element>(slice: &[T], slots: &[Option<u32>]) -> usize {
    let valid = slots.iter().flatten().map(|&o| o as usize);
    // PoolIndex guarantees at least one valid slot per position.
    let mut best = valid.clone().next().unwrap_or_default();
    let mut best_value = T::neg_infinity();
    for offset in valid {
        let value = slice[offset];
        if value > best_value {
            best = offset;
            best_value = value;
        }
    }
    best
}

/// Check buffer lengths for a fast forward call over `depth` slices.
pub(crate) fn check(
    pooled: usize,
    data: usize,
    index: &PoolIndex,
    depth: usize,
) -> Result<(), PoolError> {
    PoolError::check_len("data", index.data_size() * depth, data)?;
    PoolError::check_len("pooled", index.pooled_size() * depth, pooled)
}

/// Check buffer lengths for a fast backward call over `depth` slices.
pub(crate) fn check_backward(
    dzdx: usize,
    data: usize,
    dzdy: usize,
    index: &PoolIndex,
    depth: usize,
) -> Result<(), PoolError> {
    let input_len = index.data_size() * depth;
    PoolError::check_len("data", input_len, data)?;
    PoolError::check_len("dzdx", input_len, dzdx)?;
    PoolError::check_len("dzdy", index.pooled_size() * depth, dzdy)
}

/// Indexed forward pass over every depth slice present in `data`.
pub(crate) fn run<T: Element>(
    pooled: &mut [T],
    data: &[T],
    index: &PoolIndex,
    method: PoolMethod,
) {
    for (src, dst) in data
        .chunks_exact(index.data_size())
        .zip(pooled.chunks_exact_mut(index.pooled_size()))
    {
        for (out, slots) in dst.iter_mut().zip(index.windows()) {
            *out = match method {
                PoolMethod::Max => src[slot_argmax(src, slots)],
                PoolMethod::Avg => {
                    let (sum, count) = slots
                        .iter()
                        .flatten()
                        .fold((T::zero(), 0usize), |(acc, n), &o| (acc + src[o as usize], n + 1));
                    sum / T::from_count(count)
                }
            };
        }
    }
}

/// Indexed backward pass: scatter-add `dzdy` into `dzdx`.
pub(crate) fn run_backward<T: Element>(
    dzdx: &mut [T],
    data: &[T],
    dzdy: &[T],
    index: &PoolIndex,
    method: PoolMethod,
) {
    let data_size = index.data_size();
    let slices = dzdx
        .chunks_exact_mut(data_size)
        .zip(data.chunks_exact(data_size))
        .zip(dzdy.chunks_exact(index.pooled_size()));
    for ((grad_in, src), grad_out) in slices {
        for (&g, slots) in grad_out.iter().zip(index.windows()) {
            match method {
                PoolMethod::Max => {
                    let best = slot_argmax(src, slots);
                    grad_in[best] = grad_in[best] + g;
                }
                PoolMethod::Avg => {
                    let count = slots.iter().flatten().count();
                    let share = g / T::from_count(count);
                    for &o in slots.iter().flatten() {
                        grad_in[o as usize] = grad_in[o as usize] + share;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use strata_test_utils::ramp;

    #[test]
    fn max_and_avg_on_4x4_ramp() {
        let index = PoolIndex::for_window(4, 4, &PoolConfig::square(2, 2)).unwrap();
        let data: Vec<f32> = ramp(16);
        let mut pooled = vec![0.0; 4];
        check(pooled.len(), data.len(), &index, 1).unwrap();

        run(&mut pooled, &data, &index, PoolMethod::Max);
        assert_eq!(pooled, vec![6.0, 8.0, 14.0, 16.0]);

        run(&mut pooled, &data, &index, PoolMethod::Avg);
        assert_eq!(pooled, vec![3.5, 5.5, 11.5, 13.5]);
    }

    #[test]
    fn none_slots_are_skipped_in_divisor() {
        let index = PoolIndex::for_window(2, 2, &PoolConfig::square(2, 1).with_padding(1, 0, 1, 0))
            .unwrap();
        let mut pooled = vec![0.0f64; 4];
        run(&mut pooled, &[1.0, 2.0, 3.0, 4.0], &index, PoolMethod::Avg);
        assert_eq!(pooled, vec![1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn backward_routes_per_channel() {
        let index = PoolIndex::for_window(2, 2, &PoolConfig::square(2, 2)).unwrap();
        let data = [1.0f32, 4.0, 2.0, 3.0, 8.0, 0.0, 0.0, 0.0];
        let mut dzdx = vec![0.0; 8];
        check_backward(dzdx.len(), data.len(), 2, &index, 2).unwrap();
        run_backward(&mut dzdx, &data, &[1.0, 2.0], &index, PoolMethod::Max);
        assert_eq!(dzdx, vec![0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn nan_slot_is_skipped_like_the_geometric_kernel() {
        let index = PoolIndex::for_window(2, 2, &PoolConfig::square(2, 2)).unwrap();
        let data = [f32::NAN, 1.0, 3.0, 2.0];
        let mut pooled = vec![0.0f32; 1];
        run(&mut pooled, &data, &index, PoolMethod::Max);
        assert_eq!(pooled, vec![3.0]);

        let mut dzdx = vec![0.0f32; 4];
        run_backward(&mut dzdx, &data, &[1.0], &index, PoolMethod::Max);
        assert_eq!(dzdx, vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn duplicate_slots_receive_one_share_each() {
        let layout = crate::index::IndexLayout {
            width: 1,
            height: 1,
            window_size: 4,
            data_size: 3,
        };
        let index =
            PoolIndex::from_slots(layout, vec![Some(0), Some(1), Some(1), Some(2)]).unwrap();
        let mut dzdx = vec![0.0f64; 3];
        run_backward(&mut dzdx, &[0.0; 3], &[4.0], &index, PoolMethod::Avg);
        assert_eq!(dzdx, vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn check_uses_depth_for_both_buffers() {
        let index = PoolIndex::for_window(4, 4, &PoolConfig::square(2, 2)).unwrap();
        assert!(check(12, 48, &index, 3).is_ok());
        let err = check(12, 32, &index, 3).unwrap_err();
        assert!(err.to_string().contains("data length 32"), "got: {err}");
    }
}
