//! Top-level pooling operations on the [`Sequential`] backend.
//!
//! The `pooling*` functions write into caller-provided buffers and
//! never allocate. [`pool`] and [`pool_backward`] are allocating
//! conveniences built on them.

use strata_core::{Element, PoolError, PoolMethod};

use crate::backend::{PoolBackend, Sequential};
use crate::geometry::WindowGeometry;
use crate::index::PoolIndex;

/// Geometric forward pooling into `pooled`.
///
/// `pooled` must hold `geometry.pooled_shape().len()` elements; every
/// element is written exactly once.
pub fn pooling<T: Element>(
    pooled: &mut [T],
    data: &[T],
    method: PoolMethod,
    geometry: &WindowGeometry,
) -> Result<(), PoolError> {
    Sequential.pooling(pooled, data, method, geometry)
}

/// Geometric backward pooling: accumulate `dzdy` into `dzdx`.
///
/// `dzdx` is added to, not overwritten; zero it first.
pub fn pooling_backward<T: Element>(
    dzdx: &mut [T],
    data: &[T],
    dzdy: &[T],
    method: PoolMethod,
    geometry: &WindowGeometry,
) -> Result<(), PoolError> {
    Sequential.pooling_backward(dzdx, data, dzdy, method, geometry)
}

/// Indexed forward pooling of `depth` channels into `pooled`.
pub fn pooling_fast<T: Element>(
    pooled: &mut [T],
    data: &[T],
    index: &PoolIndex,
    method: PoolMethod,
    depth: usize,
) -> Result<(), PoolError> {
    Sequential.pooling_fast(pooled, data, index, method, depth)
}

/// Indexed backward pooling: accumulate `dzdy` into `dzdx`.
pub fn pooling_backward_fast<T: Element>(
    dzdx: &mut [T],
    data: &[T],
    dzdy: &[T],
    index: &PoolIndex,
    method: PoolMethod,
    depth: usize,
) -> Result<(), PoolError> {
    Sequential.pooling_backward_fast(dzdx, data, dzdy, index, method, depth)
}

/// Allocate and return the pooled volume.
///
/// # Examples
///
/// ```
/// use strata_core::{PoolMethod, VolumeShape};
/// use strata_pool::{pool, PoolConfig, WindowGeometry};
///
/// let data: Vec<f32> = (1..=16).map(|v| v as f32).collect();
/// let geom = WindowGeometry::new(VolumeShape::new(4, 4, 1).unwrap(), PoolConfig::square(2, 2))
///     .unwrap();
/// assert_eq!(pool(&data, PoolMethod::Max, &geom).unwrap(), vec![6.0, 8.0, 14.0, 16.0]);
/// assert_eq!(pool(&data, PoolMethod::Avg, &geom).unwrap(), vec![3.5, 5.5, 11.5, 13.5]);
/// ```
pub fn pool<T: Element>(
    data: &[T],
    method: PoolMethod,
    geometry: &WindowGeometry,
) -> Result<Vec<T>, PoolError> {
    let mut pooled = vec![T::zero(); geometry.pooled_shape().len()];
    pooling(&mut pooled, data, method, geometry)?;
    Ok(pooled)
}

/// Allocate a zeroed input gradient and scatter `dzdy` into it.
pub fn pool_backward<T: Element>(
    data: &[T],
    dzdy: &[T],
    method: PoolMethod,
    geometry: &WindowGeometry,
) -> Result<Vec<T>, PoolError> {
    let mut dzdx = vec![T::zero(); geometry.shape().len()];
    pooling_backward(&mut dzdx, data, dzdy, method, geometry)?;
    Ok(dzdx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use strata_core::VolumeShape;

    #[test]
    fn pool_rejects_short_input() {
        let geom = WindowGeometry::new(VolumeShape::new(4, 4, 1).unwrap(), PoolConfig::default())
            .unwrap();
        let err = pool(&[0.0f32; 15], PoolMethod::Avg, &geom).unwrap_err();
        assert_eq!(
            err,
            PoolError::ShapeMismatch {
                what: "data",
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn pool_backward_starts_from_zero() {
        let geom = WindowGeometry::new(VolumeShape::new(2, 2, 1).unwrap(), PoolConfig::default())
            .unwrap();
        let dzdx = pool_backward(&[1.0f64, 2.0, 3.0, 4.0], &[8.0], PoolMethod::Max, &geom).unwrap();
        assert_eq!(dzdx, vec![0.0, 0.0, 0.0, 8.0]);
    }
}
