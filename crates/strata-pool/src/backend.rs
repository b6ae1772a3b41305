//! Execution backends.
//!
//! [`PoolBackend`] is the seam between the pooling algorithm and the
//! hardware that runs it. Every backend performs the same per-channel
//! computation; backends differ only in how channels are scheduled.
//!
//! - [`Sequential`]: one thread, channels in order. The reference.
//! - [`Threaded`]: contiguous channel ranges on scoped worker threads.
//!   Channels never interact, so the output is bit-identical to
//!   [`Sequential`].
//!
//! Every method validates buffer lengths before touching any output,
//! so an `Err` leaves the caller's buffers unmodified.

use std::ops::Range;

use strata_core::{Element, PoolError, PoolMethod};

use crate::geometry::WindowGeometry;
use crate::index::PoolIndex;
use crate::{backward, fast, forward};

/// Pooling kernels over caller-owned buffers.
///
/// `dzdx` buffers are accumulated into, never overwritten: zero them
/// before the first backward call.
pub trait PoolBackend<T: Element>: Send + Sync {
    /// Short backend name for logs and reports.
    fn name(&self) -> &str;

    /// Geometric forward pooling of `data` into `pooled`.
    fn pooling(
        &self,
        pooled: &mut [T],
        data: &[T],
        method: PoolMethod,
        geometry: &WindowGeometry,
    ) -> Result<(), PoolError>;

    /// Geometric backward pooling: scatter-add `dzdy` into `dzdx`.
    fn pooling_backward(
        &self,
        dzdx: &mut [T],
        data: &[T],
        dzdy: &[T],
        method: PoolMethod,
        geometry: &WindowGeometry,
    ) -> Result<(), PoolError>;

    /// Indexed forward pooling of `depth` channels.
    fn pooling_fast(
        &self,
        pooled: &mut [T],
        data: &[T],
        index: &PoolIndex,
        method: PoolMethod,
        depth: usize,
    ) -> Result<(), PoolError>;

    /// Indexed backward pooling of `depth` channels.
    fn pooling_backward_fast(
        &self,
        dzdx: &mut [T],
        data: &[T],
        dzdy: &[T],
        index: &PoolIndex,
        method: PoolMethod,
        depth: usize,
    ) -> Result<(), PoolError>;
}

// ── Sequential ─────────────────────────────────────────────────────

/// Single-threaded reference backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl<T: Element> PoolBackend<T> for Sequential {
    fn name(&self) -> &str {
        "sequential"
    }

    fn pooling(
        &self,
        pooled: &mut [T],
        data: &[T],
        method: PoolMethod,
        geometry: &WindowGeometry,
    ) -> Result<(), PoolError> {
        forward::check(pooled.len(), data.len(), geometry)?;
        forward::run(pooled, data, method, geometry);
        Ok(())
    }

    fn pooling_backward(
        &self,
        dzdx: &mut [T],
        data: &[T],
        dzdy: &[T],
        method: PoolMethod,
        geometry: &WindowGeometry,
    ) -> Result<(), PoolError> {
        backward::check(dzdx.len(), data.len(), dzdy.len(), geometry)?;
        backward::run(dzdx, data, dzdy, method, geometry);
        Ok(())
    }

    fn pooling_fast(
        &self,
        pooled: &mut [T],
        data: &[T],
        index: &PoolIndex,
        method: PoolMethod,
        depth: usize,
    ) -> Result<(), PoolError> {
        fast::check(pooled.len(), data.len(), index, depth)?;
        fast::run(pooled, data, index, method);
        Ok(())
    }

    fn pooling_backward_fast(
        &self,
        dzdx: &mut [T],
        data: &[T],
        dzdy: &[T],
        index: &PoolIndex,
        method: PoolMethod,
        depth: usize,
    ) -> Result<(), PoolError> {
        fast::check_backward(dzdx.len(), data.len(), dzdy.len(), index, depth)?;
        fast::run_backward(dzdx, data, dzdy, index, method);
        Ok(())
    }
}

// ── Threaded ───────────────────────────────────────────────────────

/// Configuration for the [`Threaded`] backend.
#[derive(Clone, Debug, Default)]
pub struct ThreadedConfig {
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, 64]`).
    pub worker_count: Option<usize>,
}

impl ThreadedConfig {
    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        }
    }
}

/// Channel-parallel backend on scoped threads.
///
/// Splits the depth axis into at most `worker_count` contiguous
/// ranges and runs the sequential kernel on each range. Volumes with
/// a single channel run inline on the calling thread.
#[derive(Clone, Debug, Default)]
pub struct Threaded {
    config: ThreadedConfig,
}

impl Threaded {
    /// Create a threaded backend.
    pub fn new(config: ThreadedConfig) -> Self {
        Self { config }
    }

    /// Backend with an explicit worker count.
    pub fn with_workers(worker_count: usize) -> Self {
        Self::new(ThreadedConfig {
            worker_count: Some(worker_count),
        })
    }

    /// The backend configuration.
    pub fn config(&self) -> &ThreadedConfig {
        &self.config
    }

    /// Run `job` over disjoint channel blocks of `out`.
    ///
    /// `out_slice` is the length of one channel in `out`. `job`
    /// receives the channel range and the matching block of `out`.
    fn for_each_channel_block<T, F>(
        &self,
        out: &mut [T],
        out_slice: usize,
        depth: usize,
        job: F,
    ) -> Result<(), PoolError>
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync,
    {
        let workers = self.config.resolved_worker_count().min(depth);
        if workers <= 1 {
            job(0..depth, out);
            return Ok(());
        }
        let per_worker = depth.div_ceil(workers);
        log::trace!(
            "threaded backend: {depth} channels over {} workers ({per_worker} each)",
            depth.div_ceil(per_worker)
        );

        let job = &job;
        let failed = std::thread::scope(|s| {
            let handles: Vec<_> = out
                .chunks_mut(per_worker * out_slice)
                .enumerate()
                .map(|(i, block)| {
                    let start = i * per_worker;
                    let channels = start..start + block.len() / out_slice;
                    s.spawn(move || job(channels, block))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join())
                .filter(Result::is_err)
                .count()
        });
        if failed > 0 {
            return Err(PoolError::Backend {
                reason: format!("{failed} worker thread(s) panicked"),
            });
        }
        Ok(())
    }
}

/// Sub-slice covering `channels`, each `slice_len` long.
fn channels_of<'a, T>(buf: &'a [T], channels: &Range<usize>, slice_len: usize) -> &'a [T] {
    &buf[channels.start * slice_len..channels.end * slice_len]
}

impl<T: Element> PoolBackend<T> for Threaded {
    fn name(&self) -> &str {
        "threaded"
    }

    fn pooling(
        &self,
        pooled: &mut [T],
        data: &[T],
        method: PoolMethod,
        geometry: &WindowGeometry,
    ) -> Result<(), PoolError> {
        forward::check(pooled.len(), data.len(), geometry)?;
        let slice_len = geometry.shape().slice_len();
        self.for_each_channel_block(
            pooled,
            geometry.pooled_slice_len(),
            geometry.shape().depth,
            |channels, block| {
                let src = channels_of(data, &channels, slice_len);
                forward::run(block, src, method, geometry);
            },
        )
    }

    fn pooling_backward(
        &self,
        dzdx: &mut [T],
        data: &[T],
        dzdy: &[T],
        method: PoolMethod,
        geometry: &WindowGeometry,
    ) -> Result<(), PoolError> {
        backward::check(dzdx.len(), data.len(), dzdy.len(), geometry)?;
        let slice_len = geometry.shape().slice_len();
        let pooled_len = geometry.pooled_slice_len();
        self.for_each_channel_block(dzdx, slice_len, geometry.shape().depth, |channels, block| {
            let src = channels_of(data, &channels, slice_len);
            let grad = channels_of(dzdy, &channels, pooled_len);
            backward::run(block, src, grad, method, geometry);
        })
    }

    fn pooling_fast(
        &self,
        pooled: &mut [T],
        data: &[T],
        index: &PoolIndex,
        method: PoolMethod,
        depth: usize,
    ) -> Result<(), PoolError> {
        fast::check(pooled.len(), data.len(), index, depth)?;
        let data_size = index.data_size();
        self.for_each_channel_block(pooled, index.pooled_size(), depth, |channels, block| {
            let src = channels_of(data, &channels, data_size);
            fast::run(block, src, index, method);
        })
    }

    fn pooling_backward_fast(
        &self,
        dzdx: &mut [T],
        data: &[T],
        dzdy: &[T],
        index: &PoolIndex,
        method: PoolMethod,
        depth: usize,
    ) -> Result<(), PoolError> {
        fast::check_backward(dzdx.len(), data.len(), dzdy.len(), index, depth)?;
        let data_size = index.data_size();
        let pooled_size = index.pooled_size();
        self.for_each_channel_block(dzdx, data_size, depth, |channels, block| {
            let src = channels_of(data, &channels, data_size);
            let grad = channels_of(dzdy, &channels, pooled_size);
            fast::run_backward(block, src, grad, index, method);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use strata_core::VolumeShape;
    use strata_test_utils::seeded_volume;

    #[test]
    fn resolved_worker_count_clamps_explicit_values() {
        let cfg = ThreadedConfig {
            worker_count: Some(0),
        };
        assert_eq!(cfg.resolved_worker_count(), 1);
        let cfg = ThreadedConfig {
            worker_count: Some(1000),
        };
        assert_eq!(cfg.resolved_worker_count(), 64);
        assert!(ThreadedConfig::default().resolved_worker_count() >= 1);
    }

    #[test]
    fn threaded_forward_matches_sequential_with_uneven_split() {
        // 7 channels over 3 workers -> blocks of 3, 3, 1.
        let shape = VolumeShape::new(5, 6, 7).unwrap();
        let geom = WindowGeometry::new(shape, PoolConfig::square(3, 2).with_uniform_padding(1))
            .unwrap();
        let data: Vec<f64> = seeded_volume(shape.len(), 7);

        for method in PoolMethod::ALL {
            let mut a = vec![0.0; geom.pooled_shape().len()];
            let mut b = vec![0.0; geom.pooled_shape().len()];
            Sequential.pooling(&mut a, &data, method, &geom).unwrap();
            Threaded::with_workers(3)
                .pooling(&mut b, &data, method, &geom)
                .unwrap();
            assert_eq!(a, b, "method {method}");
        }
    }

    #[test]
    fn threaded_backward_fast_matches_sequential() {
        let shape = VolumeShape::new(6, 6, 4).unwrap();
        let index = PoolIndex::for_window(6, 6, &PoolConfig::square(3, 1)).unwrap();
        let data: Vec<f32> = seeded_volume(shape.len(), 11);
        let dzdy: Vec<f32> = seeded_volume(index.pooled_size() * 4, 12);

        for method in PoolMethod::ALL {
            let mut a = vec![0.0; shape.len()];
            let mut b = vec![0.0; shape.len()];
            Sequential
                .pooling_backward_fast(&mut a, &data, &dzdy, &index, method, 4)
                .unwrap();
            Threaded::with_workers(8)
                .pooling_backward_fast(&mut b, &data, &dzdy, &index, method, 4)
                .unwrap();
            assert_eq!(a, b, "method {method}");
        }
    }

    #[test]
    fn shape_errors_leave_output_untouched() {
        let shape = VolumeShape::new(4, 4, 2).unwrap();
        let geom = WindowGeometry::new(shape, PoolConfig::default()).unwrap();
        let mut pooled = vec![-1.0f32; 7];
        let err = Threaded::with_workers(2)
            .pooling(&mut pooled, &[0.0; 32], PoolMethod::Max, &geom)
            .unwrap_err();
        assert!(matches!(err, PoolError::ShapeMismatch { what: "pooled", .. }));
        assert!(pooled.iter().all(|&v| v == -1.0));
    }

    #[test]
    fn backends_are_object_safe() {
        let backends: Vec<Box<dyn PoolBackend<f32>>> =
            vec![Box::new(Sequential), Box::new(Threaded::default())];
        let names: Vec<_> = backends.iter().map(|b| b.name().to_string()).collect();
        assert_eq!(names, vec!["sequential", "threaded"]);
    }
}
