//! Benchmark profiles for the Strata pooling kernels.
//!
//! Provides pre-built feature-map shapes and stage configurations:
//!
//! - [`reference_profile`]: 56×56×64 map, 3×3 window, stride 2, pad 1
//! - [`stress_profile`]: 112×112×128 map with the same stage
//! - [`BenchCase::inputs`]: deterministic data and gradients via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_core::VolumeShape;
use strata_pool::{PoolConfig, PoolIndex, WindowGeometry};
use strata_test_utils::seeded_volume;

/// One pooling workload: geometry plus the matching fast-path index.
pub struct BenchCase {
    pub geometry: WindowGeometry,
    pub index: PoolIndex,
}

impl BenchCase {
    /// Build a case, panicking on an invalid shape (benchmarks only).
    pub fn new(width: usize, height: usize, depth: usize, config: PoolConfig) -> Self {
        let shape = VolumeShape::new(width, height, depth).expect("bench shape");
        let geometry = WindowGeometry::new(shape, config).expect("bench geometry");
        let index = PoolIndex::for_window(width, height, &config).expect("bench index");
        Self { geometry, index }
    }

    /// Channel count.
    pub fn depth(&self) -> usize {
        self.geometry.shape().depth
    }

    /// Seeded `(data, dzdy)` pair sized for this case.
    pub fn inputs(&self, seed: u64) -> (Vec<f32>, Vec<f32>) {
        let data = seeded_volume(self.geometry.shape().len(), seed);
        let dzdy = seeded_volume(self.geometry.pooled_shape().len(), seed ^ 0x5eed);
        (data, dzdy)
    }
}

/// Overlapping 3×3 / stride 2 / pad 1 stage, as in ResNet stems.
pub fn reference_config() -> PoolConfig {
    PoolConfig::square(3, 2).with_uniform_padding(1)
}

/// 56×56×64 feature map with [`reference_config`].
pub fn reference_profile() -> BenchCase {
    BenchCase::new(56, 56, 64, reference_config())
}

/// 112×112×128 feature map with [`reference_config`].
pub fn stress_profile() -> BenchCase {
    BenchCase::new(112, 112, 128, reference_config())
}
