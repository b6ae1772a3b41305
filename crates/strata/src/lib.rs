//! Strata: spatial pooling for convolutional networks.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Strata sub-crates. For most users, adding `strata` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! // 4×4 single-channel ramp, 2×2 windows, stride 2.
//! let shape = VolumeShape::new(4, 4, 1).unwrap();
//! let geometry = WindowGeometry::new(shape, PoolConfig::square(2, 2)).unwrap();
//! let data: Vec<f32> = (1..=16).map(|v| v as f32).collect();
//!
//! let pooled = pool(&data, PoolMethod::Max, &geometry).unwrap();
//! assert_eq!(pooled, vec![6.0, 8.0, 14.0, 16.0]);
//!
//! // The indexed path gives the same answer from a precomputed index.
//! let index = PoolIndex::for_window(4, 4, geometry.config()).unwrap();
//! let mut fast = vec![0.0f32; 4];
//! pooling_fast(&mut fast, &data, &index, PoolMethod::Max, 1).unwrap();
//! assert_eq!(fast, pooled);
//!
//! // Gradients route to the window maxima.
//! let dzdx = pool_backward(&data, &[1.0; 4], PoolMethod::Max, &geometry).unwrap();
//! assert_eq!(dzdx[5], 1.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Element trait, pooling method, volume shape, errors |
//! | [`pool`] | `strata-pool` | Geometry, kernels, indices, backends, index cache |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`strata-core`).
///
/// Contains the [`types::Element`] trait, [`types::PoolMethod`],
/// [`types::VolumeShape`], and [`types::PoolError`].
pub use strata_core as types;

/// Pooling kernels and their supporting types (`strata-pool`).
///
/// Geometric kernels driven by [`pool::WindowGeometry`], indexed
/// kernels driven by [`pool::PoolIndex`], the [`pool::PoolBackend`]
/// trait, and the [`pool::IndexCache`].
pub use strata_pool as pool;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
///
/// This imports the core vocabulary types, pooling configuration and
/// geometry, the index type, the backends, and the top-level operations.
pub mod prelude {
    // Core types
    pub use strata_core::{Element, PoolError, PoolMethod, VolumeShape};

    // Configuration and geometry
    pub use strata_pool::{PoolConfig, WindowGeometry};

    // Indices
    pub use strata_pool::{avg_pooling_indices, max_pooling_indices, IndexCache, PoolIndex};

    // Backends
    pub use strata_pool::{PoolBackend, Sequential, Threaded, ThreadedConfig};

    // Operations
    pub use strata_pool::{
        pool, pool_backward, pooling, pooling_backward, pooling_backward_fast, pooling_fast,
    };
}
