//! Geometric and indexed spatial pooling kernels.
//!
//! Reduces a dense `width × height × depth` volume over rectangular
//! windows with max or average, and scatters gradients back for the
//! backward pass. Two code paths compute identical results:
//!
//! - **Geometric** ([`pooling`], [`pooling_backward`]): window bounds
//!   are derived from [`WindowGeometry`] on every call.
//! - **Indexed** ([`pooling_fast`], [`pooling_backward_fast`]): windows
//!   come from a precomputed [`PoolIndex`]. Indices compose across
//!   stages ([`max_pooling_indices`], [`avg_pooling_indices`]) so a
//!   chain of pooling layers stays addressable in the origin volume.
//!
//! Kernels run on a [`PoolBackend`]; the free functions use
//! [`Sequential`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod cache;
pub mod config;
pub mod geometry;
pub mod index;
pub mod ops;

mod backward;
mod fast;
mod forward;

pub use backend::{PoolBackend, Sequential, Threaded, ThreadedConfig};
pub use cache::IndexCache;
pub use config::{pooled_extent, PoolConfig};
pub use geometry::{WindowBounds, WindowGeometry};
pub use index::{avg_pooling_indices, max_pooling_indices, IndexLayout, PoolIndex};
pub use ops::{pool, pool_backward, pooling, pooling_backward, pooling_backward_fast, pooling_fast};
