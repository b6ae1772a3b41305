//! Core types and traits for the Strata pooling kernels.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every kernel and backend: the numeric
//! [`Element`] trait, the closed [`PoolMethod`] enumeration, the
//! [`VolumeShape`] of a dense feature map, and the [`PoolError`] type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod method;
pub mod shape;

pub use element::Element;
pub use error::PoolError;
pub use method::PoolMethod;
pub use shape::VolumeShape;
