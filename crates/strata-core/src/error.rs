//! Error types for the Strata pooling kernels.
//!
//! The arithmetic kernels have no failure modes of their own. Every
//! variant here is a precondition violation caught by a checked entry
//! point before any kernel runs, so an `Err` never leaves a buffer
//! partially written.

use std::error::Error;
use std::fmt;

/// Errors from pooling configuration, shape checks, and index validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// Window, stride, or padding parameters are unusable.
    InvalidConfig {
        /// Description of the rejected parameter.
        reason: String,
    },
    /// A volume has zero width, height, or depth.
    EmptyVolume,
    /// The padded input is smaller than the window along one axis,
    /// so no pooled position exists.
    EmptyOutput {
        /// Padded input extent along the offending axis.
        input: usize,
        /// Window extent along the same axis.
        window: usize,
    },
    /// A buffer length does not match the shape derived from the
    /// volume and pooling parameters.
    ShapeMismatch {
        /// Which buffer was wrong (e.g. `"pooled"`, `"dzdx"`).
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// An index slot points outside the origin depth slice.
    IndexOutOfRange {
        /// Flat slot position in the index array.
        slot: usize,
        /// The offending offset.
        offset: u32,
        /// Size of one origin depth slice.
        data_size: usize,
    },
    /// Origin slice is too large to address with `u32` offsets.
    OffsetOverflow {
        /// The slice size that overflowed.
        value: usize,
    },
    /// A backend worker failed (e.g. a worker thread panicked).
    Backend {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid pool config: {reason}"),
            Self::EmptyVolume => write!(f, "volume has zero width, height or depth"),
            Self::EmptyOutput { input, window } => {
                write!(f, "padded input extent {input} is smaller than window {window}")
            }
            Self::ShapeMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{what} length {actual} != expected {expected}"),
            Self::IndexOutOfRange {
                slot,
                offset,
                data_size,
            } => write!(
                f,
                "index slot {slot} holds offset {offset} outside origin slice of {data_size}"
            ),
            Self::OffsetOverflow { value } => {
                write!(f, "origin slice size {value} exceeds u32::MAX")
            }
            Self::Backend { reason } => write!(f, "backend failure: {reason}"),
        }
    }
}

impl Error for PoolError {}

impl PoolError {
    /// Return `Err(ShapeMismatch)` unless `actual == expected`.
    pub fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::ShapeMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}
