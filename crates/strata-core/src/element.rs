//! Numeric element trait for pooling kernels.

use std::fmt::Debug;

use num_traits::Float;

/// Floating-point element type accepted by every pooling kernel.
///
/// Kernels are written once against this trait and monomorphised per
/// precision. Implemented for `f32` and `f64`.
///
/// # Examples
///
/// ```
/// use strata_core::Element;
///
/// assert_eq!(<f32 as Element>::from_count(4), 4.0f32);
/// assert_eq!(<f64 as Element>::from_real(0.25), 0.25f64);
/// ```
pub trait Element: Float + Debug + Send + Sync + 'static {
    /// Convert a window element count into a divisor.
    fn from_count(count: usize) -> Self;

    /// Convert an `f64` constant into this precision (rounding if needed).
    fn from_real(value: f64) -> Self;

    /// Widen to `f64` for tolerance checks and reporting.
    fn as_f64(self) -> f64;
}

impl Element for f32 {
    #[inline]
    fn from_count(count: usize) -> Self {
        count as f32
    }

    #[inline]
    fn from_real(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Element for f64 {
    #[inline]
    fn from_count(count: usize) -> Self {
        count as f64
    }

    #[inline]
    fn from_real(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}
