//! Pooling window configuration and validation.
//!
//! [`PoolConfig`] describes one pooling stage: window extent, stride,
//! and four independent padding amounts. [`validate()`](PoolConfig::validate)
//! checks the invariants every kernel relies on; the geometry layer
//! calls it before deriving any shape.

use strata_core::PoolError;

// ── PoolConfig ─────────────────────────────────────────────────────

/// Window, stride, and padding for one pooling stage.
///
/// Padding is virtual: it is never materialised and is clipped away
/// before any element is read or written. Each padding amount must be
/// strictly smaller than the window extent on its axis, which
/// guarantees that every window overlaps at least one real element.
///
/// # Examples
///
/// ```
/// use strata_pool::PoolConfig;
///
/// let cfg = PoolConfig::square(3, 2).with_uniform_padding(1);
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.pooled_width(7), Some(4));
/// assert_eq!(cfg.window_size(), 9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    /// Window extent along x.
    pub window_width: usize,
    /// Window extent along y.
    pub window_height: usize,
    /// Step between window origins along x.
    pub stride_x: usize,
    /// Step between window origins along y.
    pub stride_y: usize,
    /// Virtual columns before x = 0.
    pub pad_left: usize,
    /// Virtual columns after the last column.
    pub pad_right: usize,
    /// Virtual rows before y = 0.
    pub pad_top: usize,
    /// Virtual rows after the last row.
    pub pad_bottom: usize,
}

impl Default for PoolConfig {
    /// 2×2 window, stride 2, no padding.
    fn default() -> Self {
        Self::square(2, 2)
    }
}

impl PoolConfig {
    /// Square window with equal stride on both axes and no padding.
    pub fn square(window: usize, stride: usize) -> Self {
        Self {
            window_width: window,
            window_height: window,
            stride_x: stride,
            stride_y: stride,
            pad_left: 0,
            pad_right: 0,
            pad_top: 0,
            pad_bottom: 0,
        }
    }

    /// Replace all four padding amounts.
    pub fn with_padding(self, left: usize, right: usize, top: usize, bottom: usize) -> Self {
        Self {
            pad_left: left,
            pad_right: right,
            pad_top: top,
            pad_bottom: bottom,
            ..self
        }
    }

    /// Same padding on every side.
    pub fn with_uniform_padding(self, pad: usize) -> Self {
        self.with_padding(pad, pad, pad, pad)
    }

    /// Nominal window area, `window_width * window_height`.
    pub fn window_size(&self) -> usize {
        self.window_width * self.window_height
    }

    /// Check structural invariants.
    ///
    /// Rejects zero window extents, zero strides, and any padding that
    /// is not strictly smaller than the window on its axis.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(PoolError::InvalidConfig {
                reason: format!(
                    "window must be non-empty, got {}x{}",
                    self.window_width, self.window_height
                ),
            });
        }
        if self.stride_x == 0 || self.stride_y == 0 {
            return Err(PoolError::InvalidConfig {
                reason: format!(
                    "stride must be > 0, got ({}, {})",
                    self.stride_x, self.stride_y
                ),
            });
        }
        let pads = [
            ("pad_left", self.pad_left, self.window_width),
            ("pad_right", self.pad_right, self.window_width),
            ("pad_top", self.pad_top, self.window_height),
            ("pad_bottom", self.pad_bottom, self.window_height),
        ];
        for (name, pad, window) in pads {
            if pad >= window {
                return Err(PoolError::InvalidConfig {
                    reason: format!(
                        "{name} ({pad}) must be smaller than the window extent ({window})"
                    ),
                });
            }
        }
        Ok(())
    }

    /// Pooled extent along x for an input of `width` columns.
    pub fn pooled_width(&self, width: usize) -> Option<usize> {
        pooled_extent(
            width,
            self.window_width,
            self.stride_x,
            self.pad_left,
            self.pad_right,
        )
    }

    /// Pooled extent along y for an input of `height` rows.
    pub fn pooled_height(&self, height: usize) -> Option<usize> {
        pooled_extent(
            height,
            self.window_height,
            self.stride_y,
            self.pad_top,
            self.pad_bottom,
        )
    }
}

/// Number of window positions along one axis.
///
/// `floor((input + pad_lo + pad_hi - window) / stride) + 1`, or `None`
/// when the padded input is smaller than the window. `stride` must be
/// non-zero.
pub fn pooled_extent(
    input: usize,
    window: usize,
    stride: usize,
    pad_lo: usize,
    pad_hi: usize,
) -> Option<usize> {
    let padded = input + pad_lo + pad_hi;
    padded.checked_sub(window).map(|span| span / stride + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_2x2_stride_2() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.window_size(), 4);
        assert_eq!((cfg.stride_x, cfg.stride_y), (2, 2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let cfg = PoolConfig {
            window_height: 0,
            ..PoolConfig::square(2, 1)
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("window must be non-empty"), "got: {err}");
    }

    #[test]
    fn zero_stride_is_rejected() {
        let err = PoolConfig::square(2, 0).validate().unwrap_err();
        assert!(err.to_string().contains("stride must be > 0"), "got: {err}");
    }

    #[test]
    fn padding_equal_to_window_is_rejected() {
        let cfg = PoolConfig::square(2, 1).with_padding(0, 2, 0, 0);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("pad_right"), "got: {err}");
    }

    #[test]
    fn asymmetric_padding_changes_each_axis_independently() {
        let cfg = PoolConfig::square(3, 1).with_padding(2, 0, 0, 1);
        assert_eq!(cfg.pooled_width(5), Some(5));
        assert_eq!(cfg.pooled_height(5), Some(4));
    }

    #[test]
    fn window_larger_than_padded_input_has_no_extent() {
        assert_eq!(pooled_extent(2, 4, 1, 1, 0), None);
        assert_eq!(pooled_extent(2, 4, 1, 1, 1), Some(1));
    }

    proptest! {
        #[test]
        fn extent_matches_floor_formula(
            input in 1usize..40,
            window in 1usize..8,
            stride in 1usize..5,
            pad_lo in 0usize..4,
            pad_hi in 0usize..4,
        ) {
            let padded = input + pad_lo + pad_hi;
            let got = pooled_extent(input, window, stride, pad_lo, pad_hi);
            if padded < window {
                prop_assert_eq!(got, None);
            } else {
                let n = got.unwrap();
                // Last window fits, one more would not.
                prop_assert!((n - 1) * stride + window <= padded);
                prop_assert!(n * stride + window > padded);
            }
        }
    }
}
