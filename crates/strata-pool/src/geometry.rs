//! Window geometry: pooled shape and clipped window bounds.
//!
//! [`WindowGeometry`] binds a [`VolumeShape`] to a validated
//! [`PoolConfig`] and answers, for each pooled position `(ox, oy)`,
//! which input rows and columns feed it after stride, padding, and
//! clipping to the real input.

use strata_core::{PoolError, VolumeShape};

use crate::config::PoolConfig;

/// Clipped input window for one pooled position.
///
/// Half-open ranges `x_start..x_end` and `y_start..y_end`, always
/// inside the input and never empty for a validated geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowBounds {
    /// First valid column.
    pub x_start: usize,
    /// One past the last valid column.
    pub x_end: usize,
    /// First valid row.
    pub y_start: usize,
    /// One past the last valid row.
    pub y_end: usize,
}

impl WindowBounds {
    /// Number of valid input cells in the window.
    ///
    /// This is the AVG divisor; padding never counts.
    pub fn area(&self) -> usize {
        (self.x_end - self.x_start) * (self.y_end - self.y_start)
    }

    /// Flat in-slice offsets of the valid cells, in scan order
    /// (rows outer, columns inner).
    ///
    /// Every kernel visits windows in this order, which is what makes
    /// the first-maximum tie-break agree between code paths.
    pub fn offsets(&self, width: usize) -> impl Iterator<Item = usize> + '_ {
        (self.y_start..self.y_end)
            .flat_map(move |y| (self.x_start..self.x_end).map(move |x| y * width + x))
    }
}

/// Validated pooling geometry for one input shape.
///
/// # Examples
///
/// ```
/// use strata_core::VolumeShape;
/// use strata_pool::{PoolConfig, WindowGeometry};
///
/// let shape = VolumeShape::new(4, 4, 1).unwrap();
/// let geom = WindowGeometry::new(shape, PoolConfig::square(2, 2)).unwrap();
/// assert_eq!((geom.pooled_width(), geom.pooled_height()), (2, 2));
///
/// let b = geom.window(1, 0);
/// assert_eq!((b.x_start, b.x_end, b.y_start, b.y_end), (2, 4, 0, 2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    shape: VolumeShape,
    config: PoolConfig,
    pooled_width: usize,
    pooled_height: usize,
}

impl WindowGeometry {
    /// Validate `config` against `shape` and derive the pooled extent.
    pub fn new(shape: VolumeShape, config: PoolConfig) -> Result<Self, PoolError> {
        shape.validate()?;
        config.validate()?;
        let pooled_width = config
            .pooled_width(shape.width)
            .ok_or(PoolError::EmptyOutput {
                input: shape.width + config.pad_left + config.pad_right,
                window: config.window_width,
            })?;
        let pooled_height = config
            .pooled_height(shape.height)
            .ok_or(PoolError::EmptyOutput {
                input: shape.height + config.pad_top + config.pad_bottom,
                window: config.window_height,
            })?;
        Ok(Self {
            shape,
            config,
            pooled_width,
            pooled_height,
        })
    }

    /// Geometry over a single `width × height` slice.
    pub fn spatial(width: usize, height: usize, config: PoolConfig) -> Result<Self, PoolError> {
        Self::new(VolumeShape::new(width, height, 1)?, config)
    }

    /// Input volume shape.
    pub fn shape(&self) -> VolumeShape {
        self.shape
    }

    /// Pooling parameters.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Pooled extent along x.
    pub fn pooled_width(&self) -> usize {
        self.pooled_width
    }

    /// Pooled extent along y.
    pub fn pooled_height(&self) -> usize {
        self.pooled_height
    }

    /// Pooled positions per depth slice.
    pub fn pooled_slice_len(&self) -> usize {
        self.pooled_width * self.pooled_height
    }

    /// Shape of the pooled volume (depth unchanged).
    pub fn pooled_shape(&self) -> VolumeShape {
        VolumeShape {
            width: self.pooled_width,
            height: self.pooled_height,
            depth: self.shape.depth,
        }
    }

    /// Same spatial geometry over a different channel count.
    pub fn with_depth(&self, depth: usize) -> Self {
        Self {
            shape: self.shape.with_depth(depth),
            ..*self
        }
    }

    /// Clipped input window feeding pooled position `(ox, oy)`.
    pub fn window(&self, ox: usize, oy: usize) -> WindowBounds {
        debug_assert!(ox < self.pooled_width && oy < self.pooled_height);
        let c = &self.config;
        let (x_start, x_end) =
            clip_axis(ox * c.stride_x, c.window_width, c.pad_left, self.shape.width);
        let (y_start, y_end) =
            clip_axis(oy * c.stride_y, c.window_height, c.pad_top, self.shape.height);
        WindowBounds {
            x_start,
            x_end,
            y_start,
            y_end,
        }
    }

    /// All windows in pooled row-major order, paired with their flat
    /// in-slice pooled offset.
    pub fn windows(&self) -> impl Iterator<Item = (usize, WindowBounds)> + '_ {
        (0..self.pooled_height).flat_map(move |oy| {
            (0..self.pooled_width).map(move |ox| (oy * self.pooled_width + ox, self.window(ox, oy)))
        })
    }
}

/// Clip the padded window `[origin - pad, origin - pad + window)` to
/// `[0, extent)`. Coordinates stay unsigned: `origin` is measured in
/// padded space and the padding is subtracted with saturation.
fn clip_axis(origin: usize, window: usize, pad: usize, extent: usize) -> (usize, usize) {
    let start = origin.saturating_sub(pad);
    let end = (origin + window).saturating_sub(pad).min(extent);
    (start, end)
}
