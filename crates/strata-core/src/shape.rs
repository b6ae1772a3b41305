//! Dense volume shape.

use crate::error::PoolError;

/// Shape of a dense `width × height × depth` volume.
///
/// Storage order is width fastest, then height, then depth: element
/// `(x, y, z)` lives at `z * width * height + y * width + x`. Depth
/// slices are independent and never mixed by pooling.
///
/// # Examples
///
/// ```
/// use strata_core::VolumeShape;
///
/// let shape = VolumeShape::new(4, 3, 2).unwrap();
/// assert_eq!(shape.slice_len(), 12);
/// assert_eq!(shape.len(), 24);
/// assert_eq!(shape.offset(1, 2, 1), 12 + 2 * 4 + 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VolumeShape {
    /// Extent along x (fastest-varying).
    pub width: usize,
    /// Extent along y.
    pub height: usize,
    /// Number of independent channels.
    pub depth: usize,
}

impl VolumeShape {
    /// Create a shape, rejecting any zero extent.
    pub fn new(width: usize, height: usize, depth: usize) -> Result<Self, PoolError> {
        let shape = Self {
            width,
            height,
            depth,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Reject any zero extent.
    ///
    /// The fields are public, so a shape built with a struct literal
    /// has not been through [`VolumeShape::new`]; consumers that index
    /// into slices call this first.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(PoolError::EmptyVolume);
        }
        Ok(())
    }

    /// Elements in one depth slice.
    pub fn slice_len(&self) -> usize {
        self.width * self.height
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.slice_len() * self.depth
    }

    /// Whether the volume holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat offset of `(x, y, z)`.
    pub fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        z * self.slice_len() + y * self.width + x
    }

    /// Same spatial extent with a different channel count.
    pub fn with_depth(&self, depth: usize) -> Self {
        Self { depth, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_extent_is_rejected() {
        assert_eq!(VolumeShape::new(0, 4, 1), Err(PoolError::EmptyVolume));
        assert_eq!(VolumeShape::new(4, 0, 1), Err(PoolError::EmptyVolume));
        assert_eq!(VolumeShape::new(4, 4, 0), Err(PoolError::EmptyVolume));
    }

    #[test]
    fn literal_with_zero_extent_fails_validation() {
        let s = VolumeShape {
            width: 0,
            height: 4,
            depth: 1,
        };
        assert!(s.is_empty());
        assert_eq!(s.validate(), Err(PoolError::EmptyVolume));
        assert!(!VolumeShape::new(1, 1, 1).unwrap().is_empty());
    }

    #[test]
    fn with_depth_keeps_spatial_extent() {
        let s = VolumeShape::new(5, 7, 3).unwrap().with_depth(1);
        assert_eq!((s.width, s.height, s.depth), (5, 7, 1));
    }

    proptest! {
        #[test]
        fn offsets_are_dense_and_unique(w in 1usize..6, h in 1usize..6, d in 1usize..4) {
            let s = VolumeShape::new(w, h, d).unwrap();
            let mut seen = vec![false; s.len()];
            for z in 0..d {
                for y in 0..h {
                    for x in 0..w {
                        let o = s.offset(x, y, z);
                        prop_assert!(!seen[o]);
                        seen[o] = true;
                    }
                }
            }
            prop_assert!(seen.iter().all(|&b| b));
        }
    }
}
