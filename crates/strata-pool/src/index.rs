//! Precomputed index arrays and stage-to-stage composition.
//!
//! A [`PoolIndex`] lists, for every position of a grid, the flat
//! offsets into one depth slice of the *origin* volume that feed it.
//! Offsets are stored as `Option<u32>`: `None` marks an unused slot
//! (the window ran into padding), so a missing offset can never be
//! mistaken for cell 0.
//!
//! Composition builds the index of a pooling stage from the index of
//! the stage before it, so a chain of pooling layers can always be
//! traced straight back to the origin volume:
//!
//! ```text
//! identity(W, H) ──compose(cfg1)──▶ stage 1 ──compose(cfg2)──▶ stage 2 ...
//! ```
//!
//! For every new pooled position the clipped window is scanned rows
//! outer, columns inner, and each valid position contributes its
//! incoming slots in order. Valid slots are packed to the front; the
//! tail is `None`.
//!
//! - **AVG** keeps every copied offset, duplicates included, so the
//!   weight each origin cell carries through overlapping windows is
//!   preserved.
//! - **MAX** keeps only the first occurrence of each offset. The
//!   maximum over the list is unchanged, and so is the first maximal
//!   offset in scan order, so argmax routing matches a chain of
//!   geometric max-pool stages.

use strata_core::{PoolError, PoolMethod, VolumeShape};

use crate::config::PoolConfig;
use crate::geometry::WindowGeometry;

/// Dimensions of an index array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexLayout {
    /// Grid width (positions along x).
    pub width: usize,
    /// Grid height (positions along y).
    pub height: usize,
    /// Slots per position.
    pub window_size: usize,
    /// Size of one depth slice of the origin volume.
    pub data_size: usize,
}

impl IndexLayout {
    /// Positions in the grid (`pooledSize` for a composed index).
    pub fn positions(&self) -> usize {
        self.width * self.height
    }

    /// Total slot count, `positions() * window_size`.
    pub fn len(&self) -> usize {
        self.positions() * self.window_size
    }

    /// Whether the layout holds no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layout produced by composing `self` with one pooling stage.
    pub fn compose(&self, config: &PoolConfig) -> Result<IndexLayout, PoolError> {
        let geometry = WindowGeometry::spatial(self.width, self.height, *config)?;
        Ok(IndexLayout {
            width: geometry.pooled_width(),
            height: geometry.pooled_height(),
            window_size: config.window_size() * self.window_size,
            data_size: self.data_size,
        })
    }
}

/// Validated index array for the fast pooling path.
///
/// # Examples
///
/// ```
/// use strata_core::PoolMethod;
/// use strata_pool::{PoolConfig, PoolIndex};
///
/// let base = PoolIndex::identity(4, 4).unwrap();
/// let stage = base.compose(PoolMethod::Max, &PoolConfig::square(2, 2)).unwrap();
///
/// assert_eq!((stage.width(), stage.height()), (2, 2));
/// assert_eq!(stage.window_size(), 4);
/// assert_eq!(stage.slots_of(3), &[Some(10), Some(11), Some(14), Some(15)]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolIndex {
    layout: IndexLayout,
    slots: Vec<Option<u32>>,
}

impl PoolIndex {
    /// First-stage index: position `p` maps to origin offset `p`.
    pub fn identity(width: usize, height: usize) -> Result<Self, PoolError> {
        let data_size = VolumeShape::new(width, height, 1)?.slice_len();
        let last = u32::try_from(data_size).map_err(|_| PoolError::OffsetOverflow {
            value: data_size,
        })?;
        Ok(Self {
            layout: IndexLayout {
                width,
                height,
                window_size: 1,
                data_size,
            },
            slots: (0..last).map(Some).collect(),
        })
    }

    /// Single-stage index for pooling a `width × height` slice with
    /// `config`. Slot order equals the geometric scan order, so fast
    /// kernels driven by this index reproduce the geometric kernels
    /// exactly.
    pub fn for_window(width: usize, height: usize, config: &PoolConfig) -> Result<Self, PoolError> {
        Self::identity(width, height)?.compose(PoolMethod::Avg, config)
    }

    /// Compose a whole chain of stages starting from the identity.
    pub fn chain(
        width: usize,
        height: usize,
        stages: &[(PoolMethod, PoolConfig)],
    ) -> Result<Self, PoolError> {
        stages
            .iter()
            .try_fold(Self::identity(width, height)?, |index, (method, config)| {
                index.compose(*method, config)
            })
    }

    /// Wrap caller-built slots, checking length, offset range, and that
    /// every position has at least one valid slot.
    pub fn from_slots(layout: IndexLayout, slots: Vec<Option<u32>>) -> Result<Self, PoolError> {
        PoolError::check_len("slots", layout.len(), slots.len())?;
        if layout.positions() == 0 || layout.data_size == 0 {
            return Err(PoolError::EmptyVolume);
        }
        if layout.window_size == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "index window_size must be > 0".into(),
            });
        }
        for (slot, value) in slots.iter().enumerate() {
            if let Some(offset) = *value {
                if offset as usize >= layout.data_size {
                    return Err(PoolError::IndexOutOfRange {
                        slot,
                        offset,
                        data_size: layout.data_size,
                    });
                }
            }
        }
        if let Some(position) = slots
            .chunks_exact(layout.window_size)
            .position(|window| window.iter().all(Option::is_none))
        {
            return Err(PoolError::InvalidConfig {
                reason: format!("index position {position} has no valid slot"),
            });
        }
        Ok(Self { layout, slots })
    }

    /// Compose this index with one pooling stage.
    ///
    /// `self` describes the stage input; the result describes the
    /// pooled grid and still points into the origin volume.
    pub fn compose(&self, method: PoolMethod, config: &PoolConfig) -> Result<Self, PoolError> {
        let layout = self.layout.compose(config)?;
        let mut slots = vec![None; layout.len()];
        compose_into(&mut slots, self, method, config)?;
        log::debug!(
            "composed {method} index {}x{} -> {}x{} (window {} -> {})",
            self.layout.width,
            self.layout.height,
            layout.width,
            layout.height,
            self.layout.window_size,
            layout.window_size,
        );
        Ok(Self { layout, slots })
    }

    /// Dimensions of this index.
    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.layout.width
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.layout.height
    }

    /// Slots per position.
    pub fn window_size(&self) -> usize {
        self.layout.window_size
    }

    /// Origin depth-slice size the offsets point into.
    pub fn data_size(&self) -> usize {
        self.layout.data_size
    }

    /// Positions in the grid.
    pub fn pooled_size(&self) -> usize {
        self.layout.positions()
    }

    /// All slots, position-major.
    pub fn slots(&self) -> &[Option<u32>] {
        &self.slots
    }

    /// Slots of one grid position.
    pub fn slots_of(&self, position: usize) -> &[Option<u32>] {
        let ws = self.layout.window_size;
        &self.slots[position * ws..(position + 1) * ws]
    }

    /// Valid origin offsets of one position, in slot order.
    pub fn offsets_of(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        self.slots_of(position).iter().flatten().map(|&o| o as usize)
    }

    /// Iterate positions as slot windows.
    pub(crate) fn windows(&self) -> std::slice::ChunksExact<'_, Option<u32>> {
        self.slots.chunks_exact(self.layout.window_size)
    }
}

/// Compose `incoming` with one MAX pooling stage into `out`.
///
/// `out` must be sized to [`IndexLayout::compose`] of the incoming
/// layout. Returns that layout.
pub fn max_pooling_indices(
    out: &mut [Option<u32>],
    incoming: &PoolIndex,
    config: &PoolConfig,
) -> Result<IndexLayout, PoolError> {
    compose_into(out, incoming, PoolMethod::Max, config)
}

/// Compose `incoming` with one AVG pooling stage into `out`.
///
/// `out` must be sized to [`IndexLayout::compose`] of the incoming
/// layout. Returns that layout.
pub fn avg_pooling_indices(
    out: &mut [Option<u32>],
    incoming: &PoolIndex,
    config: &PoolConfig,
) -> Result<IndexLayout, PoolError> {
    compose_into(out, incoming, PoolMethod::Avg, config)
}

fn compose_into(
    out: &mut [Option<u32>],
    incoming: &PoolIndex,
    method: PoolMethod,
    config: &PoolConfig,
) -> Result<IndexLayout, PoolError> {
    let layout = incoming.layout.compose(config)?;
    PoolError::check_len("indices", layout.len(), out.len())?;
    let geometry = WindowGeometry::spatial(incoming.width(), incoming.height(), *config)?;
    let width = incoming.width();

    for ((_, bounds), dst) in geometry
        .windows()
        .zip(out.chunks_exact_mut(layout.window_size))
    {
        let mut filled = 0;
        for position in bounds.offsets(width) {
            for &slot in incoming.slots_of(position).iter().flatten() {
                if method == PoolMethod::Max && dst[..filled].contains(&Some(slot)) {
                    continue;
                }
                dst[filled] = Some(slot);
                filled += 1;
            }
        }
        dst[filled..].fill(None);
    }
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(index: &PoolIndex, position: usize) -> Vec<usize> {
        index.offsets_of(position).collect()
    }

    #[test]
    fn identity_maps_each_position_to_itself() {
        let id = PoolIndex::identity(3, 2).unwrap();
        assert_eq!(id.window_size(), 1);
        assert_eq!(id.data_size(), 6);
        for p in 0..6 {
            assert_eq!(valid(&id, p), vec![p]);
        }
    }

    #[test]
    fn padded_slots_are_none_and_packed_last() {
        let index = PoolIndex::for_window(2, 2, &PoolConfig::square(2, 1).with_uniform_padding(1))
            .unwrap();
        assert_eq!((index.width(), index.height()), (3, 3));
        // Top-left corner only reaches cell 0.
        assert_eq!(index.slots_of(0), &[Some(0), None, None, None]);
        // Centre sees everything.
        assert_eq!(valid(&index, 4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn avg_composition_keeps_duplicates_from_overlap() {
        // Row of 3, window 2 stride 1 twice: second stage covers
        // cells [0,1] and [1,2] -> 1 appears twice.
        let cfg = PoolConfig {
            window_height: 1,
            ..PoolConfig::square(2, 1)
        };
        let index = PoolIndex::chain(3, 1, &[(PoolMethod::Avg, cfg), (PoolMethod::Avg, cfg)])
            .unwrap();
        assert_eq!((index.width(), index.window_size()), (1, 4));
        assert_eq!(valid(&index, 0), vec![0, 1, 1, 2]);
    }

    #[test]
    fn max_composition_drops_duplicates() {
        let cfg = PoolConfig {
            window_height: 1,
            ..PoolConfig::square(2, 1)
        };
        let index = PoolIndex::chain(3, 1, &[(PoolMethod::Max, cfg), (PoolMethod::Max, cfg)])
            .unwrap();
        assert_eq!(index.window_size(), 4);
        assert_eq!(index.slots_of(0), &[Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn composition_reaches_origin_through_two_stages() {
        let cfg = PoolConfig::square(2, 2);
        let index = PoolIndex::chain(4, 4, &[(PoolMethod::Avg, cfg), (PoolMethod::Avg, cfg)])
            .unwrap();
        assert_eq!((index.width(), index.height(), index.window_size()), (1, 1, 16));
        let mut cells = valid(&index, 0);
        cells.sort_unstable();
        assert_eq!(cells, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn free_functions_fill_caller_buffer() {
        let id = PoolIndex::identity(4, 4).unwrap();
        let cfg = PoolConfig::square(2, 2);
        let layout = id.layout().compose(&cfg).unwrap();
        let mut max_out = vec![Some(99); layout.len()];
        let mut avg_out = vec![None; layout.len()];
        assert_eq!(max_pooling_indices(&mut max_out, &id, &cfg).unwrap(), layout);
        assert_eq!(avg_pooling_indices(&mut avg_out, &id, &cfg).unwrap(), layout);
        // Identity has no duplicates, so both variants agree.
        assert_eq!(max_out, avg_out);
        assert_eq!(&max_out[..4], &[Some(0), Some(1), Some(4), Some(5)]);
    }

    #[test]
    fn undersized_output_buffer_is_rejected() {
        let id = PoolIndex::identity(4, 4).unwrap();
        let mut out = vec![None; 3];
        let err = max_pooling_indices(&mut out, &id, &PoolConfig::square(2, 2)).unwrap_err();
        assert!(err.to_string().contains("indices length 3"), "got: {err}");
    }

    #[test]
    fn from_slots_validates_offsets_and_coverage() {
        let layout = IndexLayout {
            width: 2,
            height: 1,
            window_size: 2,
            data_size: 4,
        };
        let err = PoolIndex::from_slots(layout, vec![Some(0), Some(4), Some(1), None]).unwrap_err();
        assert_eq!(
            err,
            PoolError::IndexOutOfRange {
                slot: 1,
                offset: 4,
                data_size: 4
            }
        );

        let err = PoolIndex::from_slots(layout, vec![Some(0), None, None, None]).unwrap_err();
        assert!(err.to_string().contains("position 1"), "got: {err}");

        assert!(PoolIndex::from_slots(layout, vec![Some(3), None, Some(1), Some(2)]).is_ok());

        let empty = IndexLayout { width: 0, ..layout };
        assert_eq!(PoolIndex::from_slots(empty, vec![]), Err(PoolError::EmptyVolume));
    }
}
