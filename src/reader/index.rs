use std::collections::HashMap;

use crate::error::{GraphError, Result};
use crate::types::TileId;

/// Prefix-sum location index over one zone of the backing stream.
/// Element `i` is the cumulative byte length of blocks `0..=i` relative
/// to the zone's base offset; adjacent differences recover individual
/// block slices.
pub(crate) struct BlockLocationIndex {
    base: u64,
    cumulative: Vec<u64>,
}

impl BlockLocationIndex {
    pub(crate) fn new(base: i64, cumulative: Vec<u64>) -> Result<Self> {
        let base = u64::try_from(base)
            .map_err(|_| GraphError::InvalidArgument("zone offset is negative".into()))?;
        if cumulative.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(GraphError::InvalidArgument(
                "location index is not non-decreasing".into(),
            ));
        }
        Ok(Self { base, cumulative })
    }

    /// Number of blocks the zone holds.
    pub(crate) fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Stream slice `(offset, length)` of block `ordinal`.
    ///
    /// Ordinals at or past `len()` violate the caller contract: the
    /// ordinal must come from a vertex id the graph actually stores.
    pub(crate) fn resolve(&self, ordinal: u32) -> Result<(u64, u64)> {
        let i = ordinal as usize;
        debug_assert!(i < self.cumulative.len(), "block ordinal out of range");
        if i >= self.cumulative.len() {
            return Err(GraphError::Corruption(format!(
                "block ordinal {ordinal} beyond location index"
            )));
        }
        let end = self.cumulative[i];
        let start = if i == 0 { 0 } else { self.cumulative[i - 1] };
        Ok((self.base + start, end - start))
    }
}

/// Tile-id to stream-slice mapping for the regions zone, built once at
/// construction from the parallel `(tile_ids, cumulative)` arrays.
pub(crate) struct RegionLocationIndex {
    slices: HashMap<TileId, (u64, u64)>,
}

impl RegionLocationIndex {
    pub(crate) fn new(base: i64, tile_ids: &[TileId], cumulative: &[u64]) -> Result<Self> {
        let base = u64::try_from(base)
            .map_err(|_| GraphError::InvalidArgument("zone offset is negative".into()))?;
        if tile_ids.len() != cumulative.len() {
            return Err(GraphError::InvalidArgument(
                "region index arrays differ in length".into(),
            ));
        }
        let mut slices = HashMap::with_capacity(tile_ids.len());
        let mut previous = 0u64;
        for (tile, &end) in tile_ids.iter().zip(cumulative) {
            if end < previous {
                return Err(GraphError::InvalidArgument(
                    "region location index is not non-decreasing".into(),
                ));
            }
            if slices.insert(*tile, (base + previous, end - previous)).is_some() {
                return Err(GraphError::InvalidArgument(format!(
                    "duplicate tile {tile} in region index"
                )));
            }
            previous = end;
        }
        Ok(Self { slices })
    }

    /// Stream slice of the region record for `tile`, if the tile holds
    /// any vertices.
    pub(crate) fn locate(&self, tile: TileId) -> Option<(u64, u64)> {
        self.slices.get(&tile).copied()
    }
}
