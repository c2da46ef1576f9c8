use std::fmt;

/// Identifier of a vertex in the routing graph. 0 is a valid id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VertexId(pub u32);

/// First vertex id of a block: a vertex id rounded down to a multiple of
/// the block size.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct BlockId(pub u32);

/// Identifier of a map tile at a fixed zoom level. Equality with the
/// region-index keys is bit-exact.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TileId(pub u64);

impl BlockId {
    /// Block holding `vertex` for the given block size.
    ///
    /// `block_size` must be non-zero; the reader validates it at
    /// construction.
    pub fn containing(vertex: VertexId, block_size: u32) -> Self {
        BlockId(vertex.0 - vertex.0 % block_size)
    }

    /// Position of this block in the location index.
    pub fn ordinal(self, block_size: u32) -> u32 {
        self.0 / block_size
    }

    /// Offset of `vertex` within this block's vertex array.
    pub fn slot_of(self, vertex: VertexId) -> usize {
        (vertex.0 - self.0) as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VertexId {
    fn from(value: u32) -> Self {
        VertexId(value)
    }
}

impl From<VertexId> for u32 {
    fn from(value: VertexId) -> Self {
        value.0
    }
}
