//! Block-paged reader over a serialized contraction-hierarchy routing
//! graph.
//!
//! The backing stream holds three zones the reader consumes (tile
//! regions, vertex blocks, shape blocks), located through prefix-sum
//! indices supplied at construction. Every lookup goes through one of
//! three fixed-capacity LRU caches; a miss costs exactly one seek+read
//! of the record's slice. The reader owns its stream and caches
//! exclusively and is meant for serial use; parallel callers construct
//! independent readers over independent handles.

mod cache;
mod deser;
mod index;
pub mod iterator;

use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::sync::Arc;

use tracing::trace;

use crate::config::ReaderConfig;
use crate::error::{GraphError, Result};
use crate::graph::GraphSource;
use crate::metrics::ReaderMetrics;
use crate::model::{Block, BlockShapes, BoundingBox, ChEdgeData, GeoPoint, Region};
use crate::tiles::TileRange;
use crate::types::{BlockId, TileId, VertexId};

use self::cache::RecordCache;
use self::index::{BlockLocationIndex, RegionLocationIndex};
use self::iterator::{AdjacentEdge, EdgeIterator};

/// Per-zone compression flags. A flagged zone stores every record as one
/// zstd frame; unflagged zones store raw record bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoneCompression {
    pub regions: bool,
    pub blocks: bool,
    pub shapes: bool,
}

/// Where everything lives inside the backing stream: the first byte of
/// each zone, the prefix-sum location indices, and the two serialization
/// constants (`block_size`, `zoom`) the records were written with.
#[derive(Clone, Debug)]
pub struct StreamLayout {
    pub start_of_regions: i64,
    pub start_of_blocks: i64,
    pub start_of_shapes: i64,
    pub block_size: u32,
    pub zoom: i32,
    /// Tile ids of the stored regions, parallel to `region_locations`.
    pub region_tile_ids: Vec<TileId>,
    /// Cumulative region byte lengths relative to `start_of_regions`.
    pub region_locations: Vec<u64>,
    /// Cumulative block byte lengths relative to `start_of_blocks`.
    pub block_locations: Vec<u64>,
    /// Cumulative shape-block byte lengths relative to `start_of_shapes`.
    pub shape_locations: Vec<u64>,
    pub compression: ZoneCompression,
}

/// Read-only, block-paged source for a contraction-hierarchy routing
/// graph persisted in a single seekable stream.
///
/// `T` is the external tag-collection index the arcs' `tags` values
/// point into; the reader passes it through untouched.
pub struct ChGraphReader<S: Read + Seek, T> {
    stream: S,
    block_size: u32,
    zoom: i32,
    blocks: BlockLocationIndex,
    shapes: BlockLocationIndex,
    regions: RegionLocationIndex,
    compression: ZoneCompression,
    block_cache: RecordCache<BlockId, Block>,
    shape_cache: RecordCache<BlockId, BlockShapes>,
    region_cache: RecordCache<TileId, Region>,
    profiles: BTreeSet<String>,
    tags: Arc<T>,
    metrics: ReaderMetrics,
}

impl<S: Read + Seek, T> ChGraphReader<S, T> {
    /// Open a reader with default cache sizes. The stream is owned for
    /// the reader's lifetime and released on drop.
    pub fn new(
        stream: S,
        layout: StreamLayout,
        profiles: impl IntoIterator<Item = String>,
        tags: Arc<T>,
    ) -> Result<Self> {
        Self::with_config(stream, layout, profiles, tags, ReaderConfig::default())
    }

    pub fn with_config(
        stream: S,
        layout: StreamLayout,
        profiles: impl IntoIterator<Item = String>,
        tags: Arc<T>,
        config: ReaderConfig,
    ) -> Result<Self> {
        if layout.block_size == 0 {
            return Err(GraphError::InvalidArgument(
                "block size must be non-zero".into(),
            ));
        }
        if !(0..=30).contains(&layout.zoom) {
            return Err(GraphError::InvalidArgument(format!(
                "zoom {} outside the supported 0..=30 range",
                layout.zoom
            )));
        }
        if layout.block_locations.len() != layout.shape_locations.len() {
            return Err(GraphError::InvalidArgument(
                "block and shape location indices differ in length".into(),
            ));
        }
        let blocks = BlockLocationIndex::new(layout.start_of_blocks, layout.block_locations)?;
        let shapes = BlockLocationIndex::new(layout.start_of_shapes, layout.shape_locations)?;
        let regions = RegionLocationIndex::new(
            layout.start_of_regions,
            &layout.region_tile_ids,
            &layout.region_locations,
        )?;
        Ok(Self {
            stream,
            block_size: layout.block_size,
            zoom: layout.zoom,
            blocks,
            shapes,
            regions,
            compression: layout.compression,
            block_cache: RecordCache::new(config.block_cache_size),
            shape_cache: RecordCache::new(config.shape_cache_size),
            region_cache: RecordCache::new(config.region_cache_size),
            profiles: profiles.into_iter().collect(),
            tags,
            metrics: ReaderMetrics::default(),
        })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    /// The external tag-collection index, exposed unchanged.
    pub fn tags(&self) -> &Arc<T> {
        &self.tags
    }

    /// Snapshot of the read-path counters.
    pub fn metrics(&self) -> ReaderMetrics {
        self.metrics
    }

    /// Location of a vertex, or `None` when the graph has no such vertex
    /// (unknown block ordinal, or a slot past the block's vertex count).
    pub fn vertex(&mut self, vertex: VertexId) -> Result<Option<GeoPoint>> {
        let block_id = BlockId::containing(vertex, self.block_size);
        let Some(block) = self.block(block_id)? else {
            return Ok(None);
        };
        Ok(block
            .vertices
            .get(block_id.slot_of(vertex))
            .map(|v| v.location))
    }

    /// Arc payload between two vertices.
    ///
    /// The serialization stores a directed arc once, on whichever
    /// endpoint owns it, so the search probes `from`'s block first and
    /// falls back to `to`'s. The payload is returned as stored; its
    /// directional fields are never flipped here.
    pub fn edge(&mut self, from: VertexId, to: VertexId) -> Result<Option<ChEdgeData>> {
        if let Some((_, _, data)) = self.locate_arc(from, to)? {
            return Ok(Some(data));
        }
        Ok(self.locate_arc(to, from)?.map(|(_, _, data)| data))
    }

    /// Intermediate geometry of the arc between two vertices, in stored
    /// order (never reversed). `Some(vec![])` when the arc exists with no
    /// intermediates; `None` when there is no such arc.
    pub fn edge_shape(&mut self, from: VertexId, to: VertexId) -> Result<Option<Vec<GeoPoint>>> {
        let located = match self.locate_arc(from, to)? {
            Some(hit) => Some(hit),
            None => self.locate_arc(to, from)?,
        };
        let Some((block_id, arc_slot, _)) = located else {
            return Ok(None);
        };
        let shapes = self.shape_block(block_id)?;
        let entry = shapes.arcs.get(arc_slot).ok_or_else(|| {
            GraphError::Corruption("shape record shorter than block arc array".into())
        })?;
        Ok(Some(entry.clone().unwrap_or_default()))
    }

    pub fn contains_edge(&mut self, from: VertexId, to: VertexId) -> Result<bool> {
        Ok(self.edge(from, to)?.is_some())
    }

    pub fn contains_vertex(&mut self, vertex: VertexId) -> Result<bool> {
        Ok(self.vertex(vertex)?.is_some())
    }

    /// Restartable iterator over the arcs hosted on `vertex`, with each
    /// arc's intermediate geometry attached. Empty for unknown vertices.
    pub fn edges(&mut self, vertex: VertexId) -> Result<EdgeIterator> {
        let block_id = BlockId::containing(vertex, self.block_size);
        let Some(block) = self.block(block_id)? else {
            return Ok(EdgeIterator::empty());
        };
        let Some(v) = block.vertices.get(block_id.slot_of(vertex)).copied() else {
            return Ok(EdgeIterator::empty());
        };
        let start = v.arc_index as usize;
        let arcs = block.arcs[start..start + v.arc_count as usize].to_vec();

        let shapes = self.shape_block(block_id)?;
        let mut entries = Vec::with_capacity(arcs.len());
        for (i, arc) in arcs.iter().enumerate() {
            let shape = shapes.arcs.get(start + i).ok_or_else(|| {
                GraphError::Corruption("shape record shorter than block arc array".into())
            })?;
            entries.push(AdjacentEdge {
                neighbour: arc.target,
                data: arc.data,
                intermediates: shape.clone(),
            });
        }
        Ok(EdgeIterator::new(entries))
    }

    /// Arcs with at least one endpoint inside the box's tile cover.
    ///
    /// For endpoints `v` (in cover) and `u`, a pair is emitted from `v`
    /// when `v < u` or when `u` lies outside the cover; the first rule
    /// emits each in-cover pair exactly once, the second keeps
    /// boundary-crossing arcs without double-counting them.
    pub fn edges_in_box(
        &mut self,
        bounds: &BoundingBox,
    ) -> Result<Vec<(VertexId, VertexId, ChEdgeData)>> {
        let inside = self.gather_box_vertices(bounds)?;
        let mut out = Vec::new();
        for &v in &inside {
            for entry in self.edges(v)? {
                let u = entry.neighbour;
                if v < u || !inside.contains(&u) {
                    out.push((v, u, entry.data));
                }
            }
        }
        Ok(out)
    }

    /// Vertices inside the box's tile cover, ascending by id.
    pub fn vertices_in_box(&mut self, bounds: &BoundingBox) -> Result<Vec<VertexId>> {
        Ok(self.gather_box_vertices(bounds)?.into_iter().collect())
    }

    pub fn supports_profile(&self, profile: &str) -> bool {
        self.profiles.contains(profile)
    }

    pub fn profiles(&self) -> &BTreeSet<String> {
        &self.profiles
    }

    fn gather_box_vertices(&mut self, bounds: &BoundingBox) -> Result<BTreeSet<VertexId>> {
        let mut inside = BTreeSet::new();
        for tile in TileRange::covering(bounds, self.zoom) {
            if let Some(region) = self.region(tile.id())? {
                inside.extend(region.vertices.iter().copied());
            }
        }
        Ok(inside)
    }

    /// Arc from `from` to `to` stored in `from`'s block, as
    /// `(block, arc slot, payload)`.
    fn locate_arc(
        &mut self,
        from: VertexId,
        to: VertexId,
    ) -> Result<Option<(BlockId, usize, ChEdgeData)>> {
        let block_id = BlockId::containing(from, self.block_size);
        let Some(block) = self.block(block_id)? else {
            return Ok(None);
        };
        let Some(vertex) = block.vertices.get(block_id.slot_of(from)) else {
            return Ok(None);
        };
        let start = vertex.arc_index as usize;
        let window = &block.arcs[start..start + vertex.arc_count as usize];
        for (i, arc) in window.iter().enumerate() {
            if arc.target == to {
                return Ok(Some((block_id, start + i, arc.data)));
            }
        }
        Ok(None)
    }

    /// Vertex block through the block cache; `None` when the ordinal is
    /// past the end of the location index.
    fn block(&mut self, block_id: BlockId) -> Result<Option<&Block>> {
        let ordinal = block_id.ordinal(self.block_size);
        if ordinal as usize >= self.blocks.len() {
            return Ok(None);
        }
        if self.block_cache.contains(&block_id) {
            self.metrics.block_hits += 1;
        } else {
            let (offset, len) = self.blocks.resolve(ordinal)?;
            let block =
                deser::read_block(&mut self.stream, offset, len, self.compression.blocks)?;
            trace!(block = block_id.0, offset, len, "reader.block_cache.miss");
            self.metrics.block_misses += 1;
            if self.block_cache.insert(block_id, block).is_some() {
                self.metrics.evictions += 1;
            }
        }
        Ok(self.block_cache.get(&block_id))
    }

    /// Shape block through the shape cache. The shape zone is parallel to
    /// the block zone, so every known block ordinal resolves.
    fn shape_block(&mut self, block_id: BlockId) -> Result<&BlockShapes> {
        if self.shape_cache.contains(&block_id) {
            self.metrics.shape_hits += 1;
        } else {
            let (offset, len) = self.shapes.resolve(block_id.ordinal(self.block_size))?;
            let shapes =
                deser::read_shapes(&mut self.stream, offset, len, self.compression.shapes)?;
            trace!(block = block_id.0, offset, len, "reader.shape_cache.miss");
            self.metrics.shape_misses += 1;
            if self.shape_cache.insert(block_id, shapes).is_some() {
                self.metrics.evictions += 1;
            }
        }
        Ok(self
            .shape_cache
            .get(&block_id)
            .expect("shape block just cached"))
    }

    /// Region record through the region cache; `None` for tiles with no
    /// record (no vertices there).
    fn region(&mut self, tile: TileId) -> Result<Option<&Region>> {
        if self.region_cache.contains(&tile) {
            self.metrics.region_hits += 1;
        } else {
            let Some((offset, len)) = self.regions.locate(tile) else {
                trace!(tile = tile.0, "reader.region.absent");
                return Ok(None);
            };
            let region =
                deser::read_region(&mut self.stream, offset, len, self.compression.regions)?;
            trace!(tile = tile.0, offset, len, "reader.region_cache.miss");
            self.metrics.region_misses += 1;
            if self.region_cache.insert(tile, region).is_some() {
                self.metrics.evictions += 1;
            }
        }
        Ok(self.region_cache.get(&tile))
    }
}

impl<S: Read + Seek, T> GraphSource for ChGraphReader<S, T> {
    fn vertex(&mut self, vertex: VertexId) -> Result<Option<GeoPoint>> {
        ChGraphReader::vertex(self, vertex)
    }

    fn edge(&mut self, from: VertexId, to: VertexId) -> Result<Option<ChEdgeData>> {
        ChGraphReader::edge(self, from, to)
    }

    fn edge_shape(&mut self, from: VertexId, to: VertexId) -> Result<Option<Vec<GeoPoint>>> {
        ChGraphReader::edge_shape(self, from, to)
    }

    fn edges(&mut self, vertex: VertexId) -> Result<EdgeIterator> {
        ChGraphReader::edges(self, vertex)
    }

    fn edges_in_box(
        &mut self,
        bounds: &BoundingBox,
    ) -> Result<Vec<(VertexId, VertexId, ChEdgeData)>> {
        ChGraphReader::edges_in_box(self, bounds)
    }

    fn vertices_in_box(&mut self, bounds: &BoundingBox) -> Result<Vec<VertexId>> {
        ChGraphReader::vertices_in_box(self, bounds)
    }

    fn supports_profile(&self, profile: &str) -> bool {
        ChGraphReader::supports_profile(self, profile)
    }

    fn profiles(&self) -> &BTreeSet<String> {
        ChGraphReader::profiles(self)
    }

    fn vertex_count(&self) -> Result<u32> {
        Err(GraphError::UnsupportedFeature(
            "vertex counting on a block-paged graph",
        ))
    }

    fn vertices(&self) -> Result<Vec<VertexId>> {
        Err(GraphError::UnsupportedFeature(
            "vertex enumeration on a block-paged graph",
        ))
    }

    fn add_profile(&mut self, _profile: &str) -> Result<()> {
        Err(GraphError::UnsupportedFeature(
            "profile registration on a read-only graph",
        ))
    }

    fn add_restriction(&mut self, _profile: &str, _sequence: &[VertexId]) -> Result<()> {
        Err(GraphError::UnsupportedFeature(
            "turn restrictions on a read-only graph",
        ))
    }
}
