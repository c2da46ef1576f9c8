#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use rumbo::format;
use rumbo::{
    Block, BlockShapes, ChArc, ChEdgeData, ChGraphReader, GeoPoint, ReaderConfig, Region,
    StreamLayout, Tile, TileId, Vertex, VertexId, ZoneCompression,
};

pub fn vertex(lat: f32, lon: f32, arc_index: u32, arc_count: u32) -> Vertex {
    Vertex {
        location: GeoPoint::new(lat, lon),
        arc_index,
        arc_count,
    }
}

pub fn arc(target: u32, fwd: f32, bwd: f32) -> ChArc {
    arc_full(target, fwd, bwd, 0, 0, 0, 0)
}

pub fn arc_full(
    target: u32,
    fwd: f32,
    bwd: f32,
    fwd_contracted: u32,
    bwd_contracted: u32,
    direction: u8,
    tags: u32,
) -> ChArc {
    ChArc {
        target: VertexId(target),
        data: ChEdgeData {
            forward_weight: fwd,
            backward_weight: bwd,
            forward_contracted: VertexId(fwd_contracted),
            backward_contracted: VertexId(bwd_contracted),
            direction,
            tags,
        },
    }
}

/// Assembles a serialized graph stream the way the tile-set writer does:
/// a short preamble, then the regions zone, the blocks zone and the
/// shapes zone, with prefix-sum location indices over each.
pub struct StreamBuilder {
    block_size: u32,
    zoom: i32,
    compression: ZoneCompression,
    blocks: Vec<(Block, BlockShapes)>,
    regions: Vec<(TileId, Region)>,
}

impl StreamBuilder {
    pub fn new(block_size: u32, zoom: i32) -> Self {
        Self {
            block_size,
            zoom,
            compression: ZoneCompression::default(),
            blocks: Vec::new(),
            regions: Vec::new(),
        }
    }

    pub fn compressed(mut self) -> Self {
        self.compression = ZoneCompression {
            regions: true,
            blocks: true,
            shapes: true,
        };
        self
    }

    /// Append the next block ordinal. `shapes` defaults to "no arc has
    /// intermediates".
    pub fn push_block(&mut self, block: Block, shapes: Option<BlockShapes>) {
        let shapes = shapes.unwrap_or_else(|| BlockShapes {
            arcs: vec![None; block.arcs.len()],
        });
        assert_eq!(block.arcs.len(), shapes.arcs.len(), "shape record must parallel arcs");
        self.blocks.push((block, shapes));
    }

    pub fn push_region(&mut self, tile: TileId, vertices: Vec<u32>) {
        self.regions.push((
            tile,
            Region {
                vertices: vertices.into_iter().map(VertexId).collect(),
            },
        ));
    }

    /// Replace the region set with one derived from the pushed blocks:
    /// every vertex is filed under the tile its coordinates fall into.
    pub fn derive_regions(&mut self) {
        let mut by_tile: BTreeMap<TileId, Vec<VertexId>> = BTreeMap::new();
        for (ordinal, (block, _)) in self.blocks.iter().enumerate() {
            for (slot, v) in block.vertices.iter().enumerate() {
                let id = VertexId(ordinal as u32 * self.block_size + slot as u32);
                let tile = Tile::at(f64::from(v.location.lat), f64::from(v.location.lon), self.zoom);
                by_tile.entry(tile.id()).or_default().push(id);
            }
        }
        self.regions = by_tile
            .into_iter()
            .map(|(tile, vertices)| (tile, Region { vertices }))
            .collect();
    }

    pub fn build(&self) -> (Vec<u8>, StreamLayout) {
        let mut stream = vec![0u8; 16];

        let start_of_regions = stream.len() as i64;
        let mut regions = self.regions.clone();
        regions.sort_by_key(|(tile, _)| *tile);
        let mut region_tile_ids = Vec::with_capacity(regions.len());
        let mut region_locations = Vec::with_capacity(regions.len());
        let mut cumulative = 0u64;
        for (tile, region) in &regions {
            let bytes = self.record_bytes(
                format::encode_region(region).expect("encode region"),
                self.compression.regions,
            );
            cumulative += bytes.len() as u64;
            region_tile_ids.push(*tile);
            region_locations.push(cumulative);
            stream.extend_from_slice(&bytes);
        }

        let start_of_blocks = stream.len() as i64;
        let mut block_locations = Vec::with_capacity(self.blocks.len());
        cumulative = 0;
        for (block, _) in &self.blocks {
            let bytes = self.record_bytes(
                format::encode_block(block).expect("encode block"),
                self.compression.blocks,
            );
            cumulative += bytes.len() as u64;
            block_locations.push(cumulative);
            stream.extend_from_slice(&bytes);
        }

        let start_of_shapes = stream.len() as i64;
        let mut shape_locations = Vec::with_capacity(self.blocks.len());
        cumulative = 0;
        for (_, shapes) in &self.blocks {
            let bytes = self.record_bytes(
                format::encode_shapes(shapes).expect("encode shapes"),
                self.compression.shapes,
            );
            cumulative += bytes.len() as u64;
            shape_locations.push(cumulative);
            stream.extend_from_slice(&bytes);
        }

        let layout = StreamLayout {
            start_of_regions,
            start_of_blocks,
            start_of_shapes,
            block_size: self.block_size,
            zoom: self.zoom,
            region_tile_ids,
            region_locations,
            block_locations,
            shape_locations,
            compression: self.compression,
        };
        (stream, layout)
    }

    fn record_bytes(&self, raw: Vec<u8>, compressed: bool) -> Vec<u8> {
        if compressed {
            zstd::encode_all(raw.as_slice(), 0).expect("zstd encode")
        } else {
            raw
        }
    }
}

/// Midpoint of a tile's extent.
pub fn tile_center(tile: Tile) -> (f64, f64) {
    let b = tile.bounds();
    ((b.min_lat + b.max_lat) / 2.0, (b.min_lon + b.max_lon) / 2.0)
}

/// A box strictly inside one tile: its center plus a quarter of the
/// extent in every direction. Covers exactly that tile at the tile's
/// zoom.
pub fn inner_box(tile: Tile) -> rumbo::BoundingBox {
    let b = tile.bounds();
    let (lat, lon) = tile_center(tile);
    let lat_pad = (b.max_lat - b.min_lat) / 4.0;
    let lon_pad = (b.max_lon - b.min_lon) / 4.0;
    rumbo::BoundingBox::from_corners(lat - lat_pad, lon - lon_pad, lat + lat_pad, lon + lon_pad)
}

pub type MemReader = ChGraphReader<Cursor<Vec<u8>>, ()>;

pub fn open(bytes: Vec<u8>, layout: StreamLayout) -> MemReader {
    open_with_config(bytes, layout, ReaderConfig::default())
}

pub fn open_with_config(bytes: Vec<u8>, layout: StreamLayout, config: ReaderConfig) -> MemReader {
    ChGraphReader::with_config(
        Cursor::new(bytes),
        layout,
        ["car".to_string(), "bicycle".to_string()],
        Arc::new(()),
        config,
    )
    .expect("open reader")
}

/// File-backed variant; the returned `TempDir` keeps the file alive.
pub fn open_file(bytes: &[u8], layout: StreamLayout) -> (TempDir, ChGraphReader<File, ()>) {
    let dir = TempDir::new().expect("temp dir");
    let path: PathBuf = dir.path().join("graph.rumbo");
    let mut file = File::create(&path).expect("create stream file");
    file.write_all(bytes).expect("write stream");
    drop(file);
    let reader = ChGraphReader::new(
        File::open(&path).expect("open stream file"),
        layout,
        ["car".to_string()],
        Arc::new(()),
    )
    .expect("open reader");
    (dir, reader)
}
