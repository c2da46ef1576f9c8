pub mod config;
pub mod error;
pub mod format;
pub mod graph;
pub mod metrics;
pub mod model;
pub mod reader;
pub mod tiles;
pub mod types;

pub use crate::config::ReaderConfig;
pub use crate::error::{GraphError, Result};
pub use crate::graph::GraphSource;
pub use crate::metrics::ReaderMetrics;
pub use crate::model::{
    Block, BlockShapes, BoundingBox, ChArc, ChEdgeData, GeoPoint, Region, Vertex,
};
pub use crate::reader::iterator::{AdjacentEdge, EdgeIterator};
pub use crate::reader::{ChGraphReader, StreamLayout, ZoneCompression};
pub use crate::tiles::{Tile, TileRange};
pub use crate::types::{BlockId, TileId, VertexId};
