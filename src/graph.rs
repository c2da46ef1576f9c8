use std::collections::BTreeSet;

use crate::reader::iterator::EdgeIterator;
use crate::error::Result;
use crate::model::{BoundingBox, ChEdgeData, GeoPoint};
use crate::types::VertexId;

/// Capability surface of a routing-graph data source: vertex lookup,
/// edge lookup, adjacency, edge geometry, bounding-box enumeration and
/// profile membership, plus the mutation points a writable source would
/// implement.
///
/// "Missing" is a first-class result (`Ok(None)` / `Ok(false)`), never an
/// error. Read-only sources answer the mutation and whole-graph
/// enumeration methods with [`crate::error::GraphError::UnsupportedFeature`].
pub trait GraphSource {
    /// Location of a vertex, or `None` if the graph has no such vertex.
    fn vertex(&mut self, vertex: VertexId) -> Result<Option<GeoPoint>>;

    /// Directional payload of the arc between two vertices, regardless of
    /// which endpoint hosts it. The payload is returned exactly as
    /// stored; its forward fields describe traversal away from the
    /// hosting endpoint.
    fn edge(&mut self, from: VertexId, to: VertexId) -> Result<Option<ChEdgeData>>;

    /// Intermediate geometry of the arc between two vertices, in stored
    /// order. `Some(vec![])` when the arc exists but runs straight;
    /// `None` when there is no such arc.
    fn edge_shape(&mut self, from: VertexId, to: VertexId) -> Result<Option<Vec<GeoPoint>>>;

    /// Restartable iterator over the arcs hosted on `vertex`. Empty for
    /// unknown vertices.
    fn edges(&mut self, vertex: VertexId) -> Result<EdgeIterator>;

    /// Arcs with at least one endpoint inside the box's tile cover. Each
    /// unordered pair appears once.
    fn edges_in_box(
        &mut self,
        bounds: &BoundingBox,
    ) -> Result<Vec<(VertexId, VertexId, ChEdgeData)>>;

    /// Vertices inside the box's tile cover, ascending by id.
    fn vertices_in_box(&mut self, bounds: &BoundingBox) -> Result<Vec<VertexId>>;

    fn contains_vertex(&mut self, vertex: VertexId) -> Result<bool> {
        Ok(self.vertex(vertex)?.is_some())
    }

    fn contains_edge(&mut self, from: VertexId, to: VertexId) -> Result<bool> {
        Ok(self.edge(from, to)?.is_some())
    }

    /// Whether a named transportation profile is supported. Names are
    /// case-sensitive.
    fn supports_profile(&self, profile: &str) -> bool;

    /// The supported profile names, fixed at construction.
    fn profiles(&self) -> &BTreeSet<String>;

    /// Total number of vertices. Unsupported on block-paged sources (the
    /// format is not indexed for enumeration).
    fn vertex_count(&self) -> Result<u32>;

    /// All vertex ids. Unsupported on block-paged sources.
    fn vertices(&self) -> Result<Vec<VertexId>>;

    /// Register a profile. Unsupported on read-only sources.
    fn add_profile(&mut self, profile: &str) -> Result<()>;

    /// Register a turn restriction for a profile. Unsupported on
    /// read-only sources (the format never stores restrictions).
    fn add_restriction(&mut self, profile: &str, sequence: &[VertexId]) -> Result<()>;
}
