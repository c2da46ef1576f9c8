use crate::types::VertexId;

/// Decoded geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }
}

/// Geographic bounding box, degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box spanning two corners, in either order.
    pub fn from_corners(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Self {
        Self {
            min_lat: lat1.min(lat2),
            min_lon: lon1.min(lon2),
            max_lat: lat1.max(lat2),
            max_lon: lon1.max(lon2),
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        let lat = f64::from(point.lat);
        let lon = f64::from(point.lon);
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Directional payload of a contraction-hierarchy arc.
///
/// `forward_*` fields describe traversal from the hosting vertex toward
/// the target, `backward_*` the opposite direction. Either weight may be
/// infinite to denote one-way. The contracted ids name the vertex a
/// shortcut bypasses; search engines use them to unpack shortcuts into
/// the underlying arc pair. `tags` indexes an external tag table and is
/// opaque here.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChEdgeData {
    pub forward_weight: f32,
    pub backward_weight: f32,
    pub forward_contracted: VertexId,
    pub backward_contracted: VertexId,
    pub direction: u8,
    pub tags: u32,
}

impl ChEdgeData {
    /// The same arc as seen from its target: the forward/backward weight
    /// and contracted-id pairs swap. `direction` and `tags` carry over
    /// unchanged, matching the serializer convention.
    pub fn reversed(&self) -> Self {
        Self {
            forward_weight: self.backward_weight,
            backward_weight: self.forward_weight,
            forward_contracted: self.backward_contracted,
            backward_contracted: self.forward_contracted,
            direction: self.direction,
            tags: self.tags,
        }
    }
}

/// One stored arc: target vertex plus directional payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChArc {
    pub target: VertexId,
    pub data: ChEdgeData,
}

/// One stored vertex: location plus the `[arc_index, arc_index + arc_count)`
/// window into the owning block's arc array.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub location: GeoPoint,
    pub arc_index: u32,
    pub arc_count: u32,
}

/// A contiguous slab of up to `block_size` consecutive vertex ids with
/// their outgoing arcs. The final block of a graph may be shorter.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    pub vertices: Vec<Vertex>,
    pub arcs: Vec<ChArc>,
}

/// Intermediate polylines for the arcs of the matching [`Block`], in the
/// same order. `None` means the arc runs straight between its endpoints.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct BlockShapes {
    pub arcs: Vec<Option<Vec<GeoPoint>>>,
}

/// Vertex ids whose coordinates fall inside one map tile. Tiles without
/// vertices have no region record at all.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub vertices: Vec<VertexId>,
}
