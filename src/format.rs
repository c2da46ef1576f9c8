//! Little-endian record codec for the three on-disk record kinds:
//! vertex blocks, shape blocks, and tile regions.
//!
//! The byte layout is a paired contract with the tile-set serializer:
//!
//! - `Block`: `[vertex_count:4]` then per vertex
//!   `[lat:4][lon:4][arc_index:4][arc_count:4]`, then `[arc_total:4]`
//!   then per arc `[target:4][fwd_weight:4][bwd_weight:4]
//!   [fwd_contracted:4][bwd_contracted:4][direction:1][tags:4]`.
//! - `BlockShapes`: `[arc_total:4]` then per arc `[point_count:4]`
//!   followed by `point_count × [lat:4][lon:4]`. A zero point count
//!   decodes to "no intermediates".
//! - `Region`: `[vertex_count:4]` then `vertex_count × [vertex_id:4]`;
//!   the count must be non-zero (empty tiles have no record).

use crate::error::{GraphError, Result};
use crate::model::{Block, BlockShapes, ChArc, ChEdgeData, GeoPoint, Region, Vertex};
use crate::types::VertexId;

pub fn encode_block(block: &Block) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_count(&mut buf, block.vertices.len(), "vertex")?;
    for vertex in &block.vertices {
        if vertex.arc_index as usize + vertex.arc_count as usize > block.arcs.len() {
            return Err(GraphError::InvalidArgument(
                "vertex arc window exceeds block arc array".into(),
            ));
        }
        buf.extend_from_slice(&vertex.location.lat.to_le_bytes());
        buf.extend_from_slice(&vertex.location.lon.to_le_bytes());
        buf.extend_from_slice(&vertex.arc_index.to_le_bytes());
        buf.extend_from_slice(&vertex.arc_count.to_le_bytes());
    }
    write_count(&mut buf, block.arcs.len(), "arc")?;
    for arc in &block.arcs {
        buf.extend_from_slice(&arc.target.0.to_le_bytes());
        buf.extend_from_slice(&arc.data.forward_weight.to_le_bytes());
        buf.extend_from_slice(&arc.data.backward_weight.to_le_bytes());
        buf.extend_from_slice(&arc.data.forward_contracted.0.to_le_bytes());
        buf.extend_from_slice(&arc.data.backward_contracted.0.to_le_bytes());
        buf.push(arc.data.direction);
        buf.extend_from_slice(&arc.data.tags.to_le_bytes());
    }
    Ok(buf)
}

pub fn decode_block(bytes: &[u8]) -> Result<Block> {
    let mut cursor = Cursor::new(bytes);

    let vertex_count = cursor.read_u32()? as usize;
    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let lat = cursor.read_f32()?;
        let lon = cursor.read_f32()?;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GraphError::Corruption(
                "non-finite vertex coordinate".into(),
            ));
        }
        let arc_index = cursor.read_u32()?;
        let arc_count = cursor.read_u32()?;
        vertices.push(Vertex {
            location: GeoPoint::new(lat, lon),
            arc_index,
            arc_count,
        });
    }

    let arc_total = cursor.read_u32()? as usize;
    let mut arcs = Vec::with_capacity(arc_total);
    for _ in 0..arc_total {
        let target = VertexId(cursor.read_u32()?);
        let forward_weight = cursor.read_f32()?;
        let backward_weight = cursor.read_f32()?;
        let forward_contracted = VertexId(cursor.read_u32()?);
        let backward_contracted = VertexId(cursor.read_u32()?);
        let direction = cursor.read_u8()?;
        let tags = cursor.read_u32()?;
        arcs.push(ChArc {
            target,
            data: ChEdgeData {
                forward_weight,
                backward_weight,
                forward_contracted,
                backward_contracted,
                direction,
                tags,
            },
        });
    }
    cursor.ensure_consumed()?;

    for vertex in &vertices {
        if vertex.arc_index as usize + vertex.arc_count as usize > arcs.len() {
            return Err(GraphError::Corruption(
                "vertex arc window exceeds block arc array".into(),
            ));
        }
    }

    Ok(Block { vertices, arcs })
}

pub fn encode_shapes(shapes: &BlockShapes) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_count(&mut buf, shapes.arcs.len(), "arc shape")?;
    for shape in &shapes.arcs {
        let points = shape.as_deref().unwrap_or(&[]);
        write_count(&mut buf, points.len(), "shape point")?;
        for point in points {
            buf.extend_from_slice(&point.lat.to_le_bytes());
            buf.extend_from_slice(&point.lon.to_le_bytes());
        }
    }
    Ok(buf)
}

pub fn decode_shapes(bytes: &[u8]) -> Result<BlockShapes> {
    let mut cursor = Cursor::new(bytes);

    let arc_total = cursor.read_u32()? as usize;
    let mut arcs = Vec::with_capacity(arc_total);
    for _ in 0..arc_total {
        let point_count = cursor.read_u32()? as usize;
        if point_count == 0 {
            arcs.push(None);
            continue;
        }
        let mut points = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            let lat = cursor.read_f32()?;
            let lon = cursor.read_f32()?;
            points.push(GeoPoint::new(lat, lon));
        }
        arcs.push(Some(points));
    }
    cursor.ensure_consumed()?;

    Ok(BlockShapes { arcs })
}

pub fn encode_region(region: &Region) -> Result<Vec<u8>> {
    if region.vertices.is_empty() {
        return Err(GraphError::InvalidArgument(
            "region records must hold at least one vertex".into(),
        ));
    }
    let mut buf = Vec::new();
    write_count(&mut buf, region.vertices.len(), "region vertex")?;
    for vertex in &region.vertices {
        buf.extend_from_slice(&vertex.0.to_le_bytes());
    }
    Ok(buf)
}

pub fn decode_region(bytes: &[u8]) -> Result<Region> {
    let mut cursor = Cursor::new(bytes);

    let vertex_count = cursor.read_u32()? as usize;
    if vertex_count == 0 {
        return Err(GraphError::Corruption("empty region record".into()));
    }
    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        vertices.push(VertexId(cursor.read_u32()?));
    }
    cursor.ensure_consumed()?;

    Ok(Region { vertices })
}

fn write_count(buf: &mut Vec<u8>, len: usize, what: &str) -> Result<()> {
    let count: u32 = len
        .try_into()
        .map_err(|_| GraphError::InvalidArgument(format!("{what} count exceeds u32::MAX")))?;
    buf.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

struct Cursor<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, index: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.index + len > self.data.len() {
            return Err(GraphError::Corruption("unexpected end of record".into()));
        }
        let start = self.index;
        self.index += len;
        Ok(&self.data[start..start + len])
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes: [u8; 4] = self
            .take(4)?
            .try_into()
            .expect("slice has exactly 4 bytes");
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let bytes: [u8; 4] = self
            .take(4)?
            .try_into()
            .expect("slice has exactly 4 bytes");
        Ok(f32::from_le_bytes(bytes))
    }

    fn ensure_consumed(&self) -> Result<()> {
        if self.index != self.data.len() {
            return Err(GraphError::Corruption(
                "trailing bytes after record payload".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(target: u32, fwd: f32, bwd: f32) -> ChArc {
        ChArc {
            target: VertexId(target),
            data: ChEdgeData {
                forward_weight: fwd,
                backward_weight: bwd,
                forward_contracted: VertexId(0),
                backward_contracted: VertexId(0),
                direction: 0,
                tags: 0,
            },
        }
    }

    #[test]
    fn block_round_trip() {
        let block = Block {
            vertices: vec![
                Vertex {
                    location: GeoPoint::new(50.0, 4.0),
                    arc_index: 0,
                    arc_count: 2,
                },
                Vertex {
                    location: GeoPoint::new(50.01, 4.01),
                    arc_index: 2,
                    arc_count: 0,
                },
            ],
            arcs: vec![arc(1, 10.0, f32::INFINITY), arc(2, 3.5, 3.5)],
        };
        let bytes = encode_block(&block).unwrap();
        assert_eq!(decode_block(&bytes).unwrap(), block);
    }

    #[test]
    fn empty_block_round_trip() {
        let block = Block::default();
        let bytes = encode_block(&block).unwrap();
        assert_eq!(decode_block(&bytes).unwrap(), block);
    }

    #[test]
    fn truncated_block_is_corruption() {
        let block = Block {
            vertices: vec![Vertex {
                location: GeoPoint::new(1.0, 2.0),
                arc_index: 0,
                arc_count: 0,
            }],
            arcs: Vec::new(),
        };
        let bytes = encode_block(&block).unwrap();
        let err = decode_block(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, GraphError::Corruption(_)));
    }

    #[test]
    fn trailing_bytes_are_corruption() {
        let mut bytes = encode_block(&Block::default()).unwrap();
        bytes.push(0);
        let err = decode_block(&bytes).unwrap_err();
        assert!(matches!(err, GraphError::Corruption(_)));
    }

    #[test]
    fn arc_window_outside_arcs_is_rejected() {
        let block = Block {
            vertices: vec![Vertex {
                location: GeoPoint::new(0.0, 0.0),
                arc_index: 1,
                arc_count: 1,
            }],
            arcs: vec![arc(1, 1.0, 1.0)],
        };
        assert!(encode_block(&block).is_err());

        // Same invariant on the decode side, from hand-built bytes:
        // one vertex claiming a five-arc window over an empty arc array.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0f32.to_le_bytes());
        bytes.extend_from_slice(&0f32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let err = decode_block(&bytes).unwrap_err();
        assert!(matches!(err, GraphError::Corruption(_)));
    }

    #[test]
    fn shapes_round_trip_preserves_absent_entries() {
        let shapes = BlockShapes {
            arcs: vec![
                None,
                Some(vec![GeoPoint::new(50.0, 4.0), GeoPoint::new(50.1, 4.1)]),
                None,
            ],
        };
        let bytes = encode_shapes(&shapes).unwrap();
        assert_eq!(decode_shapes(&bytes).unwrap(), shapes);
    }

    #[test]
    fn empty_polyline_decodes_as_absent() {
        let shapes = BlockShapes {
            arcs: vec![Some(Vec::new())],
        };
        let bytes = encode_shapes(&shapes).unwrap();
        assert_eq!(decode_shapes(&bytes).unwrap(), BlockShapes { arcs: vec![None] });
    }

    #[test]
    fn region_round_trip() {
        let region = Region {
            vertices: vec![VertexId(0), VertexId(3), VertexId(17)],
        };
        let bytes = encode_region(&region).unwrap();
        assert_eq!(decode_region(&bytes).unwrap(), region);
    }

    #[test]
    fn empty_region_is_rejected_both_ways() {
        assert!(encode_region(&Region { vertices: Vec::new() }).is_err());
        let err = decode_region(&0u32.to_le_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Corruption(_)));
    }
}
