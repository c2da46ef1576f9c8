use std::io::{Read, Seek, SeekFrom};

use crate::error::{GraphError, Result};
use crate::format;
use crate::model::{Block, BlockShapes, Region};

/// Pull one record's bytes out of the backing stream. Seeks to `offset`,
/// reads exactly `len` bytes, and inflates them when the owning zone is
/// compressed. Never scans beyond the requested slice.
fn read_slice<S: Read + Seek>(
    stream: &mut S,
    offset: u64,
    len: u64,
    compressed: bool,
) -> Result<Vec<u8>> {
    let len = usize::try_from(len)
        .map_err(|_| GraphError::Corruption("record length exceeds address space".into()))?;
    stream.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    if compressed {
        buf = zstd::decode_all(buf.as_slice())
            .map_err(|e| GraphError::Corruption(format!("zstd decode failed: {e}")))?;
    }
    Ok(buf)
}

pub(crate) fn read_block<S: Read + Seek>(
    stream: &mut S,
    offset: u64,
    len: u64,
    compressed: bool,
) -> Result<Block> {
    let bytes = read_slice(stream, offset, len, compressed)?;
    format::decode_block(&bytes)
}

pub(crate) fn read_shapes<S: Read + Seek>(
    stream: &mut S,
    offset: u64,
    len: u64,
    compressed: bool,
) -> Result<BlockShapes> {
    let bytes = read_slice(stream, offset, len, compressed)?;
    format::decode_shapes(&bytes)
}

pub(crate) fn read_region<S: Read + Seek>(
    stream: &mut S,
    offset: u64,
    len: u64,
    compressed: bool,
) -> Result<Region> {
    let bytes = read_slice(stream, offset, len, compressed)?;
    format::decode_region(&bytes)
}
