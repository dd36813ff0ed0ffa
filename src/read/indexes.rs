use std::io::{Read, Seek, SeekFrom};

use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::{ColumnIndex, OffsetIndex, PageLocation};

use crate::error::{Error, Result};
use crate::indexes::{deserialize_column_index, Index};
use crate::metadata::ColumnChunkMetaData;

/// Reads the column index of one chunk; [`Error::MissingColumnIndex`] when
/// the chunk declares none.
pub fn read_column_index<R: Read + Seek>(
    reader: &mut R,
    chunk: &ColumnChunkMetaData,
) -> Result<Box<dyn Index>> {
    let (offset, length) = chunk.column_index_range().ok_or(Error::MissingColumnIndex)?;
    let index: ColumnIndex = read_thrift(reader, offset, length)?;
    deserialize_column_index(index, chunk.physical_type())
}

/// Reads the offset index of one chunk; [`Error::MissingOffsetIndex`] when
/// the chunk declares none.
pub fn read_offset_index<R: Read + Seek>(
    reader: &mut R,
    chunk: &ColumnChunkMetaData,
) -> Result<Vec<PageLocation>> {
    let (offset, length) = chunk.offset_index_range().ok_or(Error::MissingOffsetIndex)?;
    let index: OffsetIndex = read_thrift(reader, offset, length)?;
    Ok(index.page_locations)
}

trait ThriftRead: Sized {
    fn read<R: Read>(protocol: &mut TCompactInputProtocol<R>) -> Result<Self>;
}

impl ThriftRead for ColumnIndex {
    fn read<R: Read>(protocol: &mut TCompactInputProtocol<R>) -> Result<Self> {
        Ok(ColumnIndex::read_from_in_protocol(protocol)?)
    }
}

impl ThriftRead for OffsetIndex {
    fn read<R: Read>(protocol: &mut TCompactInputProtocol<R>) -> Result<Self> {
        Ok(OffsetIndex::read_from_in_protocol(protocol)?)
    }
}

fn read_thrift<R: Read + Seek, T: ThriftRead>(
    reader: &mut R,
    offset: i64,
    length: i32,
) -> Result<T> {
    reader.seek(SeekFrom::Start(offset.try_into()?))?;
    let length: usize = length.try_into()?;
    let mut buffer = vec![0; length];
    reader.read_exact(&mut buffer)?;

    let mut protocol = TCompactInputProtocol::new(buffer.as_slice(), usize::MAX);
    T::read(&mut protocol)
}
