use parquet_format_safe::{ColumnChunk, ColumnMetaData};

use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;
use crate::statistics::{deserialize_statistics, Statistics};

use super::column_descriptor::ColumnDescriptor;

/// Metadata of one column chunk, paired with the descriptor of its column.
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
    column_chunk: ColumnChunk,
    descriptor: ColumnDescriptor,
}

impl ColumnChunkMetaData {
    pub(crate) fn new(column_chunk: ColumnChunk, descriptor: ColumnDescriptor) -> Self {
        Self {
            column_chunk,
            descriptor,
        }
    }

    /// The byte offset this chunk starts at in its file.
    pub fn file_offset(&self) -> i64 {
        self.column_chunk.file_offset
    }

    fn metadata(&self) -> &ColumnMetaData {
        // set by the writer and validated on read
        self.column_chunk.meta_data.as_ref().unwrap()
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.descriptor.physical_type()
    }

    /// Total number of values, nulls included.
    pub fn num_values(&self) -> i64 {
        self.metadata().num_values
    }

    pub fn compression(&self) -> Result<Compression> {
        self.metadata().codec.try_into()
    }

    pub fn compressed_size(&self) -> i64 {
        self.metadata().total_compressed_size
    }

    pub fn uncompressed_size(&self) -> i64 {
        self.metadata().total_uncompressed_size
    }

    pub fn data_page_offset(&self) -> i64 {
        self.metadata().data_page_offset
    }

    pub fn dictionary_page_offset(&self) -> Option<i64> {
        self.metadata().dictionary_page_offset
    }

    /// Chunk-level statistics, decoded from thrift.
    pub fn statistics(&self) -> Option<Result<Box<dyn Statistics>>> {
        self.metadata()
            .statistics
            .as_ref()
            .map(|x| deserialize_statistics(x, self.descriptor.primitive().clone()))
    }

    /// The encodings used anywhere in this chunk.
    pub fn encodings(&self) -> Result<Vec<Encoding>> {
        self.metadata()
            .encodings
            .iter()
            .map(|x| (*x).try_into())
            .collect()
    }

    pub fn column_index_range(&self) -> Option<(i64, i32)> {
        Some((
            self.column_chunk.column_index_offset?,
            self.column_chunk.column_index_length?,
        ))
    }

    pub fn offset_index_range(&self) -> Option<(i64, i32)> {
        Some((
            self.column_chunk.offset_index_offset?,
            self.column_chunk.offset_index_length?,
        ))
    }

    pub fn bloom_filter_offset(&self) -> Option<i64> {
        self.metadata().bloom_filter_offset
    }

    /// The contiguous `(offset, length)` this chunk's pages occupy.
    pub fn byte_range(&self) -> (u64, u64) {
        let start = self
            .dictionary_page_offset()
            .filter(|x| *x > 0)
            .unwrap_or_else(|| self.data_page_offset());
        (start as u64, self.compressed_size() as u64)
    }

    pub(crate) fn try_from_thrift(
        descriptor: ColumnDescriptor,
        column_chunk: ColumnChunk,
    ) -> Result<Self> {
        if column_chunk.meta_data.is_none() {
            return Err(Error::oos("a column chunk must declare its metadata"));
        }
        Ok(Self {
            column_chunk,
            descriptor,
        })
    }

    pub(crate) fn into_thrift(self) -> ColumnChunk {
        self.column_chunk
    }
}
