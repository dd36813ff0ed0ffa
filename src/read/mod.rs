//! The read pipeline: footer parsing, lazy page streams and record
//! assembly. The reader is fully synchronous and performs no recovery past
//! a malformed page.
mod compression;
pub mod deserialize;
mod indexes;
mod metadata;
mod page;

pub use compression::{decompress, BasicDecompressor};
pub use indexes::{read_column_index, read_offset_index};
pub use metadata::read_metadata;
pub use page::{get_page_iterator, PageReader};

use std::io::{Read, Seek};

use parquet_format_safe::PageLocation;

use crate::error::{Error, Result};
use crate::indexes::Index;
use crate::metadata::{ColumnChunkMetaData, FileMetaData, RowGroupMetaData};
use crate::page::Page;
use crate::shred::{Record, RowAssembler};
use crate::value::Value;
use crate::FallibleStreamingIterator;

use deserialize::{deserialize_dict, deserialize_page, DecodedDictionary};

/// Options of [`FileReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Do not load the optional column/offset indexes; requesting one then
    /// reports it as missing.
    pub skip_page_index: bool,
}

/// Decodes all values of one column chunk, dictionary pages resolved.
pub fn read_column_values<R: Read + Seek>(
    reader: &mut R,
    chunk: &ColumnChunkMetaData,
) -> Result<Vec<Value>> {
    let pages = get_page_iterator(chunk, &mut *reader, vec![])?;
    let mut decompressor = BasicDecompressor::new(pages, vec![]);

    let mut dict: Option<DecodedDictionary> = None;
    let mut values = vec![];
    while let Some(page) = decompressor.next()? {
        match page {
            Page::Dict(page) => {
                dict = Some(deserialize_dict(page, chunk.physical_type())?);
            }
            Page::Data(page) => {
                for value in deserialize_page(page, dict.as_ref())? {
                    values.push(value?);
                }
            }
        }
    }
    Ok(values)
}

/// A synchronous parquet file reader: parses the footer eagerly, pages
/// lazily.
pub struct FileReader<R: Read + Seek> {
    reader: R,
    metadata: FileMetaData,
    options: ReadOptions,
}

impl<R: Read + Seek> FileReader<R> {
    pub fn try_new(mut reader: R, options: ReadOptions) -> Result<Self> {
        let metadata = read_metadata(&mut reader)?;
        Ok(Self {
            reader,
            metadata,
            options,
        })
    }

    pub fn metadata(&self) -> &FileMetaData {
        &self.metadata
    }

    pub fn schema(&self) -> &crate::metadata::SchemaDescriptor {
        &self.metadata.schema
    }

    pub fn num_rows(&self) -> usize {
        self.metadata.num_rows
    }

    /// The row groups of the file, in file order.
    pub fn row_groups(&self) -> impl Iterator<Item = &RowGroupMetaData> {
        self.metadata.row_groups.iter()
    }

    /// The lazy page iterator of one column chunk.
    pub fn pages(&mut self, chunk: &ColumnChunkMetaData) -> Result<PageReader<&mut R>> {
        get_page_iterator(chunk, &mut self.reader, vec![])
    }

    /// All values of one column chunk.
    pub fn column_values(&mut self, chunk: &ColumnChunkMetaData) -> Result<Vec<Value>> {
        read_column_values(&mut self.reader, chunk)
    }

    /// The column index of one chunk. Reports [`Error::MissingColumnIndex`]
    /// when the chunk declares none or index loading is disabled.
    pub fn column_index(&mut self, chunk: &ColumnChunkMetaData) -> Result<Box<dyn Index>> {
        if self.options.skip_page_index {
            return Err(Error::MissingColumnIndex);
        }
        read_column_index(&mut self.reader, chunk)
    }

    /// The offset index of one chunk. Reports [`Error::MissingOffsetIndex`]
    /// when the chunk declares none or index loading is disabled.
    pub fn offset_index(&mut self, chunk: &ColumnChunkMetaData) -> Result<Vec<PageLocation>> {
        if self.options.skip_page_index {
            return Err(Error::MissingOffsetIndex);
        }
        read_offset_index(&mut self.reader, chunk)
    }

    /// The bloom-filter bitset of one chunk.
    /// Reports [`Error::MissingBloomFilter`] when the chunk declares none.
    pub fn bloom_filter(&mut self, chunk: &ColumnChunkMetaData) -> Result<Vec<u8>> {
        let mut bitset = vec![];
        crate::bloom_filter::read(chunk, &mut self.reader, &mut bitset)?;
        Ok(bitset)
    }

    /// Decodes one row group into per-column value streams, in schema
    /// order.
    pub fn row_group_values(&mut self, row_group: usize) -> Result<Vec<Vec<Value>>> {
        let chunks = self.metadata.row_groups[row_group].columns().to_vec();
        chunks
            .iter()
            .map(|chunk| read_column_values(&mut self.reader, chunk))
            .collect()
    }

    /// Reads every row of the file back into records.
    pub fn read_records(&mut self) -> Result<Vec<Record>> {
        let mut records = vec![];
        for row_group in 0..self.metadata.row_groups.len() {
            let columns = self.row_group_values(row_group)?;
            let mut assembler = RowAssembler::new(&self.metadata.schema, columns);
            while let Some(record) = assembler.next_row()? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Deconstructs itself into the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
