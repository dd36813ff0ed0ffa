use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{FileMetaData, RowGroup, SortingColumn};

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::metadata::{KeyValue, SchemaDescriptor};
use crate::{FOOTER_SIZE, HEADER_MAGIC};

use super::column_chunk::ColumnSubmission;
use super::indexes::{
    serialize_column_index, serialize_offset_index, write_column_index, write_offset_index,
};
use super::row_group::{write_row_group, ChunkIndexData};
use super::{DynIter, WriteOptions};

pub(super) fn start_file<W: Write>(writer: &mut W) -> Result<u64> {
    writer.write_all(&HEADER_MAGIC)?;
    Ok(HEADER_MAGIC.len() as u64)
}

pub(super) fn end_file<W: Write>(mut writer: &mut W, metadata: FileMetaData) -> Result<u64> {
    let mut protocol = TCompactOutputProtocol::new(&mut writer);
    let metadata_len = metadata.write_to_out_protocol(&mut protocol)? as i32;

    let mut footer = [0u8; FOOTER_SIZE as usize];
    footer[..4].copy_from_slice(&metadata_len.to_le_bytes());
    footer[4..].copy_from_slice(&HEADER_MAGIC);
    writer.write_all(&footer)?;
    Ok(metadata_len as u64 + FOOTER_SIZE)
}

/// The low-level, page-push writer: `start` writes the header magic,
/// `write` appends one row group of compressed pages, `end` writes the
/// clustered page indexes, the footer and the trailing magic.
pub struct FileWriter<W: Write> {
    writer: W,
    schema: SchemaDescriptor,
    options: WriteOptions,
    compression: Compression,
    created_by: Option<String>,

    offset: u64,
    row_groups: Vec<RowGroup>,
    index_data: Vec<Vec<ChunkIndexData>>,
}

impl<W: Write> FileWriter<W> {
    pub fn new(
        writer: W,
        schema: SchemaDescriptor,
        options: WriteOptions,
        compression: Compression,
        created_by: Option<String>,
    ) -> Self {
        Self {
            writer,
            schema,
            options,
            compression,
            created_by,
            offset: 0,
            row_groups: vec![],
            index_data: vec![],
        }
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// The number of bytes written so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Writes the leading magic.
    pub fn start(&mut self) -> Result<()> {
        self.offset = start_file(&mut self.writer)?;
        Ok(())
    }

    /// Writes one row group. Columns must come in schema order, one
    /// submission per leaf.
    pub fn write<'a>(
        &mut self,
        columns: DynIter<'a, Result<ColumnSubmission<'a>>>,
        num_rows: usize,
        sorting_columns: Option<Vec<SortingColumn>>,
    ) -> Result<()> {
        if self.offset == 0 {
            return Err(Error::InvalidConfiguration(
                "cannot write a row group before start".to_string(),
            ));
        }
        let (row_group, index_data, size) = write_row_group(
            &mut self.writer,
            self.offset,
            self.schema.columns(),
            self.compression,
            columns,
            num_rows,
            sorting_columns,
        )?;
        self.offset += size;
        self.row_groups.push(row_group);
        self.index_data.push(index_data);
        Ok(())
    }

    /// Writes the page indexes (clustered at the end of the file), the
    /// footer and the trailing magic. Returns the total file size and the
    /// underlying writer.
    pub fn end(mut self, key_value_metadata: Option<Vec<KeyValue>>) -> Result<(u64, W)> {
        if self.offset == 0 {
            return Err(Error::InvalidConfiguration(
                "cannot end a file before start".to_string(),
            ));
        }

        // all column indexes first, then all offset indexes
        for (row_group, chunks) in self.row_groups.iter_mut().zip(self.index_data.iter()) {
            for (column_chunk, chunk) in row_group.columns.iter_mut().zip(chunks.iter()) {
                if !chunk.has_column_index() {
                    continue;
                }
                let index = serialize_column_index(
                    &chunk.descriptor,
                    &chunk.page_bounds,
                    self.options.column_index_truncate_length,
                )?;
                let written = write_column_index(&mut self.writer, &index)?;
                column_chunk.column_index_offset = Some(self.offset as i64);
                column_chunk.column_index_length = Some(written as i32);
                self.offset += written;
            }
        }
        for (row_group, chunks) in self.row_groups.iter_mut().zip(self.index_data.iter()) {
            for (column_chunk, chunk) in row_group.columns.iter_mut().zip(chunks.iter()) {
                if chunk.page_bounds.is_empty() {
                    continue;
                }
                let index =
                    serialize_offset_index(&chunk.data_page_locations, &chunk.page_bounds)?;
                let written = write_offset_index(&mut self.writer, &index)?;
                column_chunk.offset_index_offset = Some(self.offset as i64);
                column_chunk.offset_index_length = Some(written as i32);
                self.offset += written;
            }
        }

        let num_rows = self.row_groups.iter().map(|group| group.num_rows).sum();
        let metadata = FileMetaData {
            version: self.options.version.into(),
            schema: self.schema.into_thrift(),
            num_rows,
            row_groups: std::mem::take(&mut self.row_groups),
            key_value_metadata,
            created_by: self.created_by.clone(),
            column_orders: None,
            encryption_algorithm: None,
            footer_signing_key_metadata: None,
        };

        let len = end_file(&mut self.writer, metadata)?;
        Ok((self.offset + len, self.writer))
    }

    /// Consumes itself into the underlying writer without closing the
    /// file; the output will have no valid footer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
