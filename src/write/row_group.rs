use std::io::Write;

use parquet_format_safe::{RowGroup, SortingColumn};

use crate::bloom_filter;
use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;

use super::column_chunk::{write_column_chunk, ChunkResult, ColumnSubmission};
use super::DynIter;

/// Everything `end` needs to serialize one chunk's page indexes.
pub(crate) struct ChunkIndexData {
    pub descriptor: ColumnDescriptor,
    pub page_bounds: Vec<crate::column::PageBounds>,
    pub record_column_index: bool,
    /// (offset, compressed size including header) of every data page
    pub data_page_locations: Vec<(u64, u64)>,
}

impl ChunkIndexData {
    pub fn has_column_index(&self) -> bool {
        self.record_column_index && !self.page_bounds.is_empty()
    }
}

pub(crate) fn write_row_group<'a, W: Write>(
    writer: &mut W,
    mut offset: u64,
    descriptors: &[ColumnDescriptor],
    compression: Compression,
    columns: DynIter<'a, Result<ColumnSubmission<'a>>>,
    num_rows: usize,
    sorting_columns: Option<Vec<SortingColumn>>,
) -> Result<(RowGroup, Vec<ChunkIndexData>, u64)> {
    let initial = offset;

    let mut results: Vec<ChunkResult> = vec![];
    for (descriptor, submission) in descriptors.iter().zip(columns) {
        let result =
            write_column_chunk(writer, offset, descriptor, compression, submission?)?;
        offset += result.bytes_written;
        results.push(result);
    }
    if results.len() != descriptors.len() {
        return Err(Error::InvalidConfiguration(format!(
            "a row group must submit exactly {} columns; it submitted {}",
            descriptors.len(),
            results.len()
        )));
    }

    // bloom filters follow the row group's chunks; their offsets are
    // recorded in the chunk metadata
    for result in results.iter_mut() {
        if let Some(bitset) = result.bloom_filter.take() {
            let filter_offset = offset;
            offset += bloom_filter::write(writer, &bitset)? as u64;
            result
                .column_chunk
                .meta_data
                .as_mut()
                .unwrap()
                .bloom_filter_offset = Some(filter_offset as i64);
        }
    }
    let bytes_written = offset - initial;

    let file_offset = results
        .first()
        .map(|result| {
            let metadata = result.column_chunk.meta_data.as_ref().unwrap();
            metadata
                .dictionary_page_offset
                .filter(|x| *x > 0)
                .unwrap_or(metadata.data_page_offset)
        })
        .unwrap_or(initial as i64);

    let total_byte_size = results
        .iter()
        .map(|result| {
            result
                .column_chunk
                .meta_data
                .as_ref()
                .unwrap()
                .total_uncompressed_size
        })
        .sum();
    let total_compressed_size = results
        .iter()
        .map(|result| {
            result
                .column_chunk
                .meta_data
                .as_ref()
                .unwrap()
                .total_compressed_size
        })
        .sum();

    let mut columns = vec![];
    let mut index_data = vec![];
    for (result, descriptor) in results.into_iter().zip(descriptors) {
        let data_page_locations = result
            .specs
            .iter()
            .filter(|spec| !spec.is_dict())
            .map(|spec| {
                (
                    spec.offset,
                    spec.header_size + spec.header.compressed_page_size as u64,
                )
            })
            .collect();
        index_data.push(ChunkIndexData {
            descriptor: descriptor.clone(),
            page_bounds: result.page_bounds,
            record_column_index: result.record_column_index,
            data_page_locations,
        });
        columns.push(result.column_chunk);
    }

    Ok((
        RowGroup {
            columns,
            total_byte_size,
            num_rows: num_rows as i64,
            sorting_columns,
            file_offset: Some(file_offset),
            total_compressed_size: Some(total_compressed_size),
            ordinal: None,
        },
        index_data,
        bytes_written,
    ))
}
