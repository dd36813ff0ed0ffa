use std::collections::HashSet;
use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{ColumnChunk, ColumnMetaData, PageType, Type};

use crate::column::PageBounds;
use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::CompressedPage;
use crate::statistics::{reduce, Statistics};
use crate::FallibleStreamingIterator;

use super::page::{write_page, PageWriteSpec};
use super::DynStreamingIterator;

/// One column's contribution to a row group: its compressed pages plus the
/// side products the file writer records.
pub struct ColumnSubmission<'a> {
    pub pages: DynStreamingIterator<'a, CompressedPage, Error>,
    /// One entry per data page; empty suppresses the page indexes.
    pub page_bounds: Vec<PageBounds>,
    /// Whether a column index is written for this chunk. The offset index
    /// only requires `page_bounds`.
    pub record_column_index: bool,
    /// Chunk-level statistics. When absent, the page headers' statistics
    /// are reduced instead.
    pub statistics: Option<Box<dyn Statistics>>,
    /// Serialized split-block bitset, written after the row group.
    pub bloom_filter: Option<Vec<u8>>,
}

impl<'a> ColumnSubmission<'a> {
    /// Pages only, no indexes, no chunk statistics, no bloom filter.
    pub fn from_pages(pages: DynStreamingIterator<'a, CompressedPage, Error>) -> Self {
        Self {
            pages,
            page_bounds: vec![],
            record_column_index: false,
            statistics: None,
            bloom_filter: None,
        }
    }
}

pub(crate) struct ChunkResult {
    pub column_chunk: ColumnChunk,
    pub specs: Vec<PageWriteSpec>,
    pub page_bounds: Vec<PageBounds>,
    pub record_column_index: bool,
    pub bloom_filter: Option<Vec<u8>>,
    pub bytes_written: u64,
}

pub(crate) fn write_column_chunk<W: Write>(
    writer: &mut W,
    mut offset: u64,
    descriptor: &ColumnDescriptor,
    compression: Compression,
    mut submission: ColumnSubmission,
) -> Result<ChunkResult> {
    let initial = offset;

    let mut specs = vec![];
    while let Some(page) = submission.pages.next()? {
        let spec = write_page(writer, offset, page)?;
        offset += spec.bytes_written;
        specs.push(spec);
    }
    let mut bytes_written = offset - initial;

    let statistics = match submission.statistics.take() {
        Some(statistics) => Some(statistics),
        None => {
            let page_statistics = specs
                .iter()
                .filter_map(|spec| {
                    spec.header
                        .data_page_header
                        .as_ref()
                        .and_then(|header| header.statistics.as_ref())
                        .or_else(|| {
                            spec.header
                                .data_page_header_v2
                                .as_ref()
                                .and_then(|header| header.statistics.as_ref())
                        })
                })
                .map(|statistics| {
                    crate::statistics::deserialize_statistics(
                        statistics,
                        descriptor.primitive().clone(),
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            let refs: Vec<&dyn Statistics> =
                page_statistics.iter().map(|x| x.as_ref()).collect();
            reduce(&refs)?
        }
    };

    let column_chunk = build_column_chunk(&specs, descriptor, compression, statistics)?;

    // chunk metadata trails the chunk, as the format prescribes
    let mut protocol = TCompactOutputProtocol::new(&mut *writer);
    bytes_written += column_chunk
        .meta_data
        .as_ref()
        .unwrap()
        .write_to_out_protocol(&mut protocol)? as u64;

    Ok(ChunkResult {
        column_chunk,
        specs,
        page_bounds: std::mem::take(&mut submission.page_bounds),
        record_column_index: submission.record_column_index,
        bloom_filter: submission.bloom_filter.take(),
        bytes_written,
    })
}

fn build_column_chunk(
    specs: &[PageWriteSpec],
    descriptor: &ColumnDescriptor,
    compression: Compression,
    statistics: Option<Box<dyn Statistics>>,
) -> Result<ColumnChunk> {
    // the totals include the page headers
    let total_compressed_size = specs
        .iter()
        .map(|spec| spec.header_size as i64 + spec.header.compressed_page_size as i64)
        .sum();
    let total_uncompressed_size = specs
        .iter()
        .map(|spec| spec.header_size as i64 + spec.header.uncompressed_page_size as i64)
        .sum();

    let data_page_offset = specs
        .iter()
        .find(|spec| !spec.is_dict())
        .map(|spec| spec.offset as i64)
        .ok_or_else(|| Error::oos("a column chunk requires at least one data page"))?;
    let dictionary_page_offset = specs
        .first()
        .filter(|spec| spec.is_dict())
        .map(|spec| spec.offset as i64);

    let num_values = specs.iter().map(|spec| spec.num_values() as i64).sum();

    let mut encodings: HashSet<parquet_format_safe::Encoding> = HashSet::new();
    for spec in specs {
        match spec.header.type_ {
            PageType::DATA_PAGE => {
                let header = spec.header.data_page_header.as_ref().unwrap();
                encodings.insert(header.encoding);
                encodings.insert(header.definition_level_encoding);
                encodings.insert(header.repetition_level_encoding);
            }
            PageType::DATA_PAGE_V2 => {
                let header = spec.header.data_page_header_v2.as_ref().unwrap();
                encodings.insert(header.encoding);
                encodings.insert(Encoding::Rle.into());
            }
            PageType::DICTIONARY_PAGE => {
                let header = spec.header.dictionary_page_header.as_ref().unwrap();
                encodings.insert(header.encoding);
            }
            _ => {}
        }
    }

    let (type_, _): (Type, _) = descriptor.physical_type().into();

    let metadata = ColumnMetaData {
        type_,
        encodings: encodings.into_iter().collect(),
        path_in_schema: descriptor.path_in_schema().to_vec(),
        codec: compression.into(),
        num_values,
        total_uncompressed_size,
        total_compressed_size,
        key_value_metadata: None,
        data_page_offset,
        index_page_offset: None,
        dictionary_page_offset,
        statistics: statistics.map(|x| x.serialize()),
        encoding_stats: None,
        bloom_filter_offset: None,
    };

    Ok(ColumnChunk {
        file_path: None,
        file_offset: dictionary_page_offset.unwrap_or(data_page_offset) + total_compressed_size,
        meta_data: Some(metadata),
        offset_index_offset: None,
        offset_index_length: None,
        column_index_offset: None,
        column_index_length: None,
        crypto_metadata: None,
        encrypted_column_metadata: None,
    })
}
