//! Shared machinery turning buffered levels and encoded values into framed
//! data pages.
use std::ops::Range;

use parquet_format_safe::Statistics as FormatStatistics;

use crate::compression::Compression;
use crate::encoding::{get_bit_width, hybrid_rle, Encoding};
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::{DataPage, DataPageHeader, DataPageHeaderV1, DataPageHeaderV2, Page};
use crate::write::Version;

use super::Levels;

/// Splits the logical positions of `logical` into page ranges of roughly
/// `page_buffer_size` uncompressed value bytes each. `sizes` is relative to
/// the region; the returned ranges are too. Pages only break where a new
/// row starts; the last page of a chunk may be smaller.
pub(crate) fn segment_pages(
    levels: &Levels,
    logical: Range<usize>,
    sizes: &[usize],
    page_buffer_size: usize,
) -> Vec<Range<usize>> {
    let base = logical.start;
    let len = logical.len();
    let mut ranges = vec![];
    let mut start = 0;
    let mut accumulated = 0;
    for i in 0..len {
        if i > start && accumulated >= page_buffer_size && levels.rep_at(base + i) == 0 {
            ranges.push(start..i);
            start = i;
            accumulated = 0;
        }
        accumulated += sizes[i];
    }
    if len > start {
        ranges.push(start..len);
    }
    ranges
}

fn levels_to_u32(levels: &[i16]) -> Vec<u32> {
    levels.iter().map(|x| *x as u32).collect()
}

/// Encodes one level stream with a `u32` little-endian length prefix (V1
/// framing).
fn encode_levels_v1(levels: &[i16], max_level: i16, buffer: &mut Vec<u8>) -> Result<()> {
    let start = buffer.len();
    buffer.extend_from_slice(&[0; 4]);
    let num_bits = get_bit_width(max_level) as u8;
    hybrid_rle::encode(buffer, &levels_to_u32(levels), num_bits)?;
    let length = buffer.len() - start - 4;
    let length: u32 = length
        .try_into()
        .map_err(|_| Error::oos("a level section cannot exceed u32::MAX bytes"))?;
    buffer[start..start + 4].copy_from_slice(&length.to_le_bytes());
    Ok(())
}

/// Encodes one level stream without a prefix (V2 framing), returning its
/// byte length.
fn encode_levels_v2(levels: &[i16], max_level: i16, buffer: &mut Vec<u8>) -> Result<usize> {
    let start = buffer.len();
    let num_bits = get_bit_width(max_level) as u8;
    hybrid_rle::encode(buffer, &levels_to_u32(levels), num_bits)?;
    Ok(buffer.len() - start)
}

pub(crate) struct PageInput<'a> {
    pub version: Version,
    pub compression: Compression,
    pub encoding: Encoding,
    pub descriptor: &'a ColumnDescriptor,
    pub rep: &'a [i16],
    pub def: &'a [i16],
    pub num_values: usize,
    pub num_rows: usize,
    pub null_count: usize,
    /// The encoded values section.
    pub values: Vec<u8>,
    pub statistics: Option<FormatStatistics>,
}

/// Frames one data page out of its level slices and encoded values.
pub(crate) fn build_data_page(input: PageInput) -> Result<Page> {
    let num_values: i32 = input
        .num_values
        .try_into()
        .map_err(|_| Error::oos("a page can only declare i32::MAX values"))?;

    let max_rep = input.descriptor.max_rep_level();
    let max_def = input.descriptor.max_def_level();

    let mut buffer = vec![];
    let header = match input.version {
        Version::V1 => {
            if max_rep > 0 {
                encode_levels_v1(input.rep, max_rep, &mut buffer)?;
            }
            if max_def > 0 {
                encode_levels_v1(input.def, max_def, &mut buffer)?;
            }
            buffer.extend_from_slice(&input.values);

            DataPageHeader::V1(DataPageHeaderV1 {
                num_values,
                encoding: input.encoding.into(),
                definition_level_encoding: Encoding::Rle.into(),
                repetition_level_encoding: Encoding::Rle.into(),
                statistics: input.statistics,
            })
        }
        Version::V2 => {
            let mut repetition_levels_byte_length = 0;
            let mut definition_levels_byte_length = 0;
            if max_rep > 0 {
                repetition_levels_byte_length = encode_levels_v2(input.rep, max_rep, &mut buffer)?;
            }
            if max_def > 0 {
                definition_levels_byte_length = encode_levels_v2(input.def, max_def, &mut buffer)?;
            }
            buffer.extend_from_slice(&input.values);

            DataPageHeader::V2(DataPageHeaderV2 {
                num_values,
                num_nulls: input.null_count.try_into()?,
                num_rows: input.num_rows.try_into()?,
                encoding: input.encoding.into(),
                definition_levels_byte_length: definition_levels_byte_length.try_into()?,
                repetition_levels_byte_length: repetition_levels_byte_length.try_into()?,
                is_compressed: Some(input.compression != Compression::Uncompressed),
                statistics: input.statistics,
            })
        }
    };

    Ok(Page::Data(DataPage::new(
        header,
        buffer,
        input.descriptor.clone(),
    )))
}

/// Prefixes an RLE-dictionary index stream with its one-byte bit width.
pub(crate) fn encode_dict_indices(indices: &[u32], dictionary_len: usize) -> Result<Vec<u8>> {
    let num_bits = (32 - (dictionary_len.saturating_sub(1) as u32).leading_zeros()) as u8;
    let mut buffer = vec![num_bits];
    hybrid_rle::encode(&mut buffer, indices, num_bits)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segmentation_respects_row_boundaries() {
        let mut levels = Levels::new(1, 1);
        // three rows: [a, b], [c], [d, e, f]
        let reps = [0i16, 1, 0, 0, 1, 1];
        for rep in reps {
            levels.push(rep, 1).unwrap();
        }
        let sizes = [8usize; 6];
        // target of 8 bytes: a break is due after every value, but only row
        // starts qualify
        let ranges = segment_pages(&levels, 0..6, &sizes, 8);
        assert_eq!(ranges, vec![0..2, 2..3, 3..6]);
    }

    #[test]
    fn single_page_when_under_target() {
        let levels = Levels::new(0, 0);
        let sizes = [4usize; 10];
        let ranges = segment_pages(&levels, 0..10, &sizes, 1024);
        assert_eq!(ranges, vec![0..10]);
    }

    #[test]
    fn dict_indices_bit_width() {
        // 3 entries need 2 bits
        let buffer = encode_dict_indices(&[0, 1, 2, 1], 3).unwrap();
        assert_eq!(buffer[0], 2);
    }
}
