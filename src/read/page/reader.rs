use std::io::{Read, Seek, SeekFrom};

use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::PageType;

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::metadata::{ColumnChunkMetaData, ColumnDescriptor};
use crate::page::{
    CompressedDataPage, CompressedDictPage, CompressedPage, DataPageHeader, FormatPageHeader,
};

/// Positions `reader` at the start of `column`'s pages and returns the
/// lazy page iterator.
pub fn get_page_iterator<R: Read + Seek>(
    column: &ColumnChunkMetaData,
    mut reader: R,
    scratch: Vec<u8>,
) -> Result<PageReader<R>> {
    let (start, _) = column.byte_range();
    reader.seek(SeekFrom::Start(start))?;
    Ok(PageReader::new(
        reader,
        column.num_values() as usize,
        column.compression()?,
        column.descriptor().clone(),
        scratch,
    ))
}

/// An iterator of compressed pages of one column chunk. It consumes the
/// chunk's byte range sequentially and stops once the declared number of
/// values is covered.
pub struct PageReader<R: Read> {
    reader: R,
    compression: Compression,
    descriptor: ColumnDescriptor,
    /// values of data pages not yet seen
    remaining_values: usize,
    seen_dict: bool,
    scratch: Vec<u8>,
}

impl<R: Read> PageReader<R> {
    pub fn new(
        reader: R,
        num_values: usize,
        compression: Compression,
        descriptor: ColumnDescriptor,
        scratch: Vec<u8>,
    ) -> Self {
        Self {
            reader,
            compression,
            descriptor,
            remaining_values: num_values,
            seen_dict: false,
            scratch,
        }
    }

    /// Deconstructs itself into its reader and recycled scratch buffer.
    pub fn into_inner(self) -> (R, Vec<u8>) {
        (self.reader, self.scratch)
    }

    fn next_page(&mut self) -> Result<Option<CompressedPage>> {
        if self.remaining_values == 0 {
            return Ok(None);
        }

        let header = read_page_header(&mut self.reader)?;

        let length: usize = header.compressed_page_size.try_into()?;
        let mut buffer = std::mem::take(&mut self.scratch);
        buffer.clear();
        buffer.try_reserve(length).map_err(|_| {
            Error::oos("the page header declares more bytes than can be allocated")
        })?;
        self.reader
            .by_ref()
            .take(length as u64)
            .read_to_end(&mut buffer)?;
        if buffer.len() != length {
            return Err(Error::oos(format!(
                "the page header declares {} compressed bytes but the chunk holds {}",
                length,
                buffer.len()
            )));
        }

        finish_page(
            header,
            buffer,
            self.compression,
            &self.descriptor,
            &mut self.remaining_values,
            &mut self.seen_dict,
        )
        .map(Some)
    }
}

impl<R: Read> Iterator for PageReader<R> {
    type Item = Result<CompressedPage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }
}

/// Reads one thrift page header.
pub(crate) fn read_page_header<R: Read>(reader: &mut R) -> Result<FormatPageHeader> {
    let mut protocol = TCompactInputProtocol::new(reader, usize::MAX);
    Ok(FormatPageHeader::read_from_in_protocol(&mut protocol)?)
}

fn finish_page(
    header: FormatPageHeader,
    buffer: Vec<u8>,
    compression: Compression,
    descriptor: &ColumnDescriptor,
    remaining_values: &mut usize,
    seen_dict: &mut bool,
) -> Result<CompressedPage> {
    let uncompressed_page_size: usize = header.uncompressed_page_size.try_into()?;
    match header.type_ {
        PageType::DICTIONARY_PAGE => {
            if *seen_dict {
                return Err(Error::oos(
                    "a column chunk holds at most one dictionary page, and it comes first",
                ));
            }
            *seen_dict = true;
            let dict_header = header
                .dictionary_page_header
                .ok_or_else(|| Error::oos("a dictionary page requires its header"))?;
            Ok(CompressedPage::Dict(CompressedDictPage::new(
                buffer,
                compression,
                uncompressed_page_size,
                dict_header.num_values.try_into()?,
                dict_header.is_sorted.unwrap_or(false),
            )))
        }
        PageType::DATA_PAGE => {
            let data_header = header
                .data_page_header
                .ok_or_else(|| Error::oos("a v1 data page requires its header"))?;
            *remaining_values =
                remaining_values.saturating_sub(data_header.num_values.try_into()?);
            Ok(CompressedPage::Data(CompressedDataPage::new(
                DataPageHeader::V1(data_header),
                buffer,
                compression,
                uncompressed_page_size,
                descriptor.clone(),
            )))
        }
        PageType::DATA_PAGE_V2 => {
            let data_header = header
                .data_page_header_v2
                .ok_or_else(|| Error::oos("a v2 data page requires its header"))?;
            *remaining_values =
                remaining_values.saturating_sub(data_header.num_values.try_into()?);
            Ok(CompressedPage::Data(CompressedDataPage::new(
                DataPageHeader::V2(data_header),
                buffer,
                compression,
                uncompressed_page_size,
                descriptor.clone(),
            )))
        }
        other => Err(Error::oos(format!(
            "the page type {:?} is not supported",
            other
        ))),
    }
}
