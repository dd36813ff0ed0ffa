use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{DictionaryPageHeader, Encoding as FormatEncoding, PageType};

use crate::error::{Error, Result};
use crate::page::{
    CompressedDataPage, CompressedDictPage, CompressedPage, DataPageHeader, FormatPageHeader,
};

fn maybe_bytes(uncompressed: usize, compressed: usize) -> Result<(i32, i32)> {
    let uncompressed_page_size: i32 = uncompressed.try_into().map_err(|_| {
        Error::oos(format!(
            "A page can only contain i32::MAX uncompressed bytes. This one contains {}",
            uncompressed
        ))
    })?;

    let compressed_page_size: i32 = compressed.try_into().map_err(|_| {
        Error::oos(format!(
            "A page can only contain i32::MAX compressed bytes. This one contains {}",
            compressed
        ))
    })?;

    Ok((uncompressed_page_size, compressed_page_size))
}

/// Metrics of one written page, used for chunk metadata and the page
/// indexes.
pub struct PageWriteSpec {
    pub header: FormatPageHeader,
    pub header_size: u64,
    /// file offset of the page header
    pub offset: u64,
    pub bytes_written: u64,
}

impl PageWriteSpec {
    pub fn is_dict(&self) -> bool {
        self.header.type_ == PageType::DICTIONARY_PAGE
    }

    pub fn num_values(&self) -> usize {
        self.header
            .data_page_header
            .as_ref()
            .map(|x| x.num_values as usize)
            .or_else(|| {
                self.header
                    .data_page_header_v2
                    .as_ref()
                    .map(|x| x.num_values as usize)
            })
            .unwrap_or(0)
    }
}

/// Writes the page header followed by its payload, returning the metrics.
pub fn write_page<W: Write>(
    writer: &mut W,
    offset: u64,
    compressed_page: &CompressedPage,
) -> Result<PageWriteSpec> {
    let header = match compressed_page {
        CompressedPage::Data(page) => assemble_data_page_header(page),
        CompressedPage::Dict(page) => assemble_dict_page_header(page),
    }?;

    let mut protocol = TCompactOutputProtocol::new(&mut *writer);
    let header_size = header.write_to_out_protocol(&mut protocol)? as u64;
    let mut bytes_written = header_size;

    bytes_written += match compressed_page {
        CompressedPage::Data(page) => {
            writer.write_all(&page.buffer)?;
            page.buffer.len() as u64
        }
        CompressedPage::Dict(page) => {
            writer.write_all(&page.buffer)?;
            page.buffer.len() as u64
        }
    };

    Ok(PageWriteSpec {
        header,
        header_size,
        offset,
        bytes_written,
    })
}

fn assemble_data_page_header(page: &CompressedDataPage) -> Result<FormatPageHeader> {
    let (uncompressed_page_size, compressed_page_size) =
        maybe_bytes(page.uncompressed_size(), page.compressed_size())?;

    let mut header = FormatPageHeader {
        type_: match page.header() {
            DataPageHeader::V1(_) => PageType::DATA_PAGE,
            DataPageHeader::V2(_) => PageType::DATA_PAGE_V2,
        },
        uncompressed_page_size,
        compressed_page_size,
        crc: None,
        data_page_header: None,
        index_page_header: None,
        dictionary_page_header: None,
        data_page_header_v2: None,
    };

    match page.header() {
        DataPageHeader::V1(data_page_header) => {
            header.data_page_header = Some(data_page_header.clone());
        }
        DataPageHeader::V2(data_page_header) => {
            header.data_page_header_v2 = Some(data_page_header.clone());
        }
    }
    Ok(header)
}

fn assemble_dict_page_header(page: &CompressedDictPage) -> Result<FormatPageHeader> {
    let (uncompressed_page_size, compressed_page_size) =
        maybe_bytes(page.uncompressed_page_size, page.buffer.len())?;

    let num_values: i32 = page.num_values.try_into().map_err(|_| {
        Error::oos(format!(
            "A dictionary page can only contain i32::MAX items. This one contains {}",
            page.num_values
        ))
    })?;

    Ok(FormatPageHeader {
        type_: PageType::DICTIONARY_PAGE,
        uncompressed_page_size,
        compressed_page_size,
        crc: None,
        data_page_header: None,
        index_page_header: None,
        dictionary_page_header: Some(DictionaryPageHeader {
            num_values,
            encoding: FormatEncoding::PLAIN,
            is_sorted: Some(page.is_sorted),
        }),
        data_page_header_v2: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;

    #[test]
    fn dict_page_too_large() {
        let page = CompressedDictPage::new(
            vec![],
            Compression::Uncompressed,
            i32::MAX as usize + 1,
            100,
            false,
        );
        assert!(assemble_dict_page_header(&page).is_err());
    }

    #[test]
    fn dict_page_too_many_values() {
        let page = CompressedDictPage::new(
            vec![],
            Compression::Uncompressed,
            0,
            i32::MAX as usize + 1,
            false,
        );
        assert!(assemble_dict_page_header(&page).is_err());
    }
}
