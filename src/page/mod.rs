//! Page containers: the encoded (uncompressed) and compressed forms of
//! data and dictionary pages, and the V1/V2 framing of the level sections.
use parquet_format_safe::PageType as FormatPageType;

pub use parquet_format_safe::{
    DataPageHeader as DataPageHeaderV1, DataPageHeaderV2, PageHeader as FormatPageHeader,
};

use crate::compression::Compression;
use crate::encoding::{get_length, Encoding};
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::statistics::{deserialize_statistics, Statistics};

/// The type discriminant of a page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    DataPage,
    DataPageV2,
    DictionaryPage,
}

impl TryFrom<FormatPageType> for PageType {
    type Error = Error;

    fn try_from(type_: FormatPageType) -> Result<Self> {
        Ok(match type_ {
            FormatPageType::DATA_PAGE => PageType::DataPage,
            FormatPageType::DATA_PAGE_V2 => PageType::DataPageV2,
            FormatPageType::DICTIONARY_PAGE => PageType::DictionaryPage,
            _ => return Err(Error::oos("PageType out of range")),
        })
    }
}

impl From<PageType> for FormatPageType {
    fn from(type_: PageType) -> Self {
        match type_ {
            PageType::DataPage => FormatPageType::DATA_PAGE,
            PageType::DataPageV2 => FormatPageType::DATA_PAGE_V2,
            PageType::DictionaryPage => FormatPageType::DICTIONARY_PAGE,
        }
    }
}

/// The version-discriminated header of a data page.
#[derive(Debug, Clone)]
pub enum DataPageHeader {
    V1(DataPageHeaderV1),
    V2(DataPageHeaderV2),
}

impl DataPageHeader {
    /// The number of values (nulls included) the page declares.
    pub fn num_values(&self) -> usize {
        match self {
            DataPageHeader::V1(header) => header.num_values as usize,
            DataPageHeader::V2(header) => header.num_values as usize,
        }
    }

    /// The declared null count; only V2 headers carry one.
    pub fn null_count(&self) -> Option<usize> {
        match self {
            DataPageHeader::V1(_) => None,
            DataPageHeader::V2(header) => Some(header.num_nulls as usize),
        }
    }

    pub fn encoding(&self) -> Result<Encoding> {
        match self {
            DataPageHeader::V1(header) => header.encoding.try_into(),
            DataPageHeader::V2(header) => header.encoding.try_into(),
        }
    }
}

/// An uncompressed, encoded data page.
#[derive(Debug, Clone)]
pub struct DataPage {
    pub(crate) header: DataPageHeader,
    pub(crate) buffer: Vec<u8>,
    descriptor: ColumnDescriptor,
}

impl DataPage {
    pub fn new(header: DataPageHeader, buffer: Vec<u8>, descriptor: ColumnDescriptor) -> Self {
        Self {
            header,
            buffer,
            descriptor,
        }
    }

    pub fn header(&self) -> &DataPageHeader {
        &self.header
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn num_values(&self) -> usize {
        self.header.num_values()
    }

    pub fn encoding(&self) -> Result<Encoding> {
        self.header.encoding()
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// The page's min/max/null-count statistics, when declared.
    pub fn statistics(&self) -> Option<Result<Box<dyn Statistics>>> {
        let statistics = match &self.header {
            DataPageHeader::V1(header) => header.statistics.as_ref(),
            DataPageHeader::V2(header) => header.statistics.as_ref(),
        };
        statistics.map(|x| deserialize_statistics(x, self.descriptor.primitive().clone()))
    }

    /// Splits the buffer into `(repetition levels, definition levels,
    /// values)` per the page's framing version.
    pub fn split_buffer(&self) -> Result<(&[u8], &[u8], &[u8])> {
        split_buffer(self)
    }
}

/// Splits a page buffer into `(repetition levels, definition levels,
/// values)`.
///
/// V1 level sections are each prefixed by a `u32` little-endian length; V2
/// level sections have their sizes in the header and no prefix.
pub fn split_buffer(page: &DataPage) -> Result<(&[u8], &[u8], &[u8])> {
    let buffer = page.buffer();
    match &page.header {
        DataPageHeader::V1(_) => {
            let (rep, buffer) = if page.descriptor().max_rep_level() > 0 {
                split_v1_section(buffer)?
            } else {
                (&[] as &[u8], buffer)
            };
            let (def, buffer) = if page.descriptor().max_def_level() > 0 {
                split_v1_section(buffer)?
            } else {
                (&[] as &[u8], buffer)
            };
            Ok((rep, def, buffer))
        }
        DataPageHeader::V2(header) => {
            let rep_length = header.repetition_levels_byte_length as usize;
            let def_length = header.definition_levels_byte_length as usize;
            if rep_length + def_length > buffer.len() {
                return Err(Error::oos(
                    "the page header declares level sections longer than the page",
                ));
            }
            Ok((
                &buffer[..rep_length],
                &buffer[rep_length..rep_length + def_length],
                &buffer[rep_length + def_length..],
            ))
        }
    }
}

fn split_v1_section(buffer: &[u8]) -> Result<(&[u8], &[u8])> {
    if buffer.len() < 4 {
        return Err(Error::oos("a v1 level section requires a length prefix"));
    }
    let length = get_length(buffer) as usize;
    if 4 + length > buffer.len() {
        return Err(Error::oos(
            "the v1 level length prefix exceeds the page buffer",
        ));
    }
    Ok((&buffer[4..4 + length], &buffer[4 + length..]))
}

/// An uncompressed dictionary page: the chunk's values, PLAIN encoded.
#[derive(Debug, Clone)]
pub struct DictPage {
    pub buffer: Vec<u8>,
    pub num_values: usize,
    pub is_sorted: bool,
}

impl DictPage {
    pub fn new(buffer: Vec<u8>, num_values: usize, is_sorted: bool) -> Self {
        Self {
            buffer,
            num_values,
            is_sorted,
        }
    }
}

/// An uncompressed, encoded page.
#[derive(Debug, Clone)]
pub enum Page {
    Data(DataPage),
    Dict(DictPage),
}

impl Page {
    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Page::Data(page) => &mut page.buffer,
            Page::Dict(page) => &mut page.buffer,
        }
    }
}

/// A compressed, encoded data page.
#[derive(Debug)]
pub struct CompressedDataPage {
    pub(crate) header: DataPageHeader,
    pub(crate) buffer: Vec<u8>,
    compression: Compression,
    uncompressed_page_size: usize,
    pub(crate) descriptor: ColumnDescriptor,
}

impl CompressedDataPage {
    pub fn new(
        header: DataPageHeader,
        buffer: Vec<u8>,
        compression: Compression,
        uncompressed_page_size: usize,
        descriptor: ColumnDescriptor,
    ) -> Self {
        Self {
            header,
            buffer,
            compression,
            uncompressed_page_size,
            descriptor,
        }
    }

    pub fn header(&self) -> &DataPageHeader {
        &self.header
    }

    pub fn uncompressed_size(&self) -> usize {
        self.uncompressed_page_size
    }

    pub fn compressed_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn num_values(&self) -> usize {
        self.header.num_values()
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    pub fn statistics(&self) -> Option<Result<Box<dyn Statistics>>> {
        let statistics = match &self.header {
            DataPageHeader::V1(header) => header.statistics.as_ref(),
            DataPageHeader::V2(header) => header.statistics.as_ref(),
        };
        statistics.map(|x| deserialize_statistics(x, self.descriptor.primitive().clone()))
    }
}

/// A compressed dictionary page.
#[derive(Debug)]
pub struct CompressedDictPage {
    pub(crate) buffer: Vec<u8>,
    compression: Compression,
    pub(crate) uncompressed_page_size: usize,
    pub(crate) num_values: usize,
    pub(crate) is_sorted: bool,
}

impl CompressedDictPage {
    pub fn new(
        buffer: Vec<u8>,
        compression: Compression,
        uncompressed_page_size: usize,
        num_values: usize,
        is_sorted: bool,
    ) -> Self {
        Self {
            buffer,
            compression,
            uncompressed_page_size,
            num_values,
            is_sorted,
        }
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }
}

/// A compressed, encoded page.
#[derive(Debug)]
pub enum CompressedPage {
    Data(CompressedDataPage),
    Dict(CompressedDictPage),
}

impl CompressedPage {
    pub fn compression(&self) -> Compression {
        match self {
            CompressedPage::Data(page) => page.compression(),
            CompressedPage::Dict(page) => page.compression(),
        }
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        match self {
            CompressedPage::Data(page) => &mut page.buffer,
            CompressedPage::Dict(page) => &mut page.buffer,
        }
    }

    pub(crate) fn uncompressed_size(&self) -> usize {
        match self {
            CompressedPage::Data(page) => page.uncompressed_size(),
            CompressedPage::Dict(page) => page.uncompressed_page_size,
        }
    }
}

// read: CompressedPage -> Page
// write: Page -> CompressedPage

impl streaming_decompression::Compressed for CompressedPage {
    fn is_compressed(&self) -> bool {
        self.compression() != Compression::Uncompressed
    }
}

impl streaming_decompression::Decompressed for Page {
    fn buffer_mut(&mut self) -> &mut Vec<u8> {
        self.buffer_mut()
    }
}
