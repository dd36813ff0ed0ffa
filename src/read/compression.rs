//! Page decompression behind a streaming iterator, so that one scratch
//! buffer serves every page of a chunk.
use crate::compression::{create_codec, Compression};
use crate::error::{Error, Result};
use crate::page::{CompressedPage, DataPage, DataPageHeader, DictPage, Page};
use crate::FallibleStreamingIterator;

/// Decompresses one page into `buffer`.
pub fn decompress(compressed: CompressedPage, buffer: &mut Vec<u8>) -> Result<Page> {
    buffer.clear();
    let compression = compressed.compression();
    let codec = create_codec(compression)?;

    match (compressed, codec) {
        (CompressedPage::Data(page), Some(mut codec)) => {
            let uncompressed = page.uncompressed_size();
            match &page.header {
                DataPageHeader::V1(_) => {
                    buffer.resize(uncompressed, 0);
                    codec.decompress(&page.buffer, buffer)?;
                }
                DataPageHeader::V2(header) => {
                    // levels are never compressed in v2
                    let prefix = (header.repetition_levels_byte_length
                        + header.definition_levels_byte_length)
                        as usize;
                    if prefix > page.buffer.len() || prefix > uncompressed {
                        return Err(Error::oos(
                            "the page header declares level sections longer than the page",
                        ));
                    }
                    buffer.extend_from_slice(&page.buffer[..prefix]);
                    buffer.resize(uncompressed, 0);
                    codec.decompress(&page.buffer[prefix..], &mut buffer[prefix..])?;
                }
            }
            Ok(Page::Data(DataPage::new(
                page.header,
                std::mem::take(buffer),
                page.descriptor,
            )))
        }
        (CompressedPage::Data(page), None) => Ok(Page::Data(DataPage::new(
            page.header,
            page.buffer,
            page.descriptor,
        ))),
        (CompressedPage::Dict(page), Some(mut codec)) => {
            buffer.resize(page.uncompressed_page_size, 0);
            codec.decompress(&page.buffer, buffer)?;
            Ok(Page::Dict(DictPage::new(
                std::mem::take(buffer),
                page.num_values,
                page.is_sorted,
            )))
        }
        (CompressedPage::Dict(page), None) => Ok(Page::Dict(DictPage::new(
            page.buffer,
            page.num_values,
            page.is_sorted,
        ))),
    }
}

type StreamingDecompressor<I> = streaming_decompression::Decompressor<
    CompressedPage,
    Page,
    fn(CompressedPage, &mut Vec<u8>) -> Result<Page>,
    Error,
    I,
>;

/// A [`FallibleStreamingIterator`] of decompressed pages, recycling one
/// buffer across pages. Pages are released back to the pool when the
/// iterator advances.
pub struct BasicDecompressor<I: Iterator<Item = Result<CompressedPage>>> {
    iter: StreamingDecompressor<I>,
}

impl<I: Iterator<Item = Result<CompressedPage>>> BasicDecompressor<I> {
    pub fn new(iter: I, buffer: Vec<u8>) -> Self {
        Self {
            iter: StreamingDecompressor::new(iter, buffer, decompress),
        }
    }
}

impl<I: Iterator<Item = Result<CompressedPage>>> FallibleStreamingIterator
    for BasicDecompressor<I>
{
    type Item = Page;
    type Error = Error;

    fn advance(&mut self) -> Result<()> {
        self.iter.advance()
    }

    fn get(&self) -> Option<&Page> {
        self.iter.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;
    use crate::page::CompressedDictPage;

    #[test]
    fn uncompressed_dict_page_passes_through() {
        let page = CompressedPage::Dict(CompressedDictPage::new(
            vec![1, 2, 3],
            Compression::Uncompressed,
            3,
            1,
            false,
        ));
        let mut buffer = vec![];
        match decompress(page, &mut buffer).unwrap() {
            Page::Dict(dict) => assert_eq!(dict.buffer, vec![1, 2, 3]),
            _ => unreachable!(),
        }
    }
}
