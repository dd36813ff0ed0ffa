//! Page compression: an iterator adapter turning encoded pages into
//! compressed pages, reusing one scratch buffer across pages.
use crate::compression::{create_codec, Codec, Compression};
use crate::error::{Error, Result};
use crate::page::{
    CompressedDataPage, CompressedDictPage, CompressedPage, DataPageHeader, Page,
};
use crate::FallibleStreamingIterator;

use super::DynIter;

fn compress_buffer(
    codec: &mut Option<Box<dyn Codec>>,
    input: &[u8],
    output: &mut Vec<u8>,
) -> Result<()> {
    match codec {
        Some(codec) => codec.compress(input, output),
        None => {
            output.extend_from_slice(input);
            Ok(())
        }
    }
}

/// Compresses one page. `buffer` is the recycled output allocation.
pub fn compress(
    compression: Compression,
    page: Page,
    mut buffer: Vec<u8>,
) -> Result<CompressedPage> {
    buffer.clear();
    let mut codec = create_codec(compression)?;
    match page {
        Page::Data(page) => {
            let uncompressed_page_size = page.buffer.len();
            match &page.header {
                DataPageHeader::V1(_) => {
                    // v1: the whole payload is one compressed block
                    compress_buffer(&mut codec, &page.buffer, &mut buffer)?;
                }
                DataPageHeader::V2(header) => {
                    // v2: levels stay uncompressed; only values are compressed
                    let prefix = (header.repetition_levels_byte_length
                        + header.definition_levels_byte_length)
                        as usize;
                    if prefix > page.buffer.len() {
                        return Err(Error::oos(
                            "the page header declares level sections longer than the page",
                        ));
                    }
                    buffer.extend_from_slice(&page.buffer[..prefix]);
                    compress_buffer(&mut codec, &page.buffer[prefix..], &mut buffer)?;
                }
            }
            let descriptor = page.descriptor().clone();
            Ok(CompressedPage::Data(CompressedDataPage::new(
                page.header,
                buffer,
                compression,
                uncompressed_page_size,
                descriptor,
            )))
        }
        Page::Dict(page) => {
            let uncompressed_page_size = page.buffer.len();
            compress_buffer(&mut codec, &page.buffer, &mut buffer)?;
            Ok(CompressedPage::Dict(CompressedDictPage::new(
                buffer,
                compression,
                uncompressed_page_size,
                page.num_values,
                page.is_sorted,
            )))
        }
    }
}

/// A [`FallibleStreamingIterator`] of compressed pages. The scratch buffer
/// of each page is recycled into the next.
pub struct Compressor<'a> {
    iter: DynIter<'a, Result<Page>>,
    compression: Compression,
    current: Option<CompressedPage>,
    buffer: Vec<u8>,
}

impl<'a> Compressor<'a> {
    pub fn new(iter: DynIter<'a, Result<Page>>, compression: Compression, buffer: Vec<u8>) -> Self {
        Self {
            iter,
            compression,
            current: None,
            buffer,
        }
    }

    /// Deconstructs itself into its recycled buffer.
    pub fn into_inner(mut self) -> Vec<u8> {
        std::mem::take(self.current.as_mut().map(|x| x.buffer_mut()).unwrap_or(&mut self.buffer))
    }
}

impl<'a> FallibleStreamingIterator for Compressor<'a> {
    type Item = CompressedPage;
    type Error = Error;

    fn advance(&mut self) -> Result<()> {
        // reclaim the previous page's buffer
        if let Some(page) = self.current.take() {
            let mut buffer = match page {
                CompressedPage::Data(page) => page.buffer,
                CompressedPage::Dict(page) => page.buffer,
            };
            buffer.clear();
            self.buffer = buffer;
        }

        self.current = match self.iter.next() {
            Some(page) => Some(compress(
                self.compression,
                page?,
                std::mem::take(&mut self.buffer),
            )?),
            None => None,
        };
        Ok(())
    }

    fn get(&self) -> Option<&Self::Item> {
        self.current.as_ref()
    }
}
