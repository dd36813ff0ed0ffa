use crate::error::{Error, Result};

use super::super::delta_bitpacked;

/// Decodes `DELTA_LENGTH_BYTE_ARRAY`: first iterate the lengths, then take
/// the payload with [`Decoder::into_values`]. Malformed length streams
/// surface as errors.
#[derive(Debug)]
pub struct Decoder<'a> {
    values: &'a [u8],
    lengths: delta_bitpacked::Decoder<'a>,
    total_length: usize,
}

impl<'a> Decoder<'a> {
    pub fn try_new(values: &'a [u8]) -> Result<Self> {
        let lengths = delta_bitpacked::Decoder::try_new(values)?;
        Ok(Self {
            values,
            lengths,
            total_length: 0,
        })
    }

    /// The concatenated payloads, clamped to the buffer; consumers validate
    /// each value's length against it.
    /// # Panics
    /// If the length iterator was not fully consumed.
    pub fn into_values(self) -> &'a [u8] {
        assert_eq!(self.lengths.size_hint().0, 0);
        let start = self.lengths.consumed_bytes().min(self.values.len());
        let end = (start + self.total_length).min(self.values.len());
        &self.values[start..end]
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lengths.next() {
            Some(Ok(length)) => {
                if length < 0 {
                    return Some(Err(Error::oos("a byte-array length cannot be negative")));
                }
                self.total_length += length as usize;
                Some(Ok(length))
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.lengths.size_hint()
    }
}
