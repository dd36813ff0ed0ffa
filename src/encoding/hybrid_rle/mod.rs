// see https://github.com/apache/parquet-format/blob/master/Encodings.md#run-length-encoding--bit-packing-hybrid-rle--3
mod bitmap;
mod decoder;
mod encoder;

pub use bitmap::{encode_bitmap, BitmapIter};
pub use decoder::Decoder;
pub use encoder::encode;

use crate::error::Result;

use super::bitpacked;

/// One run of a hybrid stream.
#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// A slice of bit-packed bytes covering groups of 8 values.
    Bitpacked(&'a [u8]),
    /// A single value repeated `usize` times.
    Rle(&'a [u8], usize),
}

enum State<'a> {
    Bitpacked(bitpacked::Decoder<'a, u32>),
    Rle { value: u32, remaining: usize },
    Finished,
}

/// An iterator over the `u32` values of a hybrid stream of known length.
/// Malformed runs surface as errors and end the iteration.
pub struct HybridRleDecoder<'a> {
    runs: Decoder<'a>,
    state: State<'a>,
    remaining: usize,
}

impl<'a> HybridRleDecoder<'a> {
    pub fn try_new(values: &'a [u8], num_bits: u32, length: usize) -> Result<Self> {
        let runs = Decoder::new(values, num_bits);
        let mut decoder = Self {
            runs,
            state: State::Finished,
            remaining: length,
        };
        decoder.load_run()?;
        Ok(decoder)
    }

    fn load_run(&mut self) -> Result<()> {
        self.state = match self.runs.next().transpose()? {
            Some(HybridEncoded::Bitpacked(packed)) => {
                let num_bits = self.runs.num_bits() as usize;
                let length = std::cmp::min(packed.len() * 8 / num_bits, self.remaining);
                State::Bitpacked(bitpacked::Decoder::new(packed, num_bits, length))
            }
            Some(HybridEncoded::Rle(bytes, run_length)) => {
                let mut padded = [0u8; std::mem::size_of::<u32>()];
                padded[..bytes.len()].copy_from_slice(bytes);
                State::Rle {
                    value: u32::from_le_bytes(padded),
                    remaining: run_length,
                }
            }
            None => State::Finished,
        };
        Ok(())
    }
}

impl<'a> Iterator for HybridRleDecoder<'a> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let next = match &mut self.state {
                State::Bitpacked(decoder) => decoder.next(),
                State::Rle { value, remaining } => {
                    if *remaining == 0 {
                        None
                    } else {
                        *remaining -= 1;
                        Some(*value)
                    }
                }
                State::Finished => {
                    if self.runs.num_bits() == 0 {
                        // a zero bit width encodes a stream of zeros with no bytes
                        self.remaining -= 1;
                        return Some(Ok(0));
                    }
                    return None;
                }
            };
            match next {
                Some(value) => {
                    self.remaining -= 1;
                    return Some(Ok(value));
                }
                None => {
                    if let Err(e) = self.load_run() {
                        self.remaining = 0;
                        return Some(Err(e));
                    }
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(values: &[u32], num_bits: u8) {
        let mut buffer = vec![];
        encode(&mut buffer, values, num_bits).unwrap();
        let decoded = HybridRleDecoder::try_new(&buffer, num_bits as u32, values.len())
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn literals_roundtrip() {
        roundtrip(&[0, 1, 2, 1, 2, 1, 1, 0, 3], 2);
    }

    #[test]
    fn runs_roundtrip() {
        let mut values = vec![7u32; 20];
        values.extend([0, 1, 2, 3]);
        values.extend(std::iter::repeat(2).take(9));
        roundtrip(&values, 3);
    }

    #[test]
    fn zero_bit_width() {
        let decoded = HybridRleDecoder::try_new(&[], 0, 5)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(decoded, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn empty_is_empty() {
        let decoded = HybridRleDecoder::try_new(&[], 1, 0)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn truncated_rle_run_surfaces_as_an_error() {
        // header declares an rle run of 8 two-byte values, but no value
        // bytes follow
        let buffer = [0b00010000u8];
        assert!(HybridRleDecoder::try_new(&buffer, 16, 8).is_err());
    }

    #[test]
    fn malformed_second_run_ends_iteration() {
        let mut buffer = vec![];
        encode(&mut buffer, &[1u32; 9], 16).unwrap();
        // an rle header with its value bytes chopped off
        buffer.extend([0b00010000u8]);
        let mut decoder = HybridRleDecoder::try_new(&buffer, 16, 20).unwrap();
        // the first, well-formed run decodes
        for _ in 0..9 {
            assert_eq!(decoder.next().unwrap().unwrap(), 1);
        }
        assert!(decoder.next().unwrap().is_err());
        assert!(decoder.next().is_none());
    }
}
