use crate::error::{Error, Result};

use super::super::{ceil8, uleb128};
use super::HybridEncoded;

/// An iterator over the runs of an RLE / bit-packed hybrid stream. Run
/// headers come from an untrusted page buffer, so every run is
/// bounds-checked before it is handed out.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    values: &'a [u8],
    num_bits: u32,
}

impl<'a> Decoder<'a> {
    pub fn new(values: &'a [u8], num_bits: u32) -> Self {
        Self { values, num_bits }
    }

    /// The number of bits each encoded value occupies.
    #[inline]
    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    fn next_run(&mut self) -> Result<HybridEncoded<'a>> {
        let (header, consumed) = uleb128::decode(self.values)?;
        self.values = &self.values[consumed..];
        if header & 1 == 1 {
            // <bit-packed-header> := (number-of-groups-of-8 << 1) | 1
            let groups = header as usize >> 1;
            let bytes = groups * self.num_bits as usize;
            let bytes = std::cmp::min(bytes, self.values.len());
            let (run, remaining) = self.values.split_at(bytes);
            self.values = remaining;
            Ok(HybridEncoded::Bitpacked(run))
        } else {
            // <rle-header> := run-length << 1; the repeated value takes
            // round-up-to-byte(num_bits) bytes
            let run_length = header as usize >> 1;
            let rle_bytes = ceil8(self.num_bits as usize);
            if rle_bytes > self.values.len() {
                return Err(Error::oos(
                    "the rle run header declares a value beyond the page buffer",
                ));
            }
            let (run, remaining) = self.values.split_at(rle_bytes);
            self.values = remaining;
            Ok(HybridEncoded::Rle(run, run_length))
        }
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<HybridEncoded<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.values.is_empty() || self.num_bits == 0 {
            return None;
        }
        let run = self.next_run();
        if run.is_err() {
            // do not resume decoding past a malformed run
            self.values = &[];
        }
        Some(run)
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::bitpacked;
    use super::*;

    #[test]
    fn bitpacked_run() {
        let num_bits = 1;
        // one group of 8 bit-packed values
        let values = [0b00000011u8, 0b00001011];

        let mut decoder = Decoder::new(&values, num_bits);
        match decoder.next().unwrap().unwrap() {
            HybridEncoded::Bitpacked(run) => {
                assert_eq!(run, &[0b00001011]);
                let decoded =
                    bitpacked::Decoder::<u32>::new(run, num_bits as usize, 5).collect::<Vec<_>>();
                assert_eq!(decoded, &[1, 1, 0, 1, 0]);
            }
            _ => panic!(),
        }
    }

    #[test]
    fn rle_run() {
        let num_bits = 1;
        // a run of 8 repetitions of the value 1
        let values = [0b00010000u8, 0b00000001];

        let mut decoder = Decoder::new(&values, num_bits);
        match decoder.next().unwrap().unwrap() {
            HybridEncoded::Rle(run, length) => {
                assert_eq!(run, &[0b00000001]);
                assert_eq!(length, 8);
            }
            _ => panic!(),
        }
    }

    #[test]
    fn mixed_runs() {
        let num_bits = 2;
        // rle run of 3 x 2, then one group of 8 bit-packed values
        let values = [
            0b00000110u8,
            0b00000010, // rle: 3 times the value 2
            0b00000011,
            0b10_01_00_11,
            0b00_11_10_01, // bitpacked
        ];

        let mut decoder = Decoder::new(&values, num_bits);
        assert_eq!(
            decoder.next().unwrap().unwrap(),
            HybridEncoded::Rle(&[0b00000010], 3)
        );
        match decoder.next().unwrap().unwrap() {
            HybridEncoded::Bitpacked(run) => assert_eq!(run.len(), 2),
            _ => panic!(),
        }
        assert!(decoder.next().is_none());
    }

    #[test]
    fn truncated_rle_run_is_an_error() {
        // a 16-bit-wide rle run header with no value bytes behind it
        let values = [0b00010000u8];
        let mut decoder = Decoder::new(&values, 16);
        assert!(decoder.next().unwrap().is_err());
        // the decoder does not resume past the malformed run
        assert!(decoder.next().is_none());
    }

    #[test]
    fn overlong_header_is_an_error() {
        let values = [0xFF; 11];
        let mut decoder = Decoder::new(&values, 1);
        assert!(decoder.next().unwrap().is_err());
    }
}
