use std::io::Write;

use super::super::{bitpacked, ceil8, uleb128};

/// How many consecutive equal values justify an RLE run.
const MIN_RLE_RUN: usize = 8;

/// Encodes `values` as an RLE / bit-packed hybrid stream of `num_bits`
/// values: runs of at least [`MIN_RLE_RUN`] equal values become RLE runs,
/// everything else is bit-packed in groups of 8. The trailing group is
/// zero-padded; decoders must stop at the declared value count.
pub fn encode<W: Write>(writer: &mut W, values: &[u32], num_bits: u8) -> std::io::Result<()> {
    let mut encoder = RunEncoder::new(writer, num_bits);
    for value in values {
        encoder.put(*value)?;
    }
    encoder.finish()
}

struct RunEncoder<'a, W: Write> {
    writer: &'a mut W,
    num_bits: u8,
    /// values not yet part of any run, fewer than 8
    buffered: [u32; 8],
    num_buffered: usize,
    previous: u32,
    repeat_count: usize,
    /// packed groups of the bit-packed run being accumulated
    packed: Vec<u8>,
    num_groups: usize,
}

impl<'a, W: Write> RunEncoder<'a, W> {
    fn new(writer: &'a mut W, num_bits: u8) -> Self {
        Self {
            writer,
            num_bits,
            buffered: [0; 8],
            num_buffered: 0,
            previous: 0,
            repeat_count: 0,
            packed: vec![],
            num_groups: 0,
        }
    }

    fn put(&mut self, value: u32) -> std::io::Result<()> {
        if self.repeat_count > 0 && value == self.previous {
            self.repeat_count += 1;
            if self.repeat_count >= MIN_RLE_RUN {
                // the buffered occurrences are subsumed by the run
                return Ok(());
            }
        } else {
            if self.repeat_count >= MIN_RLE_RUN {
                self.write_rle_run()?;
            }
            self.repeat_count = 1;
            self.previous = value;
        }
        self.buffered[self.num_buffered] = value;
        self.num_buffered += 1;
        if self.num_buffered == 8 {
            self.append_bitpacked_group();
        }
        Ok(())
    }

    fn finish(mut self) -> std::io::Result<()> {
        if self.repeat_count >= MIN_RLE_RUN {
            self.write_rle_run()?;
        } else if self.num_buffered > 0 {
            self.buffered[self.num_buffered..].fill(0);
            self.num_buffered = 8;
            self.append_bitpacked_group();
        }
        self.flush_bitpacked_run()
    }

    /// Packs the 8 buffered values onto the open bit-packed run.
    fn append_bitpacked_group(&mut self) {
        let offset = self.packed.len();
        self.packed.resize(offset + self.num_bits as usize, 0);
        bitpacked::encode(
            &self.buffered[..8],
            self.num_bits as usize,
            &mut self.packed[offset..],
        );
        self.num_groups += 1;
        self.num_buffered = 0;
        self.repeat_count = 0;
    }

    fn flush_bitpacked_run(&mut self) -> std::io::Result<()> {
        if self.num_groups == 0 {
            return Ok(());
        }
        let mut container = [0; 10];
        let header = ((self.num_groups as u64) << 1) | 1;
        let used = uleb128::encode(header, &mut container);
        self.writer.write_all(&container[..used])?;
        self.writer.write_all(&self.packed)?;
        self.packed.clear();
        self.num_groups = 0;
        Ok(())
    }

    fn write_rle_run(&mut self) -> std::io::Result<()> {
        // an rle run terminates any open bit-packed run
        self.flush_bitpacked_run()?;

        let mut container = [0; 10];
        let used = uleb128::encode((self.repeat_count as u64) << 1, &mut container);
        self.writer.write_all(&container[..used])?;
        let bytes = self.previous.to_le_bytes();
        self.writer.write_all(&bytes[..ceil8(self.num_bits as usize)])?;

        self.repeat_count = 0;
        self.num_buffered = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_equal_becomes_rle() {
        let values = vec![1u32; 12];
        let mut buffer = vec![];
        encode(&mut buffer, &values, 1).unwrap();
        // header 12 << 1, value on one byte
        assert_eq!(buffer, vec![24, 1]);
    }

    #[test]
    fn mixed_values_are_bitpacked() {
        let values = [0u32, 1, 2, 1, 2, 1, 1, 0];
        let mut buffer = vec![];
        encode(&mut buffer, &values, 2).unwrap();
        assert_eq!(
            buffer,
            vec![(1 << 1) | 1, 0b01_10_01_00, 0b00_01_01_10]
        );
    }

    #[test]
    fn trailing_group_is_padded() {
        let values = [0u32, 1, 2, 1, 2, 1, 1, 0, 3];
        let mut buffer = vec![];
        encode(&mut buffer, &values, 2).unwrap();
        assert_eq!(
            buffer,
            vec![(2 << 1) | 1, 0b01_10_01_00, 0b00_01_01_10, 0b00_00_00_11, 0]
        );
    }

    #[test]
    fn rle_after_literals() {
        let mut values = vec![0u32, 1, 2, 3, 0, 1, 2, 3];
        values.extend(std::iter::repeat(7).take(10));
        let mut buffer = vec![];
        encode(&mut buffer, &values, 3).unwrap();
        let expected = vec![
            (1 << 1) | 1, // one bit-packed group
            0b11_010_001,
            0b0_001_000_0,
            0b011_010_0,
            10 << 1, // rle run of 10
            7,
        ];
        assert_eq!(buffer.len(), expected.len());
        assert_eq!(buffer[0], expected[0]);
        assert_eq!(buffer[4], expected[4]);
        assert_eq!(buffer[5], expected[5]);
    }
}
