use crate::error::{Error, Result};

use super::super::{bitpacked, ceil8, uleb128, zigzag_leb128};

#[derive(Debug)]
struct Block<'a> {
    // the minimum delta, added to every normalized value of the block
    min_delta: i64,
    values_per_mini_block: usize,
    bitwidths: &'a [u8],
    values: &'a [u8],
    // number of deltas still to yield from this block
    remaining: usize,
    // invariant: < values_per_mini_block
    current_index: usize,
    // `None` when the miniblock's bit width is zero
    current_miniblock: Option<bitpacked::Decoder<'a, u64>>,
    consumed_bytes: usize,
}

impl<'a> Block<'a> {
    fn try_new(
        mut values: &'a [u8],
        num_mini_blocks: usize,
        values_per_mini_block: usize,
        length: usize,
    ) -> Result<Self> {
        let length = std::cmp::min(length, num_mini_blocks * values_per_mini_block);

        let mut consumed_bytes = 0;
        let (min_delta, consumed) = zigzag_leb128::decode(values)?;
        consumed_bytes += consumed;
        values = &values[consumed..];

        if values.len() < num_mini_blocks {
            return Err(Error::oos(
                "the delta block declares more mini-blocks than its buffer holds",
            ));
        }
        let bitwidths = &values[..num_mini_blocks];
        consumed_bytes += num_mini_blocks;
        values = &values[num_mini_blocks..];

        let mut block = Block {
            min_delta,
            values_per_mini_block,
            bitwidths,
            values,
            remaining: length,
            current_index: 0,
            current_miniblock: None,
            consumed_bytes,
        };
        block.advance_miniblock()?;
        Ok(block)
    }

    fn advance_miniblock(&mut self) -> Result<()> {
        let num_bits = *self.bitwidths.first().ok_or_else(|| {
            Error::oos("the delta block ran out of mini-block bit widths")
        })? as usize;
        self.bitwidths = &self.bitwidths[1..];

        self.current_miniblock = if num_bits > 0 {
            let length = std::cmp::min(self.remaining, self.values_per_mini_block);

            let miniblock_length = ceil8(self.values_per_mini_block * num_bits);
            if self.values.len() < miniblock_length {
                return Err(Error::oos(
                    "the delta mini-block exceeds the page buffer",
                ));
            }
            let (miniblock, remainder) = self.values.split_at(miniblock_length);

            self.values = remainder;
            self.consumed_bytes += miniblock_length;

            Some(bitpacked::Decoder::new(miniblock, num_bits, length))
        } else {
            None
        };
        self.current_index = 0;
        Ok(())
    }
}

impl<'a> Iterator for Block<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let normalized = self
            .current_miniblock
            .as_mut()
            .and_then(|miniblock| miniblock.next())
            .unwrap_or(0);
        let result = self.min_delta.wrapping_add(normalized as i64);

        self.current_index += 1;
        self.remaining -= 1;

        if self.remaining > 0 && self.current_index == self.values_per_mini_block {
            if let Err(e) = self.advance_miniblock() {
                self.remaining = 0;
                return Some(Err(e));
            }
        }

        Some(Ok(result))
    }
}

/// Decoder of `DELTA_BINARY_PACKED`, an iterator of `Result<i64>`.
/// The header is validated at construction; malformed blocks surface as
/// errors and end the iteration.
#[derive(Debug)]
pub struct Decoder<'a> {
    num_mini_blocks: usize,
    values_per_mini_block: usize,
    /// number of values still to yield
    total_count: usize,
    /// the running value
    next_value: i64,
    values: &'a [u8],
    current_block: Option<Block<'a>>,
    /// bytes consumed up to (excluding) `current_block`
    consumed_bytes: usize,
}

impl<'a> Decoder<'a> {
    pub fn try_new(mut values: &'a [u8]) -> Result<Self> {
        let mut consumed_bytes = 0;
        let (block_size, consumed) = uleb128::decode(values)?;
        consumed_bytes += consumed;
        if block_size == 0 || block_size % 128 != 0 {
            return Err(Error::oos(
                "the delta header's block size must be a non-zero multiple of 128",
            ));
        }
        values = &values[consumed..];
        let (num_mini_blocks, consumed) = uleb128::decode(values)?;
        let num_mini_blocks = num_mini_blocks as usize;
        consumed_bytes += consumed;
        if num_mini_blocks == 0 {
            return Err(Error::oos(
                "the delta header must declare at least one mini-block",
            ));
        }
        values = &values[consumed..];
        let (total_count, consumed) = uleb128::decode(values)?;
        let total_count = total_count as usize;
        consumed_bytes += consumed;
        values = &values[consumed..];
        let (first_value, consumed) = zigzag_leb128::decode(values)?;
        consumed_bytes += consumed;
        values = &values[consumed..];

        let values_per_mini_block = block_size as usize / num_mini_blocks;
        if values_per_mini_block == 0 || values_per_mini_block % 8 != 0 {
            return Err(Error::oos(
                "the delta mini-block size must be a non-zero multiple of 8",
            ));
        }

        // the first value is carried by the header; a block only exists when
        // there are deltas to decode
        let current_block = if total_count > 1 {
            Some(Block::try_new(
                values,
                num_mini_blocks,
                values_per_mini_block,
                total_count - 1,
            )?)
        } else {
            None
        };

        Ok(Self {
            num_mini_blocks,
            values_per_mini_block,
            total_count,
            next_value: first_value,
            values,
            current_block,
            consumed_bytes,
        })
    }

    /// The total number of bytes consumed by this decoder once exhausted.
    pub fn consumed_bytes(&self) -> usize {
        self.consumed_bytes
            + self
                .current_block
                .as_ref()
                .map(|block| block.consumed_bytes)
                .unwrap_or(0)
    }

    fn next_delta(&mut self) -> Result<i64> {
        if let Some(delta) = self.current_block.as_mut().and_then(|block| block.next()) {
            return delta;
        }
        // exhausted block: load the next one
        let block = self.current_block.take();
        let consumed = block.map(|block| block.consumed_bytes).unwrap_or(0);
        self.values = &self.values[consumed..];
        self.consumed_bytes += consumed;
        let mut block = Block::try_new(
            self.values,
            self.num_mini_blocks,
            self.values_per_mini_block,
            self.total_count,
        )?;
        let delta = block.next().ok_or_else(|| {
            Error::oos("the delta stream ended before its declared value count")
        })??;
        self.current_block = Some(block);
        Ok(delta)
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.total_count == 0 {
            return None;
        }
        self.total_count -= 1;
        let result = self.next_value;

        if self.total_count > 0 {
            match self.next_delta() {
                Ok(delta) => self.next_value = self.next_value.wrapping_add(delta),
                Err(e) => {
                    self.total_count = 0;
                    return Some(Err(e));
                }
            }
        }
        Some(Ok(result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.total_count, Some(self.total_count))
    }
}

impl<'a> ExactSizeIterator for Decoder<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_spark() {
        // VALIDATED from Spark==3.1.1
        // header: block size 128, 4 mini-blocks, 5 elements, first value 2
        // block1: min_delta 1, bit widths [0, 0, 0, 0]
        let data = &[128, 1, 4, 5, 2, 2, 0, 0, 0, 0];
        let expected = (1i64..=5).collect::<Vec<_>>();

        let mut decoder = Decoder::try_new(data).unwrap();
        let result = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(expected, result);
        assert_eq!(decoder.consumed_bytes(), 10);
    }

    #[test]
    fn from_spark_with_trailing_bytes() {
        // VALIDATED from Spark==3.1.1
        let data = &[
            128, 1, 4, 6, 2, 7, 3, 0, 0, 0, 0b01101101, 0b00001011, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            // trailing bytes not consumed by the decoder
            1, 2, 3,
        ];
        let expected = vec![1i64, 2, 3, 4, 5, 1];

        let mut decoder = Decoder::try_new(data).unwrap();
        let result = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(expected, result);
        assert_eq!(decoder.consumed_bytes(), data.len() - 3);
    }

    #[test]
    fn multiple_miniblocks() {
        #[rustfmt::skip]
        let data = &[
            // header: block size 128, 4 mini-blocks, 65 elements, first value 50
            128, 1, 4, 65, 100,
            // block 1 header: min_delta -4, bit widths [3, 4, 0, 0]
            7, 3, 4, 0, 0,
            // 32 3-bit zeros for mini-block 1 (12 bytes)
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            // 32 4-bit values of 8 for mini-block 2 (16 bytes)
            0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88,
            0x88, 0x88,
            // not consumed
            1, 2, 3,
        ];

        #[rustfmt::skip]
        let expected = [
            50i64,
            // mini-block 1: 32 deltas of -4
            46, 42, 38, 34, 30, 26, 22, 18, 14, 10, 6, 2, -2, -6, -10, -14, -18, -22, -26, -30,
            -34, -38, -42, -46, -50, -54, -58, -62, -66, -70, -74, -78,
            // mini-block 2: 32 deltas of 4
            -74, -70, -66, -62, -58, -54, -50, -46, -42, -38, -34, -30, -26, -22, -18, -14, -10,
            -6, -2, 2, 6, 10, 14, 18, 22, 26, 30, 34, 38, 42, 46, 50,
        ];

        let mut decoder = Decoder::try_new(data).unwrap();
        let result = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(&expected[..], &result[..]);
        assert_eq!(decoder.consumed_bytes(), data.len() - 3);
    }

    #[test]
    fn invalid_block_size_is_an_error() {
        // block size 100 is not a multiple of 128
        let data = &[100, 1, 5, 2];
        assert!(Decoder::try_new(data).is_err());
    }

    #[test]
    fn zero_mini_blocks_is_an_error() {
        let data = &[128, 1, 0, 5, 2];
        assert!(Decoder::try_new(data).is_err());
    }

    #[test]
    fn truncated_bitwidths_are_an_error() {
        // 4 mini-blocks declared, but the buffer ends after min_delta
        let data = &[128, 1, 4, 5, 2, 2];
        assert!(Decoder::try_new(data).is_err());
    }

    #[test]
    fn truncated_miniblock_is_an_error() {
        // mini-block 1 declares 3 bits per value (12 bytes) but holds 2
        let data = &[128, 1, 4, 6, 2, 7, 3, 0, 0, 0, 0b01101101, 0b00001011];
        assert!(Decoder::try_new(data).is_err());
    }
}
