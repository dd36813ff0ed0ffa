use super::super::{bitpacked, ceil8, uleb128, zigzag_leb128};

const BLOCK_SIZE: usize = 128;
const MINI_BLOCKS: usize = 1;

/// Encodes an iterator of `i64` according to `DELTA_BINARY_PACKED`.
/// # Implementation
/// The layout is one mini-block per block; deltas wrap on overflow as the
/// format requires.
pub fn encode<I: ExactSizeIterator<Item = i64>>(mut iterator: I, buffer: &mut Vec<u8>) {
    let mut container = [0u8; 10];

    let used = uleb128::encode(BLOCK_SIZE as u64, &mut container);
    buffer.extend_from_slice(&container[..used]);

    let used = uleb128::encode(MINI_BLOCKS as u64, &mut container);
    buffer.extend_from_slice(&container[..used]);

    let total_count = iterator.len();
    let used = uleb128::encode(total_count as u64, &mut container);
    buffer.extend_from_slice(&container[..used]);

    let first_value = iterator.next().unwrap_or(0);
    let (container, used) = zigzag_leb128::encode(first_value);
    buffer.extend_from_slice(&container[..used]);

    let mut deltas = [0i64; BLOCK_SIZE];
    let mut normalized = [0u64; BLOCK_SIZE];

    let mut previous = first_value;
    loop {
        let mut count = 0;
        while count < BLOCK_SIZE {
            match iterator.next() {
                Some(value) => {
                    deltas[count] = value.wrapping_sub(previous);
                    previous = value;
                    count += 1;
                }
                None => break,
            }
        }
        if count == 0 {
            break;
        }

        let min_delta = *deltas[..count].iter().min().unwrap();
        deltas[..count]
            .iter()
            .zip(normalized.iter_mut())
            .for_each(|(delta, slot)| {
                *slot = delta.wrapping_sub(min_delta) as u64;
            });
        let max_normalized = *normalized[..count].iter().max().unwrap();

        // <min delta> <bitwidths of miniblocks> <miniblocks>
        let (container, used) = zigzag_leb128::encode(min_delta);
        buffer.extend_from_slice(&container[..used]);

        let num_bits = (64 - max_normalized.leading_zeros()) as usize;
        buffer.push(num_bits as u8);

        if num_bits > 0 {
            // a written block always covers BLOCK_SIZE slots; trailing
            // slots beyond `count` pack as zeros
            normalized[count..].fill(0);
            let start = buffer.len();
            buffer.resize(start + ceil8(BLOCK_SIZE * num_bits), 0);
            bitpacked::encode(&normalized, num_bits, &mut buffer[start..]);
        }

        if count < BLOCK_SIZE {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_delta() {
        // header: [128, 1, 1, 5, 2]:
        //  block size: 128    <=u> 128, 1
        //  mini-blocks: 1     <=u> 1
        //  elements: 5        <=u> 5
        //  first_value: 2     <=z> 1
        // block1: [2, 0]
        //  min_delta: 1       <=z> 2
        //  bitwidth: 0
        let data = (1i32..6).map(i64::from);
        let expected = vec![128u8, 1, 1, 5, 2, 2, 0];

        let mut buffer = vec![];
        encode(data, &mut buffer);
        assert_eq!(expected, buffer);
    }

    #[test]
    fn negative_min_delta() {
        // max - min = 1 - -4 = 5 -> 3 bits
        let data = vec![1i64, 2, 3, 4, 5, 1];
        // header: [128, 1, 1, 6, 2]
        // block1 header: min_delta: -4 <=z> 7, bitwidth: 3
        // values: [5, 5, 5, 5, 0, ...] in 3 bits
        let mut expected = vec![128u8, 1, 1, 6, 2, 7, 3, 0b01101101, 0b00001011];
        expected.extend(std::iter::repeat(0).take(128 * 3 / 8 - 2));

        let mut buffer = vec![];
        encode(data.into_iter(), &mut buffer);
        assert_eq!(expected, buffer);
    }
}
