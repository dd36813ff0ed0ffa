use seq_macro::seq;

/// Generates an unpack kernel for one unpacked width, plus the runtime
/// dispatcher over every valid number of bits.
macro_rules! unpack_impl {
    ($kernel:ident, $dispatch:ident, $t:ty, $length:expr, $max_bits:literal) => {
        #[inline]
        fn $kernel<const NUM_BITS: usize>(input: &[u8], output: &mut [$t; $length]) {
            if NUM_BITS == 0 {
                for out in output.iter_mut() {
                    *out = 0;
                }
                return;
            }
            let mask = (1u128 << NUM_BITS) - 1;

            let mut start_bit = 0;
            for out in output.iter_mut() {
                let start_byte = start_bit / 8;
                let offset = start_bit % 8;
                let num_bytes = (offset + NUM_BITS + 7) / 8;

                let mut window = 0u128;
                for (i, byte) in input[start_byte..start_byte + num_bytes].iter().enumerate() {
                    window |= (*byte as u128) << (8 * i);
                }
                *out = ((window >> offset) & mask) as $t;
                start_bit += NUM_BITS;
            }
        }

        /// Unpacks `output.len()` values of `num_bits` each from `input`.
        /// `input` must hold at least `ceil8(num_bits * output.len())` bytes.
        pub fn $dispatch(input: &[u8], output: &mut [$t; $length], num_bits: usize) {
            seq!(i in 0..=$max_bits {
                match num_bits {
                    #(i => $kernel::<i>(input, output),)*
                    _ => unreachable!("unpacking with an invalid number of bits"),
                }
            })
        }
    };
}

unpack_impl!(kernel8, unpack8, u8, 8, 8);
unpack_impl!(kernel16, unpack16, u16, 16, 16);
unpack_impl!(kernel32, unpack32, u32, 32, 32);
unpack_impl!(kernel64, unpack64, u64, 64, 64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_three_bits() {
        let input = [0b10001000u8, 0b11000110, 0b11111010, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut output = [0u32; 32];
        unpack32(&input, &mut output, 3);
        assert_eq!(&output[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unpack_full_width() {
        let values: [u64; 64] = std::array::from_fn(|i| u64::MAX - i as u64);
        let mut packed = [0u8; 64 * 8];
        super::super::pack::pack64(&values, &mut packed, 64);
        let mut output = [0u64; 64];
        unpack64(&packed, &mut output, 64);
        assert_eq!(output, values);
    }
}
