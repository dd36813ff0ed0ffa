//! LSB-first bit packing of unsigned integers in groups of
//! `width-in-bits` values, the layout the RLE hybrid and the delta codecs
//! build on.
mod pack;
mod unpack;

use super::ceil8;

/// A byte buffer large enough to hold one fully packed group.
pub trait Packed: Copy + Sized + AsRef<[u8]> + AsMut<[u8]> {
    const LENGTH: usize;
    fn zero() -> Self;
}

macro_rules! packed {
    ($length:expr) => {
        impl Packed for [u8; $length] {
            const LENGTH: usize = $length;
            #[inline]
            fn zero() -> Self {
                [0; $length]
            }
        }
    };
}

packed!(8);
packed!(16 * 2);
packed!(32 * 4);
packed!(64 * 8);

/// One unpacked group of values.
pub trait Unpacked<T>:
    Copy + Sized + AsRef<[T]> + AsMut<[T]> + std::ops::Index<usize, Output = T>
{
    const LENGTH: usize;
    fn zero() -> Self;
}

macro_rules! unpacked {
    ($t:ty, $length:expr) => {
        impl Unpacked<$t> for [$t; $length] {
            const LENGTH: usize = $length;
            #[inline]
            fn zero() -> Self {
                [0; $length]
            }
        }
    };
}

unpacked!(u8, 8);
unpacked!(u16, 16);
unpacked!(u32, 32);
unpacked!(u64, 64);

/// An unsigned integer that can be bit-packed and unpacked in groups of its
/// bit width.
pub trait Unpackable: Copy + Sized + Default {
    type Packed: Packed;
    type Unpacked: Unpacked<Self>;

    fn unpack(packed: &[u8], num_bits: usize, unpacked: &mut Self::Unpacked);
    fn pack(unpacked: &Self::Unpacked, num_bits: usize, packed: &mut [u8]);
}

macro_rules! unpackable {
    ($t:ty, $packed:ty, $unpacked:ty, $unpack:ident, $pack:ident) => {
        impl Unpackable for $t {
            type Packed = $packed;
            type Unpacked = $unpacked;

            #[inline]
            fn unpack(packed: &[u8], num_bits: usize, unpacked: &mut Self::Unpacked) {
                unpack::$unpack(packed, unpacked, num_bits)
            }

            #[inline]
            fn pack(unpacked: &Self::Unpacked, num_bits: usize, packed: &mut [u8]) {
                pack::$pack(unpacked, packed, num_bits)
            }
        }
    };
}

unpackable!(u8, [u8; 8], [u8; 8], unpack8, pack8);
unpackable!(u16, [u8; 16 * 2], [u16; 16], unpack16, pack16);
unpackable!(u32, [u8; 32 * 4], [u32; 32], unpack32, pack32);
unpackable!(u64, [u8; 64 * 8], [u64; 64], unpack64, pack64);

/// Encodes `unpacked` into `packed` with `num_bits` per value, returning
/// the number of bytes written. `packed` must be zeroed and hold at least
/// `ceil8(num_bits * unpacked.len())` bytes.
pub fn encode<T: Unpackable>(unpacked: &[T], num_bits: usize, packed: &mut [u8]) -> usize {
    let group_length = T::Unpacked::LENGTH;
    let packed_group_size = ceil8(group_length * num_bits);

    let mut written = 0;
    for group in unpacked.chunks(group_length) {
        let mut buffer = T::Unpacked::zero();
        buffer.as_mut()[..group.len()].copy_from_slice(group);

        if group.len() == group_length && packed.len() >= written + packed_group_size {
            T::pack(&buffer, num_bits, &mut packed[written..]);
            written += packed_group_size;
        } else {
            // partial trailing group: pack into scratch so the kernel can
            // write a full group, then keep only the meaningful bytes
            let mut scratch = T::Packed::zero();
            T::pack(&buffer, num_bits, scratch.as_mut());
            let meaningful = ceil8(group.len() * num_bits);
            packed[written..written + meaningful]
                .copy_from_slice(&scratch.as_ref()[..meaningful]);
            written += meaningful;
        }
    }
    written
}

#[inline]
fn decode_group<T: Unpackable>(packed: &[u8], num_bits: usize, unpacked: &mut T::Unpacked) {
    let group_size = T::Unpacked::LENGTH * num_bits / 8;

    if packed.len() < group_size {
        // a trailing partial group: widen it with zeros so the kernel can
        // read full windows
        let mut buffer = T::Packed::zero();
        buffer.as_mut()[..packed.len()].copy_from_slice(packed);
        T::unpack(buffer.as_ref(), num_bits, unpacked)
    } else {
        T::unpack(packed, num_bits, unpacked)
    }
}

/// An iterator over `length` values of `num_bits` each.
#[derive(Debug, Clone)]
pub struct Decoder<'a, T: Unpackable> {
    packed_groups: std::slice::Chunks<'a, u8>,
    num_bits: usize,
    remaining: usize,
    current_group: T::Unpacked,
    // invariant: < T::Unpacked::LENGTH
    current_index: usize,
}

impl<'a, T: Unpackable> Decoder<'a, T> {
    pub fn new(packed: &'a [u8], num_bits: usize, mut length: usize) -> Self {
        let group_size = std::cmp::max(T::Unpacked::LENGTH * num_bits / 8, 1);

        let mut packed_groups = packed.chunks(group_size);
        let mut current_group = T::Unpacked::zero();
        if num_bits == 0 {
            // every value is zero; the buffer carries nothing
        } else if let Some(group) = packed_groups.next() {
            decode_group::<T>(group, num_bits, &mut current_group);
        } else {
            length = 0
        }

        Self {
            packed_groups,
            num_bits,
            remaining: length,
            current_group,
            current_index: 0,
        }
    }
}

impl<'a, T: Unpackable> Iterator for Decoder<'a, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.current_group[self.current_index];
        self.current_index += 1;
        if self.current_index == T::Unpacked::LENGTH {
            if let Some(group) = self.packed_groups.next() {
                decode_group::<T>(group, self.num_bits, &mut self.current_group);
            }
            self.current_index = 0;
        }
        self.remaining -= 1;
        Some(result)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Unpackable> ExactSizeIterator for Decoder<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> (usize, Vec<u32>, Vec<u8>) {
        let num_bits = 3;
        let packed = std::iter::repeat([0b10001000u8, 0b11000110, 0b11111010])
            .take(5)
            .flatten()
            .collect();
        let unpacked = std::iter::repeat([0u32, 1, 2, 3, 4, 5, 6, 7])
            .take(5)
            .flatten()
            .collect();
        (num_bits, unpacked, packed)
    }

    #[test]
    fn decode_basic() {
        let num_bits = 3;
        let data = [0b10001000u8, 0b11000110, 0b11111010];
        let decoded = Decoder::<u32>::new(&data, num_bits, 8).collect::<Vec<_>>();
        assert_eq!(decoded, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn decode_across_groups() {
        let (num_bits, expected, data) = case();
        let decoded = Decoder::<u32>::new(&data, num_bits, expected.len()).collect::<Vec<_>>();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn encode_matches() {
        let (num_bits, unpacked, expected) = case();
        let mut packed = vec![0u8; 4 * 32];
        let written = encode(&unpacked, num_bits, &mut packed);
        assert_eq!(&packed[..15], expected);
        assert_eq!(written, 15);
    }

    #[test]
    fn decode_bools() {
        let data = [0b10101010u8];
        let decoded = Decoder::<u32>::new(&data, 1, 8).collect::<Vec<_>>();
        assert_eq!(decoded, vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn odd_trailing_value() {
        // 4 groups of [0..=6, 0] and one extra element
        let data = [0b10001000u8, 0b11000110, 0b00011010];
        let num_bits = 3;
        let copies = 4;
        let expected = std::iter::repeat([0u32, 1, 2, 3, 4, 5, 6, 0])
            .take(copies)
            .flatten()
            .chain(std::iter::once(2))
            .collect::<Vec<_>>();
        let data = std::iter::repeat(data)
            .take(copies)
            .flatten()
            .chain(std::iter::once(0b00000010u8))
            .collect::<Vec<_>>();

        let decoded = Decoder::<u32>::new(&data, num_bits, expected.len()).collect::<Vec<_>>();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn u64_roundtrip() {
        let unpacked: Vec<u64> = (0..130).map(|x| x * 7 % 1024).collect();
        let num_bits = 10;
        let mut packed = vec![0u8; super::ceil8(unpacked.len() * num_bits) + 8];
        encode(&unpacked, num_bits, &mut packed);
        let decoded = Decoder::<u64>::new(&packed, num_bits, unpacked.len()).collect::<Vec<_>>();
        assert_eq!(decoded, unpacked);
    }
}
