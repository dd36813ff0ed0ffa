//! PLAIN encoding: little-endian fixed width for numerics, length-prefixed
//! slices for BYTE_ARRAY, raw bytes for FIXED_LEN_BYTE_ARRAY and packed
//! bits for BOOLEAN.
use crate::error::{Error, Result};
use crate::types::NativeType;

use super::hybrid_rle::{encode_bitmap, BitmapIter};

pub fn encode_native<T: NativeType>(values: &[T], buffer: &mut Vec<u8>) {
    buffer.reserve(values.len() * std::mem::size_of::<T>());
    for value in values {
        buffer.extend_from_slice(value.to_le_bytes().as_ref());
    }
}

pub fn encode_boolean(values: &[bool], buffer: &mut Vec<u8>) {
    // infallible: the sink is a vec
    encode_bitmap(buffer, values.iter().copied()).unwrap();
}

pub fn encode_binary<'a, I: Iterator<Item = &'a [u8]>>(values: I, buffer: &mut Vec<u8>) {
    for value in values {
        buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
        buffer.extend_from_slice(value);
    }
}

pub fn encode_fixed<'a, I: Iterator<Item = &'a [u8]>>(values: I, buffer: &mut Vec<u8>) {
    for value in values {
        buffer.extend_from_slice(value);
    }
}

/// Decodes `length` native values, failing when the buffer is too short.
pub fn decode_native<T: NativeType>(buffer: &[u8], length: usize) -> Result<Vec<T>> {
    let size = std::mem::size_of::<T>();
    if buffer.len() < length * size {
        return Err(Error::oos(format!(
            "the page declares {} plain values but its buffer holds {} bytes",
            length,
            buffer.len()
        )));
    }
    Ok(buffer[..length * size]
        .chunks_exact(size)
        .map(|chunk| {
            let bytes: T::Bytes = chunk.try_into().unwrap();
            T::from_le_bytes(bytes)
        })
        .collect())
}

/// Decodes `length` booleans from packed bits.
pub fn decode_boolean(buffer: &[u8], length: usize) -> Result<Vec<bool>> {
    if buffer.len() * 8 < length {
        return Err(Error::oos(format!(
            "the page declares {} boolean values but its buffer holds {} bytes",
            length,
            buffer.len()
        )));
    }
    Ok(BitmapIter::new(buffer, 0, length).collect())
}

/// An iterator over length-prefixed slices, bounds-checked on every step.
#[derive(Debug, Clone)]
pub struct BinaryIter<'a> {
    values: &'a [u8],
    remaining: usize,
}

impl<'a> BinaryIter<'a> {
    pub fn new(values: &'a [u8], length: usize) -> Self {
        Self {
            values,
            remaining: length,
        }
    }
}

impl<'a> Iterator for BinaryIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.values.len() < 4 {
            return Some(Err(Error::oos(
                "the page declares more byte-array values than its buffer holds",
            )));
        }
        let length = u32::from_le_bytes(self.values[..4].try_into().unwrap()) as usize;
        self.values = &self.values[4..];
        if self.values.len() < length {
            return Some(Err(Error::oos(
                "a byte-array length prefix exceeds the remaining page buffer",
            )));
        }
        let (value, remaining) = self.values.split_at(length);
        self.values = remaining;
        Some(Ok(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// An iterator over raw fixed-width slices.
#[derive(Debug, Clone)]
pub struct FixedLenIter<'a> {
    values: &'a [u8],
    size: usize,
    remaining: usize,
}

impl<'a> FixedLenIter<'a> {
    pub fn new(values: &'a [u8], size: usize, length: usize) -> Self {
        Self {
            values,
            size,
            remaining: length,
        }
    }
}

impl<'a> Iterator for FixedLenIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.values.len() < self.size {
            return Some(Err(Error::oos(
                "the page declares more fixed-length values than its buffer holds",
            )));
        }
        let (value, remaining) = self.values.split_at(self.size);
        self.values = remaining;
        Some(Ok(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_roundtrip() {
        let values = [1i32, -1, i32::MAX, i32::MIN];
        let mut buffer = vec![];
        encode_native(&values, &mut buffer);
        assert_eq!(buffer.len(), 16);
        assert_eq!(decode_native::<i32>(&buffer, 4).unwrap(), values);
    }

    #[test]
    fn native_count_is_validated() {
        let buffer = vec![0u8; 6];
        assert!(decode_native::<i32>(&buffer, 2).is_err());
    }

    #[test]
    fn boolean_packing() {
        let values = [true, false, true, true, false, false, false, true, true];
        let mut buffer = vec![];
        encode_boolean(&values, &mut buffer);
        assert_eq!(buffer, vec![0b10001101, 0b00000001]);
        assert_eq!(decode_boolean(&buffer, 9).unwrap(), values);
    }

    #[test]
    fn binary_roundtrip() {
        let values: Vec<&[u8]> = vec![b"test", b"", b"parquet"];
        let mut buffer = vec![];
        encode_binary(values.iter().copied(), &mut buffer);

        let decoded = BinaryIter::new(&buffer, 3)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn binary_length_prefix_is_validated() {
        // declares 100 bytes but carries none
        let buffer = 100u32.to_le_bytes();
        let result = BinaryIter::new(&buffer, 1).collect::<Result<Vec<_>>>();
        assert!(result.is_err());
    }
}
