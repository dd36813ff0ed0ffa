//! Hash-keyed deduplicating value stores, one per physical shape. Each
//! dictionary owns the chunk's unique values in insertion order and maps
//! values to `u32` indices; data pages reference it through
//! `RLE_DICTIONARY`-encoded indices.
use std::collections::HashMap;
use std::hash::Hash;

use crate::bounds;
use crate::encoding::plain;
use crate::error::{Error, Result};
use crate::types::NativeType;

/// A dictionary of fixed-width native values, keyed by bit pattern so that
/// floats can participate.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveDictionary<T: NativeType>
where
    T::Bytes: Hash + Eq,
{
    values: Vec<T>,
    index: HashMap<T::Bytes, u32>,
}

impl<T: NativeType> PrimitiveDictionary<T>
where
    T::Bytes: Hash + Eq,
{
    pub fn new() -> Self {
        Self {
            values: vec![],
            index: HashMap::new(),
        }
    }

    /// The index of `value`, inserting it if new.
    pub fn insert(&mut self, value: T) -> u32 {
        *self.index.entry(value.to_le_bytes()).or_insert_with(|| {
            self.values.push(value);
            (self.values.len() - 1) as u32
        })
    }

    /// Resolves `indexes` into `out`, bounds-checking every index.
    pub fn lookup(&self, indexes: &[u32], out: &mut Vec<T>) -> Result<()> {
        out.reserve(indexes.len());
        for index in indexes {
            out.push(self.get(*index)?);
        }
        Ok(())
    }

    pub fn get(&self, index: u32) -> Result<T> {
        self.values
            .get(index as usize)
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                index: index as usize,
                length: self.values.len(),
            })
    }

    /// Min/max over the subset referenced by `indexes`, NaN excluded.
    pub fn bounds(&self, indexes: &[u32]) -> Result<Option<(T, T)>> {
        let mut referenced = Vec::with_capacity(indexes.len());
        self.lookup(indexes, &mut referenced)?;
        Ok(bounds::bounds(&referenced))
    }

    /// Total bytes of the stored values.
    pub fn byte_size(&self) -> usize {
        self.values.len() * std::mem::size_of::<T>()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.index.clear();
    }

    /// Drops the hash table; the dictionary keeps answering lookups but no
    /// longer accepts inserts. Called when the owning chunk is flushed.
    pub fn freeze(&mut self) {
        self.index = HashMap::new();
    }

    /// The PLAIN-encoded dictionary page payload.
    pub fn to_plain(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.byte_size());
        plain::encode_native(&self.values, &mut buffer);
        buffer
    }
}

/// A dictionary of variable-length byte arrays.
#[derive(Debug, Clone, Default)]
pub struct BinaryDictionary {
    values: Vec<Vec<u8>>,
    value_bytes: usize,
    index: HashMap<Vec<u8>, u32>,
}

impl BinaryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: &[u8]) -> u32 {
        if let Some(index) = self.index.get(value) {
            return *index;
        }
        let index = self.values.len() as u32;
        self.index.insert(value.to_vec(), index);
        self.values.push(value.to_vec());
        self.value_bytes += value.len();
        index
    }

    pub fn get(&self, index: u32) -> Result<&[u8]> {
        self.values
            .get(index as usize)
            .map(|x| x.as_slice())
            .ok_or(Error::IndexOutOfBounds {
                index: index as usize,
                length: self.values.len(),
            })
    }

    pub fn lookup(&self, indexes: &[u32], out: &mut Vec<Vec<u8>>) -> Result<()> {
        out.reserve(indexes.len());
        for index in indexes {
            out.push(self.get(*index)?.to_vec());
        }
        Ok(())
    }

    /// Byte-wise min/max over the subset referenced by `indexes`.
    pub fn bounds(&self, indexes: &[u32]) -> Result<Option<(&[u8], &[u8])>> {
        let referenced = indexes
            .iter()
            .map(|index| self.get(*index))
            .collect::<Result<Vec<_>>>()?;
        Ok(bounds::bounds_binary(referenced.into_iter()))
    }

    /// Total bytes of the stored values, length prefixes excluded.
    pub fn byte_size(&self) -> usize {
        self.value_bytes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.index.clear();
        self.value_bytes = 0;
    }

    pub fn freeze(&mut self) {
        self.index = HashMap::new();
    }

    pub fn to_plain(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.value_bytes + self.values.len() * 4);
        plain::encode_binary(self.values.iter().map(|x| x.as_slice()), &mut buffer);
        buffer
    }
}

/// A dictionary of fixed-length byte arrays, stored contiguously.
#[derive(Debug, Clone)]
pub struct FixedLenDictionary {
    size: usize,
    values: Vec<u8>,
    index: HashMap<Vec<u8>, u32>,
}

impl FixedLenDictionary {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            values: vec![],
            index: HashMap::new(),
        }
    }

    pub fn insert(&mut self, value: &[u8]) -> Result<u32> {
        if value.len() != self.size {
            return Err(Error::Coercion(format!(
                "a FIXED_LEN_BYTE_ARRAY({}) dictionary cannot hold {} bytes",
                self.size,
                value.len()
            )));
        }
        if let Some(index) = self.index.get(value) {
            return Ok(*index);
        }
        let index = (self.values.len() / self.size) as u32;
        self.index.insert(value.to_vec(), index);
        self.values.extend_from_slice(value);
        Ok(index)
    }

    pub fn get(&self, index: u32) -> Result<&[u8]> {
        let offset = index as usize * self.size;
        if offset + self.size > self.values.len() {
            return Err(Error::IndexOutOfBounds {
                index: index as usize,
                length: self.len(),
            });
        }
        Ok(&self.values[offset..offset + self.size])
    }

    /// Byte-wise (big-endian) min/max over the referenced subset.
    pub fn bounds(&self, indexes: &[u32]) -> Result<Option<(&[u8], &[u8])>> {
        let referenced = indexes
            .iter()
            .map(|index| self.get(*index))
            .collect::<Result<Vec<_>>>()?;
        Ok(bounds::bounds_binary(referenced.into_iter()))
    }

    pub fn byte_size(&self) -> usize {
        self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len() / self.size
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn reset(&mut self) {
        self.values.clear();
        self.index.clear();
    }

    pub fn freeze(&mut self) {
        self.index = HashMap::new();
    }

    pub fn to_plain(&self) -> Vec<u8> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut dictionary = PrimitiveDictionary::<i32>::new();
        let first = dictionary.insert(10);
        dictionary.insert(20);
        assert_eq!(dictionary.insert(10), first);
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.get(first).unwrap(), 10);
    }

    #[test]
    fn lookup_inverts_insert() {
        let mut dictionary = BinaryDictionary::new();
        let values: Vec<&[u8]> = vec![b"Han", b"Leia", b"Luke", b"Han"];
        let indexes: Vec<u32> = values.iter().map(|v| dictionary.insert(v)).collect();
        assert_eq!(dictionary.len(), 3);

        let mut out = vec![];
        dictionary.lookup(&indexes, &mut out).unwrap();
        assert_eq!(out, values.iter().map(|x| x.to_vec()).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let mut dictionary = PrimitiveDictionary::<i64>::new();
        dictionary.insert(1);
        assert!(matches!(
            dictionary.get(7),
            Err(Error::IndexOutOfBounds { index: 7, length: 1 })
        ));
    }

    #[test]
    fn bounds_skip_nan() {
        let mut dictionary = PrimitiveDictionary::<f32>::new();
        let indexes = [
            dictionary.insert(f32::NAN),
            dictionary.insert(3.0),
            dictionary.insert(1.0),
        ];
        let (min, max) = dictionary.bounds(&indexes).unwrap().unwrap();
        assert_eq!((min, max), (1.0, 3.0));
    }

    #[test]
    fn fixed_len_rejects_wrong_width() {
        let mut dictionary = FixedLenDictionary::new(16);
        assert!(dictionary.insert(b"short").is_err());
    }
}
