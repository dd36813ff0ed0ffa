use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::types::NativeType;

/// Decodes a `BYTE_STREAM_SPLIT` buffer into native values.
#[derive(Debug)]
pub struct Decoder<'a, T: NativeType> {
    values: &'a [u8],
    num_elements: usize,
    current: usize,
    phantom: PhantomData<T>,
}

impl<'a, T: NativeType> Decoder<'a, T> {
    pub fn try_new(values: &'a [u8]) -> Result<Self> {
        let element_size = std::mem::size_of::<T>();
        if values.len() % element_size != 0 {
            return Err(Error::oos(
                "the byte-stream-split buffer is not a multiple of the element size",
            ));
        }
        Ok(Self {
            values,
            num_elements: values.len() / element_size,
            current: 0,
            phantom: PhantomData,
        })
    }
}

impl<'a, T: NativeType> Iterator for Decoder<'a, T> {
    type Item = Result<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.num_elements {
            return None;
        }
        let element_size = std::mem::size_of::<T>();
        let mut gathered = vec![0u8; element_size];
        for (n, byte) in gathered.iter_mut().enumerate() {
            *byte = self.values[self.num_elements * n + self.current];
        }
        self.current += 1;

        let bytes: T::Bytes = match gathered.as_slice().try_into() {
            Ok(bytes) => bytes,
            Err(e) => return Some(Err(e.into())),
        };
        Some(Ok(T::from_le_bytes(bytes)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_elements - self.current;
        (remaining, Some(remaining))
    }
}
