use crate::error::Result;

use super::super::delta_bitpacked;
use super::super::delta_length_byte_array;

/// Decodes `DELTA_BYTE_ARRAY`: iterate the prefix lengths, then move on to
/// the suffix lengths and values with [`Decoder::into_lengths`]. Malformed
/// length streams surface as errors.
#[derive(Debug)]
pub struct Decoder<'a> {
    values: &'a [u8],
    prefix_lengths: delta_bitpacked::Decoder<'a>,
}

impl<'a> Decoder<'a> {
    pub fn try_new(values: &'a [u8]) -> Result<Self> {
        let prefix_lengths = delta_bitpacked::Decoder::try_new(values)?;
        Ok(Self {
            values,
            prefix_lengths,
        })
    }

    /// The decoder of suffix lengths and values.
    /// # Panics
    /// If the prefix-length iterator was not fully consumed.
    pub fn into_lengths(self) -> Result<delta_length_byte_array::Decoder<'a>> {
        assert_eq!(self.prefix_lengths.size_hint().0, 0);
        let consumed = self.prefix_lengths.consumed_bytes().min(self.values.len());
        delta_length_byte_array::Decoder::try_new(&self.values[consumed..])
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.prefix_lengths.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.prefix_lengths.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_spark() {
        // VALIDATED from Spark==3.1.1
        let data = &[
            128, 1, 4, 2, 0, 0, 0, 0, 0, 0, 128, 1, 4, 2, 10, 0, 0, 0, 0, 0, 72, 101, 108, 108,
            111, 87, 111, 114, 108, 100,
            // extra bytes, ignored: they are beyond the sum of all lengths
            1, 2, 3,
        ];
        let expected = &["Hello", "World"];
        let expected_lengths = expected.iter().map(|x| x.len() as i64).collect::<Vec<_>>();
        let expected_values = expected.join("");

        let mut decoder = Decoder::try_new(data).unwrap();
        let prefixes = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(prefixes, vec![0, 0]);

        let mut decoder = decoder.into_lengths().unwrap();
        let lengths = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(lengths, expected_lengths);

        assert_eq!(decoder.into_values(), expected_values.as_bytes());
    }

    #[test]
    fn malformed_prefix_stream_is_an_error() {
        let data = &[100u8, 1, 2, 0];
        assert!(Decoder::try_new(data).is_err());
    }
}
