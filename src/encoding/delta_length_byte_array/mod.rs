// see https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-length-byte-array-delta_length_byte_array--6
mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::encode;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[test]
    fn basic() {
        let data: Vec<&[u8]> = vec![b"Hello", b"World"];
        let mut buffer = vec![];
        encode(data.iter().copied(), &mut buffer);

        let mut decoder = Decoder::try_new(&buffer).unwrap();
        let lengths = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(lengths, vec![5, 5]);
        assert_eq!(decoder.into_values(), b"HelloWorld");
    }

    #[test]
    fn empty_strings() {
        let data: Vec<&[u8]> = vec![b"", b"a", b""];
        let mut buffer = vec![];
        encode(data.iter().copied(), &mut buffer);

        let mut decoder = Decoder::try_new(&buffer).unwrap();
        let lengths = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(lengths, vec![0, 1, 0]);
        assert_eq!(decoder.into_values(), b"a");
    }

    #[test]
    fn malformed_length_stream_is_an_error() {
        // block size 100 is not a multiple of 128
        let buffer = [100u8, 1, 5, 2];
        assert!(Decoder::try_new(&buffer).is_err());
    }
}
