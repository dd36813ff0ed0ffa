// see https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-encoding-delta_binary_packed--5
mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::encode;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    fn roundtrip(data: &[i64]) {
        let mut buffer = vec![];
        encode(data.iter().copied(), &mut buffer);
        let decoder = Decoder::try_new(&buffer).unwrap();
        let result = decoder.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn basic() {
        roundtrip(&[1, 3, 1, 2, 3]);
    }

    #[test]
    fn negative_values() {
        roundtrip(&[1, 3, -1, 2, 3]);
    }

    #[test]
    fn single_value() {
        roundtrip(&[42]);
    }

    #[test]
    fn empty() {
        roundtrip(&[]);
    }

    #[test]
    fn more_than_one_block() {
        let mut data = vec![1i64, 3, -1, 2, 3, 10, 1];
        for x in 0..128 {
            data.push(x - 10)
        }
        roundtrip(&data);
    }

    #[test]
    fn wide_deltas() {
        roundtrip(&[i64::MIN, i64::MAX, 0, -1, 1]);
    }

    #[test]
    fn consumed_bytes_stop_at_the_block() {
        let data = vec![1i64, 2, 3, 4, 5];
        let mut buffer = vec![];
        encode(data.iter().copied(), &mut buffer);
        let trailing = buffer.len();
        buffer.extend([1, 2, 3]);

        let mut decoder = Decoder::try_new(&buffer).unwrap();
        let result = decoder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(result, data);
        assert_eq!(decoder.consumed_bytes(), trailing);
    }
}
