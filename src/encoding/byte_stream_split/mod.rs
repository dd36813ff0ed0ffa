// see https://github.com/apache/parquet-format/blob/master/Encodings.md#byte-stream-split-byte_stream_split--9
mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::encode;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[test]
    fn floats() -> Result<()> {
        let data = vec![1.5f32, -2.25, 0.0, f32::MAX];
        let mut buffer = vec![];
        encode(&data, &mut buffer);

        let result = Decoder::<f32>::try_new(&buffer)?.collect::<Result<Vec<_>>>()?;
        assert_eq!(result, data);
        Ok(())
    }

    #[test]
    fn doubles() -> Result<()> {
        let data = vec![1e300f64, -2.5, 0.1];
        let mut buffer = vec![];
        encode(&data, &mut buffer);

        let result = Decoder::<f64>::try_new(&buffer)?.collect::<Result<Vec<_>>>()?;
        assert_eq!(result, data);
        Ok(())
    }

    #[test]
    fn misaligned_buffer_errors() {
        assert!(Decoder::<f32>::try_new(&[0u8; 7]).is_err());
    }
}
