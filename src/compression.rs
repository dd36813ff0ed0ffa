//! Page-payload compression: a thin, opaque block-compressor interface over
//! the codecs the parquet format allows.
use parquet_format_safe::CompressionCodec;

use crate::error::{Error, Result};

/// The compression applied to page payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    Uncompressed,
    Snappy,
    Gzip,
    Lzo,
    Brotli,
    Lz4,
    Zstd,
    Lz4Raw,
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Snappy
    }
}

impl TryFrom<CompressionCodec> for Compression {
    type Error = Error;

    fn try_from(codec: CompressionCodec) -> Result<Self> {
        Ok(match codec {
            CompressionCodec::UNCOMPRESSED => Compression::Uncompressed,
            CompressionCodec::SNAPPY => Compression::Snappy,
            CompressionCodec::GZIP => Compression::Gzip,
            CompressionCodec::LZO => Compression::Lzo,
            CompressionCodec::BROTLI => Compression::Brotli,
            CompressionCodec::LZ4 => Compression::Lz4,
            CompressionCodec::ZSTD => Compression::Zstd,
            CompressionCodec::LZ4_RAW => Compression::Lz4Raw,
            _ => return Err(Error::oos("CompressionCodec out of range")),
        })
    }
}

impl From<Compression> for CompressionCodec {
    fn from(codec: Compression) -> Self {
        match codec {
            Compression::Uncompressed => CompressionCodec::UNCOMPRESSED,
            Compression::Snappy => CompressionCodec::SNAPPY,
            Compression::Gzip => CompressionCodec::GZIP,
            Compression::Lzo => CompressionCodec::LZO,
            Compression::Brotli => CompressionCodec::BROTLI,
            Compression::Lz4 => CompressionCodec::LZ4,
            Compression::Zstd => CompressionCodec::ZSTD,
            Compression::Lz4Raw => CompressionCodec::LZ4_RAW,
        }
    }
}

/// A block compressor/decompressor.
pub trait Codec: Send + Sync {
    /// Compresses `input` and appends the result to `output`.
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()>;

    /// Decompresses `input` into exactly `output.len()` bytes.
    fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<()>;
}

/// Returns the codec for `compression`, `None` for `Uncompressed`.
pub fn create_codec(compression: Compression) -> Result<Option<Box<dyn Codec>>> {
    match compression {
        Compression::Uncompressed => Ok(None),
        #[cfg(feature = "snappy")]
        Compression::Snappy => Ok(Some(Box::new(snappy_codec::SnappyCodec::new()))),
        #[cfg(feature = "gzip")]
        Compression::Gzip => Ok(Some(Box::new(gzip_codec::GzipCodec))),
        #[cfg(feature = "brotli")]
        Compression::Brotli => Ok(Some(Box::new(brotli_codec::BrotliCodec))),
        #[cfg(feature = "lz4")]
        Compression::Lz4 | Compression::Lz4Raw => Ok(Some(Box::new(lz4_codec::Lz4Codec))),
        #[cfg(feature = "zstd")]
        Compression::Zstd => Ok(Some(Box::new(zstd_codec::ZstdCodec))),
        _ => Err(Error::FeatureNotActive(format!(
            "compression {:?} requires a feature that is not active",
            compression
        ))),
    }
}

#[cfg(feature = "snappy")]
mod snappy_codec {
    use snap::raw::{decompress_len, max_compress_len, Decoder, Encoder};

    use super::Codec;
    use crate::error::{Error, Result};

    pub(super) struct SnappyCodec {
        decoder: Decoder,
        encoder: Encoder,
    }

    impl SnappyCodec {
        pub(super) fn new() -> Self {
            Self {
                decoder: Decoder::new(),
                encoder: Encoder::new(),
            }
        }
    }

    impl Codec for SnappyCodec {
        fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
            let offset = output.len();
            output.resize(offset + max_compress_len(input.len()), 0);
            let written = self.encoder.compress(input, &mut output[offset..])?;
            output.truncate(offset + written);
            Ok(())
        }

        fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
            let expected = decompress_len(input)?;
            if expected > output.len() {
                return Err(Error::oos(
                    "the snappy payload decompresses to more bytes than the page header declares",
                ));
            }
            self.decoder.decompress(input, output)?;
            Ok(())
        }
    }
}

#[cfg(feature = "gzip")]
mod gzip_codec {
    use std::io::{Read, Write};

    use super::Codec;
    use crate::error::Result;

    pub(super) struct GzipCodec;

    impl Codec for GzipCodec {
        fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
            let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
            encoder.write_all(input)?;
            encoder.try_finish()?;
            Ok(())
        }

        fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
            let mut decoder = flate2::read::GzDecoder::new(input);
            decoder.read_exact(output)?;
            Ok(())
        }
    }
}

#[cfg(feature = "brotli")]
mod brotli_codec {
    use std::io::{Read, Write};

    use super::Codec;
    use crate::error::Result;

    const BUFFER_SIZE: usize = 4096;
    // supported levels 0-9
    const QUALITY: u32 = 1;
    // recommended between 20-22
    const LG_WINDOW_SIZE: u32 = 22;

    pub(super) struct BrotliCodec;

    impl Codec for BrotliCodec {
        fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
            let mut encoder =
                brotli::CompressorWriter::new(output, BUFFER_SIZE, QUALITY, LG_WINDOW_SIZE);
            encoder.write_all(input)?;
            encoder.flush()?;
            Ok(())
        }

        fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
            brotli::Decompressor::new(input, BUFFER_SIZE).read_exact(output)?;
            Ok(())
        }
    }
}

#[cfg(feature = "lz4")]
mod lz4_codec {
    use std::io::{Read, Write};

    use super::Codec;
    use crate::error::Result;

    pub(super) struct Lz4Codec;

    impl Codec for Lz4Codec {
        fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
            let mut encoder = lz4::EncoderBuilder::new().build(output)?;
            encoder.write_all(input)?;
            encoder.finish().1?;
            Ok(())
        }

        fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
            let mut decoder = lz4::Decoder::new(input)?;
            decoder.read_exact(output)?;
            Ok(())
        }
    }
}

#[cfg(feature = "zstd")]
mod zstd_codec {
    use std::io::{Read, Write};

    use super::Codec;
    use crate::error::Result;

    // favor speed over ratio
    const LEVEL: i32 = 1;

    pub(super) struct ZstdCodec;

    impl Codec for ZstdCodec {
        fn compress(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
            let mut encoder = zstd::Encoder::new(output, LEVEL)?;
            encoder.write_all(input)?;
            encoder.finish()?;
            Ok(())
        }

        fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
            let mut decoder = zstd::Decoder::new(input)?;
            decoder.read_exact(output)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(compression: Compression) {
        let data = (0..16_000u32).map(|x| (x % 255) as u8).collect::<Vec<_>>();
        let mut codec = create_codec(compression).unwrap().unwrap();

        let mut compressed = Vec::new();
        codec.compress(&data, &mut compressed).unwrap();

        let mut decompressed = vec![0; data.len()];
        codec.decompress(&compressed, &mut decompressed).unwrap();
        assert_eq!(data, decompressed);
    }

    #[test]
    fn snappy() {
        roundtrip(Compression::Snappy)
    }

    #[test]
    fn gzip() {
        roundtrip(Compression::Gzip)
    }

    #[test]
    fn brotli() {
        roundtrip(Compression::Brotli)
    }

    #[test]
    fn lz4() {
        roundtrip(Compression::Lz4)
    }

    #[test]
    fn zstd() {
        roundtrip(Compression::Zstd)
    }

    #[test]
    fn uncompressed_has_no_codec() {
        assert!(create_codec(Compression::Uncompressed).unwrap().is_none());
    }
}
