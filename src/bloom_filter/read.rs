use std::io::{Read, Seek, SeekFrom};

use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::{
    BloomFilterAlgorithm, BloomFilterCompression, BloomFilterHeader, SplitBlockAlgorithm,
    Uncompressed,
};

use crate::error::{Error, Result};
use crate::metadata::ColumnChunkMetaData;

/// Reads the bloom filter of `column` into `bitset`.
///
/// Errors with [`Error::MissingBloomFilter`] when the chunk declares none;
/// an unsupported algorithm or compression yields an empty bitset.
pub fn read<R: Read + Seek>(
    column: &ColumnChunkMetaData,
    mut reader: &mut R,
    bitset: &mut Vec<u8>,
) -> Result<()> {
    let offset = column
        .bloom_filter_offset()
        .ok_or(Error::MissingBloomFilter)?;
    reader.seek(SeekFrom::Start(offset as u64))?;

    let mut protocol = TCompactInputProtocol::new(&mut reader, usize::MAX);
    let header = BloomFilterHeader::read_from_in_protocol(&mut protocol)?;

    if header.algorithm != BloomFilterAlgorithm::BLOCK(SplitBlockAlgorithm {})
        || header.compression != BloomFilterCompression::UNCOMPRESSED(Uncompressed {})
    {
        bitset.clear();
        return Ok(());
    }

    let num_bytes: usize = header.num_bytes.try_into()?;
    bitset.clear();
    bitset.resize(num_bytes, 0);
    reader.read_exact(bitset)?;
    Ok(())
}
