use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{
    BloomFilterAlgorithm, BloomFilterCompression, BloomFilterHash, BloomFilterHeader,
    SplitBlockAlgorithm, Uncompressed, XxHash,
};

use crate::error::Result;

/// Writes the thrift header followed by the raw bitset; returns the number
/// of bytes written.
pub(crate) fn write<W: Write>(writer: &mut W, bitset: &[u8]) -> Result<usize> {
    let header = BloomFilterHeader {
        num_bytes: bitset.len() as i32,
        algorithm: BloomFilterAlgorithm::BLOCK(SplitBlockAlgorithm {}),
        hash: BloomFilterHash::XXHASH(XxHash {}),
        compression: BloomFilterCompression::UNCOMPRESSED(Uncompressed {}),
    };

    let mut protocol = TCompactOutputProtocol::new(&mut *writer);
    let header_size = header.write_to_out_protocol(&mut protocol)?;

    writer.write_all(bitset)?;
    Ok(header_size + bitset.len())
}
