//! Byte-level codecs: every encoding a page may declare, each defined by a
//! pure encode/decode pair.
pub mod bitpacked;
pub mod byte_stream_split;
pub mod delta_bitpacked;
pub mod delta_byte_array;
pub mod delta_length_byte_array;
pub mod hybrid_rle;
pub mod plain;
pub mod uleb128;
pub mod zigzag_leb128;

use parquet_format_safe::Encoding as FormatEncoding;

use crate::error::Error;

/// The encoding of a page's value section, as declared in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Little-endian fixed width for numerics, `<len: u32 LE><bytes>` for
    /// BYTE_ARRAY, raw bytes for FIXED_LEN_BYTE_ARRAY, packed bits for
    /// BOOLEAN.
    Plain,
    /// Deprecated dictionary encoding; modern pages use `RleDictionary` and
    /// dictionary pages use `Plain`.
    PlainDictionary,
    /// The RLE / bit-packed hybrid, used for levels and dictionary indices.
    Rle,
    /// Deprecated bit-packed-only levels encoding.
    BitPacked,
    /// Mini-blocks of zig-zag encoded deltas, bit-packed per block.
    DeltaBinaryPacked,
    /// A `DeltaBinaryPacked` stream of lengths followed by the concatenated
    /// payloads.
    DeltaLengthByteArray,
    /// `DeltaBinaryPacked` prefix lengths and suffix lengths, followed by
    /// the concatenated suffixes.
    DeltaByteArray,
    /// A one-byte bit width followed by an RLE / bit-packed hybrid stream of
    /// dictionary indices.
    RleDictionary,
    /// Transpose of N K-byte values into K streams of N bytes.
    ByteStreamSplit,
}

impl TryFrom<FormatEncoding> for Encoding {
    type Error = Error;

    fn try_from(encoding: FormatEncoding) -> Result<Self, Self::Error> {
        Ok(match encoding {
            FormatEncoding::PLAIN => Encoding::Plain,
            FormatEncoding::PLAIN_DICTIONARY => Encoding::PlainDictionary,
            FormatEncoding::RLE => Encoding::Rle,
            FormatEncoding::BIT_PACKED => Encoding::BitPacked,
            FormatEncoding::DELTA_BINARY_PACKED => Encoding::DeltaBinaryPacked,
            FormatEncoding::DELTA_LENGTH_BYTE_ARRAY => Encoding::DeltaLengthByteArray,
            FormatEncoding::DELTA_BYTE_ARRAY => Encoding::DeltaByteArray,
            FormatEncoding::RLE_DICTIONARY => Encoding::RleDictionary,
            FormatEncoding::BYTE_STREAM_SPLIT => Encoding::ByteStreamSplit,
            _ => return Err(Error::oos("Encoding out of range")),
        })
    }
}

impl From<Encoding> for FormatEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Plain => FormatEncoding::PLAIN,
            Encoding::PlainDictionary => FormatEncoding::PLAIN_DICTIONARY,
            Encoding::Rle => FormatEncoding::RLE,
            Encoding::BitPacked => FormatEncoding::BIT_PACKED,
            Encoding::DeltaBinaryPacked => FormatEncoding::DELTA_BINARY_PACKED,
            Encoding::DeltaLengthByteArray => FormatEncoding::DELTA_LENGTH_BYTE_ARRAY,
            Encoding::DeltaByteArray => FormatEncoding::DELTA_BYTE_ARRAY,
            Encoding::RleDictionary => FormatEncoding::RLE_DICTIONARY,
            Encoding::ByteStreamSplit => FormatEncoding::BYTE_STREAM_SPLIT,
        }
    }
}

use crate::schema::types::PhysicalType;

impl Encoding {
    /// Whether this encoding may carry values of `physical_type`.
    pub fn is_compatible(&self, physical_type: &PhysicalType) -> bool {
        match self {
            Encoding::Plain => true,
            Encoding::PlainDictionary | Encoding::RleDictionary => {
                !matches!(physical_type, PhysicalType::Boolean)
            }
            Encoding::Rle => matches!(physical_type, PhysicalType::Boolean),
            Encoding::BitPacked => false,
            Encoding::DeltaBinaryPacked => {
                matches!(physical_type, PhysicalType::Int32 | PhysicalType::Int64)
            }
            Encoding::DeltaLengthByteArray | Encoding::DeltaByteArray => {
                matches!(physical_type, PhysicalType::ByteArray)
            }
            Encoding::ByteStreamSplit => {
                matches!(physical_type, PhysicalType::Float | PhysicalType::Double)
            }
        }
    }
}

/// Reads the `u32` little-endian length prefixing an independent
/// RLE-encoded buffer.
/// # Panics
/// If `values` holds fewer than 4 bytes.
pub fn get_length(values: &[u8]) -> u32 {
    u32::from_le_bytes(values[0..4].try_into().unwrap())
}

/// The number of bytes required to hold `value` bits.
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + usize::from(value % 8 != 0)
}

/// The number of bits required to represent any level up to `max_level`.
#[inline]
pub fn get_bit_width(max_level: i16) -> u32 {
    16 - (max_level as u16).leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_widths() {
        assert_eq!(get_bit_width(0), 0);
        assert_eq!(get_bit_width(1), 1);
        assert_eq!(get_bit_width(2), 2);
        assert_eq!(get_bit_width(3), 2);
        assert_eq!(get_bit_width(4), 3);
        assert_eq!(get_bit_width(255), 8);
    }

    #[test]
    fn delta_is_integer_only() {
        assert!(Encoding::DeltaBinaryPacked.is_compatible(&PhysicalType::Int32));
        assert!(!Encoding::DeltaBinaryPacked.is_compatible(&PhysicalType::Double));
    }
}
