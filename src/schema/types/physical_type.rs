use parquet_format_safe::Type;

use crate::error::Error;

/// The set of physical types: how leaf values are laid out in pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    /// 12-byte little-endian integer, deprecated timestamp representation.
    Int96,
    Float,
    Double,
    ByteArray,
    /// Fixed number of bytes per value, declared by the schema.
    FixedLenByteArray(usize),
}

impl PhysicalType {
    /// The plain-encoded width of one value, `None` for BYTE_ARRAY.
    pub fn width(&self) -> Option<usize> {
        match self {
            PhysicalType::Boolean => None,
            PhysicalType::Int32 | PhysicalType::Float => Some(4),
            PhysicalType::Int64 | PhysicalType::Double => Some(8),
            PhysicalType::Int96 => Some(12),
            PhysicalType::ByteArray => None,
            PhysicalType::FixedLenByteArray(size) => Some(*size),
        }
    }
}

impl TryFrom<(Type, Option<i32>)> for PhysicalType {
    type Error = Error;

    fn try_from((type_, length): (Type, Option<i32>)) -> Result<Self, Self::Error> {
        Ok(match type_ {
            Type::BOOLEAN => PhysicalType::Boolean,
            Type::INT32 => PhysicalType::Int32,
            Type::INT64 => PhysicalType::Int64,
            Type::INT96 => PhysicalType::Int96,
            Type::FLOAT => PhysicalType::Float,
            Type::DOUBLE => PhysicalType::Double,
            Type::BYTE_ARRAY => PhysicalType::ByteArray,
            Type::FIXED_LEN_BYTE_ARRAY => {
                let length = length.ok_or_else(|| {
                    Error::oos("FIXED_LEN_BYTE_ARRAY schema element requires a length")
                })?;
                PhysicalType::FixedLenByteArray(length.try_into()?)
            }
            _ => return Err(Error::oos("unknown physical type in thrift")),
        })
    }
}

impl From<PhysicalType> for (Type, Option<i32>) {
    fn from(physical_type: PhysicalType) -> Self {
        match physical_type {
            PhysicalType::Boolean => (Type::BOOLEAN, None),
            PhysicalType::Int32 => (Type::INT32, None),
            PhysicalType::Int64 => (Type::INT64, None),
            PhysicalType::Int96 => (Type::INT96, None),
            PhysicalType::Float => (Type::FLOAT, None),
            PhysicalType::Double => (Type::DOUBLE, None),
            PhysicalType::ByteArray => (Type::BYTE_ARRAY, None),
            PhysicalType::FixedLenByteArray(length) => {
                (Type::FIXED_LEN_BYTE_ARRAY, Some(length as i32))
            }
        }
    }
}
