//! Decoding pages back into leveled values.
mod values;

pub use values::{deserialize_page, ValueReader};

use crate::encoding::plain;
use crate::error::{Error, Result};
use crate::page::DictPage;
use crate::schema::types::PhysicalType;
use crate::types::Int96;

/// A dictionary page decoded into its typed values.
#[derive(Debug, Clone)]
pub enum DecodedDictionary {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Int96(Vec<Int96>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Binary(Vec<Vec<u8>>),
    FixedLen(Vec<Vec<u8>>),
}

impl DecodedDictionary {
    pub fn len(&self) -> usize {
        match self {
            DecodedDictionary::Boolean(v) => v.len(),
            DecodedDictionary::Int32(v) => v.len(),
            DecodedDictionary::Int64(v) => v.len(),
            DecodedDictionary::Int96(v) => v.len(),
            DecodedDictionary::Float(v) => v.len(),
            DecodedDictionary::Double(v) => v.len(),
            DecodedDictionary::Binary(v) => v.len(),
            DecodedDictionary::FixedLen(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes a (PLAIN-encoded) dictionary page per the column's physical
/// type.
pub fn deserialize_dict(page: &DictPage, physical_type: PhysicalType) -> Result<DecodedDictionary> {
    let buffer = &page.buffer;
    let length = page.num_values;
    Ok(match physical_type {
        PhysicalType::Boolean => {
            DecodedDictionary::Boolean(plain::decode_boolean(buffer, length)?)
        }
        PhysicalType::Int32 => DecodedDictionary::Int32(plain::decode_native(buffer, length)?),
        PhysicalType::Int64 => DecodedDictionary::Int64(plain::decode_native(buffer, length)?),
        PhysicalType::Int96 => DecodedDictionary::Int96(plain::decode_native(buffer, length)?),
        PhysicalType::Float => DecodedDictionary::Float(plain::decode_native(buffer, length)?),
        PhysicalType::Double => DecodedDictionary::Double(plain::decode_native(buffer, length)?),
        PhysicalType::ByteArray => DecodedDictionary::Binary(
            plain::BinaryIter::new(buffer, length)
                .map(|x| x.map(|x| x.to_vec()))
                .collect::<Result<_>>()?,
        ),
        PhysicalType::FixedLenByteArray(size) => DecodedDictionary::FixedLen(
            plain::FixedLenIter::new(buffer, size, length)
                .map(|x| x.map(|x| x.to_vec()))
                .collect::<Result<_>>()?,
        ),
    })
}

pub(crate) fn dict_datum(dict: &DecodedDictionary, index: u32) -> Result<crate::value::Datum> {
    use crate::value::Datum;
    let i = index as usize;
    let out_of_bounds = |length: usize| Error::IndexOutOfBounds { index: i, length };
    Ok(match dict {
        DecodedDictionary::Boolean(v) => {
            Datum::Boolean(*v.get(i).ok_or_else(|| out_of_bounds(v.len()))?)
        }
        DecodedDictionary::Int32(v) => {
            Datum::Int32(*v.get(i).ok_or_else(|| out_of_bounds(v.len()))?)
        }
        DecodedDictionary::Int64(v) => {
            Datum::Int64(*v.get(i).ok_or_else(|| out_of_bounds(v.len()))?)
        }
        DecodedDictionary::Int96(v) => {
            Datum::Int96(*v.get(i).ok_or_else(|| out_of_bounds(v.len()))?)
        }
        DecodedDictionary::Float(v) => {
            Datum::Float(*v.get(i).ok_or_else(|| out_of_bounds(v.len()))?)
        }
        DecodedDictionary::Double(v) => {
            Datum::Double(*v.get(i).ok_or_else(|| out_of_bounds(v.len()))?)
        }
        DecodedDictionary::Binary(v) => {
            Datum::ByteArray(v.get(i).ok_or_else(|| out_of_bounds(v.len()))?.clone())
        }
        DecodedDictionary::FixedLen(v) => {
            Datum::FixedLenByteArray(v.get(i).ok_or_else(|| out_of_bounds(v.len()))?.clone())
        }
    })
}
