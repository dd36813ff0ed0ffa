//! Typed page- and chunk-level statistics, and their thrift
//! (de)serialization. Only the canonical `min_value`/`max_value` pair is
//! ever written; the legacy `min`/`max` fields are left unset.
mod binary;
mod boolean;
mod fixed_len_binary;
mod primitive;

pub use binary::BinaryStatistics;
pub use boolean::BooleanStatistics;
pub use fixed_len_binary::FixedLenStatistics;
pub use primitive::PrimitiveStatistics;

use std::any::Any;

use parquet_format_safe::Statistics as FormatStatistics;

use crate::error::{Error, Result};
use crate::schema::types::{PhysicalType, PrimitiveNode};

/// Statistics of one page or one column chunk.
pub trait Statistics: Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn physical_type(&self) -> PhysicalType;

    fn null_count(&self) -> Option<i64>;

    /// Serializes into the thrift representation.
    fn serialize(&self) -> FormatStatistics;
}

impl PartialEq for &dyn Statistics {
    fn eq(&self, other: &Self) -> bool {
        self.physical_type() == other.physical_type() && self.serialize() == other.serialize()
    }
}

/// Deserializes the thrift statistics of a column with `primitive` type.
pub fn deserialize_statistics(
    statistics: &FormatStatistics,
    primitive: PrimitiveNode,
) -> Result<Box<dyn Statistics>> {
    match primitive.physical_type {
        PhysicalType::Boolean => boolean::read(statistics),
        PhysicalType::Int32 => primitive::read::<i32>(statistics),
        PhysicalType::Int64 => primitive::read::<i64>(statistics),
        PhysicalType::Int96 => primitive::read::<crate::types::Int96>(statistics),
        PhysicalType::Float => primitive::read::<f32>(statistics),
        PhysicalType::Double => primitive::read::<f64>(statistics),
        PhysicalType::ByteArray => binary::read(statistics),
        PhysicalType::FixedLenByteArray(size) => fixed_len_binary::read(statistics, size),
    }
}

/// Reduces per-page statistics into one chunk-level statistics value.
/// All inputs must have the same physical type.
pub fn reduce(stats: &[&dyn Statistics]) -> Result<Option<Box<dyn Statistics>>> {
    if stats.is_empty() {
        return Ok(None);
    }
    let physical_type = stats[0].physical_type();
    if stats
        .iter()
        .any(|x| x.physical_type() != physical_type)
    {
        return Err(Error::TypeMismatch(
            "cannot reduce statistics of different physical types".to_string(),
        ));
    }

    Ok(Some(match physical_type {
        PhysicalType::Boolean => boolean::reduce(stats)?,
        PhysicalType::Int32 => primitive::reduce::<i32>(stats)?,
        PhysicalType::Int64 => primitive::reduce::<i64>(stats)?,
        PhysicalType::Int96 => primitive::reduce::<crate::types::Int96>(stats)?,
        PhysicalType::Float => primitive::reduce::<f32>(stats)?,
        PhysicalType::Double => primitive::reduce::<f64>(stats)?,
        PhysicalType::ByteArray => binary::reduce(stats)?,
        PhysicalType::FixedLenByteArray(size) => fixed_len_binary::reduce(stats, size)?,
    }))
}

fn sum_counts(counts: impl Iterator<Item = Option<i64>>) -> Option<i64> {
    counts.fold(Some(0), |acc, count| Some(acc? + count?))
}
