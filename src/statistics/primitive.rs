use parquet_format_safe::Statistics as FormatStatistics;

use super::{sum_counts, Statistics};
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;
use crate::types::{self, NativeType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveStatistics<T: NativeType> {
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub min_value: Option<T>,
    pub max_value: Option<T>,
}

impl<T: NativeType> Statistics for PrimitiveStatistics<T> {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn physical_type(&self) -> PhysicalType {
        T::TYPE
    }

    fn null_count(&self) -> Option<i64> {
        self.null_count
    }

    fn serialize(&self) -> FormatStatistics {
        FormatStatistics {
            null_count: self.null_count,
            distinct_count: self.distinct_count,
            min_value: self.min_value.map(|x| x.to_le_bytes().as_ref().to_vec()),
            max_value: self.max_value.map(|x| x.to_le_bytes().as_ref().to_vec()),
            min: None,
            max: None,
        }
    }
}

pub fn read<T: NativeType>(statistics: &FormatStatistics) -> Result<Box<dyn Statistics>> {
    for value in [&statistics.min_value, &statistics.max_value].into_iter().flatten() {
        if value.len() != std::mem::size_of::<T>() {
            return Err(Error::oos(
                "a primitive statistics value must be plain encoded",
            ));
        }
    }

    Ok(Box::new(PrimitiveStatistics::<T> {
        null_count: statistics.null_count,
        distinct_count: statistics.distinct_count,
        min_value: statistics.min_value.as_deref().map(types::decode),
        max_value: statistics.max_value.as_deref().map(types::decode),
    }))
}

pub(super) fn reduce<T: NativeType>(stats: &[&dyn Statistics]) -> Result<Box<dyn Statistics>> {
    let stats = stats
        .iter()
        .map(|x| {
            x.as_any()
                .downcast_ref::<PrimitiveStatistics<T>>()
                .ok_or_else(|| {
                    Error::TypeMismatch("the statistics are not primitive".to_string())
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let null_count = sum_counts(stats.iter().map(|x| x.null_count));
    let min_value = stats
        .iter()
        .filter_map(|x| x.min_value)
        .reduce(|a, b| if b.ord(&a) == std::cmp::Ordering::Less { b } else { a });
    let max_value = stats
        .iter()
        .filter_map(|x| x.max_value)
        .reduce(|a, b| if b.ord(&a) == std::cmp::Ordering::Greater { b } else { a });

    Ok(Box::new(PrimitiveStatistics::<T> {
        null_count,
        distinct_count: None,
        min_value,
        max_value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let statistics = PrimitiveStatistics::<i64> {
            null_count: Some(2),
            distinct_count: None,
            min_value: Some(-10),
            max_value: Some(1024),
        };
        let serialized = statistics.serialize();
        let read = read::<i64>(&serialized).unwrap();
        let read = read
            .as_any()
            .downcast_ref::<PrimitiveStatistics<i64>>()
            .unwrap();
        assert_eq!(read, &statistics);
        // the legacy pair is never emitted
        assert_eq!(serialized.min, None);
        assert_eq!(serialized.max, None);
    }

    #[test]
    fn reduce_keeps_extremes() {
        let a = PrimitiveStatistics::<i32> {
            null_count: Some(1),
            distinct_count: None,
            min_value: Some(3),
            max_value: Some(5),
        };
        let b = PrimitiveStatistics::<i32> {
            null_count: Some(0),
            distinct_count: None,
            min_value: Some(-7),
            max_value: Some(4),
        };
        let reduced = reduce::<i32>(&[&a, &b]).unwrap();
        let reduced = reduced
            .as_any()
            .downcast_ref::<PrimitiveStatistics<i32>>()
            .unwrap();
        assert_eq!(reduced.min_value, Some(-7));
        assert_eq!(reduced.max_value, Some(5));
        assert_eq!(reduced.null_count, Some(1));
    }
}
