use parquet_format_safe::Statistics as FormatStatistics;

use super::{sum_counts, Statistics};
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryStatistics {
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub min_value: Option<Vec<u8>>,
    pub max_value: Option<Vec<u8>>,
}

impl Statistics for BinaryStatistics {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn physical_type(&self) -> PhysicalType {
        PhysicalType::ByteArray
    }

    fn null_count(&self) -> Option<i64> {
        self.null_count
    }

    fn serialize(&self) -> FormatStatistics {
        FormatStatistics {
            null_count: self.null_count,
            distinct_count: self.distinct_count,
            min_value: self.min_value.clone(),
            max_value: self.max_value.clone(),
            min: None,
            max: None,
        }
    }
}

pub fn read(statistics: &FormatStatistics) -> Result<Box<dyn Statistics>> {
    Ok(Box::new(BinaryStatistics {
        null_count: statistics.null_count,
        distinct_count: statistics.distinct_count,
        min_value: statistics.min_value.clone(),
        max_value: statistics.max_value.clone(),
    }))
}

pub(super) fn reduce(stats: &[&dyn Statistics]) -> Result<Box<dyn Statistics>> {
    let stats = stats
        .iter()
        .map(|x| {
            x.as_any()
                .downcast_ref::<BinaryStatistics>()
                .ok_or_else(|| Error::TypeMismatch("the statistics are not binary".to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let null_count = sum_counts(stats.iter().map(|x| x.null_count));
    let min_value = stats
        .iter()
        .filter_map(|x| x.min_value.as_ref())
        .min()
        .cloned();
    let max_value = stats
        .iter()
        .filter_map(|x| x.max_value.as_ref())
        .max()
        .cloned();

    Ok(Box::new(BinaryStatistics {
        null_count,
        distinct_count: None,
        min_value,
        max_value,
    }))
}
