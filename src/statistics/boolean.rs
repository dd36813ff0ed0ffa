use parquet_format_safe::Statistics as FormatStatistics;

use super::{sum_counts, Statistics};
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BooleanStatistics {
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub min_value: Option<bool>,
    pub max_value: Option<bool>,
}

impl Statistics for BooleanStatistics {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn physical_type(&self) -> PhysicalType {
        PhysicalType::Boolean
    }

    fn null_count(&self) -> Option<i64> {
        self.null_count
    }

    fn serialize(&self) -> FormatStatistics {
        FormatStatistics {
            null_count: self.null_count,
            distinct_count: self.distinct_count,
            min_value: self.min_value.map(|x| vec![u8::from(x)]),
            max_value: self.max_value.map(|x| vec![u8::from(x)]),
            min: None,
            max: None,
        }
    }
}

pub fn read(statistics: &FormatStatistics) -> Result<Box<dyn Statistics>> {
    let decode = |value: &Option<Vec<u8>>| -> Result<Option<bool>> {
        value
            .as_ref()
            .map(|x| {
                if x.len() != 1 {
                    return Err(Error::oos(
                        "a boolean statistics value must be a single byte",
                    ));
                }
                Ok(x[0] != 0)
            })
            .transpose()
    };

    Ok(Box::new(BooleanStatistics {
        null_count: statistics.null_count,
        distinct_count: statistics.distinct_count,
        min_value: decode(&statistics.min_value)?,
        max_value: decode(&statistics.max_value)?,
    }))
}

pub(super) fn reduce(stats: &[&dyn Statistics]) -> Result<Box<dyn Statistics>> {
    let stats = stats
        .iter()
        .map(|x| {
            x.as_any()
                .downcast_ref::<BooleanStatistics>()
                .ok_or_else(|| Error::TypeMismatch("the statistics are not boolean".to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let null_count = sum_counts(stats.iter().map(|x| x.null_count));
    let min_value = stats.iter().filter_map(|x| x.min_value).min();
    let max_value = stats.iter().filter_map(|x| x.max_value).max();

    Ok(Box::new(BooleanStatistics {
        null_count,
        distinct_count: None,
        min_value,
        max_value,
    }))
}
