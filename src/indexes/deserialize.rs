use parquet_format_safe::ColumnIndex;

use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;
use crate::types;

use super::index::{BooleanIndex, ByteIndex, Index, NativeIndex, PageIndex};

/// Converts a thrift column index into its typed representation.
pub fn deserialize_column_index(
    index: ColumnIndex,
    physical_type: PhysicalType,
) -> Result<Box<dyn Index>> {
    let boundary_order = index.boundary_order.try_into()?;
    let entries = entries(&index)?;

    Ok(match physical_type {
        PhysicalType::Boolean => Box::new(BooleanIndex {
            indexes: typed_entries(entries, |bytes| {
                if bytes.len() != 1 {
                    return Err(Error::oos("a boolean index value must be a single byte"));
                }
                Ok(bytes[0] != 0)
            })?,
            boundary_order,
        }),
        PhysicalType::Int32 => native_index::<i32>(entries, boundary_order)?,
        PhysicalType::Int64 => native_index::<i64>(entries, boundary_order)?,
        PhysicalType::Int96 => native_index::<types::Int96>(entries, boundary_order)?,
        PhysicalType::Float => native_index::<f32>(entries, boundary_order)?,
        PhysicalType::Double => native_index::<f64>(entries, boundary_order)?,
        PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_) => Box::new(ByteIndex {
            physical_type,
            indexes: typed_entries(entries, |bytes| Ok(bytes.to_vec()))?,
            boundary_order,
        }),
    })
}

type RawEntry<'a> = (Option<&'a [u8]>, Option<&'a [u8]>, Option<i64>);

fn entries(index: &ColumnIndex) -> Result<Vec<RawEntry>> {
    let len = index.null_pages.len();
    if index.min_values.len() != len || index.max_values.len() != len {
        return Err(Error::oos(
            "the column index min/max lists must cover every page",
        ));
    }
    let null_counts = match &index.null_counts {
        Some(counts) if counts.len() == len => counts.iter().map(|x| Some(*x)).collect(),
        Some(_) => {
            return Err(Error::oos(
                "the column index null counts must cover every page",
            ))
        }
        None => vec![None; len],
    };

    Ok(index
        .null_pages
        .iter()
        .zip(index.min_values.iter())
        .zip(index.max_values.iter())
        .zip(null_counts)
        .map(|(((null_page, min), max), null_count)| {
            if *null_page {
                (None, None, null_count)
            } else {
                (Some(min.as_slice()), Some(max.as_slice()), null_count)
            }
        })
        .collect())
}

fn typed_entries<T, F: Fn(&[u8]) -> Result<T>>(
    entries: Vec<RawEntry>,
    decode: F,
) -> Result<Vec<PageIndex<T>>> {
    entries
        .into_iter()
        .map(|(min, max, null_count)| {
            Ok(PageIndex {
                min: min.map(&decode).transpose()?,
                max: max.map(&decode).transpose()?,
                null_count,
            })
        })
        .collect()
}

fn native_index<T: types::NativeType>(
    entries: Vec<RawEntry>,
    boundary_order: super::BoundaryOrder,
) -> Result<Box<dyn Index>> {
    let indexes = typed_entries(entries, |bytes| {
        if bytes.len() != std::mem::size_of::<T>() {
            return Err(Error::oos("an index value must be plain encoded"));
        }
        Ok(types::decode::<T>(bytes))
    })?;
    Ok(Box::new(NativeIndex::<T> {
        indexes,
        boundary_order,
    }))
}
