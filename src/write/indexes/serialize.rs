use std::cmp::Ordering;

use parquet_format_safe::{ColumnIndex, OffsetIndex, PageLocation};

use crate::column::PageBounds;
use crate::error::{Error, Result};
use crate::indexes::BoundaryOrder;
use crate::metadata::{get_sort_order, ColumnDescriptor, SortOrder};
use crate::schema::types::PhysicalType;

/// Truncates a lower bound: dropping trailing bytes can only move it down,
/// which keeps it a valid lower bound.
fn truncate_min(min: &[u8], limit: usize) -> Vec<u8> {
    if min.len() <= limit {
        return min.to_vec();
    }
    min[..limit].to_vec()
}

/// Truncates an upper bound: the last retained byte is bumped and the rest
/// dropped, widening the bound. An unbumpable (all-0xFF) prefix keeps the
/// full value.
fn truncate_max(max: &[u8], limit: usize) -> Vec<u8> {
    if max.len() <= limit {
        return max.to_vec();
    }
    let mut truncated = max[..limit].to_vec();
    while let Some(last) = truncated.last_mut() {
        if *last < u8::MAX {
            *last += 1;
            return truncated;
        }
        truncated.pop();
    }
    max.to_vec()
}

/// Compares two plain-encoded values per the column's sort order.
fn compare_plain(descriptor: &ColumnDescriptor, a: &[u8], b: &[u8]) -> Option<Ordering> {
    let unsigned = get_sort_order(descriptor.primitive()) == SortOrder::Unsigned;
    Some(match descriptor.physical_type() {
        PhysicalType::Boolean => a.cmp(b),
        PhysicalType::Int32 if unsigned => {
            u32::from_le_bytes(a.try_into().ok()?).cmp(&u32::from_le_bytes(b.try_into().ok()?))
        }
        PhysicalType::Int32 => {
            i32::from_le_bytes(a.try_into().ok()?).cmp(&i32::from_le_bytes(b.try_into().ok()?))
        }
        PhysicalType::Int64 if unsigned => {
            u64::from_le_bytes(a.try_into().ok()?).cmp(&u64::from_le_bytes(b.try_into().ok()?))
        }
        PhysicalType::Int64 => {
            i64::from_le_bytes(a.try_into().ok()?).cmp(&i64::from_le_bytes(b.try_into().ok()?))
        }
        PhysicalType::Float => f32::from_le_bytes(a.try_into().ok()?)
            .partial_cmp(&f32::from_le_bytes(b.try_into().ok()?))?,
        PhysicalType::Double => f64::from_le_bytes(a.try_into().ok()?)
            .partial_cmp(&f64::from_le_bytes(b.try_into().ok()?))?,
        PhysicalType::Int96 => return None,
        PhysicalType::ByteArray | PhysicalType::FixedLenByteArray(_) => a.cmp(b),
    })
}

fn boundary_order(descriptor: &ColumnDescriptor, bounds: &[PageBounds]) -> BoundaryOrder {
    let pairs: Vec<(&[u8], &[u8])> = match bounds
        .iter()
        .map(|page| Some((page.min.as_deref()?, page.max.as_deref()?)))
        .collect::<Option<Vec<_>>>()
    {
        Some(pairs) if pairs.len() > 1 => pairs,
        _ => return BoundaryOrder::Unordered,
    };

    let mut ascending = true;
    let mut descending = true;
    for window in pairs.windows(2) {
        let (min_order, max_order) = match (
            compare_plain(descriptor, window[0].0, window[1].0),
            compare_plain(descriptor, window[0].1, window[1].1),
        ) {
            (Some(min_order), Some(max_order)) => (min_order, max_order),
            _ => return BoundaryOrder::Unordered,
        };
        if min_order == Ordering::Greater || max_order == Ordering::Greater {
            ascending = false;
        }
        if min_order == Ordering::Less || max_order == Ordering::Less {
            descending = false;
        }
    }
    if ascending {
        BoundaryOrder::Ascending
    } else if descending {
        BoundaryOrder::Descending
    } else {
        BoundaryOrder::Unordered
    }
}

/// Builds the thrift column index of one chunk. BYTE_ARRAY bounds longer
/// than `truncate_length` are truncated: minima down, maxima up.
pub(crate) fn serialize_column_index(
    descriptor: &ColumnDescriptor,
    bounds: &[PageBounds],
    truncate_length: usize,
) -> Result<ColumnIndex> {
    let truncate = descriptor.physical_type() == PhysicalType::ByteArray;

    let mut null_pages = Vec::with_capacity(bounds.len());
    let mut min_values = Vec::with_capacity(bounds.len());
    let mut max_values = Vec::with_capacity(bounds.len());
    let mut null_counts = Vec::with_capacity(bounds.len());

    for page in bounds {
        match (&page.min, &page.max) {
            (Some(min), Some(max)) => {
                null_pages.push(false);
                if truncate {
                    min_values.push(truncate_min(min, truncate_length));
                    max_values.push(truncate_max(max, truncate_length));
                } else {
                    min_values.push(min.clone());
                    max_values.push(max.clone());
                }
            }
            (None, None) => {
                null_pages.push(true);
                min_values.push(vec![]);
                max_values.push(vec![]);
            }
            _ => {
                return Err(Error::oos(
                    "a page records either both bounds or neither",
                ))
            }
        }
        null_counts.push(page.null_count);
    }

    Ok(ColumnIndex {
        null_pages,
        min_values,
        max_values,
        boundary_order: boundary_order(descriptor, bounds).into(),
        null_counts: Some(null_counts),
    })
}

/// Builds the thrift offset index of one chunk from its data pages'
/// `(offset, compressed size)` and per-page row counts.
pub(crate) fn serialize_offset_index(
    locations: &[(u64, u64)],
    bounds: &[PageBounds],
) -> Result<OffsetIndex> {
    if locations.len() != bounds.len() {
        return Err(Error::oos(
            "the offset index requires one location per data page",
        ));
    }
    let mut first_row_index = 0i64;
    let page_locations = locations
        .iter()
        .zip(bounds)
        .map(|((offset, size), page)| {
            let location = PageLocation {
                offset: (*offset).try_into()?,
                compressed_page_size: (*size).try_into()?,
                first_row_index,
            };
            first_row_index += page.num_rows as i64;
            Ok(location)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OffsetIndex { page_locations })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_truncates_down_max_truncates_up() {
        let min = truncate_min(b"Skywalker", 4);
        assert_eq!(min, b"Skyw");
        assert!(min.as_slice() <= &b"Skywalker"[..]);

        let max = truncate_max(b"Skywalker", 4);
        assert_eq!(max, b"Skyx");
        assert!(max.as_slice() >= &b"Skywalker"[..]);
    }

    #[test]
    fn unbumpable_max_stays_complete() {
        let max = truncate_max(&[0xFF, 0xFF, 0xFF, 0x01], 2);
        assert_eq!(max, vec![0xFF, 0xFF, 0xFF, 0x01]);
    }

    #[test]
    fn short_values_are_untouched() {
        assert_eq!(truncate_min(b"ab", 4), b"ab");
        assert_eq!(truncate_max(b"ab", 4), b"ab");
    }
}
