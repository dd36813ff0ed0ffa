//! Column and offset indexes: per-page min/max/null-count and byte
//! locations, enabling page-level skipping.
mod deserialize;
mod index;
mod intervals;

pub use deserialize::deserialize_column_index;
pub use index::{BooleanIndex, ByteIndex, Index, NativeIndex, PageIndex};
pub use intervals::{compute_rows, select_pages, FilteredPage, Interval};

pub use parquet_format_safe::PageLocation;

use parquet_format_safe::BoundaryOrder as FormatBoundaryOrder;

use crate::error::Error;

/// Whether the per-page min/max lists of a column index are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryOrder {
    #[default]
    Unordered,
    Ascending,
    Descending,
}

impl TryFrom<FormatBoundaryOrder> for BoundaryOrder {
    type Error = Error;

    fn try_from(order: FormatBoundaryOrder) -> Result<Self, Self::Error> {
        Ok(match order {
            FormatBoundaryOrder::UNORDERED => BoundaryOrder::Unordered,
            FormatBoundaryOrder::ASCENDING => BoundaryOrder::Ascending,
            FormatBoundaryOrder::DESCENDING => BoundaryOrder::Descending,
            _ => return Err(Error::oos("BoundaryOrder out of range")),
        })
    }
}

impl From<BoundaryOrder> for FormatBoundaryOrder {
    fn from(order: BoundaryOrder) -> Self {
        match order {
            BoundaryOrder::Unordered => FormatBoundaryOrder::UNORDERED,
            BoundaryOrder::Ascending => FormatBoundaryOrder::ASCENDING,
            BoundaryOrder::Descending => FormatBoundaryOrder::DESCENDING,
        }
    }
}
