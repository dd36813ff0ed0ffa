use crate::schema::types::{
    PhysicalType, PrimitiveConvertedType, PrimitiveLogicalType, PrimitiveNode,
};

/// Sort order used when aggregating and comparing statistics of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Signed comparison of the represented value.
    Signed,
    /// Unsigned (for byte arrays, byte-wise) comparison.
    Unsigned,
    /// Comparison is undefined.
    Undefined,
}

/// Column order of a leaf, as stored in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
    /// The column uses the sort order derived from its type.
    TypeDefinedOrder(SortOrder),
    /// The file predates column orders; comparisons are undefined.
    Undefined,
}

/// Derives the sort order of a leaf: the logical annotation wins, then the
/// converted annotation, then the physical type.
pub fn get_sort_order(primitive: &PrimitiveNode) -> SortOrder {
    if let Some(logical_type) = &primitive.logical_type {
        return logical_sort_order(logical_type);
    }
    if let Some(converted_type) = &primitive.converted_type {
        return converted_sort_order(converted_type);
    }
    physical_sort_order(&primitive.physical_type)
}

fn logical_sort_order(logical_type: &PrimitiveLogicalType) -> SortOrder {
    use PrimitiveLogicalType::*;
    match logical_type {
        String | Enum | Json | Bson | Uuid => SortOrder::Unsigned,
        Integer(t) => {
            if t.is_signed() {
                SortOrder::Signed
            } else {
                SortOrder::Unsigned
            }
        }
        Decimal(_, _) | Date | Time { .. } | Timestamp { .. } => SortOrder::Signed,
        Unknown => SortOrder::Undefined,
    }
}

fn converted_sort_order(converted_type: &PrimitiveConvertedType) -> SortOrder {
    use PrimitiveConvertedType::*;
    match converted_type {
        Utf8 | Json | Bson | Enum => SortOrder::Unsigned,
        Int8 | Int16 | Int32 | Int64 => SortOrder::Signed,
        Uint8 | Uint16 | Uint32 | Uint64 => SortOrder::Unsigned,
        Decimal(_, _) | Date => SortOrder::Signed,
        TimeMillis | TimeMicros | TimestampMillis | TimestampMicros => SortOrder::Signed,
        Interval => SortOrder::Undefined,
    }
}

fn physical_sort_order(physical_type: &PhysicalType) -> SortOrder {
    use PhysicalType::*;
    match physical_type {
        // order: false, true
        Boolean => SortOrder::Unsigned,
        Int32 | Int64 => SortOrder::Signed,
        Int96 => SortOrder::Undefined,
        // NaN handling is the concern of the statistics builder, not of the
        // order itself
        Float | Double => SortOrder::Signed,
        ByteArray | FixedLenByteArray(_) => SortOrder::Unsigned,
    }
}
