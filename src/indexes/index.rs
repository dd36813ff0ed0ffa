use std::any::Any;

use crate::schema::types::PhysicalType;
use crate::types::NativeType;

use super::BoundaryOrder;

/// A decoded column index.
pub trait Index: Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn physical_type(&self) -> PhysicalType;
}

/// The index entry of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageIndex<T> {
    /// `None` when the page is all nulls.
    pub min: Option<T>,
    /// `None` when the page is all nulls.
    pub max: Option<T>,
    pub null_count: Option<i64>,
}

/// The column index of a fixed-width column.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeIndex<T: NativeType> {
    pub indexes: Vec<PageIndex<T>>,
    pub boundary_order: BoundaryOrder,
}

impl<T: NativeType> Index for NativeIndex<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn physical_type(&self) -> PhysicalType {
        T::TYPE
    }
}

/// The column index of a BYTE_ARRAY or FIXED_LEN_BYTE_ARRAY column.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteIndex {
    pub physical_type: PhysicalType,
    pub indexes: Vec<PageIndex<Vec<u8>>>,
    pub boundary_order: BoundaryOrder,
}

impl Index for ByteIndex {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }
}

/// The column index of a BOOLEAN column.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanIndex {
    pub indexes: Vec<PageIndex<bool>>,
    pub boundary_order: BoundaryOrder,
}

impl Index for BooleanIndex {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn physical_type(&self) -> PhysicalType {
        PhysicalType::Boolean
    }
}
