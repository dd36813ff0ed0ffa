//! The unit the shredder and the column buffers exchange: one leaf datum
//! together with its repetition and definition levels and the column it
//! belongs to.
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;
use crate::types::Int96;

/// A leaf payload. `Null` marks a value whose definition level is below the
/// column's maximum; it carries no bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96(Int96),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    FixedLenByteArray(Vec<u8>),
}

impl Datum {
    /// The physical type this datum is stored as, if any.
    pub fn physical_type(&self) -> Option<PhysicalType> {
        Some(match self {
            Datum::Null => return None,
            Datum::Boolean(_) => PhysicalType::Boolean,
            Datum::Int32(_) => PhysicalType::Int32,
            Datum::Int64(_) => PhysicalType::Int64,
            Datum::Int96(_) => PhysicalType::Int96,
            Datum::Float(_) => PhysicalType::Float,
            Datum::Double(_) => PhysicalType::Double,
            Datum::ByteArray(_) => PhysicalType::ByteArray,
            Datum::FixedLenByteArray(v) => PhysicalType::FixedLenByteArray(v.len()),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }
}

/// One shredded leaf value.
///
/// The column index is stored as the bitwise complement of the owning
/// column's zero-based position, so that a defaulted (zeroed) `Value` can
/// never be mistaken for one assigned to column 0. The sentinel is checked
/// whenever a value crosses a component boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub datum: Datum,
    pub repetition_level: i16,
    pub definition_level: i16,
    column_index: i16,
}

impl Value {
    pub fn new(
        datum: Datum,
        repetition_level: i16,
        definition_level: i16,
        column_index: usize,
    ) -> Self {
        Self {
            datum,
            repetition_level,
            definition_level,
            column_index: !(column_index as i16),
        }
    }

    /// A null at the given levels.
    pub fn null(repetition_level: i16, definition_level: i16, column_index: usize) -> Self {
        Self::new(Datum::Null, repetition_level, definition_level, column_index)
    }

    /// The column this value belongs to.
    ///
    /// Errors if the value was never assigned to a column (i.e. it still
    /// carries the default, non-complemented index).
    pub fn column_index(&self) -> Result<usize> {
        if self.column_index >= 0 {
            return Err(Error::TypeMismatch(
                "the value was not assigned to any column".to_string(),
            ));
        }
        Ok((!self.column_index) as usize)
    }

    /// Whether this value was assigned to `index`.
    pub fn belongs_to(&self, index: usize) -> bool {
        self.column_index == !(index as i16)
    }

    /// Re-assigns this value to another column. Used by the row-group
    /// merger when re-mapping values through a merged schema's ordering.
    pub fn reassign(&mut self, column_index: usize) {
        self.column_index = !(column_index as i16);
    }

    /// Whether this value starts a new row.
    pub fn is_row_start(&self) -> bool {
        self.repetition_level == 0
    }
}

/// An ordered sequence of values covering all leaf columns of one record in
/// depth-first left-to-right order.
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_distinguishes_default_from_column_zero() {
        let assigned = Value::new(Datum::Int32(1), 0, 0, 0);
        assert_eq!(assigned.column_index().unwrap(), 0);

        let defaulted = Value {
            datum: Datum::Null,
            repetition_level: 0,
            definition_level: 0,
            column_index: 0,
        };
        assert!(defaulted.column_index().is_err());
    }

    #[test]
    fn reassign_moves_columns() {
        let mut value = Value::new(Datum::Int64(3), 0, 0, 2);
        value.reassign(5);
        assert!(value.belongs_to(5));
        assert_eq!(value.column_index().unwrap(), 5);
    }
}
