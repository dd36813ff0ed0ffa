//! Per-leaf in-memory accumulators: typed, sortable, bounded, optionally
//! dictionary-backed. Buffers grow until the row-group writer flushes them
//! into pages and are then truncated for reuse.
mod binary;
mod boolean;
mod dictionary;
mod fixed_len;
mod pages;
mod primitive;

pub use binary::BinaryBuffer;
pub use boolean::BooleanBuffer;
pub use dictionary::{BinaryDictionary, FixedLenDictionary, PrimitiveDictionary};
pub use fixed_len::FixedLenBuffer;
pub use primitive::{NativeDatum, PrimitiveBuffer};

use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::Page;
use crate::schema::types::{PhysicalType, PrimitiveLogicalType};
use crate::statistics::Statistics;
use crate::value::Value;
use crate::write::Version;

/// Everything a buffer needs to turn its content into pages.
#[derive(Debug, Clone)]
pub struct FlushOptions {
    pub version: Version,
    pub compression: Compression,
    /// Target uncompressed byte size per data page.
    pub page_buffer_size: usize,
    /// Whether to emit statistics in each data-page header.
    pub data_page_statistics: bool,
    /// Whether to record per-page bounds for the column index.
    pub record_page_bounds: bool,
    /// The non-dictionary encoding of this column.
    pub encoding: Encoding,
}

/// Per-page bounds and null count, the raw material of the column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBounds {
    /// Plain-encoded minimum, `None` when the page is all nulls.
    pub min: Option<Vec<u8>>,
    /// Plain-encoded maximum, `None` when the page is all nulls.
    pub max: Option<Vec<u8>>,
    pub null_count: i64,
    pub num_rows: usize,
}

/// The output of flushing one column buffer.
pub struct FlushedColumn {
    /// The dictionary page (if any) followed by the data pages.
    pub pages: Vec<Page>,
    /// Chunk-level statistics.
    pub statistics: Box<dyn Statistics>,
    /// One entry per data page, in order.
    pub page_bounds: Vec<PageBounds>,
}

/// The contract every per-leaf accumulator satisfies.
pub trait ColumnBuffer: std::fmt::Debug + Send {
    fn descriptor(&self) -> &ColumnDescriptor;

    /// Number of logical values, nulls included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of value slots allocated.
    fn cap(&self) -> usize;

    /// Estimated in-memory byte size of the buffered content.
    fn byte_size(&self) -> usize;

    /// Truncates for reuse; capacity is kept.
    fn reset(&mut self);

    /// Appends one value, honoring its levels and coercing its datum to
    /// this buffer's physical type.
    fn push_value(&mut self, value: &Value) -> Result<()>;

    /// Appends `values`, validating that each one belongs to this column.
    fn write_values(&mut self, values: &[Value]) -> Result<()> {
        for value in values {
            if !value.belongs_to(self.descriptor().index()) {
                return Err(Error::TypeMismatch(format!(
                    "a value for column {:?} was written to column \"{}\"",
                    value.column_index(),
                    self.descriptor().name()
                )));
            }
            self.push_value(value)?;
        }
        Ok(())
    }

    /// Reads back `length` logical values starting at `start`.
    fn read_values(&self, start: usize, length: usize) -> Vec<Value>;

    /// Whether the row at logical position `i` sorts before the one at `j`.
    /// Only meaningful for non-repeated columns; nulls sort first.
    fn less(&self, i: usize, j: usize) -> bool;

    /// Swaps the rows at logical positions `i` and `j`.
    /// Only meaningful for non-repeated columns.
    fn swap(&mut self, i: usize, j: usize);

    /// A new, empty buffer with the same configuration.
    fn clone_empty(&self) -> Box<dyn ColumnBuffer>;

    /// Encodes the buffered content into pages and truncates the buffer.
    fn flush(&mut self, options: &FlushOptions) -> Result<FlushedColumn>;
}

/// Builds the buffer for `descriptor`.
///
/// The unsigned INT32/INT64 ordering variants are selected by the column's
/// logical type. `dictionary` makes the buffer maintain a chunk dictionary
/// (ignored for BOOLEAN) bounded by `dictionary_max_bytes`.
pub fn new_column_buffer(
    descriptor: &ColumnDescriptor,
    dictionary: bool,
    dictionary_max_bytes: Option<usize>,
    int96_compatibility: bool,
) -> Result<Box<dyn ColumnBuffer>> {
    let unsigned = matches!(
        descriptor.primitive().logical_type,
        Some(PrimitiveLogicalType::Integer(integer)) if !integer.is_signed()
    );

    fn with_dict<T: primitive::NativeDatum>(
        buffer: PrimitiveBuffer<T>,
        dictionary: bool,
        max_bytes: Option<usize>,
    ) -> Box<dyn ColumnBuffer>
    where
        T::Bytes: std::hash::Hash + Eq + Ord,
    {
        if dictionary {
            Box::new(buffer.with_dictionary(max_bytes))
        } else {
            Box::new(buffer)
        }
    }

    Ok(match descriptor.physical_type() {
        PhysicalType::Boolean => Box::new(BooleanBuffer::new(descriptor.clone())),
        PhysicalType::Int32 => with_dict(
            PrimitiveBuffer::<i32>::new(descriptor.clone(), unsigned),
            dictionary,
            dictionary_max_bytes,
        ),
        PhysicalType::Int64 => with_dict(
            PrimitiveBuffer::<i64>::new(descriptor.clone(), unsigned),
            dictionary,
            dictionary_max_bytes,
        ),
        PhysicalType::Int96 => {
            if !int96_compatibility {
                return Err(Error::InvalidConfiguration(
                    "INT96 is deprecated and write-disabled; enable int96 compatibility to write it"
                        .to_string(),
                ));
            }
            with_dict(
                PrimitiveBuffer::<crate::types::Int96>::new(descriptor.clone(), false),
                dictionary,
                dictionary_max_bytes,
            )
        }
        PhysicalType::Float => with_dict(
            PrimitiveBuffer::<f32>::new(descriptor.clone(), false),
            dictionary,
            dictionary_max_bytes,
        ),
        PhysicalType::Double => with_dict(
            PrimitiveBuffer::<f64>::new(descriptor.clone(), false),
            dictionary,
            dictionary_max_bytes,
        ),
        PhysicalType::ByteArray => {
            let buffer = BinaryBuffer::new(descriptor.clone());
            if dictionary {
                Box::new(buffer.with_dictionary(dictionary_max_bytes))
            } else {
                Box::new(buffer)
            }
        }
        PhysicalType::FixedLenByteArray(size) => {
            let buffer = FixedLenBuffer::new(descriptor.clone(), size);
            if dictionary {
                Box::new(buffer.with_dictionary(dictionary_max_bytes))
            } else {
                Box::new(buffer)
            }
        }
    })
}

/// The definition/repetition level streams of a buffer. Leaf values whose
/// definition level is below the maximum do not consume a value slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct Levels {
    def: Vec<i16>,
    rep: Vec<i16>,
    max_def: i16,
    max_rep: i16,
}

impl Levels {
    pub(crate) fn new(max_def: i16, max_rep: i16) -> Self {
        Self {
            def: vec![],
            rep: vec![],
            max_def,
            max_rep,
        }
    }

    pub(crate) fn push(&mut self, rep: i16, def: i16) -> Result<()> {
        if rep > self.max_rep || rep < 0 {
            return Err(Error::TypeMismatch(format!(
                "repetition level {} exceeds the column's maximum {}",
                rep, self.max_rep
            )));
        }
        if def > self.max_def || def < 0 {
            return Err(Error::TypeMismatch(format!(
                "definition level {} exceeds the column's maximum {}",
                def, self.max_def
            )));
        }
        if self.max_def > 0 {
            self.def.push(def);
        }
        if self.max_rep > 0 {
            self.rep.push(rep);
        }
        Ok(())
    }

    pub(crate) fn max_def(&self) -> i16 {
        self.max_def
    }

    pub(crate) fn max_rep(&self) -> i16 {
        self.max_rep
    }

    pub(crate) fn def(&self) -> &[i16] {
        &self.def
    }

    pub(crate) fn rep(&self) -> &[i16] {
        &self.rep
    }

    /// Whether the value at logical position `i` is defined (consumes a
    /// value slot).
    pub(crate) fn is_defined(&self, i: usize) -> bool {
        self.max_def == 0 || self.def[i] == self.max_def
    }

    /// The definition level of position `i`.
    pub(crate) fn def_at(&self, i: usize) -> i16 {
        if self.max_def == 0 {
            0
        } else {
            self.def[i]
        }
    }

    /// The repetition level of position `i`.
    pub(crate) fn rep_at(&self, i: usize) -> i16 {
        if self.max_rep == 0 {
            0
        } else {
            self.rep[i]
        }
    }

    /// The value slot of position `i`: the number of defined positions
    /// before it.
    pub(crate) fn slot_of(&self, i: usize) -> usize {
        if self.max_def == 0 {
            i
        } else {
            self.def[..i].iter().filter(|d| **d == self.max_def).count()
        }
    }

    pub(crate) fn null_count(&self, range: std::ops::Range<usize>) -> usize {
        if self.max_def == 0 {
            0
        } else {
            self.def[range].iter().filter(|d| **d != self.max_def).count()
        }
    }

    pub(crate) fn num_rows(&self, range: std::ops::Range<usize>) -> usize {
        if self.max_rep == 0 {
            range.len()
        } else {
            self.rep[range].iter().filter(|r| **r == 0).count()
        }
    }

    pub(crate) fn swap(&mut self, i: usize, j: usize) {
        if self.max_def > 0 {
            self.def.swap(i, j);
        }
        if self.max_rep > 0 {
            self.rep.swap(i, j);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.def.clear();
        self.rep.clear();
    }

    pub(crate) fn byte_size(&self) -> usize {
        (self.def.len() + self.rep.len()) * std::mem::size_of::<i16>()
    }
}
