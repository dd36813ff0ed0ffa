//! The column buffer of fixed-width native values: INT32, INT64, INT96,
//! FLOAT and DOUBLE, plus the unsigned INT32/INT64 variants that differ
//! only in ordering.
use std::cmp::Ordering;
use std::hash::Hash;

use parquet_format_safe::Statistics as FormatStatistics;

use crate::encoding::{byte_stream_split, delta_bitpacked, plain, Encoding};
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::{DictPage, Page};
use crate::schema::types::PhysicalType;
use crate::statistics::PrimitiveStatistics;
use crate::types::{Int96, NativeType};
use crate::value::{Datum, Value};

use super::dictionary::PrimitiveDictionary;
use super::pages::{build_data_page, encode_dict_indices, segment_pages, PageInput};
use super::{ColumnBuffer, FlushOptions, FlushedColumn, Levels, PageBounds};

/// Conversions between [`Datum`] and a native value, following the
/// documented coercion rules: truncation/clamping for numeric narrowing,
/// base-10 parsing for byte arrays, 1/0 for booleans.
pub trait NativeDatum: NativeType {
    fn from_datum(datum: &Datum) -> Result<Self>;

    fn to_datum(self) -> Datum;

    /// The value stored when a null is written to a non-nullable buffer.
    fn zero() -> Result<Self>;

    /// Conversion for `DELTA_BINARY_PACKED`; `None` for non-integers.
    fn to_i64(self) -> Option<i64>;

    fn from_i64(value: i64) -> Self;
}

fn parse_bytes<F: std::str::FromStr>(bytes: &[u8]) -> Result<F> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<F>().ok())
        .ok_or_else(|| {
            Error::Coercion(format!(
                "the byte array {:?} does not parse as a base-10 number",
                String::from_utf8_lossy(bytes)
            ))
        })
}

impl NativeDatum for i32 {
    fn from_datum(datum: &Datum) -> Result<Self> {
        Ok(match datum {
            Datum::Boolean(x) => i32::from(*x),
            Datum::Int32(x) => *x,
            Datum::Int64(x) => *x as i32,
            Datum::Float(x) => *x as i32,
            Datum::Double(x) => *x as i32,
            Datum::ByteArray(x) => parse_bytes(x)?,
            other => {
                return Err(Error::TypeMismatch(format!(
                    "cannot write {:?} to an INT32 column",
                    other
                )))
            }
        })
    }

    fn to_datum(self) -> Datum {
        Datum::Int32(self)
    }

    fn zero() -> Result<Self> {
        Ok(0)
    }

    fn to_i64(self) -> Option<i64> {
        Some(self as i64)
    }

    fn from_i64(value: i64) -> Self {
        value as i32
    }
}

impl NativeDatum for i64 {
    fn from_datum(datum: &Datum) -> Result<Self> {
        Ok(match datum {
            Datum::Boolean(x) => i64::from(*x),
            Datum::Int32(x) => *x as i64,
            Datum::Int64(x) => *x,
            Datum::Float(x) => *x as i64,
            Datum::Double(x) => *x as i64,
            Datum::ByteArray(x) => parse_bytes(x)?,
            other => {
                return Err(Error::TypeMismatch(format!(
                    "cannot write {:?} to an INT64 column",
                    other
                )))
            }
        })
    }

    fn to_datum(self) -> Datum {
        Datum::Int64(self)
    }

    fn zero() -> Result<Self> {
        Ok(0)
    }

    fn to_i64(self) -> Option<i64> {
        Some(self)
    }

    fn from_i64(value: i64) -> Self {
        value
    }
}

impl NativeDatum for f32 {
    fn from_datum(datum: &Datum) -> Result<Self> {
        Ok(match datum {
            Datum::Boolean(x) => f32::from(u8::from(*x)),
            Datum::Int32(x) => *x as f32,
            Datum::Int64(x) => *x as f32,
            Datum::Float(x) => *x,
            Datum::Double(x) => *x as f32,
            Datum::ByteArray(x) => parse_bytes(x)?,
            other => {
                return Err(Error::TypeMismatch(format!(
                    "cannot write {:?} to a FLOAT column",
                    other
                )))
            }
        })
    }

    fn to_datum(self) -> Datum {
        Datum::Float(self)
    }

    fn zero() -> Result<Self> {
        Ok(0.0)
    }

    fn to_i64(self) -> Option<i64> {
        None
    }

    fn from_i64(value: i64) -> Self {
        value as f32
    }
}

impl NativeDatum for f64 {
    fn from_datum(datum: &Datum) -> Result<Self> {
        Ok(match datum {
            Datum::Boolean(x) => f64::from(u8::from(*x)),
            Datum::Int32(x) => *x as f64,
            Datum::Int64(x) => *x as f64,
            Datum::Float(x) => *x as f64,
            Datum::Double(x) => *x,
            Datum::ByteArray(x) => parse_bytes(x)?,
            other => {
                return Err(Error::TypeMismatch(format!(
                    "cannot write {:?} to a DOUBLE column",
                    other
                )))
            }
        })
    }

    fn to_datum(self) -> Datum {
        Datum::Double(self)
    }

    fn zero() -> Result<Self> {
        Ok(0.0)
    }

    fn to_i64(self) -> Option<i64> {
        None
    }

    fn from_i64(value: i64) -> Self {
        value as f64
    }
}

impl NativeDatum for Int96 {
    fn from_datum(datum: &Datum) -> Result<Self> {
        match datum {
            Datum::Int96(x) => Ok(*x),
            other => Err(Error::TypeMismatch(format!(
                "cannot write {:?} to an INT96 column",
                other
            ))),
        }
    }

    fn to_datum(self) -> Datum {
        Datum::Int96(self)
    }

    fn zero() -> Result<Self> {
        Err(Error::TypeMismatch(
            "cannot store a null in a non-nullable INT96 column".to_string(),
        ))
    }

    fn to_i64(self) -> Option<i64> {
        None
    }

    fn from_i64(_: i64) -> Self {
        unreachable!("INT96 does not support DELTA_BINARY_PACKED")
    }
}

#[derive(Debug, Clone)]
struct DictState<T: NativeType>
where
    T::Bytes: Hash + Eq,
{
    dictionary: PrimitiveDictionary<T>,
    /// one index per defined value in the dictionary-encoded region
    indices: Vec<u32>,
    /// logical length of the dictionary-encoded region
    split: usize,
    max_bytes: Option<usize>,
    overflowed: bool,
}

/// A buffer of fixed-width values. `unsigned` orders INT32/INT64 content
/// as unsigned, implementing the `uint32`/`uint64` variants.
#[derive(Debug, Clone)]
pub struct PrimitiveBuffer<T: NativeDatum>
where
    T::Bytes: Hash + Eq + Ord,
{
    descriptor: ColumnDescriptor,
    levels: Levels,
    /// defined values outside the dictionary-encoded region
    values: Vec<T>,
    dict: Option<DictState<T>>,
    unsigned: bool,
}

impl<T: NativeDatum> PrimitiveBuffer<T>
where
    T::Bytes: Hash + Eq + Ord,
{
    pub fn new(descriptor: ColumnDescriptor, unsigned: bool) -> Self {
        let levels = Levels::new(descriptor.max_def_level(), descriptor.max_rep_level());
        Self {
            descriptor,
            levels,
            values: vec![],
            dict: None,
            unsigned,
        }
    }

    pub(crate) fn with_dictionary(mut self, max_bytes: Option<usize>) -> Self {
        self.dict = Some(DictState {
            dictionary: PrimitiveDictionary::new(),
            indices: vec![],
            split: 0,
            max_bytes,
            overflowed: false,
        });
        self
    }

    /// Typed fast path: appends one defined native value.
    pub fn push_native(&mut self, rep: i16, def: i16, value: T) -> Result<()> {
        self.levels.push(rep, def)?;
        if def == self.levels.max_def() {
            self.push_defined(value);
        }
        Ok(())
    }

    fn push_defined(&mut self, value: T) {
        let levels_len = self.levels_len();
        match &mut self.dict {
            Some(state) if !state.overflowed => {
                let index = state.dictionary.insert(value);
                state.indices.push(index);
                state.split = levels_len;
                if let Some(max_bytes) = state.max_bytes {
                    if state.dictionary.byte_size() > max_bytes {
                        state.overflowed = true;
                    }
                }
            }
            _ => self.values.push(value),
        }
    }

    fn levels_len(&self) -> usize {
        // logical length so far; the current value's levels are already in
        let defined = self
            .dict
            .as_ref()
            .map(|s| s.indices.len())
            .unwrap_or(0)
            + self.values.len();
        if self.levels.max_def() == 0 {
            defined
        } else {
            self.levels.def().len()
        }
    }

    fn cmp_values(&self, a: &T, b: &T) -> Ordering {
        if self.unsigned {
            // little endian: comparing the reversed bytes is an unsigned
            // comparison
            let a = a.to_le_bytes();
            let b = b.to_le_bytes();
            a.as_ref().iter().rev().cmp(b.as_ref().iter().rev())
        } else {
            a.ord(b)
        }
    }

    /// All defined values in order, the dictionary region materialized.
    fn materialize(&self) -> Vec<T> {
        let mut all = Vec::with_capacity(self.num_defined());
        if let Some(state) = &self.dict {
            for index in &state.indices {
                // infallible: the buffer created every index
                all.push(state.dictionary.get(*index).unwrap());
            }
        }
        all.extend_from_slice(&self.values);
        all
    }

    fn num_defined(&self) -> usize {
        self.dict.as_ref().map(|s| s.indices.len()).unwrap_or(0) + self.values.len()
    }

    fn datum_at(&self, i: usize) -> Option<T> {
        if !self.levels.is_defined(i) {
            return None;
        }
        let slot = self.levels.slot_of(i);
        Some(self.slot_value(slot))
    }

    fn slot_value(&self, slot: usize) -> T {
        match &self.dict {
            Some(state) if slot < state.indices.len() => {
                state.dictionary.get(state.indices[slot]).unwrap()
            }
            Some(state) => self.values[slot - state.indices.len()],
            None => self.values[slot],
        }
    }

    fn is_nan(value: &T) -> bool {
        match T::TYPE {
            PhysicalType::Float => {
                f32::from_le_bytes(value.to_le_bytes().as_ref().try_into().unwrap()).is_nan()
            }
            PhysicalType::Double => {
                f64::from_le_bytes(value.to_le_bytes().as_ref().try_into().unwrap()).is_nan()
            }
            _ => false,
        }
    }

    /// min/max with the buffer's ordering; NaN excluded.
    fn bounds_of(&self, values: &[T]) -> Option<(T, T)> {
        let mut iter = values.iter().filter(|x| !Self::is_nan(x));
        let first = *iter.next()?;
        let (mut min, mut max) = (first, first);
        for value in iter {
            if self.cmp_values(value, &min) == Ordering::Less {
                min = *value;
            }
            if self.cmp_values(value, &max) == Ordering::Greater {
                max = *value;
            }
        }
        Some((min, max))
    }

    fn page_statistics(
        &self,
        values: &[T],
        null_count: usize,
        distinct: Option<i64>,
    ) -> (Option<(T, T)>, FormatStatistics) {
        let bounds = self.bounds_of(values);
        let statistics = FormatStatistics {
            null_count: Some(null_count as i64),
            distinct_count: distinct,
            min_value: bounds.map(|(min, _)| min.to_le_bytes().as_ref().to_vec()),
            max_value: bounds.map(|(_, max)| max.to_le_bytes().as_ref().to_vec()),
            min: None,
            max: None,
        };
        (bounds, statistics)
    }

    fn encode_values(&self, values: &[T], encoding: Encoding, buffer: &mut Vec<u8>) -> Result<()> {
        match encoding {
            Encoding::Plain => {
                plain::encode_native(values, buffer);
                Ok(())
            }
            Encoding::DeltaBinaryPacked => {
                let as_i64 = values
                    .iter()
                    .map(|x| {
                        x.to_i64().ok_or_else(|| {
                            Error::TypeMismatch(
                                "DELTA_BINARY_PACKED requires an integer column".to_string(),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                delta_bitpacked::encode(as_i64.into_iter(), buffer);
                Ok(())
            }
            Encoding::ByteStreamSplit => {
                byte_stream_split::encode(values, buffer);
                Ok(())
            }
            other => Err(Error::InvalidConfiguration(format!(
                "encoding {:?} is not valid for {:?} columns",
                other,
                T::TYPE
            ))),
        }
    }

    /// Emits the pages of one region of logical positions.
    #[allow(clippy::too_many_arguments)]
    fn flush_region(
        &self,
        options: &FlushOptions,
        logical: std::ops::Range<usize>,
        slot_offset: usize,
        all_values: &[T],
        dict_encoded: bool,
        pages: &mut Vec<Page>,
        page_bounds: &mut Vec<PageBounds>,
    ) -> Result<()> {
        if logical.is_empty() {
            return Ok(());
        }
        let value_size = std::mem::size_of::<T>();
        let sizes: Vec<usize> = (logical.clone())
            .map(|i| {
                if self.levels.is_defined(i) {
                    if dict_encoded {
                        4
                    } else {
                        value_size
                    }
                } else {
                    0
                }
            })
            .collect();

        let base = logical.start;
        let mut slot_start = slot_offset;
        for range in segment_pages(&self.levels, logical.clone(), &sizes, options.page_buffer_size) {
            let range = range.start + base..range.end + base;
            let num_values = range.len();
            let null_count = self.levels.null_count(range.clone());
            let num_rows = self.levels.num_rows(range.clone());
            let slot_end = slot_start + (num_values - null_count);
            let values = &all_values[slot_start..slot_end];

            let (bounds, statistics) = self.page_statistics(values, null_count, None);

            let mut encoded = vec![];
            let encoding = if dict_encoded {
                let state = self.dict.as_ref().unwrap();
                encoded = encode_dict_indices(
                    &state.indices[slot_start..slot_end],
                    state.dictionary.len(),
                )?;
                Encoding::RleDictionary
            } else {
                self.encode_values(values, options.encoding, &mut encoded)?;
                options.encoding
            };

            pages.push(build_data_page(PageInput {
                version: options.version,
                compression: options.compression,
                encoding,
                descriptor: &self.descriptor,
                rep: level_slice(self.levels.rep(), &range),
                def: level_slice(self.levels.def(), &range),
                num_values,
                num_rows,
                null_count,
                values: encoded,
                statistics: options.data_page_statistics.then_some(statistics),
            })?);

            page_bounds.push(PageBounds {
                min: options
                    .record_page_bounds
                    .then(|| bounds.map(|(min, _)| min.to_le_bytes().as_ref().to_vec()))
                    .flatten(),
                max: options
                    .record_page_bounds
                    .then(|| bounds.map(|(_, max)| max.to_le_bytes().as_ref().to_vec()))
                    .flatten(),
                null_count: null_count as i64,
                num_rows,
            });
            slot_start = slot_end;
        }
        Ok(())
    }
}

pub(super) fn level_slice<'a>(levels: &'a [i16], range: &std::ops::Range<usize>) -> &'a [i16] {
    if levels.is_empty() {
        levels
    } else {
        &levels[range.clone()]
    }
}

impl<T: NativeDatum> ColumnBuffer for PrimitiveBuffer<T>
where
    T::Bytes: Hash + Eq + Ord,
{
    fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    fn len(&self) -> usize {
        self.levels_len()
    }

    fn cap(&self) -> usize {
        self.values.capacity()
    }

    fn byte_size(&self) -> usize {
        let dict_bytes = self
            .dict
            .as_ref()
            .map(|s| s.dictionary.byte_size() + s.indices.len() * 4)
            .unwrap_or(0);
        self.values.len() * std::mem::size_of::<T>() + dict_bytes + self.levels.byte_size()
    }

    fn reset(&mut self) {
        self.levels.reset();
        self.values.clear();
        if let Some(state) = &mut self.dict {
            state.dictionary.reset();
            state.indices.clear();
            state.split = 0;
            state.overflowed = false;
        }
    }

    fn push_value(&mut self, value: &Value) -> Result<()> {
        if value.datum.is_null() {
            if self.descriptor.max_def_level() == 0 {
                // a null in a non-nullable column stores the type's zero
                let zero = T::zero()?;
                self.levels
                    .push(value.repetition_level, value.definition_level)?;
                self.push_defined(zero);
                return Ok(());
            }
            return self
                .levels
                .push(value.repetition_level, value.definition_level);
        }
        let native = T::from_datum(&value.datum)?;
        self.push_native(value.repetition_level, value.definition_level, native)
    }

    fn read_values(&self, start: usize, length: usize) -> Vec<Value> {
        (start..start + length)
            .map(|i| {
                let datum = self
                    .datum_at(i)
                    .map(|x| x.to_datum())
                    .unwrap_or(Datum::Null);
                Value::new(
                    datum,
                    self.levels.rep_at(i),
                    self.levels.def_at(i),
                    self.descriptor.index(),
                )
            })
            .collect()
    }

    fn less(&self, i: usize, j: usize) -> bool {
        match (self.datum_at(i), self.datum_at(j)) {
            (None, None) => false,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => self.cmp_values(&a, &b) == Ordering::Less,
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (i, j) = (i.min(j), i.max(j));
        let defined_i = self.levels.is_defined(i);
        let defined_j = self.levels.is_defined(j);
        let slot_i = self.levels.slot_of(i);
        let slot_j = self.levels.slot_of(j);
        self.levels.swap(i, j);
        match (defined_i, defined_j) {
            (false, false) => {}
            (true, true) => {
                let boundary = self.dict.as_ref().map(|state| state.indices.len());
                match boundary {
                    // a mixed-region swap would change which values are
                    // dictionary-encoded; materialize first
                    Some(boundary) if (slot_i < boundary) != (slot_j < boundary) => {
                        self.values = self.materialize();
                        self.dict = None;
                        self.values.swap(slot_i, slot_j);
                    }
                    Some(boundary) if slot_j < boundary => self
                        .dict
                        .as_mut()
                        .unwrap()
                        .indices
                        .swap(slot_i, slot_j),
                    Some(boundary) => self.values.swap(slot_i - boundary, slot_j - boundary),
                    None => self.values.swap(slot_i, slot_j),
                }
            }
            // a mixed-null swap moves a value slot; the dictionary region
            // cannot express that, so materialize it
            (true, false) | (false, true) => {
                if self.dict.is_some() {
                    self.values = self.materialize();
                    self.dict = None;
                }
                if defined_i {
                    let value = self.values.remove(slot_i);
                    self.values.insert(slot_j - 1, value);
                } else {
                    let value = self.values.remove(slot_j);
                    self.values.insert(slot_i, value);
                }
            }
        }
    }

    fn clone_empty(&self) -> Box<dyn ColumnBuffer> {
        let mut empty = PrimitiveBuffer::<T>::new(self.descriptor.clone(), self.unsigned);
        if let Some(state) = &self.dict {
            empty = empty.with_dictionary(state.max_bytes);
        }
        Box::new(empty)
    }

    fn flush(&mut self, options: &FlushOptions) -> Result<FlushedColumn> {
        let len = self.len();
        let all_values = self.materialize();

        let mut pages = vec![];
        let mut page_bounds = vec![];

        let mut split = match &self.dict {
            Some(state) if !state.indices.is_empty() => {
                pages.push(Page::Dict(DictPage::new(
                    state.dictionary.to_plain(),
                    state.dictionary.len(),
                    false,
                )));
                state.split
            }
            _ => 0,
        };
        // the fallback region must start at a row boundary
        while split > 0 && split < len && self.levels.rep_at(split) != 0 {
            split -= 1;
        }
        let slot_offset = self.levels.slot_of(split);

        // dictionary-encoded region, then the plain/fallback remainder
        self.flush_region(
            options,
            0..split,
            0,
            &all_values,
            true,
            &mut pages,
            &mut page_bounds,
        )?;
        self.flush_region(
            options,
            split..len,
            slot_offset,
            &all_values,
            false,
            &mut pages,
            &mut page_bounds,
        )?;

        let null_count = self.levels.null_count(0..len);
        let bounds = self.bounds_of(&all_values);
        let statistics = Box::new(PrimitiveStatistics::<T> {
            null_count: Some(null_count as i64),
            distinct_count: None,
            min_value: bounds.map(|(min, _)| min),
            max_value: bounds.map(|(_, max)| max),
        });

        self.reset();
        Ok(FlushedColumn {
            pages,
            statistics,
            page_bounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SchemaDescriptor;
    use crate::schema::types::{PrimitiveNode, Repetition};
    use crate::write::Version;

    fn descriptor(repetition: Repetition) -> ColumnDescriptor {
        let schema = SchemaDescriptor::try_new(
            "s",
            vec![PrimitiveNode::from_physical("c", repetition, PhysicalType::Int32).into()],
        )
        .unwrap();
        schema.column(0).clone()
    }

    fn options() -> FlushOptions {
        FlushOptions {
            version: Version::V2,
            compression: crate::compression::Compression::Uncompressed,
            page_buffer_size: 1024 * 1024,
            data_page_statistics: false,
            record_page_bounds: true,
            encoding: Encoding::Plain,
        }
    }

    #[test]
    fn len_equals_writes_and_reads_roundtrip() {
        let mut buffer = PrimitiveBuffer::<i32>::new(descriptor(Repetition::Optional), false);
        buffer.push_native(0, 1, 10).unwrap();
        buffer
            .push_value(&Value::null(0, 0, buffer.descriptor().index()))
            .unwrap();
        buffer.push_native(0, 1, -3).unwrap();
        assert_eq!(buffer.len(), 3);

        let values = buffer.read_values(0, 3);
        assert_eq!(values[0].datum, Datum::Int32(10));
        assert_eq!(values[1].datum, Datum::Null);
        assert_eq!(values[2].datum, Datum::Int32(-3));
    }

    #[test]
    fn coercions() {
        let mut buffer = PrimitiveBuffer::<i32>::new(descriptor(Repetition::Required), false);
        let index = buffer.descriptor().index();
        buffer
            .push_value(&Value::new(Datum::Boolean(true), 0, 0, index))
            .unwrap();
        buffer
            .push_value(&Value::new(Datum::Double(-7.9), 0, 0, index))
            .unwrap();
        buffer
            .push_value(&Value::new(Datum::ByteArray(b"42".to_vec()), 0, 0, index))
            .unwrap();
        let values = buffer.read_values(0, 3);
        assert_eq!(values[0].datum, Datum::Int32(1));
        assert_eq!(values[1].datum, Datum::Int32(-7));
        assert_eq!(values[2].datum, Datum::Int32(42));

        let result = buffer.push_value(&Value::new(
            Datum::ByteArray(b"not a number".to_vec()),
            0,
            0,
            index,
        ));
        assert!(matches!(result, Err(Error::Coercion(_))));
        // the failed write did not consume a slot
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn wrong_column_is_rejected() {
        let mut buffer = PrimitiveBuffer::<i32>::new(descriptor(Repetition::Required), false);
        let value = Value::new(Datum::Int32(1), 0, 0, 17);
        assert!(buffer.write_values(&[value]).is_err());
    }

    #[test]
    fn sort_support() {
        let mut buffer = PrimitiveBuffer::<i32>::new(descriptor(Repetition::Optional), false);
        buffer.push_native(0, 1, 5).unwrap();
        buffer
            .push_value(&Value::null(0, 0, buffer.descriptor().index()))
            .unwrap();
        buffer.push_native(0, 1, 1).unwrap();

        // nulls sort first
        assert!(buffer.less(1, 0));
        assert!(buffer.less(2, 0));

        buffer.swap(0, 1);
        let values = buffer.read_values(0, 3);
        assert_eq!(values[0].datum, Datum::Null);
        assert_eq!(values[1].datum, Datum::Int32(5));
        assert_eq!(values[2].datum, Datum::Int32(1));
    }

    #[test]
    fn unsigned_ordering() {
        let mut buffer = PrimitiveBuffer::<i32>::new(descriptor(Repetition::Required), true);
        buffer.push_native(0, 0, -1).unwrap(); // u32::MAX
        buffer.push_native(0, 0, 1).unwrap();
        assert!(buffer.less(1, 0));
    }

    #[test]
    fn dictionary_overflow_splits_the_chunk() {
        let descriptor = descriptor(Repetition::Required);
        // 3 distinct values of 4 bytes each: overflow after the third
        let mut buffer =
            PrimitiveBuffer::<i32>::new(descriptor, false).with_dictionary(Some(10));
        for value in [1, 2, 2, 3, 4, 5] {
            buffer.push_native(0, 0, value).unwrap();
        }
        let flushed = buffer.flush(&options()).unwrap();
        // dict page + one dict-encoded page + one plain page
        assert_eq!(flushed.pages.len(), 3);
        assert!(matches!(flushed.pages[0], Page::Dict(_)));
    }

    #[test]
    fn flush_excludes_nan_from_statistics() {
        let schema = SchemaDescriptor::try_new(
            "s",
            vec![
                PrimitiveNode::from_physical("c", Repetition::Required, PhysicalType::Float)
                    .into(),
            ],
        )
        .unwrap();
        let mut buffer = PrimitiveBuffer::<f32>::new(schema.column(0).clone(), false);
        for value in [f32::NAN, 3.0, 1.0, f32::NAN, 2.0] {
            buffer.push_native(0, 0, value).unwrap();
        }
        let flushed = buffer.flush(&options()).unwrap();
        let statistics = flushed
            .statistics
            .as_any()
            .downcast_ref::<PrimitiveStatistics<f32>>()
            .unwrap();
        assert_eq!(statistics.min_value, Some(1.0));
        assert_eq!(statistics.max_value, Some(3.0));
    }
}
