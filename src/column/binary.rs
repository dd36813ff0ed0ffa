//! The BYTE_ARRAY column buffer, optionally dictionary-backed.
use parquet_format_safe::Statistics as FormatStatistics;

use crate::bounds::bounds_binary;
use crate::encoding::{delta_byte_array, delta_length_byte_array, plain, Encoding};
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::{DictPage, Page};
use crate::statistics::BinaryStatistics;
use crate::value::{Datum, Value};

use super::dictionary::BinaryDictionary;
use super::pages::{build_data_page, encode_dict_indices, segment_pages, PageInput};
use super::primitive::level_slice;
use super::{ColumnBuffer, FlushOptions, FlushedColumn, Levels, PageBounds};

#[derive(Debug, Clone)]
struct DictState {
    dictionary: BinaryDictionary,
    indices: Vec<u32>,
    /// logical length of the dictionary-encoded region
    split: usize,
    max_bytes: Option<usize>,
    overflowed: bool,
}

#[derive(Debug, Clone)]
pub struct BinaryBuffer {
    descriptor: ColumnDescriptor,
    levels: Levels,
    /// defined values outside the dictionary-encoded region
    values: Vec<Vec<u8>>,
    value_bytes: usize,
    dict: Option<DictState>,
}

impl BinaryBuffer {
    pub fn new(descriptor: ColumnDescriptor) -> Self {
        let levels = Levels::new(descriptor.max_def_level(), descriptor.max_rep_level());
        Self {
            descriptor,
            levels,
            values: vec![],
            value_bytes: 0,
            dict: None,
        }
    }

    pub(crate) fn with_dictionary(mut self, max_bytes: Option<usize>) -> Self {
        self.dict = Some(DictState {
            dictionary: BinaryDictionary::new(),
            indices: vec![],
            split: 0,
            max_bytes,
            overflowed: false,
        });
        self
    }

    pub fn push_bytes(&mut self, rep: i16, def: i16, value: &[u8]) -> Result<()> {
        self.levels.push(rep, def)?;
        if def == self.levels.max_def() {
            self.push_defined(value);
        }
        Ok(())
    }

    fn push_defined(&mut self, value: &[u8]) {
        let len_logical = self.len_logical();
        match &mut self.dict {
            Some(state) if !state.overflowed => {
                let index = state.dictionary.insert(value);
                state.indices.push(index);
                state.split = len_logical;
                if let Some(max_bytes) = state.max_bytes {
                    if state.dictionary.byte_size() > max_bytes {
                        state.overflowed = true;
                    }
                }
            }
            _ => {
                self.value_bytes += value.len();
                self.values.push(value.to_vec());
            }
        }
    }

    fn len_logical(&self) -> usize {
        if self.levels.max_def() == 0 {
            self.num_defined()
        } else {
            self.levels.def().len()
        }
    }

    fn num_defined(&self) -> usize {
        self.dict.as_ref().map(|s| s.indices.len()).unwrap_or(0) + self.values.len()
    }

    fn coerce(datum: &Datum) -> Result<Vec<u8>> {
        Ok(match datum {
            Datum::ByteArray(x) | Datum::FixedLenByteArray(x) => x.clone(),
            Datum::Boolean(x) => {
                if *x {
                    b"true".to_vec()
                } else {
                    b"false".to_vec()
                }
            }
            Datum::Int32(x) => x.to_string().into_bytes(),
            Datum::Int64(x) => x.to_string().into_bytes(),
            Datum::Float(x) => x.to_string().into_bytes(),
            Datum::Double(x) => x.to_string().into_bytes(),
            other => {
                return Err(Error::TypeMismatch(format!(
                    "cannot write {:?} to a BYTE_ARRAY column",
                    other
                )))
            }
        })
    }

    fn materialize(&self) -> Vec<Vec<u8>> {
        let mut all = Vec::with_capacity(self.num_defined());
        if let Some(state) = &self.dict {
            for index in &state.indices {
                all.push(state.dictionary.get(*index).unwrap().to_vec());
            }
        }
        all.extend(self.values.iter().cloned());
        all
    }

    fn datum_at(&self, i: usize) -> Option<Vec<u8>> {
        if !self.levels.is_defined(i) {
            return None;
        }
        let slot = self.levels.slot_of(i);
        Some(match &self.dict {
            Some(state) if slot < state.indices.len() => {
                state.dictionary.get(state.indices[slot]).unwrap().to_vec()
            }
            Some(state) => self.values[slot - state.indices.len()].clone(),
            None => self.values[slot].clone(),
        })
    }

    fn encode_values(
        &self,
        values: &[Vec<u8>],
        encoding: Encoding,
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        match encoding {
            Encoding::Plain => {
                plain::encode_binary(values.iter().map(|x| x.as_slice()), buffer);
                Ok(())
            }
            Encoding::DeltaLengthByteArray => {
                delta_length_byte_array::encode(values.iter().map(|x| x.as_slice()), buffer);
                Ok(())
            }
            Encoding::DeltaByteArray => {
                delta_byte_array::encode(values.iter().map(|x| x.as_slice()), buffer);
                Ok(())
            }
            other => Err(Error::InvalidConfiguration(format!(
                "encoding {:?} is not valid for BYTE_ARRAY columns",
                other
            ))),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn flush_region(
        &self,
        options: &FlushOptions,
        logical: std::ops::Range<usize>,
        slot_offset: usize,
        all_values: &[Vec<u8>],
        dict_encoded: bool,
        pages: &mut Vec<Page>,
        page_bounds: &mut Vec<PageBounds>,
    ) -> Result<()> {
        if logical.is_empty() {
            return Ok(());
        }
        let base = logical.start;
        let sizes: Vec<usize> = (logical.clone())
            .map(|i| {
                if !self.levels.is_defined(i) {
                    0
                } else if dict_encoded {
                    4
                } else {
                    let slot = self.levels.slot_of(i);
                    4 + all_values[slot].len()
                }
            })
            .collect();

        let mut slot_start = slot_offset;
        for range in segment_pages(&self.levels, logical.clone(), &sizes, options.page_buffer_size) {
            let range = range.start + base..range.end + base;
            let num_values = range.len();
            let null_count = self.levels.null_count(range.clone());
            let num_rows = self.levels.num_rows(range.clone());
            let slot_end = slot_start + (num_values - null_count);
            let values = &all_values[slot_start..slot_end];

            let bounds = bounds_binary(values.iter().map(|x| x.as_slice()));
            let statistics = FormatStatistics {
                null_count: Some(null_count as i64),
                distinct_count: None,
                min_value: bounds.map(|(min, _)| min.to_vec()),
                max_value: bounds.map(|(_, max)| max.to_vec()),
                min: None,
                max: None,
            };

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
                    .then(|| bounds.map(|(min, _)| min.to_vec()))
                    .flatten(),
                max: options
                    .record_page_bounds
                    .then(|| bounds.map(|(_, max)| max.to_vec()))
                    .flatten(),
                null_count: null_count as i64,
                num_rows,
            });
            slot_start = slot_end;
        }
        Ok(())
    }
}

impl ColumnBuffer for BinaryBuffer {
    fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    fn len(&self) -> usize {
        self.len_logical()
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
        self.value_bytes + self.values.len() * std::mem::size_of::<Vec<u8>>()
            + dict_bytes
            + self.levels.byte_size()
    }

    fn reset(&mut self) {
        self.levels.reset();
        self.values.clear();
        self.value_bytes = 0;
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
                return self.push_bytes(value.repetition_level, value.definition_level, &[]);
            }
            return self
                .levels
                .push(value.repetition_level, value.definition_level);
        }
        let coerced = Self::coerce(&value.datum)?;
        self.push_bytes(value.repetition_level, value.definition_level, &coerced)
    }

    fn read_values(&self, start: usize, length: usize) -> Vec<Value> {
        (start..start + length)
            .map(|i| {
                let datum = self
                    .datum_at(i)
                    .map(Datum::ByteArray)
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
        self.datum_at(i) < self.datum_at(j)
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

        if self.dict.is_some() && defined_i != defined_j {
            self.values = self.materialize();
            self.value_bytes = self.values.iter().map(|x| x.len()).sum();
            self.dict = None;
        }
        match (defined_i, defined_j) {
            (false, false) => {}
            (true, true) => {
                let boundary = self.dict.as_ref().map(|state| state.indices.len());
                match boundary {
                    Some(boundary) if (slot_i < boundary) != (slot_j < boundary) => {
                        self.values = self.materialize();
                        self.value_bytes = self.values.iter().map(|x| x.len()).sum();
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
            (true, false) => {
                let value = self.values.remove(slot_i);
                self.values.insert(slot_j - 1, value);
            }
            (false, true) => {
                let value = self.values.remove(slot_j);
                self.values.insert(slot_i, value);
            }
        }
    }

    fn clone_empty(&self) -> Box<dyn ColumnBuffer> {
        let mut empty = BinaryBuffer::new(self.descriptor.clone());
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
        while split > 0 && split < len && self.levels.rep_at(split) != 0 {
            split -= 1;
        }
        let slot_offset = self.levels.slot_of(split);

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
        let bounds = bounds_binary(all_values.iter().map(|x| x.as_slice()));
        let statistics = Box::new(BinaryStatistics {
            null_count: Some(null_count as i64),
            distinct_count: None,
            min_value: bounds.map(|(min, _)| min.to_vec()),
            max_value: bounds.map(|(_, max)| max.to_vec()),
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
    use crate::compression::Compression;
    use crate::metadata::SchemaDescriptor;
    use crate::schema::types::{PhysicalType, PrimitiveNode, Repetition};
    use crate::write::Version;

    fn descriptor() -> ColumnDescriptor {
        let schema = SchemaDescriptor::try_new(
            "s",
            vec![PrimitiveNode::from_physical(
                "c",
                Repetition::Optional,
                PhysicalType::ByteArray,
            )
            .into()],
        )
        .unwrap();
        schema.column(0).clone()
    }

    fn options(encoding: Encoding) -> FlushOptions {
        FlushOptions {
            version: Version::V1,
            compression: Compression::Uncompressed,
            page_buffer_size: 1024 * 1024,
            data_page_statistics: false,
            record_page_bounds: true,
            encoding,
        }
    }

    #[test]
    fn optional_bytes_are_not_corrupted() {
        let mut buffer = BinaryBuffer::new(descriptor());
        buffer.push_bytes(0, 1, b"test").unwrap();
        let values = buffer.read_values(0, 1);
        assert_eq!(values[0].datum, Datum::ByteArray(b"test".to_vec()));

        let flushed = buffer.flush(&options(Encoding::Plain)).unwrap();
        assert_eq!(flushed.pages.len(), 1);
        let statistics = flushed
            .statistics
            .as_any()
            .downcast_ref::<BinaryStatistics>()
            .unwrap();
        assert_eq!(statistics.min_value.as_deref(), Some(&b"test"[..]));
    }

    #[test]
    fn dictionary_chunk_bounds() {
        let mut buffer = BinaryBuffer::new(descriptor()).with_dictionary(None);
        for name in [&b"Han"[..], b"Leia", b"Luke"] {
            buffer.push_bytes(0, 1, name).unwrap();
        }
        let flushed = buffer.flush(&options(Encoding::Plain)).unwrap();
        assert!(matches!(&flushed.pages[0], Page::Dict(dict) if dict.num_values == 3));

        let statistics = flushed
            .statistics
            .as_any()
            .downcast_ref::<BinaryStatistics>()
            .unwrap();
        assert_eq!(statistics.min_value.as_deref(), Some(&b"Han"[..]));
        assert_eq!(statistics.max_value.as_deref(), Some(&b"Luke"[..]));
    }
}
