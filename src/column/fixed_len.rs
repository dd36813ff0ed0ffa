//! The FIXED_LEN_BYTE_ARRAY column buffer, stored contiguously. 16-byte
//! columns (BE128) compare byte-wise as big-endian integers, which is the
//! plain lexicographic order used here for every width.
use parquet_format_safe::Statistics as FormatStatistics;

use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::{DictPage, Page};
use crate::statistics::FixedLenStatistics;
use crate::value::{Datum, Value};

use super::dictionary::FixedLenDictionary;
use super::pages::{build_data_page, encode_dict_indices, segment_pages, PageInput};
use super::primitive::level_slice;
use super::{ColumnBuffer, FlushOptions, FlushedColumn, Levels, PageBounds};

use crate::encoding::Encoding;

#[derive(Debug, Clone)]
struct DictState {
    dictionary: FixedLenDictionary,
    indices: Vec<u32>,
    split: usize,
    max_bytes: Option<usize>,
    overflowed: bool,
}

#[derive(Debug, Clone)]
pub struct FixedLenBuffer {
    descriptor: ColumnDescriptor,
    size: usize,
    levels: Levels,
    /// concatenated defined values outside the dictionary region
    data: Vec<u8>,
    dict: Option<DictState>,
}

impl FixedLenBuffer {
    pub fn new(descriptor: ColumnDescriptor, size: usize) -> Self {
        let levels = Levels::new(descriptor.max_def_level(), descriptor.max_rep_level());
        Self {
            descriptor,
            size,
            levels,
            data: vec![],
            dict: None,
        }
    }

    pub(crate) fn with_dictionary(mut self, max_bytes: Option<usize>) -> Self {
        self.dict = Some(DictState {
            dictionary: FixedLenDictionary::new(self.size),
            indices: vec![],
            split: 0,
            max_bytes,
            overflowed: false,
        });
        self
    }

    pub fn push_bytes(&mut self, rep: i16, def: i16, value: &[u8]) -> Result<()> {
        if value.len() != self.size {
            return Err(Error::Coercion(format!(
                "a FIXED_LEN_BYTE_ARRAY({}) column cannot hold {} bytes",
                self.size,
                value.len()
            )));
        }
        self.levels.push(rep, def)?;
        if def == self.levels.max_def() {
            self.push_defined(value)?;
        }
        Ok(())
    }

    fn push_defined(&mut self, value: &[u8]) -> Result<()> {
        let len_logical = self.len_logical();
        match &mut self.dict {
            Some(state) if !state.overflowed => {
                let index = state.dictionary.insert(value)?;
                state.indices.push(index);
                state.split = len_logical;
                if let Some(max_bytes) = state.max_bytes {
                    if state.dictionary.byte_size() > max_bytes {
                        state.overflowed = true;
                    }
                }
            }
            _ => self.data.extend_from_slice(value),
        }
        Ok(())
    }

    fn len_logical(&self) -> usize {
        if self.levels.max_def() == 0 {
            self.num_defined()
        } else {
            self.levels.def().len()
        }
    }

    fn num_defined(&self) -> usize {
        self.dict.as_ref().map(|s| s.indices.len()).unwrap_or(0) + self.data.len() / self.size
    }

    fn materialize(&self) -> Vec<u8> {
        let mut all = Vec::with_capacity(self.num_defined() * self.size);
        if let Some(state) = &self.dict {
            for index in &state.indices {
                all.extend_from_slice(state.dictionary.get(*index).unwrap());
            }
        }
        all.extend_from_slice(&self.data);
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
            Some(state) => {
                let offset = (slot - state.indices.len()) * self.size;
                self.data[offset..offset + self.size].to_vec()
            }
            None => {
                let offset = slot * self.size;
                self.data[offset..offset + self.size].to_vec()
            }
        })
    }

    fn bounds_of<'a>(&self, values: &'a [u8]) -> Option<(&'a [u8], &'a [u8])> {
        crate::bounds::bounds_binary(values.chunks_exact(self.size))
    }

    #[allow(clippy::too_many_arguments)]
    fn flush_region(
        &self,
        options: &FlushOptions,
        logical: std::ops::Range<usize>,
        slot_offset: usize,
        all_values: &[u8],
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
                    self.size
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
            let values = &all_values[slot_start * self.size..slot_end * self.size];

            let bounds = self.bounds_of(values);
            let statistics = FormatStatistics {
                null_count: Some(null_count as i64),
                distinct_count: None,
                min_value: bounds.map(|(min, _)| min.to_vec()),
                max_value: bounds.map(|(_, max)| max.to_vec()),
                min: None,
                max: None,
            };

            let (encoded, encoding) = if dict_encoded {
                let state = self.dict.as_ref().unwrap();
                (
                    encode_dict_indices(
                        &state.indices[slot_start..slot_end],
                        state.dictionary.len(),
                    )?,
                    Encoding::RleDictionary,
                )
            } else if options.encoding == Encoding::Plain {
                (values.to_vec(), Encoding::Plain)
            } else {
                return Err(Error::InvalidConfiguration(format!(
                    "encoding {:?} is not valid for FIXED_LEN_BYTE_ARRAY columns",
                    options.encoding
                )));
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

    fn remove_slot(&mut self, slot: usize) -> Vec<u8> {
        let offset = slot * self.size;
        self.data.drain(offset..offset + self.size).collect()
    }

    fn insert_slot(&mut self, slot: usize, value: &[u8]) {
        let offset = slot * self.size;
        self.data.splice(offset..offset, value.iter().copied());
    }
}

impl ColumnBuffer for FixedLenBuffer {
    fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    fn len(&self) -> usize {
        self.len_logical()
    }

    fn cap(&self) -> usize {
        self.data.capacity() / self.size.max(1)
    }

    fn byte_size(&self) -> usize {
        let dict_bytes = self
            .dict
            .as_ref()
            .map(|s| s.dictionary.byte_size() + s.indices.len() * 4)
            .unwrap_or(0);
        self.data.len() + dict_bytes + self.levels.byte_size()
    }

    fn reset(&mut self) {
        self.levels.reset();
        self.data.clear();
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
                // BE128 and friends: a null stores all zeros
                let zeros = vec![0; self.size];
                return self.push_bytes(value.repetition_level, value.definition_level, &zeros);
            }
            return self
                .levels
                .push(value.repetition_level, value.definition_level);
        }
        match &value.datum {
            Datum::FixedLenByteArray(x) | Datum::ByteArray(x) => {
                self.push_bytes(value.repetition_level, value.definition_level, x)
            }
            other => Err(Error::TypeMismatch(format!(
                "cannot write {:?} to a FIXED_LEN_BYTE_ARRAY column",
                other
            ))),
        }
    }

    fn read_values(&self, start: usize, length: usize) -> Vec<Value> {
        (start..start + length)
            .map(|i| {
                let datum = self
                    .datum_at(i)
                    .map(Datum::FixedLenByteArray)
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

        if self.dict.is_some() {
            let boundary = self.dict.as_ref().unwrap().indices.len();
            let crosses = (slot_i < boundary) != (slot_j < boundary);
            if defined_i != defined_j || (defined_i && defined_j && crosses) {
                self.data = self.materialize();
                self.dict = None;
            }
        }
        match (defined_i, defined_j) {
            (false, false) => {}
            (true, true) => match &mut self.dict {
                Some(state) if slot_j < state.indices.len() => {
                    state.indices.swap(slot_i, slot_j)
                }
                Some(state) => {
                    let offset = state.indices.len();
                    let a = (slot_i - offset) * self.size;
                    let b = (slot_j - offset) * self.size;
                    for k in 0..self.size {
                        self.data.swap(a + k, b + k);
                    }
                }
                None => {
                    let a = slot_i * self.size;
                    let b = slot_j * self.size;
                    for k in 0..self.size {
                        self.data.swap(a + k, b + k);
                    }
                }
            },
            (true, false) => {
                let value = self.remove_slot(slot_i);
                self.insert_slot(slot_j - 1, &value);
            }
            (false, true) => {
                let value = self.remove_slot(slot_j);
                self.insert_slot(slot_i, &value);
            }
        }
    }

    fn clone_empty(&self) -> Box<dyn ColumnBuffer> {
        let mut empty = FixedLenBuffer::new(self.descriptor.clone(), self.size);
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
        let bounds = self.bounds_of(&all_values);
        let statistics = Box::new(FixedLenStatistics {
            size: self.size,
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
    use crate::metadata::SchemaDescriptor;
    use crate::schema::types::{PhysicalType, PrimitiveNode, Repetition};

    #[test]
    fn wrong_width_is_a_coercion_error() {
        let schema = SchemaDescriptor::try_new(
            "s",
            vec![PrimitiveNode::from_physical(
                "c",
                Repetition::Required,
                PhysicalType::FixedLenByteArray(16),
            )
            .into()],
        )
        .unwrap();
        let mut buffer = FixedLenBuffer::new(schema.column(0).clone(), 16);
        assert!(matches!(
            buffer.push_bytes(0, 0, b"short"),
            Err(Error::Coercion(_))
        ));
        assert_eq!(buffer.len(), 0);
    }
}
