//! The BOOLEAN column buffer. Booleans are never dictionary-encoded; the
//! values section is bit-packed PLAIN.
use parquet_format_safe::Statistics as FormatStatistics;

use crate::encoding::{plain, Encoding};
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::statistics::BooleanStatistics;
use crate::value::{Datum, Value};

use super::pages::{build_data_page, segment_pages, PageInput};
use super::{ColumnBuffer, FlushOptions, FlushedColumn, Levels, PageBounds};

#[derive(Debug, Clone)]
pub struct BooleanBuffer {
    descriptor: ColumnDescriptor,
    levels: Levels,
    values: Vec<bool>,
}

impl BooleanBuffer {
    pub fn new(descriptor: ColumnDescriptor) -> Self {
        let levels = Levels::new(descriptor.max_def_level(), descriptor.max_rep_level());
        Self {
            descriptor,
            levels,
            values: vec![],
        }
    }

    pub fn push_bool(&mut self, rep: i16, def: i16, value: bool) -> Result<()> {
        self.levels.push(rep, def)?;
        if def == self.levels.max_def() {
            self.values.push(value);
        }
        Ok(())
    }

    fn coerce(datum: &Datum) -> Result<bool> {
        Ok(match datum {
            Datum::Boolean(x) => *x,
            Datum::Int32(x) => *x != 0,
            Datum::Int64(x) => *x != 0,
            other => {
                return Err(Error::TypeMismatch(format!(
                    "cannot write {:?} to a BOOLEAN column",
                    other
                )))
            }
        })
    }

    fn datum_at(&self, i: usize) -> Option<bool> {
        if !self.levels.is_defined(i) {
            return None;
        }
        Some(self.values[self.levels.slot_of(i)])
    }

    fn len_logical(&self) -> usize {
        if self.levels.max_def() == 0 {
            self.values.len()
        } else {
            self.levels.def().len()
        }
    }
}

impl ColumnBuffer for BooleanBuffer {
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
        self.values.len() + self.levels.byte_size()
    }

    fn reset(&mut self) {
        self.levels.reset();
        self.values.clear();
    }

    fn push_value(&mut self, value: &Value) -> Result<()> {
        if value.datum.is_null() {
            if self.descriptor.max_def_level() == 0 {
                return self.push_bool(value.repetition_level, value.definition_level, false);
            }
            return self
                .levels
                .push(value.repetition_level, value.definition_level);
        }
        let coerced = Self::coerce(&value.datum)?;
        self.push_bool(value.repetition_level, value.definition_level, coerced)
    }

    fn read_values(&self, start: usize, length: usize) -> Vec<Value> {
        (start..start + length)
            .map(|i| {
                let datum = self
                    .datum_at(i)
                    .map(Datum::Boolean)
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
        // nulls first, then false before true
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
        match (defined_i, defined_j) {
            (false, false) => {}
            (true, true) => self.values.swap(slot_i, slot_j),
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
        Box::new(BooleanBuffer::new(self.descriptor.clone()))
    }

    fn flush(&mut self, options: &FlushOptions) -> Result<FlushedColumn> {
        let len = self.len();
        let mut pages = vec![];
        let mut page_bounds = vec![];

        // one packed bit per defined value
        let sizes: Vec<usize> = (0..len)
            .map(|i| usize::from(self.levels.is_defined(i)))
            .collect();

        let mut slot_start = 0;
        for range in segment_pages(
            &self.levels,
            0..len,
            &sizes,
            // sizes are bits here
            options.page_buffer_size * 8,
        ) {
            let num_values = range.len();
            let null_count = self.levels.null_count(range.clone());
            let num_rows = self.levels.num_rows(range.clone());
            let slot_end = slot_start + (num_values - null_count);
            let values = &self.values[slot_start..slot_end];

            let min = values.iter().copied().min();
            let max = values.iter().copied().max();
            let statistics = FormatStatistics {
                null_count: Some(null_count as i64),
                distinct_count: None,
                min_value: min.map(|x| vec![u8::from(x)]),
                max_value: max.map(|x| vec![u8::from(x)]),
                min: None,
                max: None,
            };

            let mut encoded = vec![];
            plain::encode_boolean(values, &mut encoded);

            pages.push(build_data_page(PageInput {
                version: options.version,
                compression: options.compression,
                encoding: Encoding::Plain,
                descriptor: &self.descriptor,
                rep: super::primitive::level_slice(self.levels.rep(), &range),
                def: super::primitive::level_slice(self.levels.def(), &range),
                num_values,
                num_rows,
                null_count,
                values: encoded,
                statistics: options.data_page_statistics.then_some(statistics),
            })?);

            page_bounds.push(PageBounds {
                min: options
                    .record_page_bounds
                    .then(|| min.map(|x| vec![u8::from(x)]))
                    .flatten(),
                max: options
                    .record_page_bounds
                    .then(|| max.map(|x| vec![u8::from(x)]))
                    .flatten(),
                null_count: null_count as i64,
                num_rows,
            });
            slot_start = slot_end;
        }

        let statistics = Box::new(BooleanStatistics {
            null_count: Some(self.levels.null_count(0..len) as i64),
            distinct_count: None,
            min_value: self.values.iter().copied().min(),
            max_value: self.values.iter().copied().max(),
        });

        self.reset();
        Ok(FlushedColumn {
            pages,
            statistics,
            page_bounds,
        })
    }
}
