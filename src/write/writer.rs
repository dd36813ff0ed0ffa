//! The buffered, row-oriented writer: accumulates shredded rows in column
//! buffers, flushes row groups on size or row thresholds, sorts, builds
//! bloom filters and key-value metadata.
use std::io::{BufWriter, Write};

use parquet_format_safe::SortingColumn;

use crate::column::{new_column_buffer, ColumnBuffer, FlushOptions, FlushedColumn};
use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::metadata::{KeyValue, SchemaDescriptor};
use crate::schema::types::PhysicalType;
use crate::value::{Datum, Row, Value};

use super::column_chunk::ColumnSubmission;
use super::compression::Compressor;
use super::file::FileWriter;
use super::{positive, DynIter, DynStreamingIterator, Version, WriteOptions};

/// A bloom filter request for one leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomFilterOptions {
    /// zero-based leaf index
    pub column: usize,
    /// bits spent per distinct value; drives the false-positive rate
    pub bits_per_value: usize,
}

/// A sort key for row groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortingColumnOptions {
    /// zero-based leaf index
    pub column: usize,
    pub descending: bool,
    pub nulls_first: bool,
}

/// The full configuration surface of [`Writer`].
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Target uncompressed size per data page.
    pub page_buffer_size: usize,
    /// Output buffering; 0 writes through.
    pub write_buffer_size: usize,
    /// Byte threshold that flushes a row group.
    pub row_group_target_size: usize,
    /// Row-count threshold that flushes a row group; `None` is unbounded.
    pub max_rows_per_row_group: Option<usize>,
    pub data_page_version: Version,
    /// Emit statistics in every data-page header.
    pub data_page_statistics: bool,
    pub compression: Compression,
    /// `(kind, encoding)` overrides of the default (non-dictionary)
    /// encoding; the kind's length payload is ignored when matching.
    pub encodings: Vec<(PhysicalType, Encoding)>,
    /// Whether chunks start dictionary-encoded.
    pub dictionary: bool,
    /// Leaf indexes that opt out of `dictionary`.
    pub no_dictionary: Vec<usize>,
    /// Per-chunk dictionary byte budget; `None` is unlimited.
    pub dictionary_max_bytes: Option<usize>,
    pub sorting_columns: Vec<SortingColumnOptions>,
    pub bloom_filters: Vec<BloomFilterOptions>,
    /// Pairs appended to the footer.
    pub key_value_metadata: Option<Vec<KeyValue>>,
    /// Leaf indexes whose column-index bounds are not recorded.
    pub skip_page_bounds: Vec<usize>,
    pub column_index_truncate_length: usize,
    /// Allow writing the deprecated INT96 type.
    pub int96_compatibility: bool,
    pub created_by: Option<String>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            page_buffer_size: 1024 * 1024,
            write_buffer_size: 0,
            row_group_target_size: 128 * 1024 * 1024,
            max_rows_per_row_group: None,
            data_page_version: Version::V2,
            data_page_statistics: false,
            compression: Compression::Snappy,
            encodings: vec![],
            dictionary: true,
            no_dictionary: vec![],
            dictionary_max_bytes: None,
            sorting_columns: vec![],
            bloom_filters: vec![],
            key_value_metadata: None,
            skip_page_bounds: vec![],
            column_index_truncate_length: 64,
            int96_compatibility: false,
            created_by: None,
        }
    }
}

impl WriterOptions {
    /// Sets the fallback encoding of every column whose physical kind is
    /// `kind`. Fails when the pair is incompatible.
    pub fn default_encoding_for(mut self, kind: PhysicalType, encoding: Encoding) -> Result<Self> {
        if !encoding.is_compatible(&kind) {
            return Err(Error::InvalidConfiguration(format!(
                "encoding {:?} cannot encode {:?} columns",
                encoding, kind
            )));
        }
        self.encodings.push((kind, encoding));
        Ok(self)
    }

    fn encoding_for(&self, physical_type: PhysicalType) -> Encoding {
        self.encodings
            .iter()
            .rev()
            .find(|(kind, _)| std::mem::discriminant(kind) == std::mem::discriminant(&physical_type))
            .map(|(_, encoding)| *encoding)
            .unwrap_or(Encoding::Plain)
    }
}

enum Sink<W: Write> {
    Plain(W),
    Buffered(BufWriter<W>),
}

impl<W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Sink::Plain(writer) => writer.write(buf),
            Sink::Buffered(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Sink::Plain(writer) => writer.flush(),
            Sink::Buffered(writer) => writer.flush(),
        }
    }
}

impl<W: Write> Sink<W> {
    fn into_inner(self) -> Result<W> {
        match self {
            Sink::Plain(writer) => Ok(writer),
            Sink::Buffered(writer) => writer
                .into_inner()
                .map_err(|e| Error::Transport(e.to_string())),
        }
    }
}

/// The buffered writer: [`Writer::write_rows`] accumulates, row groups are
/// flushed on the configured thresholds, [`Writer::close`] writes indexes
/// and footer.
pub struct Writer<W: Write> {
    file: FileWriter<Sink<W>>,
    options: WriterOptions,
    buffers: Vec<Box<dyn ColumnBuffer>>,
    /// rows pending shredding, kept whole while sorting is configured
    pending_rows: Vec<Row>,
    buffered_rows: usize,
    started: bool,
}

impl<W: Write> Writer<W> {
    /// Validates `options` against `schema` and builds the writer. No
    /// partial state is retained on error.
    pub fn try_new(writer: W, schema: SchemaDescriptor, options: WriterOptions) -> Result<Self> {
        positive("page_buffer_size", options.page_buffer_size)?;
        positive("row_group_target_size", options.row_group_target_size)?;
        if let Some(max_rows) = options.max_rows_per_row_group {
            positive("max_rows_per_row_group", max_rows)?;
        }
        for (kind, encoding) in &options.encodings {
            if !encoding.is_compatible(kind) {
                return Err(Error::InvalidConfiguration(format!(
                    "encoding {:?} cannot encode {:?} columns",
                    encoding, kind
                )));
            }
        }
        for sorting in &options.sorting_columns {
            let descriptor = schema.columns().get(sorting.column).ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "sorting column {} is not a leaf of the schema",
                    sorting.column
                ))
            })?;
            if descriptor.max_rep_level() > 0 {
                return Err(Error::InvalidConfiguration(format!(
                    "sorting column \"{}\" is repeated; only flat columns can sort row groups",
                    descriptor.name()
                )));
            }
        }
        for bloom in &options.bloom_filters {
            if bloom.column >= schema.num_columns() {
                return Err(Error::InvalidConfiguration(format!(
                    "bloom filter column {} is not a leaf of the schema",
                    bloom.column
                )));
            }
            positive("bits_per_value", bloom.bits_per_value)?;
            if !cfg!(feature = "bloom_filter") {
                return Err(Error::FeatureNotActive(
                    "bloom filters require the bloom_filter feature".to_string(),
                ));
            }
        }

        let buffers = schema
            .columns()
            .iter()
            .map(|descriptor| {
                let dictionary = options.dictionary
                    && !options.no_dictionary.contains(&descriptor.index());
                new_column_buffer(
                    descriptor,
                    dictionary,
                    options.dictionary_max_bytes,
                    options.int96_compatibility,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let sink = if options.write_buffer_size > 0 {
            Sink::Buffered(BufWriter::with_capacity(options.write_buffer_size, writer))
        } else {
            Sink::Plain(writer)
        };
        let file = FileWriter::new(
            sink,
            schema,
            WriteOptions {
                version: options.data_page_version,
                column_index_truncate_length: options.column_index_truncate_length,
            },
            options.compression,
            options.created_by.clone(),
        );

        Ok(Self {
            file,
            options,
            buffers,
            pending_rows: vec![],
            buffered_rows: 0,
            started: false,
        })
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        self.file.schema()
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Rows buffered in the open row group.
    pub fn buffered_rows(&self) -> usize {
        self.buffered_rows
    }

    /// Appends `rows`, flushing row groups whenever a threshold is hit.
    pub fn write_rows<I: IntoIterator<Item = Row>>(&mut self, rows: I) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Appends one row: an ordered sequence of values covering the leaf
    /// columns in schema order.
    pub fn write_row(&mut self, row: Row) -> Result<()> {
        if self.options.sorting_columns.is_empty() {
            self.shred_into_buffers(&row)?;
        } else {
            self.pending_rows.push(row);
        }
        self.buffered_rows += 1;

        if let Some(max_rows) = self.options.max_rows_per_row_group {
            if self.buffered_rows >= max_rows {
                return self.flush_row_group();
            }
        }
        let buffered_bytes: usize = self.buffers.iter().map(|buffer| buffer.byte_size()).sum::<usize>()
            + self
                .pending_rows
                .iter()
                .map(|row| row.len() * std::mem::size_of::<Value>())
                .sum::<usize>();
        if buffered_bytes >= self.options.row_group_target_size {
            return self.flush_row_group();
        }
        Ok(())
    }

    fn shred_into_buffers(&mut self, row: &[Value]) -> Result<()> {
        for value in row {
            let index = value.column_index()?;
            let num_buffers = self.buffers.len();
            let buffer = self.buffers.get_mut(index).ok_or_else(|| {
                Error::TypeMismatch(format!(
                    "a value claims column {} but the schema has {} leaves",
                    index, num_buffers
                ))
            })?;
            buffer.write_values(std::slice::from_ref(value))?;
        }
        Ok(())
    }

    fn sort_pending_rows(&mut self) {
        let sorting = self.options.sorting_columns.clone();
        self.pending_rows.sort_by(|a, b| {
            for key in &sorting {
                let left = row_datum(a, key.column);
                let right = row_datum(b, key.column);
                let mut order = compare_datums(left, right, key.nulls_first);
                if key.descending {
                    order = order.reverse();
                }
                if order != std::cmp::Ordering::Equal {
                    return order;
                }
            }
            std::cmp::Ordering::Equal
        });
    }

    /// Flushes the buffered rows as one row group. A no-op when empty.
    pub fn flush_row_group(&mut self) -> Result<()> {
        if self.buffered_rows == 0 {
            return Ok(());
        }
        if !self.started {
            self.file.start()?;
            self.started = true;
        }
        if !self.pending_rows.is_empty() {
            self.sort_pending_rows();
            let rows = std::mem::take(&mut self.pending_rows);
            for row in &rows {
                self.shred_into_buffers(row)?;
            }
        }

        let num_rows = self.buffered_rows;
        let options = &self.options;

        let mut submissions = vec![];
        for buffer in self.buffers.iter_mut() {
            let descriptor = buffer.descriptor().clone();
            let index = descriptor.index();

            let bloom_request = options
                .bloom_filters
                .iter()
                .find(|bloom| bloom.column == index)
                .copied();
            let bloom_filter = build_bloom_filter(buffer.as_ref(), bloom_request)?;

            let flush_options = FlushOptions {
                version: options.data_page_version,
                compression: options.compression,
                page_buffer_size: options.page_buffer_size,
                data_page_statistics: options.data_page_statistics,
                record_page_bounds: !options.skip_page_bounds.contains(&index),
                encoding: options.encoding_for(descriptor.physical_type()),
            };
            let FlushedColumn {
                pages,
                statistics,
                page_bounds,
            } = buffer.flush(&flush_options)?;

            let compressor = Compressor::new(
                DynIter::new(pages.into_iter().map(Ok)),
                options.compression,
                vec![],
            );
            submissions.push(ColumnSubmission {
                pages: DynStreamingIterator::new(compressor),
                page_bounds,
                record_column_index: !options.skip_page_bounds.contains(&index),
                statistics: Some(statistics),
                bloom_filter,
            });
        }

        let sorting_columns = if options.sorting_columns.is_empty() {
            None
        } else {
            Some(
                options
                    .sorting_columns
                    .iter()
                    .map(|key| SortingColumn {
                        column_idx: key.column as i32,
                        descending: key.descending,
                        nulls_first: key.nulls_first,
                    })
                    .collect(),
            )
        };

        self.file.write(
            DynIter::new(submissions.into_iter().map(Ok)),
            num_rows,
            sorting_columns,
        )?;
        self.buffered_rows = 0;
        Ok(())
    }

    /// Flushes pending rows, writes indexes, footer and trailing magic.
    /// Returns the file size and the underlying writer.
    pub fn close(mut self) -> Result<(u64, W)> {
        self.flush_row_group()?;
        if !self.started {
            self.file.start()?;
        }
        let key_value_metadata = self.options.key_value_metadata.take();
        let (size, sink) = self.file.end(key_value_metadata)?;
        let mut writer = sink.into_inner()?;
        writer.flush()?;
        Ok((size, writer))
    }

    /// Abandons the writer without closing the file; the output has no
    /// valid footer and readers will reject it.
    pub fn abandon(self) -> Result<W> {
        self.file.into_inner().into_inner()
    }
}

fn row_datum(row: &Row, column: usize) -> Option<&Datum> {
    row.iter()
        .find(|value| value.belongs_to(column))
        .map(|value| &value.datum)
}

pub(super) fn compare_datums(
    left: Option<&Datum>,
    right: Option<&Datum>,
    nulls_first: bool,
) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    let is_null = |datum: Option<&Datum>| datum.map(|x| x.is_null()).unwrap_or(true);
    match (is_null(left), is_null(right)) {
        (true, true) => return Equal,
        (true, false) => return if nulls_first { Less } else { Greater },
        (false, true) => return if nulls_first { Greater } else { Less },
        (false, false) => {}
    }
    match (left.unwrap(), right.unwrap()) {
        (Datum::Boolean(a), Datum::Boolean(b)) => a.cmp(b),
        (Datum::Int32(a), Datum::Int32(b)) => a.cmp(b),
        (Datum::Int64(a), Datum::Int64(b)) => a.cmp(b),
        (Datum::Float(a), Datum::Float(b)) => a.partial_cmp(b).unwrap_or(Equal),
        (Datum::Double(a), Datum::Double(b)) => a.partial_cmp(b).unwrap_or(Equal),
        (Datum::ByteArray(a), Datum::ByteArray(b)) => a.cmp(b),
        (Datum::FixedLenByteArray(a), Datum::FixedLenByteArray(b)) => a.cmp(b),
        (Datum::Int96(a), Datum::Int96(b)) => {
            a.iter().rev().cmp(b.iter().rev())
        }
        _ => Equal,
    }
}

#[cfg(feature = "bloom_filter")]
fn build_bloom_filter(
    buffer: &dyn ColumnBuffer,
    request: Option<BloomFilterOptions>,
) -> Result<Option<Vec<u8>>> {
    use crate::bloom_filter::{hash_bytes, SplitBlockFilter};

    let request = match request {
        Some(request) => request,
        None => return Ok(None),
    };

    let values = buffer.read_values(0, buffer.len());
    let hashes: Vec<u64> = values
        .iter()
        .filter_map(|value| {
            Some(match &value.datum {
                Datum::Null => return None,
                Datum::Boolean(x) => hash_bytes(&[u8::from(*x)]),
                Datum::Int32(x) => hash_bytes(&x.to_le_bytes()),
                Datum::Int64(x) => hash_bytes(&x.to_le_bytes()),
                Datum::Int96(x) => {
                    hash_bytes(crate::types::NativeType::to_le_bytes(x).as_ref())
                }
                Datum::Float(x) => hash_bytes(&x.to_le_bytes()),
                Datum::Double(x) => hash_bytes(&x.to_le_bytes()),
                Datum::ByteArray(x) | Datum::FixedLenByteArray(x) => hash_bytes(x),
            })
        })
        .collect();

    let mut filter = SplitBlockFilter::with_capacity(hashes.len(), request.bits_per_value);
    for hash in hashes {
        filter.insert(hash);
    }
    Ok(Some(filter.to_bytes()))
}

#[cfg(not(feature = "bloom_filter"))]
fn build_bloom_filter(
    _: &dyn ColumnBuffer,
    request: Option<BloomFilterOptions>,
) -> Result<Option<Vec<u8>>> {
    match request {
        Some(_) => Err(Error::FeatureNotActive(
            "bloom filters require the bloom_filter feature".to_string(),
        )),
        None => Ok(None),
    }
}
