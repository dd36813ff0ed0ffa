use parquet_format_safe::RowGroup;

use crate::error::{Error, Result};

use super::{column_chunk_metadata::ColumnChunkMetaData, schema_descriptor::SchemaDescriptor};

/// Metadata of one row group: one column chunk per leaf, covering the same
/// rows.
#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
    columns: Vec<ColumnChunkMetaData>,
    num_rows: usize,
    total_byte_size: usize,
}

impl RowGroupMetaData {
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
        &self.columns[i]
    }

    /// Column chunks in schema order.
    pub fn columns(&self) -> &[ColumnChunkMetaData] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Total uncompressed byte size of all column data.
    pub fn total_byte_size(&self) -> usize {
        self.total_byte_size
    }

    /// Total compressed byte size of all column data.
    pub fn compressed_size(&self) -> usize {
        self.columns.iter().map(|c| c.compressed_size() as usize).sum()
    }

    pub(crate) fn try_from_thrift(
        schema_descriptor: &SchemaDescriptor,
        row_group: RowGroup,
    ) -> Result<RowGroupMetaData> {
        if schema_descriptor.num_columns() != row_group.columns.len() {
            return Err(Error::oos(format!(
                "the schema has {} leaves but the row group declares {} chunks",
                schema_descriptor.num_columns(),
                row_group.columns.len()
            )));
        }
        let total_byte_size = row_group.total_byte_size.try_into()?;
        let num_rows = row_group.num_rows.try_into()?;
        let columns = row_group
            .columns
            .into_iter()
            .zip(schema_descriptor.columns())
            .map(|(column_chunk, descriptor)| {
                ColumnChunkMetaData::try_from_thrift(descriptor.clone(), column_chunk)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RowGroupMetaData {
            columns,
            num_rows,
            total_byte_size,
        })
    }
}
