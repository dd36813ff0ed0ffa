use crate::error::{Error, Result};

use super::{
    get_sort_order, ColumnOrder, RowGroupMetaData, SchemaDescriptor,
};

/// Arbitrary string pairs appended to the footer.
pub type KeyValue = parquet_format_safe::KeyValue;

/// Metadata of a parquet file, decoded from its footer.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    /// Format version of the file.
    pub version: i32,
    /// Total number of rows, all row groups combined.
    pub num_rows: usize,
    /// The application that wrote the file.
    pub created_by: Option<String>,
    /// The file's row groups, in file order.
    pub row_groups: Vec<RowGroupMetaData>,
    /// Optional string pairs from the footer.
    pub key_value_metadata: Option<Vec<KeyValue>>,
    /// The schema of the file.
    pub schema: SchemaDescriptor,
    /// Sort order of min/max statistics per leaf; `None` for legacy files.
    pub column_orders: Option<Vec<ColumnOrder>>,
}

impl FileMetaData {
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn key_value_metadata(&self) -> &Option<Vec<KeyValue>> {
        &self.key_value_metadata
    }

    /// Column order of the `i`th leaf; `Undefined` for legacy files.
    pub fn column_order(&self, i: usize) -> ColumnOrder {
        self.column_orders
            .as_ref()
            .map(|orders| orders[i])
            .unwrap_or(ColumnOrder::Undefined)
    }

    pub(crate) fn try_from_thrift(metadata: parquet_format_safe::FileMetaData) -> Result<Self> {
        let schema = SchemaDescriptor::try_from_thrift(&metadata.schema)?;

        let row_groups = metadata
            .row_groups
            .into_iter()
            .map(|rg| RowGroupMetaData::try_from_thrift(&schema, rg))
            .collect::<Result<Vec<_>>>()?;

        let column_orders = metadata
            .column_orders
            .map(|orders| {
                if orders.len() != schema.num_columns() {
                    return Err(Error::oos(format!(
                        "the footer declares {} column orders for {} leaves",
                        orders.len(),
                        schema.num_columns()
                    )));
                }
                Ok(schema
                    .columns()
                    .iter()
                    .map(|column| {
                        ColumnOrder::TypeDefinedOrder(get_sort_order(column.primitive()))
                    })
                    .collect())
            })
            .transpose()?;

        Ok(FileMetaData {
            version: metadata.version,
            num_rows: metadata.num_rows.try_into()?,
            created_by: metadata.created_by,
            row_groups,
            key_value_metadata: metadata.key_value_metadata,
            schema,
            column_orders,
        })
    }
}
