mod serialize;

pub(crate) use serialize::{serialize_column_index, serialize_offset_index};

use std::io::Write;

use parquet_format_safe::thrift::protocol::TCompactOutputProtocol;
use parquet_format_safe::{ColumnIndex, OffsetIndex};

use crate::error::Result;

pub(crate) fn write_column_index<W: Write>(writer: &mut W, index: &ColumnIndex) -> Result<u64> {
    let mut protocol = TCompactOutputProtocol::new(writer);
    Ok(index.write_to_out_protocol(&mut protocol)? as u64)
}

pub(crate) fn write_offset_index<W: Write>(writer: &mut W, index: &OffsetIndex) -> Result<u64> {
    let mut protocol = TCompactOutputProtocol::new(writer);
    Ok(index.write_to_out_protocol(&mut protocol)? as u64)
}
