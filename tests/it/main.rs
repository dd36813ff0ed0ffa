mod bloom;
mod concurrent;
mod indexes;
mod merge;
mod not_closed;
mod roundtrip;

use std::io::Cursor;

use parquetry::error::Result;
use parquetry::metadata::SchemaDescriptor;
use parquetry::read::{FileReader, ReadOptions};
use parquetry::shred::{shred, Record};
use parquetry::write::{Writer, WriterOptions};

/// Writes `records` into an in-memory parquet file.
pub fn write_file(
    schema: SchemaDescriptor,
    records: &[Record],
    options: WriterOptions,
) -> Result<Vec<u8>> {
    let mut writer = Writer::try_new(Cursor::new(vec![]), schema, options)?;
    for record in records {
        let row = shred(writer.schema(), record)?;
        writer.write_row(row)?;
    }
    let (_, cursor) = writer.close()?;
    Ok(cursor.into_inner())
}

/// Reopens an in-memory file.
pub fn open(data: Vec<u8>) -> Result<FileReader<Cursor<Vec<u8>>>> {
    FileReader::try_new(Cursor::new(data), ReadOptions::default())
}
