use std::io::Cursor;

use parquetry::error::{Error, Result};
use parquetry::metadata::SchemaDescriptor;
use parquetry::schema::types::{PhysicalType, PrimitiveNode, Repetition};
use parquetry::shred::{shred, Record};
use parquetry::write::{Writer, WriterOptions};

use super::open;

#[test]
fn abandoned_file_is_reported_as_not_closed() -> Result<()> {
    let schema = SchemaDescriptor::try_new(
        "s",
        vec![PrimitiveNode::from_physical("x", Repetition::Required, PhysicalType::Int64).into()],
    )
    .unwrap();

    let mut writer = Writer::try_new(Cursor::new(vec![]), schema, WriterOptions::default())?;
    for i in 0..10i64 {
        let row = shred(writer.schema(), &Record::group(vec![("x", Record::Int64(i))]))?;
        writer.write_row(row)?;
    }
    // flush the row group but never write the footer
    writer.flush_row_group()?;
    let data = writer.abandon()?.into_inner();
    let expected_tail: Vec<u8> = data[data.len() - 8..].to_vec();

    match open(data) {
        Err(Error::NotProperlyClosed(message)) => {
            assert!(message.contains("trailing magic"));
            assert!(message.contains(&format!("{:?}", expected_tail)));
        }
        other => panic!("expected NotProperlyClosed, got {:?}", other.err()),
    }
    Ok(())
}

#[test]
fn garbage_is_not_a_parquet_file() {
    let data = b"definitely not a parquet file".to_vec();
    assert!(matches!(open(data), Err(Error::NotAParquetFile(_))));
}
