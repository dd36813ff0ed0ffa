use std::io::Cursor;

use parquetry::error::{Error, Result};
use parquetry::metadata::SchemaDescriptor;
use parquetry::schema::types::{PhysicalType, PrimitiveNode, Repetition};
use parquetry::shred::{shred, Record};
use parquetry::write::{ConcurrentRowGroupWriter, Writer, WriterOptions};

use super::open;

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::try_new(
        "s",
        vec![PrimitiveNode::from_physical("x", Repetition::Required, PhysicalType::Int32).into()],
    )
    .unwrap()
}

fn rows(schema: &SchemaDescriptor, range: std::ops::Range<i32>) -> Vec<parquetry::value::Row> {
    range
        .map(|i| shred(schema, &Record::group(vec![("x", Record::Int32(i))])).unwrap())
        .collect()
}

#[test]
fn handles_commit_in_construction_order() -> Result<()> {
    let schema = schema();
    let writer = Writer::try_new(Cursor::new(vec![]), schema.clone(), WriterOptions::default())?;
    let mut concurrent = ConcurrentRowGroupWriter::new(writer);

    let mut first = concurrent.handle();
    let mut second = concurrent.handle();
    first.write_rows(rows(&schema, 0..5));
    second.write_rows(rows(&schema, 5..10));

    first.commit()?;
    second.commit()?;
    let (_, cursor) = concurrent.close()?;

    let records = open(cursor.into_inner())?.read_records()?;
    let values: Vec<i32> = records
        .iter()
        .map(|record| match record.field("x") {
            Some(Record::Int32(x)) => *x,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(values, (0..10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn out_of_order_commit_is_rejected() -> Result<()> {
    let schema = schema();
    let writer = Writer::try_new(Cursor::new(vec![]), schema.clone(), WriterOptions::default())?;
    let mut concurrent = ConcurrentRowGroupWriter::new(writer);

    let mut first = concurrent.handle();
    let mut second = concurrent.handle();
    first.write_rows(rows(&schema, 0..2));
    second.write_rows(rows(&schema, 2..4));

    assert!(matches!(
        second.commit(),
        Err(Error::OutOfOrderCommit {
            expected: 0,
            found: 1
        })
    ));
    first.commit()?;
    Ok(())
}
