use std::io::Cursor;

use parquetry::error::Result;
use parquetry::metadata::SchemaDescriptor;
use parquetry::schema::types::{PhysicalType, PrimitiveNode, Repetition};
use parquetry::shred::Record;
use parquetry::value::Datum;
use parquetry::write::{merge_row_groups, MergeSource, Writer, WriterOptions};

use super::{open, write_file};

fn schema_xy() -> SchemaDescriptor {
    SchemaDescriptor::try_new(
        "s",
        vec![
            PrimitiveNode::from_physical("x", Repetition::Required, PhysicalType::Int64).into(),
            PrimitiveNode::string("y", Repetition::Required).into(),
        ],
    )
    .unwrap()
}

fn schema_yx() -> SchemaDescriptor {
    SchemaDescriptor::try_new(
        "s",
        vec![
            PrimitiveNode::string("y", Repetition::Required).into(),
            PrimitiveNode::from_physical("x", Repetition::Required, PhysicalType::Int64).into(),
        ],
    )
    .unwrap()
}

fn record(x: i64, y: &str) -> Record {
    Record::group(vec![("x", Record::Int64(x)), ("y", Record::utf8(y))])
}

/// Merging permuted-schema row groups re-maps every value's column index;
/// the merged columns are the inputs' concatenated.
#[test]
fn merge_remaps_permuted_columns() -> Result<()> {
    let records_a = vec![record(1, "a1"), record(2, "a2")];
    let records_b = vec![record(3, "b1"), record(4, "b2")];

    let file_a = write_file(schema_xy(), &records_a, WriterOptions::default())?;
    // same logical schema, field order swapped by one transposition
    let file_b = write_file(schema_yx(), &records_b, WriterOptions::default())?;

    let mut sources = vec![];
    for data in [file_a, file_b] {
        let mut reader = open(data)?;
        let columns = reader.row_group_values(0)?;
        sources.push(MergeSource {
            schema: reader.schema().clone(),
            columns,
        });
    }

    let mut writer = Writer::try_new(
        Cursor::new(vec![]),
        schema_xy(),
        WriterOptions::default(),
    )?;
    merge_row_groups(&mut writer, sources)?;
    let (_, cursor) = writer.close()?;

    let mut merged = open(cursor.into_inner())?;
    let chunks = merged.metadata().row_groups[0].columns().to_vec();

    // column 0 is `x` of A then `x` of B, although B stored `x` second
    let xs: Vec<Datum> = merged
        .column_values(&chunks[0])?
        .into_iter()
        .map(|value| value.datum)
        .collect();
    assert_eq!(
        xs,
        vec![
            Datum::Int64(1),
            Datum::Int64(2),
            Datum::Int64(3),
            Datum::Int64(4)
        ]
    );

    let ys: Vec<Datum> = merged
        .column_values(&chunks[1])?
        .into_iter()
        .map(|value| value.datum)
        .collect();
    assert_eq!(
        ys,
        vec![
            Datum::ByteArray(b"a1".to_vec()),
            Datum::ByteArray(b"a2".to_vec()),
            Datum::ByteArray(b"b1".to_vec()),
            Datum::ByteArray(b"b2".to_vec())
        ]
    );

    assert_eq!(
        merged.read_records()?,
        vec![record(1, "a1"), record(2, "a2"), record(3, "b1"), record(4, "b2")]
    );
    Ok(())
}

/// With sorting columns configured the merger interleaves by key.
#[test]
fn merge_is_a_k_way_merge_on_the_sort_key() -> Result<()> {
    let records_a = vec![record(1, "a"), record(4, "a"), record(6, "a")];
    let records_b = vec![record(2, "b"), record(3, "b"), record(5, "b")];

    let sorted = WriterOptions {
        sorting_columns: vec![parquetry::write::SortingColumnOptions {
            column: 0,
            descending: false,
            nulls_first: true,
        }],
        ..Default::default()
    };

    let file_a = write_file(schema_xy(), &records_a, sorted.clone())?;
    let file_b = write_file(schema_xy(), &records_b, sorted.clone())?;

    let mut sources = vec![];
    for data in [file_a, file_b] {
        let mut reader = open(data)?;
        let columns = reader.row_group_values(0)?;
        sources.push(MergeSource {
            schema: reader.schema().clone(),
            columns,
        });
    }

    let mut writer = Writer::try_new(Cursor::new(vec![]), schema_xy(), sorted)?;
    merge_row_groups(&mut writer, sources)?;
    let (_, cursor) = writer.close()?;

    let records = open(cursor.into_inner())?.read_records()?;
    let keys: Vec<i64> = records
        .iter()
        .map(|record| match record.field("x") {
            Some(Record::Int64(x)) => *x,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(keys, vec![1, 2, 3, 4, 5, 6]);
    Ok(())
}
