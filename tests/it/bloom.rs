use parquetry::bloom_filter::{hash_bytes, hash_native, SplitBlockFilter};
use parquetry::error::{Error, Result};
use parquetry::metadata::SchemaDescriptor;
use parquetry::schema::types::{PhysicalType, PrimitiveNode, Repetition};
use parquetry::shred::Record;
use parquetry::write::{BloomFilterOptions, WriterOptions};

use super::{open, write_file};

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::try_new(
        "s",
        vec![
            PrimitiveNode::from_physical("id", Repetition::Required, PhysicalType::Int64).into(),
            PrimitiveNode::string("name", Repetition::Optional).into(),
        ],
    )
    .unwrap()
}

#[test]
fn every_written_value_is_found() -> Result<()> {
    let records: Vec<Record> = (0..500i64)
        .map(|i| {
            Record::group(vec![
                ("id", Record::Int64(i * 7)),
                ("name", Record::utf8(format!("name-{}", i))),
            ])
        })
        .collect();

    let options = WriterOptions {
        bloom_filters: vec![
            BloomFilterOptions {
                column: 0,
                bits_per_value: 10,
            },
            BloomFilterOptions {
                column: 1,
                bits_per_value: 10,
            },
        ],
        ..Default::default()
    };
    let data = write_file(schema(), &records, options)?;
    let mut reader = open(data)?;
    let chunks = reader.metadata().row_groups[0].columns().to_vec();

    let ids = SplitBlockFilter::from_bitset(&reader.bloom_filter(&chunks[0])?);
    assert!((0..500i64).all(|i| ids.check(hash_native(i * 7))));

    let names = SplitBlockFilter::from_bitset(&reader.bloom_filter(&chunks[1])?);
    assert!((0..500).all(|i| names.check(hash_bytes(format!("name-{}", i).as_bytes()))));

    Ok(())
}

#[test]
fn absent_filter_is_a_named_error() -> Result<()> {
    let records = vec![Record::group(vec![
        ("id", Record::Int64(1)),
        ("name", Record::Null),
    ])];
    let data = write_file(schema(), &records, WriterOptions::default())?;
    let mut reader = open(data)?;
    let chunk = reader.metadata().row_groups[0].columns()[0].clone();
    assert!(matches!(
        reader.bloom_filter(&chunk),
        Err(Error::MissingBloomFilter)
    ));
    Ok(())
}
