use parquetry::compression::Compression;
use parquetry::encoding::Encoding;
use parquetry::error::Result;
use parquetry::metadata::SchemaDescriptor;
use parquetry::page::Page;
use parquetry::read::deserialize::deserialize_dict;
use parquetry::schema::types::{PhysicalType, PrimitiveNode, Repetition};
use parquetry::shred::Record;
use parquetry::statistics::{BinaryStatistics, PrimitiveStatistics};
use parquetry::write::{Version, WriterOptions};
use parquetry::FallibleStreamingIterator;

use super::{open, write_file};

fn names_schema() -> SchemaDescriptor {
    SchemaDescriptor::try_new(
        "names",
        vec![
            PrimitiveNode::string("first", Repetition::Required).into(),
            PrimitiveNode::string("last", Repetition::Required).into(),
        ],
    )
    .unwrap()
}

fn names() -> Vec<Record> {
    [("Han", "Solo"), ("Leia", "Skywalker"), ("Luke", "Skywalker")]
        .into_iter()
        .map(|(first, last)| {
            Record::group(vec![
                ("first", Record::utf8(first)),
                ("last", Record::utf8(last)),
            ])
        })
        .collect()
}

#[test]
fn dictionary_and_delta_names() -> Result<()> {
    // v1 pages, dictionary on `first`, delta strings on `last`
    let options = WriterOptions {
        data_page_version: Version::V1,
        compression: Compression::Snappy,
        no_dictionary: vec![1],
        ..Default::default()
    }
    .default_encoding_for(PhysicalType::ByteArray, Encoding::DeltaByteArray)?;

    let data = write_file(names_schema(), &names(), options)?;
    let mut reader = open(data)?;

    assert_eq!(reader.num_rows(), 3);

    let chunks = reader.metadata().row_groups[0].columns().to_vec();

    let first = chunks[0].statistics().unwrap()?;
    let first = first.as_any().downcast_ref::<BinaryStatistics>().unwrap();
    assert_eq!(first.min_value.as_deref(), Some(&b"Han"[..]));
    assert_eq!(first.max_value.as_deref(), Some(&b"Luke"[..]));

    let last = chunks[1].statistics().unwrap()?;
    let last = last.as_any().downcast_ref::<BinaryStatistics>().unwrap();
    assert_eq!(last.min_value.as_deref(), Some(&b"Skywalker"[..]));
    assert_eq!(last.max_value.as_deref(), Some(&b"Solo"[..]));

    // the dictionary of `first` holds exactly the three distinct names
    assert!(chunks[0].dictionary_page_offset().is_some());
    let pages = reader.pages(&chunks[0])?;
    let mut decompressor = parquetry::read::BasicDecompressor::new(pages, vec![]);
    match decompressor.next()? {
        Some(Page::Dict(dict)) => {
            let decoded = deserialize_dict(dict, PhysicalType::ByteArray)?;
            assert_eq!(decoded.len(), 3);
        }
        _ => panic!("the dictionary page must come first"),
    }
    drop(decompressor);

    // `last` carries no dictionary and uses delta strings
    assert!(chunks[1].dictionary_page_offset().is_none());
    assert!(chunks[1]
        .encodings()?
        .contains(&Encoding::DeltaByteArray));

    assert_eq!(reader.read_records()?, names());
    Ok(())
}

#[test]
fn row_count_threshold_splits_groups() -> Result<()> {
    let schema = SchemaDescriptor::try_new(
        "s",
        vec![PrimitiveNode::from_physical("id", Repetition::Required, PhysicalType::Int64).into()],
    )
    .unwrap();
    let records: Vec<Record> = (0..100i64)
        .map(|i| Record::group(vec![("id", Record::Int64(i))]))
        .collect();

    let options = WriterOptions {
        max_rows_per_row_group: Some(10),
        compression: Compression::Uncompressed,
        key_value_metadata: Some(vec![parquetry::metadata::KeyValue {
            key: "writer".to_string(),
            value: Some("parquetry".to_string()),
        }]),
        ..Default::default()
    };
    let data = write_file(schema, &records, options)?;
    let mut reader = open(data)?;

    assert_eq!(reader.row_groups().count(), 10);
    assert!(reader.row_groups().all(|group| group.num_rows() == 10));

    let key_values = reader.metadata().key_value_metadata().as_ref().unwrap();
    assert_eq!(key_values[0].key, "writer");
    assert_eq!(key_values[0].value.as_deref(), Some("parquetry"));

    assert_eq!(reader.read_records()?, records);
    Ok(())
}

#[test]
fn nan_never_reaches_statistics() -> Result<()> {
    let schema = SchemaDescriptor::try_new(
        "s",
        vec![PrimitiveNode::from_physical("x", Repetition::Required, PhysicalType::Float).into()],
    )
    .unwrap();
    let records: Vec<Record> = [f32::NAN, 3.0, 1.0, f32::NAN, 2.0]
        .into_iter()
        .map(|x| Record::group(vec![("x", Record::Float(x))]))
        .collect();

    let data = write_file(schema, &records, WriterOptions::default())?;
    let mut reader = open(data)?;

    let chunk = reader.metadata().row_groups[0].columns()[0].clone();
    let statistics = chunk.statistics().unwrap()?;
    let statistics = statistics
        .as_any()
        .downcast_ref::<PrimitiveStatistics<f32>>()
        .unwrap();
    assert_eq!(statistics.min_value, Some(1.0));
    assert_eq!(statistics.max_value, Some(3.0));

    // NaN comes back as NaN though
    let records = reader.read_records()?;
    match records[0].field("x") {
        Some(Record::Float(x)) => assert!(x.is_nan()),
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}

#[test]
fn optional_bytes_survive() -> Result<()> {
    let schema = SchemaDescriptor::try_new(
        "s",
        vec![PrimitiveNode::from_physical(
            "payload",
            Repetition::Optional,
            PhysicalType::ByteArray,
        )
        .into()],
    )
    .unwrap();
    let records = vec![
        Record::group(vec![("payload", Record::Bytes(b"test".to_vec()))]),
        Record::group(vec![("payload", Record::Null)]),
        Record::group(vec![("payload", Record::Bytes(vec![]))]),
    ];

    for version in [Version::V1, Version::V2] {
        let options = WriterOptions {
            data_page_version: version,
            ..Default::default()
        };
        let data = write_file(schema.clone(), &records, options)?;
        let result = open(data)?.read_records()?;
        assert_eq!(result, records);
    }
    Ok(())
}

#[test]
fn sorted_row_groups() -> Result<()> {
    let schema = SchemaDescriptor::try_new(
        "s",
        vec![
            PrimitiveNode::from_physical("key", Repetition::Required, PhysicalType::Int32).into(),
            PrimitiveNode::string("name", Repetition::Required).into(),
        ],
    )
    .unwrap();
    let records: Vec<Record> = [3, 1, 2]
        .into_iter()
        .map(|key| {
            Record::group(vec![
                ("key", Record::Int32(key)),
                ("name", Record::utf8(format!("name-{}", key))),
            ])
        })
        .collect();

    let options = WriterOptions {
        sorting_columns: vec![parquetry::write::SortingColumnOptions {
            column: 0,
            descending: false,
            nulls_first: true,
        }],
        ..Default::default()
    };
    let data = write_file(schema, &records, options)?;
    let result = open(data)?.read_records()?;

    let keys: Vec<i32> = result
        .iter()
        .map(|record| match record.field("key") {
            Some(Record::Int32(x)) => *x,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(keys, vec![1, 2, 3]);
    // the name column moved with its row
    match result[0].field("name") {
        Some(Record::Bytes(name)) => assert_eq!(name, b"name-1"),
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}

#[test]
fn every_compression_roundtrips() -> Result<()> {
    let schema = SchemaDescriptor::try_new(
        "s",
        vec![PrimitiveNode::from_physical("x", Repetition::Required, PhysicalType::Int64).into()],
    )
    .unwrap();
    let records: Vec<Record> = (0..1000i64)
        .map(|i| Record::group(vec![("x", Record::Int64(i * 3 % 17))]))
        .collect();

    for compression in [
        Compression::Uncompressed,
        Compression::Snappy,
        Compression::Gzip,
        Compression::Brotli,
        Compression::Lz4,
        Compression::Zstd,
    ] {
        let options = WriterOptions {
            compression,
            ..Default::default()
        };
        let data = write_file(schema.clone(), &records, options)?;
        assert_eq!(open(data)?.read_records()?, records);
    }
    Ok(())
}

#[test]
fn randomized_values_roundtrip() -> Result<()> {
    use rand::Rng;
    let mut rng = rand::rngs::ThreadRng::default();

    let schema = SchemaDescriptor::try_new(
        "s",
        vec![
            PrimitiveNode::from_physical("a", Repetition::Optional, PhysicalType::Int32).into(),
            PrimitiveNode::from_physical("b", Repetition::Required, PhysicalType::Double).into(),
        ],
    )
    .unwrap();
    let records: Vec<Record> = (0..2000)
        .map(|_| {
            let a = if rng.gen_bool(0.2) {
                Record::Null
            } else {
                Record::Int32(rng.gen())
            };
            Record::group(vec![("a", a), ("b", Record::Double(rng.gen()))])
        })
        .collect();

    let options = WriterOptions {
        // force several pages per chunk
        page_buffer_size: 1024,
        data_page_statistics: true,
        ..Default::default()
    };
    let data = write_file(schema, &records, options)?;
    assert_eq!(open(data)?.read_records()?, records);
    Ok(())
}
