use parquetry::error::{Error, Result};
use parquetry::indexes::{ByteIndex, NativeIndex};
use parquetry::metadata::SchemaDescriptor;
use parquetry::read::{FileReader, ReadOptions};
use parquetry::schema::types::{PhysicalType, PrimitiveNode, Repetition};
use parquetry::shred::Record;
use parquetry::write::WriterOptions;

use super::{open, write_file};

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::try_new(
        "s",
        vec![
            PrimitiveNode::from_physical("id", Repetition::Required, PhysicalType::Int32).into(),
            PrimitiveNode::string("name", Repetition::Required).into(),
        ],
    )
    .unwrap()
}

fn records() -> Vec<Record> {
    (0..64i32)
        .map(|i| {
            Record::group(vec![
                ("id", Record::Int32(i)),
                ("name", Record::utf8(format!("identifier-{:04}", i))),
            ])
        })
        .collect()
}

#[test]
fn column_and_offset_indexes() -> Result<()> {
    let options = WriterOptions {
        // a few bytes per page: several pages per chunk
        page_buffer_size: 64,
        column_index_truncate_length: 8,
        ..Default::default()
    };
    let data = write_file(schema(), &records(), options)?;
    let mut reader = open(data)?;
    let chunks = reader.metadata().row_groups[0].columns().to_vec();

    let index = reader.column_index(&chunks[0])?;
    let index = index.as_any().downcast_ref::<NativeIndex<i32>>().unwrap();
    assert!(index.indexes.len() > 1);
    assert_eq!(index.indexes[0].min, Some(0));
    assert_eq!(index.indexes.last().unwrap().max, Some(63));
    assert_eq!(
        index.boundary_order,
        parquetry::indexes::BoundaryOrder::Ascending
    );

    // byte-array bounds are truncated to the configured limit: minima cut
    // down, maxima bumped up
    let names = reader.column_index(&chunks[1])?;
    let names = names.as_any().downcast_ref::<ByteIndex>().unwrap();
    for page in &names.indexes {
        let min = page.min.as_ref().unwrap();
        let max = page.max.as_ref().unwrap();
        assert!(min.len() <= 8 && max.len() <= 8);
        assert!(min.as_slice() <= &b"identifier-0000"[..]);
        assert!(max.as_slice() >= &b"identifier-0"[..]);
    }

    // the offset index covers every page with increasing first-row indexes
    let locations = reader.offset_index(&chunks[0])?;
    assert_eq!(locations.len(), index.indexes.len());
    assert_eq!(locations[0].first_row_index, 0);
    assert!(locations
        .windows(2)
        .all(|pair| pair[0].first_row_index < pair[1].first_row_index
            && pair[0].offset < pair[1].offset));

    Ok(())
}

#[test]
fn skip_page_index_reports_missing() -> Result<()> {
    let data = write_file(schema(), &records(), WriterOptions::default())?;
    let mut reader = FileReader::try_new(
        std::io::Cursor::new(data),
        ReadOptions {
            skip_page_index: true,
        },
    )?;
    let chunk = reader.metadata().row_groups[0].columns()[0].clone();
    assert!(matches!(
        reader.column_index(&chunk),
        Err(Error::MissingColumnIndex)
    ));
    assert!(matches!(
        reader.offset_index(&chunk),
        Err(Error::MissingOffsetIndex)
    ));
    Ok(())
}

#[test]
fn skipped_bounds_suppress_the_column_index() -> Result<()> {
    let options = WriterOptions {
        skip_page_bounds: vec![1],
        ..Default::default()
    };
    let data = write_file(schema(), &records(), options)?;
    let mut reader = open(data)?;
    let chunks = reader.metadata().row_groups[0].columns().to_vec();

    // column 0 keeps its index, column 1 opted out
    assert!(reader.column_index(&chunks[0]).is_ok());
    assert!(matches!(
        reader.column_index(&chunks[1]),
        Err(Error::MissingColumnIndex)
    ));
    // the offset index is unaffected
    assert!(reader.offset_index(&chunks[1]).is_ok());
    Ok(())
}
