//! Shredding nested records into flat per-column value streams with
//! definition and repetition levels, and assembling them back.
mod assembler;
mod record;
mod shredder;

pub use assembler::RowAssembler;
pub use record::Record;
pub use shredder::shred;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SchemaDescriptor;
    use crate::schema::types::{Node, PhysicalType, PrimitiveNode, Repetition};
    use crate::value::Datum;

    fn nested_schema() -> SchemaDescriptor {
        SchemaDescriptor::try_new(
            "spans",
            vec![
                PrimitiveNode::from_physical("id", Repetition::Required, PhysicalType::Int64)
                    .into(),
                Node::list(
                    "tags",
                    Repetition::Optional,
                    PrimitiveNode::string("element", Repetition::Required).into(),
                ),
                Node::map(
                    "attributes",
                    Repetition::Optional,
                    PrimitiveNode::string("key", Repetition::Required).into(),
                    Node::Primitive(PrimitiveNode::from_physical(
                        "value",
                        Repetition::Optional,
                        PhysicalType::Double,
                    )),
                ),
            ],
        )
        .unwrap()
    }

    fn record() -> Record {
        Record::Group(vec![
            ("id".to_string(), Record::Int64(7)),
            (
                "tags".to_string(),
                Record::List(vec![
                    Record::Bytes(b"a".to_vec()),
                    Record::Bytes(b"b".to_vec()),
                ]),
            ),
            (
                "attributes".to_string(),
                Record::Map(vec![
                    (Record::Bytes(b"x".to_vec()), Record::Double(1.5)),
                    (Record::Bytes(b"y".to_vec()), Record::Null),
                ]),
            ),
        ])
    }

    #[test]
    fn shred_levels_of_nested_record() {
        let schema = nested_schema();
        let row = shred(&schema, &record()).unwrap();

        // id
        assert_eq!(row[0].datum, Datum::Int64(7));
        assert_eq!((row[0].repetition_level, row[0].definition_level), (0, 0));

        // tags: two elements, second continues the repetition
        let tags: Vec<_> = row.iter().filter(|v| v.belongs_to(1)).collect();
        assert_eq!(
            (tags[0].repetition_level, tags[0].definition_level),
            (0, 2)
        );
        assert_eq!(
            (tags[1].repetition_level, tags[1].definition_level),
            (1, 2)
        );

        // attribute values: present, then present-null
        let values: Vec<_> = row.iter().filter(|v| v.belongs_to(3)).collect();
        assert_eq!(values[0].datum, Datum::Double(1.5));
        assert_eq!(values[0].definition_level, 3);
        assert_eq!(values[1].datum, Datum::Null);
        assert_eq!(values[1].definition_level, 2);
        assert_eq!(values[1].repetition_level, 1);
    }

    #[test]
    fn roundtrip_through_assembler() {
        let schema = nested_schema();
        let records = vec![
            record(),
            Record::Group(vec![
                ("id".to_string(), Record::Int64(8)),
                ("tags".to_string(), Record::List(vec![])),
                ("attributes".to_string(), Record::Null),
            ]),
        ];

        let mut columns: Vec<Vec<crate::value::Value>> =
            (0..schema.num_columns()).map(|_| vec![]).collect();
        for record in &records {
            for value in shred(&schema, record).unwrap() {
                let index = value.column_index().unwrap();
                columns[index].push(value);
            }
        }

        let mut assembler = RowAssembler::new(&schema, columns);
        let mut result = vec![];
        while let Some(row) = assembler.next_row().unwrap() {
            result.push(row);
        }
        assert_eq!(result, records);
    }

    #[test]
    fn empty_list_consumes_one_slot_per_leaf() {
        let schema = nested_schema();
        let record = Record::Group(vec![
            ("id".to_string(), Record::Int64(1)),
            ("tags".to_string(), Record::List(vec![])),
            ("attributes".to_string(), Record::Map(vec![])),
        ]);
        let row = shred(&schema, &record).unwrap();
        // one value per leaf
        assert_eq!(row.len(), 4);
        // the empty list is defined up to the list group itself
        let tag = row.iter().find(|v| v.belongs_to(1)).unwrap();
        assert_eq!(tag.datum, Datum::Null);
        assert_eq!((tag.repetition_level, tag.definition_level), (0, 1));
    }
}
