use crate::error::{Error, Result};
use crate::metadata::SchemaDescriptor;
use crate::schema::types::{Node, PhysicalType, PrimitiveNode, Repetition};
use crate::value::{Datum, Row, Value};

use super::Record;

/// Shreds one nested record into a flat row of leveled values, one or more
/// per leaf column, in depth-first left-to-right order.
///
/// The record must be a group covering the schema's top-level fields;
/// absent fields shred as nulls.
pub fn shred(schema: &SchemaDescriptor, record: &Record) -> Result<Row> {
    if !matches!(record, Record::Group(_)) {
        return Err(Error::TypeMismatch(
            "a row must be a group record".to_string(),
        ));
    }

    let mut shredder = Shredder {
        row: Vec::with_capacity(schema.num_columns()),
        leaf: 0,
    };
    for field in schema.fields() {
        let value = record.field(field.name());
        shredder.shred_field(field, value, 0, 0, 0)?;
    }
    Ok(shredder.row)
}

struct Shredder {
    row: Row,
    /// the next leaf column, in depth-first order
    leaf: usize,
}

impl Shredder {
    /// Emits one value for a field at its place in the repetition and
    /// definition hierarchy. `rep` is the level the first emitted value of
    /// each leaf carries; `def` counts the ancestors present so far;
    /// `rep_depth` counts the repeated ancestors entered so far.
    fn shred_field(
        &mut self,
        node: &Node,
        value: Option<&Record>,
        rep: i16,
        def: i16,
        rep_depth: i16,
    ) -> Result<()> {
        let absent = value.map(|x| x.is_null()).unwrap_or(true);
        match node.repetition() {
            Repetition::Repeated => self.shred_repeated(node, value, rep, def, rep_depth),
            Repetition::Optional => {
                if absent {
                    self.emit_nulls(node, rep, def);
                    Ok(())
                } else {
                    self.shred_present(node, value.unwrap(), rep, def + 1, rep_depth)
                }
            }
            Repetition::Required => {
                if absent {
                    return Err(Error::TypeMismatch(format!(
                        "the required field \"{}\" is missing",
                        node.name()
                    )));
                }
                self.shred_present(node, value.unwrap(), rep, def, rep_depth)
            }
        }
    }

    fn shred_repeated(
        &mut self,
        node: &Node,
        value: Option<&Record>,
        rep: i16,
        def: i16,
        rep_depth: i16,
    ) -> Result<()> {
        let depth = rep_depth + 1;

        // a map's pairs shred through the two children of its entry group
        if let (Some(Record::Map(pairs)), Node::Group { fields, .. }) = (value, node) {
            if fields.len() != 2 {
                return Err(Error::TypeMismatch(format!(
                    "the map entry group \"{}\" must have a key and a value",
                    node.name()
                )));
            }
            if pairs.is_empty() {
                self.emit_nulls(node, rep, def);
                return Ok(());
            }
            let start = self.leaf;
            for (i, (key, entry)) in pairs.iter().enumerate() {
                self.leaf = start;
                let rep = if i == 0 { rep } else { depth };
                // nullability is decided per entry before descending
                self.shred_field(&fields[0], Some(key), rep, def + 1, depth)?;
                self.shred_field(&fields[1], Some(entry), rep, def + 1, depth)?;
            }
            return Ok(());
        }

        let items: &[Record] = match value {
            None | Some(Record::Null) => &[],
            Some(Record::List(items)) => items,
            Some(other) => std::slice::from_ref(other),
        };
        if items.is_empty() {
            self.emit_nulls(node, rep, def);
            return Ok(());
        }
        let start = self.leaf;
        for (i, item) in items.iter().enumerate() {
            self.leaf = start;
            let rep = if i == 0 { rep } else { depth };
            self.shred_present(node, item, rep, def + 1, depth)?;
        }
        Ok(())
    }

    fn shred_present(
        &mut self,
        node: &Node,
        value: &Record,
        rep: i16,
        def: i16,
        rep_depth: i16,
    ) -> Result<()> {
        match node {
            Node::Primitive(primitive) => {
                let datum = record_to_datum(primitive, value)?;
                self.row.push(Value::new(datum, rep, def, self.leaf));
                self.leaf += 1;
                Ok(())
            }
            Node::Group { fields, .. } => match value {
                Record::Group(_) => {
                    for field in fields {
                        self.shred_field(field, value.field(field.name()), rep, def, rep_depth)?;
                    }
                    Ok(())
                }
                // the LIST convention: the annotated group wraps a single
                // repeated group that carries the elements
                Record::List(_) | Record::Map(_) if fields.len() == 1 => {
                    self.shred_field(&fields[0], Some(value), rep, def, rep_depth)
                }
                // an element group with a single field takes the element
                // value directly
                other if fields.len() == 1 => {
                    self.shred_field(&fields[0], Some(other), rep, def, rep_depth)
                }
                other => Err(Error::TypeMismatch(format!(
                    "cannot shred {:?} into the group \"{}\"",
                    other,
                    node.name()
                ))),
            },
        }
    }

    /// Every leaf under `node` records one null at the levels where the
    /// hierarchy ended.
    fn emit_nulls(&mut self, node: &Node, rep: i16, def: i16) {
        for _ in 0..node.num_leaves() {
            self.row.push(Value::null(rep, def, self.leaf));
            self.leaf += 1;
        }
    }
}

fn record_to_datum(primitive: &PrimitiveNode, value: &Record) -> Result<Datum> {
    Ok(match (value, primitive.physical_type) {
        (Record::Boolean(x), _) => Datum::Boolean(*x),
        (Record::Int32(x), _) => Datum::Int32(*x),
        (Record::Int64(x), _) => Datum::Int64(*x),
        (Record::Int96(x), _) => Datum::Int96(*x),
        (Record::Float(x), _) => Datum::Float(*x),
        (Record::Double(x), _) => Datum::Double(*x),
        (Record::Bytes(x), PhysicalType::FixedLenByteArray(_)) => {
            Datum::FixedLenByteArray(x.clone())
        }
        (Record::Bytes(x), _) => Datum::ByteArray(x.clone()),
        (other, _) => {
            return Err(Error::TypeMismatch(format!(
                "cannot shred {:?} into the leaf \"{}\"",
                other, primitive.field.name
            )))
        }
    })
}
