use crate::error::{Error, Result};
use crate::metadata::SchemaDescriptor;
use crate::schema::types::{GroupLogicalType, Node, Repetition};
use crate::value::{Datum, Value};

use super::Record;

/// Inverts shredding: walks the value streams of every leaf column in
/// lock-step and emits one nested [`Record`] per row. Row boundaries are
/// the positions where the first leaf's repetition level returns to zero.
pub struct RowAssembler<'a> {
    schema: &'a SchemaDescriptor,
    columns: Vec<std::iter::Peekable<std::vec::IntoIter<Value>>>,
    /// the leaf being visited during one traversal
    leaf: usize,
}

impl<'a> RowAssembler<'a> {
    /// `columns` holds the decoded values of each leaf, in schema order.
    pub fn new(schema: &'a SchemaDescriptor, columns: Vec<Vec<Value>>) -> Self {
        let columns = columns
            .into_iter()
            .map(|column| column.into_iter().peekable())
            .collect();
        Self {
            schema,
            columns,
            leaf: 0,
        }
    }

    /// Assembles the next row, `None` once every stream is exhausted.
    pub fn next_row(&mut self) -> Result<Option<Record>> {
        if self.columns.iter_mut().all(|column| column.peek().is_none()) {
            return Ok(None);
        }

        self.leaf = 0;
        let schema = self.schema;
        let mut fields = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let record = self.assemble_field(field, 0, 0)?;
            fields.push((field.name().to_string(), record));
        }
        Ok(Some(Record::Group(fields)))
    }

    fn peek_def(&mut self, leaf: usize) -> Result<i16> {
        self.columns[leaf]
            .peek()
            .map(|value| value.definition_level)
            .ok_or_else(|| Error::oos("a column stream ended in the middle of a row"))
    }

    fn peek_rep(&mut self, leaf: usize) -> Option<i16> {
        self.columns[leaf].peek().map(|value| value.repetition_level)
    }

    fn pop(&mut self, leaf: usize) -> Result<Value> {
        self.columns[leaf]
            .next()
            .ok_or_else(|| Error::oos("a column stream ended in the middle of a row"))
    }

    /// Consumes the single hole value every leaf under `node` carries for
    /// an absent subtree.
    fn consume_nulls(&mut self, node: &Node) -> Result<()> {
        for _ in 0..node.num_leaves() {
            self.pop(self.leaf)?;
            self.leaf += 1;
        }
        Ok(())
    }

    /// `def` counts the ancestors known present; `rep_depth` counts the
    /// repeated ancestors entered.
    fn assemble_field(&mut self, node: &Node, def: i16, rep_depth: i16) -> Result<Record> {
        match node.repetition() {
            Repetition::Required => self.assemble_present(node, def, rep_depth),
            Repetition::Optional => {
                if self.peek_def(self.leaf)? > def {
                    self.assemble_present(node, def + 1, rep_depth)
                } else {
                    self.consume_nulls(node)?;
                    Ok(Record::Null)
                }
            }
            Repetition::Repeated => {
                let depth = rep_depth + 1;
                if self.peek_def(self.leaf)? <= def {
                    self.consume_nulls(node)?;
                    return Ok(Record::List(vec![]));
                }
                let first_leaf = self.leaf;
                let mut items = vec![];
                loop {
                    self.leaf = first_leaf;
                    items.push(self.assemble_present(node, def + 1, depth)?);
                    // the node repeats while the next value re-enters at
                    // its depth
                    match self.peek_rep(first_leaf) {
                        Some(rep) if rep == depth => continue,
                        _ => break,
                    }
                }
                Ok(Record::List(items))
            }
        }
    }

    fn assemble_present(&mut self, node: &Node, def: i16, rep_depth: i16) -> Result<Record> {
        match node {
            Node::Primitive(_) => {
                let value = self.pop(self.leaf)?;
                self.leaf += 1;
                Ok(datum_to_record(value))
            }
            Node::Group {
                fields,
                logical_type,
                ..
            } => {
                let mut entries = Vec::with_capacity(fields.len());
                for field in fields {
                    let record = self.assemble_field(field, def, rep_depth)?;
                    entries.push((field.name().to_string(), record));
                }

                match logical_type {
                    Some(GroupLogicalType::List) => unwrap_list(entries),
                    Some(GroupLogicalType::Map) => unwrap_map(entries),
                    None => Ok(Record::Group(entries)),
                }
            }
        }
    }
}

/// `<group (LIST)> { repeated group { element } }` flattens to the
/// elements.
fn unwrap_list(mut entries: Vec<(String, Record)>) -> Result<Record> {
    if entries.len() != 1 {
        return Err(Error::oos("a LIST group must have a single child"));
    }
    let (_, inner) = entries.pop().unwrap();
    match inner {
        Record::List(items) => Ok(Record::List(
            items.into_iter().map(unwrap_element).collect::<Result<_>>()?,
        )),
        other => Ok(other),
    }
}

fn unwrap_element(item: Record) -> Result<Record> {
    match item {
        Record::Group(mut fields) if fields.len() == 1 => Ok(fields.pop().unwrap().1),
        other => Ok(other),
    }
}

/// `<group (MAP)> { repeated group { key; value } }` flattens to pairs.
fn unwrap_map(mut entries: Vec<(String, Record)>) -> Result<Record> {
    if entries.len() != 1 {
        return Err(Error::oos("a MAP group must have a single child"));
    }
    let (_, inner) = entries.pop().unwrap();
    match inner {
        Record::List(items) => {
            let pairs = items
                .into_iter()
                .map(|item| match item {
                    Record::Group(mut fields) if fields.len() == 2 => {
                        let value = fields.pop().unwrap().1;
                        let key = fields.pop().unwrap().1;
                        Ok((key, value))
                    }
                    _ => Err(Error::oos("a map entry must hold a key and a value")),
                })
                .collect::<Result<_>>()?;
            Ok(Record::Map(pairs))
        }
        other => Ok(other),
    }
}

fn datum_to_record(value: Value) -> Record {
    match value.datum {
        Datum::Null => Record::Null,
        Datum::Boolean(x) => Record::Boolean(x),
        Datum::Int32(x) => Record::Int32(x),
        Datum::Int64(x) => Record::Int64(x),
        Datum::Int96(x) => Record::Int96(x),
        Datum::Float(x) => Record::Float(x),
        Datum::Double(x) => Record::Double(x),
        Datum::ByteArray(x) | Datum::FixedLenByteArray(x) => Record::Bytes(x),
    }
}
