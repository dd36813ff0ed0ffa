use crate::types::Int96;

/// A dynamically-typed nested record, the input of the shredder and the
/// output of the assembler. Typed callers build these from their own
/// structs; a derive layer can generate that conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96(Int96),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    /// A repeated field or LIST-annotated group.
    List(Vec<Record>),
    /// A MAP-annotated group.
    Map(Vec<(Record, Record)>),
    /// A struct; fields are looked up by name.
    Group(Vec<(String, Record)>),
}

impl Record {
    pub fn is_null(&self) -> bool {
        matches!(self, Record::Null)
    }

    /// The field `name` of a group, `None` when absent.
    pub fn field(&self, name: &str) -> Option<&Record> {
        match self {
            Record::Group(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// A group from field pairs; a convenience for tests and callers.
    pub fn group<N: Into<String>>(fields: Vec<(N, Record)>) -> Self {
        Record::Group(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn utf8<S: Into<String>>(value: S) -> Self {
        Record::Bytes(value.into().into_bytes())
    }
}
