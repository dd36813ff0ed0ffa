use parquet_format_safe::FieldRepetitionType;

use super::{
    check_converted_invariants, check_logical_invariants, GroupConvertedType, GroupLogicalType,
    PhysicalType, PrimitiveConvertedType, PrimitiveLogicalType,
};
use crate::error::{Error, Result};

/// How many times a field may appear within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    /// Exactly once; contributes to neither level.
    Required,
    /// Zero or one time; contributes one definition level.
    Optional,
    /// Zero or more times; contributes one definition and one repetition level.
    Repeated,
}

impl TryFrom<FieldRepetitionType> for Repetition {
    type Error = Error;

    fn try_from(repetition: FieldRepetitionType) -> Result<Self> {
        Ok(match repetition {
            FieldRepetitionType::REQUIRED => Repetition::Required,
            FieldRepetitionType::OPTIONAL => Repetition::Optional,
            FieldRepetitionType::REPEATED => Repetition::Repeated,
            _ => return Err(Error::oos("FieldRepetitionType out of range")),
        })
    }
}

impl From<Repetition> for FieldRepetitionType {
    fn from(repetition: Repetition) -> Self {
        match repetition {
            Repetition::Required => FieldRepetitionType::REQUIRED,
            Repetition::Optional => FieldRepetitionType::OPTIONAL,
            Repetition::Repeated => FieldRepetitionType::REPEATED,
        }
    }
}

/// Name, repetition and (optional) field id common to every node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldInfo {
    pub name: String,
    pub repetition: Repetition,
    pub id: Option<i32>,
}

impl FieldInfo {
    pub fn new<N: Into<String>>(name: N, repetition: Repetition) -> Self {
        Self {
            name: name.into(),
            repetition,
            id: None,
        }
    }
}

/// A leaf of the schema tree: a typed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimitiveNode {
    pub field: FieldInfo,
    pub physical_type: PhysicalType,
    pub logical_type: Option<PrimitiveLogicalType>,
    pub converted_type: Option<PrimitiveConvertedType>,
}

impl PrimitiveNode {
    /// A leaf with no logical annotation.
    pub fn from_physical<N: Into<String>>(
        name: N,
        repetition: Repetition,
        physical_type: PhysicalType,
    ) -> Self {
        Self {
            field: FieldInfo::new(name, repetition),
            physical_type,
            logical_type: None,
            converted_type: None,
        }
    }

    /// A fully annotated leaf, validated against the parquet specification.
    pub fn try_new<N: Into<String>>(
        name: N,
        repetition: Repetition,
        physical_type: PhysicalType,
        logical_type: Option<PrimitiveLogicalType>,
        converted_type: Option<PrimitiveConvertedType>,
    ) -> Result<Self> {
        check_converted_invariants(&physical_type, &converted_type)?;
        check_logical_invariants(&physical_type, &logical_type)?;
        Ok(Self {
            field: FieldInfo::new(name, repetition),
            physical_type,
            logical_type,
            converted_type,
        })
    }

    /// An UTF8 string leaf.
    pub fn string<N: Into<String>>(name: N, repetition: Repetition) -> Self {
        Self {
            field: FieldInfo::new(name, repetition),
            physical_type: PhysicalType::ByteArray,
            logical_type: Some(PrimitiveLogicalType::String),
            converted_type: Some(PrimitiveConvertedType::Utf8),
        }
    }
}

/// A node of the schema tree: either a typed leaf or a group of nodes.
/// Schemas are trees by construction; cycles cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Primitive(PrimitiveNode),
    Group {
        field: FieldInfo,
        logical_type: Option<GroupLogicalType>,
        converted_type: Option<GroupConvertedType>,
        fields: Vec<Node>,
    },
}

impl Node {
    pub fn field(&self) -> &FieldInfo {
        match self {
            Node::Primitive(primitive) => &primitive.field,
            Node::Group { field, .. } => field,
        }
    }

    pub fn name(&self) -> &str {
        &self.field().name
    }

    pub fn repetition(&self) -> Repetition {
        self.field().repetition
    }

    /// A plain group with no logical annotation.
    pub fn group<N: Into<String>>(name: N, repetition: Repetition, fields: Vec<Node>) -> Self {
        Node::Group {
            field: FieldInfo::new(name, repetition),
            logical_type: None,
            converted_type: None,
            fields,
        }
    }

    /// A list of `element`, encoded as the three-level structure
    /// `<name> (LIST) { repeated group list { <element> } }`.
    pub fn list<N: Into<String>>(name: N, repetition: Repetition, element: Node) -> Self {
        Node::Group {
            field: FieldInfo::new(name, repetition),
            logical_type: Some(GroupLogicalType::List),
            converted_type: Some(GroupConvertedType::List),
            fields: vec![Node::Group {
                field: FieldInfo::new("list", Repetition::Repeated),
                logical_type: None,
                converted_type: None,
                fields: vec![element],
            }],
        }
    }

    /// A map from `key` to `value`, encoded as
    /// `<name> (MAP) { repeated group key_value { <key>; <value> } }`.
    pub fn map<N: Into<String>>(name: N, repetition: Repetition, key: Node, value: Node) -> Self {
        Node::Group {
            field: FieldInfo::new(name, repetition),
            logical_type: Some(GroupLogicalType::Map),
            converted_type: Some(GroupConvertedType::Map),
            fields: vec![Node::Group {
                field: FieldInfo::new("key_value", Repetition::Repeated),
                logical_type: None,
                converted_type: Some(GroupConvertedType::MapKeyValue),
                fields: vec![key, value],
            }],
        }
    }

    /// The number of leaves under (and including) this node.
    pub fn num_leaves(&self) -> usize {
        match self {
            Node::Primitive(_) => 1,
            Node::Group { fields, .. } => fields.iter().map(|f| f.num_leaves()).sum(),
        }
    }
}

impl From<PrimitiveNode> for Node {
    fn from(primitive: PrimitiveNode) -> Self {
        Node::Primitive(primitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_shape() {
        let node = Node::list(
            "tags",
            Repetition::Optional,
            PrimitiveNode::string("element", Repetition::Required).into(),
        );
        assert_eq!(node.num_leaves(), 1);
        match node {
            Node::Group { fields, .. } => {
                assert_eq!(fields[0].repetition(), Repetition::Repeated);
                assert_eq!(fields[0].name(), "list");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn annotation_mismatch_is_rejected() {
        let result = PrimitiveNode::try_new(
            "ts",
            Repetition::Required,
            PhysicalType::Int32,
            Some(PrimitiveLogicalType::Timestamp {
                unit: super::super::TimeUnit::Milliseconds,
                is_adjusted_to_utc: true,
            }),
            None,
        );
        assert!(result.is_err());
    }
}
