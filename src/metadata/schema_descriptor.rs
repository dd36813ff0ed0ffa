use std::collections::HashSet;

use parquet_format_safe::SchemaElement;

use crate::error::{Error, Result};
use crate::schema::io_thrift::{from_thrift, to_thrift};
use crate::schema::types::{Node, Repetition};
use crate::MAX_LEAF_COLUMNS;

use super::column_descriptor::ColumnDescriptor;

/// A schema: a named tree of fields, plus one [`ColumnDescriptor`] per leaf
/// in depth-first left-to-right order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<Node>,
    leaves: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    /// Builds a descriptor, validating that sibling names are unique and the
    /// leaf count stays within bounds.
    pub fn try_new<N: Into<String>>(name: N, fields: Vec<Node>) -> Result<Self> {
        check_duplicate_names(&fields)?;

        let mut leaves = vec![];
        for field in &fields {
            let mut path = vec![];
            build_tree(field, 0, 0, &mut leaves, &mut path);
        }
        if leaves.len() > MAX_LEAF_COLUMNS {
            return Err(Error::InvalidConfiguration(format!(
                "a schema may declare at most {} leaf columns; this one declares {}",
                MAX_LEAF_COLUMNS,
                leaves.len()
            )));
        }

        Ok(Self {
            name: name.into(),
            fields,
            leaves,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The top-level fields of the schema.
    pub fn fields(&self) -> &[Node] {
        &self.fields
    }

    /// Descriptor of the `i`th leaf.
    pub fn column(&self, i: usize) -> &ColumnDescriptor {
        &self.leaves[i]
    }

    /// All leaf descriptors, in depth-first left-to-right order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.leaves
    }

    pub fn num_columns(&self) -> usize {
        self.leaves.len()
    }

    /// Whether `other` has the same leaves (type and levels) in possibly
    /// different field order. Used by the row-group merger.
    pub fn is_structurally_equal(&self, other: &Self) -> bool {
        if self.num_columns() != other.num_columns() {
            return false;
        }
        self.leaves.iter().all(|leaf| {
            other.leaves.iter().any(|candidate| {
                candidate.path_in_schema() == leaf.path_in_schema()
                    && candidate.primitive() == leaf.primitive()
                    && candidate.max_def_level() == leaf.max_def_level()
                    && candidate.max_rep_level() == leaf.max_rep_level()
            })
        })
    }

    pub(crate) fn into_thrift(&self) -> Vec<SchemaElement> {
        to_thrift(&self.name, &self.fields)
    }

    pub(crate) fn try_from_thrift(elements: &[SchemaElement]) -> Result<Self> {
        let (name, fields) = from_thrift(elements)?;
        Self::try_new(name, fields)
    }
}

fn check_duplicate_names(fields: &[Node]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name()) {
            return Err(Error::InvalidConfiguration(format!(
                "duplicate field name \"{}\" among sibling fields",
                field.name()
            )));
        }
        if let Node::Group { fields, .. } = field {
            check_duplicate_names(fields)?;
        }
    }
    Ok(())
}

/// Walks the tree accumulating the level maxima: optional and repeated
/// ancestors raise the definition level, repeated ancestors also raise the
/// repetition level.
fn build_tree<'a>(
    node: &'a Node,
    mut max_rep_level: i16,
    mut max_def_level: i16,
    leaves: &mut Vec<ColumnDescriptor>,
    path_so_far: &mut Vec<&'a str>,
) {
    path_so_far.push(node.name());
    match node.repetition() {
        Repetition::Optional => {
            max_def_level += 1;
        }
        Repetition::Repeated => {
            max_def_level += 1;
            max_rep_level += 1;
        }
        Repetition::Required => {}
    }

    match node {
        Node::Primitive(primitive) => {
            let path_in_schema = path_so_far.iter().copied().map(String::from).collect();
            let index = leaves.len();
            leaves.push(ColumnDescriptor::new(
                primitive.clone(),
                max_def_level,
                max_rep_level,
                path_in_schema,
                index,
            ));
        }
        Node::Group { fields, .. } => {
            for field in fields {
                build_tree(field, max_rep_level, max_def_level, leaves, path_so_far);
                path_so_far.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{PhysicalType, PrimitiveNode};

    #[test]
    fn levels_of_nested_list() {
        let schema = SchemaDescriptor::try_new(
            "s",
            vec![Node::list(
                "tags",
                Repetition::Optional,
                PrimitiveNode::string("element", Repetition::Required).into(),
            )],
        )
        .unwrap();

        let leaf = schema.column(0);
        // optional list + repeated inner group; required element adds nothing
        assert_eq!(leaf.max_def_level(), 2);
        assert_eq!(leaf.max_rep_level(), 1);
        assert_eq!(leaf.path_in_schema(), ["tags", "list", "element"]);
    }

    #[test]
    fn duplicate_sibling_names_rejected() {
        let result = SchemaDescriptor::try_new(
            "s",
            vec![
                PrimitiveNode::from_physical("a", Repetition::Required, PhysicalType::Int32)
                    .into(),
                PrimitiveNode::from_physical("a", Repetition::Optional, PhysicalType::Int64)
                    .into(),
            ],
        );
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn leaf_indexes_are_depth_first() {
        let schema = SchemaDescriptor::try_new(
            "s",
            vec![
                PrimitiveNode::from_physical("a", Repetition::Required, PhysicalType::Int32)
                    .into(),
                Node::group(
                    "g",
                    Repetition::Optional,
                    vec![
                        PrimitiveNode::string("b", Repetition::Optional).into(),
                        PrimitiveNode::from_physical(
                            "c",
                            Repetition::Required,
                            PhysicalType::Double,
                        )
                        .into(),
                    ],
                ),
            ],
        )
        .unwrap();

        let indexes: Vec<_> = schema.columns().iter().map(|c| c.index()).collect();
        assert_eq!(indexes, [0, 1, 2]);
        assert_eq!(schema.column(2).max_def_level(), 1);
    }
}
