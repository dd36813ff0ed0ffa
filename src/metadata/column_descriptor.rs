use crate::schema::types::{PhysicalType, PrimitiveNode};

/// A descriptor of a leaf column: its primitive node, the two level maxima
/// derived from its ancestors, its dotted path and its position among the
/// schema's leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    primitive: PrimitiveNode,
    max_def_level: i16,
    max_rep_level: i16,
    path_in_schema: Vec<String>,
    index: usize,
}

impl ColumnDescriptor {
    pub(crate) fn new(
        primitive: PrimitiveNode,
        max_def_level: i16,
        max_rep_level: i16,
        path_in_schema: Vec<String>,
        index: usize,
    ) -> Self {
        Self {
            primitive,
            max_def_level,
            max_rep_level,
            path_in_schema,
            index,
        }
    }

    /// The maximum definition level any value of this column may carry.
    pub fn max_def_level(&self) -> i16 {
        self.max_def_level
    }

    /// The maximum repetition level any value of this column may carry.
    pub fn max_rep_level(&self) -> i16 {
        self.max_rep_level
    }

    /// The dotted path from the root to this leaf, e.g. `["a", "b", "c"]`.
    pub fn path_in_schema(&self) -> &[String] {
        &self.path_in_schema
    }

    /// The zero-based position of this leaf in depth-first schema order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn primitive(&self) -> &PrimitiveNode {
        &self.primitive
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.primitive.physical_type
    }

    pub fn name(&self) -> &str {
        &self.primitive.field.name
    }

    /// Whether this column may hold nulls.
    pub fn is_nullable(&self) -> bool {
        self.max_def_level > 0
    }

    /// Whether this column belongs to a repeated subtree.
    pub fn is_repeated(&self) -> bool {
        self.max_rep_level > 0
    }
}
