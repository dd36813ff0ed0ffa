//! Flattening of the node tree to thrift `SchemaElement`s and back.
mod from_thrift;
mod to_thrift;

pub use from_thrift::from_thrift;
pub use to_thrift::to_thrift;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{Node, PhysicalType, PrimitiveNode, Repetition};

    #[test]
    fn nested_roundtrip() {
        let fields = vec![
            PrimitiveNode::from_physical("id", Repetition::Required, PhysicalType::Int64).into(),
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
        ];

        let elements = to_thrift("spans", &fields);
        let (name, decoded) = from_thrift(&elements).unwrap();
        assert_eq!(name, "spans");
        assert_eq!(decoded, fields);
    }
}
