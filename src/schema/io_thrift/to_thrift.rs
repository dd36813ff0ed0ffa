use parquet_format_safe::SchemaElement;

use crate::schema::types::Node;

/// Flattens a schema (root name + fields) into thrift `SchemaElement`s in
/// depth-first order. The first element is the root group; per the format
/// spec its repetition is not set.
pub fn to_thrift(name: &str, fields: &[Node]) -> Vec<SchemaElement> {
    let mut elements = Vec::with_capacity(1 + fields.len());
    elements.push(SchemaElement {
        type_: None,
        type_length: None,
        repetition_type: None,
        name: name.to_string(),
        num_children: Some(fields.len() as i32),
        converted_type: None,
        scale: None,
        precision: None,
        field_id: None,
        logical_type: None,
    });
    for field in fields {
        flatten(field, &mut elements);
    }
    elements
}

fn flatten(node: &Node, elements: &mut Vec<SchemaElement>) {
    match node {
        Node::Primitive(primitive) => {
            let (type_, type_length) = primitive.physical_type.into();
            let (converted_type, maybe_decimal) = primitive
                .converted_type
                .map(|x| {
                    let (converted, decimal) = x.into();
                    (Some(converted), decimal)
                })
                .unwrap_or((None, None));

            elements.push(SchemaElement {
                type_: Some(type_),
                type_length,
                repetition_type: Some(primitive.field.repetition.into()),
                name: primitive.field.name.clone(),
                num_children: None,
                converted_type,
                precision: maybe_decimal.map(|x| x.0),
                scale: maybe_decimal.map(|x| x.1),
                field_id: primitive.field.id,
                logical_type: primitive.logical_type.map(|x| x.into()),
            });
        }
        Node::Group {
            field,
            logical_type,
            converted_type,
            fields,
        } => {
            elements.push(SchemaElement {
                type_: None,
                type_length: None,
                repetition_type: Some(field.repetition.into()),
                name: field.name.clone(),
                num_children: Some(fields.len() as i32),
                converted_type: converted_type.map(|x| x.into()),
                scale: None,
                precision: None,
                field_id: field.id,
                logical_type: logical_type.map(|x| x.into()),
            });
            for field in fields {
                flatten(field, elements);
            }
        }
    }
}
