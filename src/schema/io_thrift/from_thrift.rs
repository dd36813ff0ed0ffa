use parquet_format_safe::SchemaElement;

use crate::error::{Error, Result};
use crate::schema::types::{FieldInfo, Node, PrimitiveNode};

/// Rebuilds a schema (root name + fields) from a flat list of thrift
/// `SchemaElement`s as stored in the footer.
pub fn from_thrift(elements: &[SchemaElement]) -> Result<(String, Vec<Node>)> {
    let root = elements
        .first()
        .ok_or_else(|| Error::oos("the schema must have at least the root element"))?;
    let num_children = root.num_children.unwrap_or(0);
    if num_children < 0 {
        return Err(Error::oos("the root element declares negative children"));
    }

    let mut fields = Vec::with_capacity(num_children as usize);
    let mut index = 1;
    for _ in 0..num_children {
        let (next, field) = unflatten(elements, index)?;
        index = next;
        fields.push(field);
    }
    if index != elements.len() {
        return Err(Error::oos(format!(
            "the schema declares {} elements but its children only cover {}",
            elements.len(),
            index
        )));
    }
    Ok((root.name.clone(), fields))
}

/// Builds the node rooted at `elements[index]`; returns the index of the
/// first element not belonging to it.
fn unflatten(elements: &[SchemaElement], index: usize) -> Result<(usize, Node)> {
    let element = elements
        .get(index)
        .ok_or_else(|| Error::oos("a group declares more children than the schema holds"))?;
    let repetition = element
        .repetition_type
        .ok_or_else(|| Error::oos("repetition must be defined for a non-root element"))?
        .try_into()?;
    let field = FieldInfo {
        name: element.name.clone(),
        repetition,
        id: element.field_id,
    };

    match element.num_children {
        // parquet-cpp writes `Some(0)` for primitives; treat it as absent
        None | Some(0) => {
            let physical = element
                .type_
                .ok_or_else(|| Error::oos("a primitive element must declare a physical type"))?;
            let physical_type = (physical, element.type_length).try_into()?;

            let converted_type = match element.converted_type {
                Some(converted) => {
                    let maybe_decimal = match (element.precision, element.scale) {
                        (Some(precision), Some(scale)) => Some((precision, scale)),
                        (None, None) => None,
                        _ => {
                            return Err(Error::oos(
                                "precision and scale must either both be set or both absent",
                            ))
                        }
                    };
                    Some((converted, maybe_decimal).try_into()?)
                }
                None => None,
            };
            let logical_type = element
                .logical_type
                .clone()
                .map(|x| x.try_into())
                .transpose()?;

            let mut primitive = PrimitiveNode::try_new(
                field.name,
                repetition,
                physical_type,
                logical_type,
                converted_type,
            )?;
            primitive.field.id = element.field_id;

            Ok((index + 1, Node::Primitive(primitive)))
        }
        Some(n) => {
            if n < 0 {
                return Err(Error::oos("a group declares negative children"));
            }
            let mut fields = Vec::with_capacity(n as usize);
            let mut next = index + 1;
            for _ in 0..n {
                let (index, child) = unflatten(elements, next)?;
                next = index;
                fields.push(child);
            }

            let converted_type = element
                .converted_type
                .map(|x| x.try_into())
                .transpose()?;
            let logical_type = element
                .logical_type
                .clone()
                .map(|x| x.try_into())
                .transpose()?;

            Ok((
                next,
                Node::Group {
                    field,
                    logical_type,
                    converted_type,
                    fields,
                },
            ))
        }
    }
}
