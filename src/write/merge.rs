//! K-way merging of sorted row groups into one output row group.
use std::io::Write;

use crate::error::{Error, Result};
use crate::metadata::SchemaDescriptor;
use crate::value::{Row, Value};

use super::writer::{compare_datums, Writer};

/// One input row group: its schema and the decoded values of every leaf,
/// in that schema's depth-first order.
pub struct MergeSource {
    pub schema: SchemaDescriptor,
    pub columns: Vec<Vec<Value>>,
}

/// Merges `sources` into `writer` as a single stream of rows, k-way merged
/// by the writer's sorting columns (plain concatenation when none are
/// configured).
///
/// The sources' schemas must be structurally equal to the writer's; field
/// order may differ. Every value's column index is re-mapped through the
/// writer's schema unconditionally: the mapping is what keeps a re-ordered
/// source's columns from silently landing in the wrong output column.
pub fn merge_row_groups<W: Write>(writer: &mut Writer<W>, sources: Vec<MergeSource>) -> Result<()> {
    let target = writer.schema().clone();

    let mut source_rows = Vec::with_capacity(sources.len());
    for source in sources {
        if !target.is_structurally_equal(&source.schema) {
            return Err(Error::TypeMismatch(format!(
                "the row group of schema \"{}\" is not structurally equal to \"{}\"",
                source.schema.name(),
                target.name()
            )));
        }
        let mapping = leaf_mapping(&source.schema, &target)?;
        source_rows.push(rows_of(remap(source.columns, &mapping))?);
    }

    let keys: Vec<_> = writer.options().sorting_columns.clone();
    if keys.is_empty() {
        for rows in source_rows {
            writer.write_rows(rows)?;
        }
        return Ok(());
    }

    // k-way merge: repeatedly take the source whose head row sorts first
    let mut heads: Vec<std::vec::IntoIter<Row>> =
        source_rows.into_iter().map(|rows| rows.into_iter()).collect();
    let mut fronts: Vec<Option<Row>> = heads.iter_mut().map(|iter| iter.next()).collect();

    loop {
        let mut best: Option<usize> = None;
        for (i, front) in fronts.iter().enumerate() {
            let front = match front {
                Some(front) => front,
                None => continue,
            };
            best = match best {
                None => Some(i),
                Some(current) => {
                    let ordering = compare_rows(fronts[current].as_ref().unwrap(), front, &keys);
                    if ordering == std::cmp::Ordering::Greater {
                        Some(i)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        let best = match best {
            Some(best) => best,
            None => break,
        };
        let row = fronts[best].take().unwrap();
        fronts[best] = heads[best].next();
        writer.write_row(row)?;
    }
    Ok(())
}

fn compare_rows(
    a: &Row,
    b: &Row,
    keys: &[super::writer::SortingColumnOptions],
) -> std::cmp::Ordering {
    for key in keys {
        let left = a
            .iter()
            .find(|value| value.belongs_to(key.column))
            .map(|value| &value.datum);
        let right = b
            .iter()
            .find(|value| value.belongs_to(key.column))
            .map(|value| &value.datum);
        let mut order = compare_datums(left, right, key.nulls_first);
        if key.descending {
            order = order.reverse();
        }
        if order != std::cmp::Ordering::Equal {
            return order;
        }
    }
    std::cmp::Ordering::Equal
}

/// `mapping[source_leaf] = target_leaf`, matched by path.
fn leaf_mapping(source: &SchemaDescriptor, target: &SchemaDescriptor) -> Result<Vec<usize>> {
    source
        .columns()
        .iter()
        .map(|leaf| {
            target
                .columns()
                .iter()
                .find(|candidate| candidate.path_in_schema() == leaf.path_in_schema())
                .map(|candidate| candidate.index())
                .ok_or_else(|| {
                    Error::TypeMismatch(format!(
                        "the column {:?} does not exist in the merged schema",
                        leaf.path_in_schema()
                    ))
                })
        })
        .collect()
}

/// Moves every column to its target position and re-assigns the values'
/// column indexes.
fn remap(columns: Vec<Vec<Value>>, mapping: &[usize]) -> Vec<Vec<Value>> {
    let mut remapped: Vec<Vec<Value>> = (0..columns.len()).map(|_| vec![]).collect();
    for (source_index, mut column) in columns.into_iter().enumerate() {
        let target_index = mapping[source_index];
        for value in column.iter_mut() {
            value.reassign(target_index);
        }
        remapped[target_index] = column;
    }
    remapped
}

/// Splits per-column value streams into rows: a row boundary is exactly a
/// value with repetition level zero.
fn rows_of(columns: Vec<Vec<Value>>) -> Result<Vec<Row>> {
    let mut per_column_rows: Vec<Vec<Vec<Value>>> = vec![];
    for column in columns {
        let mut rows: Vec<Vec<Value>> = vec![];
        for value in column {
            if value.is_row_start() {
                rows.push(vec![]);
            }
            match rows.last_mut() {
                Some(row) => row.push(value),
                None => {
                    return Err(Error::oos(
                        "a column stream does not start at a row boundary",
                    ))
                }
            }
        }
        per_column_rows.push(rows);
    }

    let num_rows = per_column_rows.first().map(|rows| rows.len()).unwrap_or(0);
    if per_column_rows.iter().any(|rows| rows.len() != num_rows) {
        return Err(Error::oos(
            "the columns of a row group must cover the same rows",
        ));
    }

    let mut rows: Vec<Row> = (0..num_rows).map(|_| vec![]).collect();
    for column_rows in per_column_rows {
        for (row, mut segment) in rows.iter_mut().zip(column_rows) {
            row.append(&mut segment);
        }
    }
    Ok(rows)
}
