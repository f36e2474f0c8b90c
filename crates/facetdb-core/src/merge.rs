//! Column-level merge of two versions of one logical record.
//!
//! `to` is the already-cached version, `from` the freshly obtained one.
//! Each non-key column is arbitrated independently using the recorded
//! write-time and TTL metadata traveling inside the attribute map. Key
//! columns are never touched: both sides address the same logical record
//! or the merge refuses outright.

use crate::record::Record;
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// MergeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MergeError {
    #[error("cannot merge '{from}' into '{to}': entity types differ")]
    EntityMismatch { to: String, from: String },
}

/// Merge with absence/identity handling: the same instance or a one-sided
/// input short-circuits without touching any column.
pub fn merge(
    to: Option<Arc<Record>>,
    from: Option<Arc<Record>>,
) -> Result<Option<Arc<Record>>, MergeError> {
    match (to, from) {
        (Some(to), Some(from)) => {
            if Arc::ptr_eq(&to, &from) {
                return Ok(Some(to));
            }

            let mut merged = (*to).clone();
            merge_into(&mut merged, &from)?;

            Ok(Some(Arc::new(merged)))
        }
        (to, None) => Ok(to),
        (None, from) => Ok(from),
    }
}

/// Merge `from` into `to` column by column, mutating `to` in place.
pub fn merge_into(to: &mut Record, from: &Record) -> Result<(), MergeError> {
    if to.descriptor().path != from.descriptor().path {
        return Err(MergeError::EntityMismatch {
            to: to.descriptor().path.clone(),
            from: from.descriptor().path.clone(),
        });
    }

    let columns: Vec<String> = to
        .descriptor()
        .value_columns()
        .map(|prop| prop.column.clone())
        .collect();

    for column in &columns {
        merge_column(to, from, column);
    }

    Ok(())
}

fn merge_column(to: &mut Record, from: &Record, column: &str) {
    let from_value = from.get(column).cloned();
    let to_present = to.get(column).is_some();

    let to_write_time = to.write_time_of(column);
    let from_write_time = from.write_time_of(column);
    let to_ttl = to.ttl_of(column);
    let from_ttl = from.ttl_of(column);

    match (to_present, from_value) {
        // Nothing on either side.
        (false, None) => {}

        // Only the fresh side carries a value: adopt it with its metadata.
        (false, Some(value)) => {
            to.set(column.to_string(), value);
            if let Some(write_time) = from_write_time {
                to.set_write_time(column, write_time);
            }
            if let Some(ttl) = from_ttl {
                to.set_ttl(column, ttl);
            }
        }

        // Only the cached side carries a value: no information to merge.
        (true, None) => {}

        (true, Some(value)) => {
            let equal = to.get(column) == Some(&value);

            if equal {
                // Values agree: synchronize metadata only.
                if let Some(write_time) = from_write_time
                    && to_write_time.is_none_or(|current| write_time > current)
                {
                    to.set_write_time(column, write_time);
                }
                if let Some(ttl) = from_ttl
                    && to_ttl.is_none_or(|current| ttl > current)
                {
                    to.set_ttl(column, ttl);
                }
            } else if let Some(write_time) = from_write_time {
                // Conflicting values: strictly newer write-time wins.
                if to_write_time.is_none_or(|current| write_time > current) {
                    to.set(column.to_string(), value);
                    to.set_write_time(column, write_time);
                    if let Some(ttl) = from_ttl {
                        to.set_ttl(column, ttl);
                    }
                }
            } else if to_write_time.is_none() {
                // Neither side carries a write-time and the values differ:
                // adopt the fresh value anyway. Last-writer-wins without
                // evidence of recency; dangerous waters, kept until the
                // intended product semantics are settled.
                to.set(column.to_string(), value);
            }
        }
    }
}

///
/// TESTS
///
