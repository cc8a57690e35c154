//! # Schema Merge
//!
//! Deep merge of a schema extension onto a base schema.
//!
//! Combination rules, applied key by key over the overlay:
//!
//! - mapping + mapping: merged recursively;
//! - sequence + sequence: base followed by overlay, duplicates dropped by
//!   first occurrence;
//! - anything else: the overlay value replaces the base value.
//!
//! Keys only present in the base are kept. Inputs are borrowed and never
//! modified; the result is an independent copy.

use serde_yaml::{Mapping, Value};

/// Merge `overlay` onto `base`, returning a new value.
///
/// If either side is not a mapping the overlay wins, matching the rule for
/// a type mismatch on a nested key.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            Value::Mapping(merge_mappings(base, overlay))
        }
        _ => overlay.clone(),
    }
}

fn merge_mappings(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut result = base.clone();

    for (key, value) in overlay {
        let merged = match (result.get(key), value) {
            (Some(Value::Mapping(b)), Value::Mapping(o)) => Value::Mapping(merge_mappings(b, o)),
            (Some(Value::Sequence(b)), Value::Sequence(o)) => Value::Sequence(merge_sequences(b, o)),
            _ => value.clone(),
        };
        // Replacing an existing key keeps its original position.
        result.insert(key.clone(), merged);
    }

    result
}

/// Concatenate two sequences and drop duplicates, keeping first occurrences.
///
/// Elements are compared by deep value equality with a linear scan, so
/// nested mappings deduplicate the same way scalars do.
fn merge_sequences(base: &[Value], overlay: &[Value]) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(base.len() + overlay.len());
    for item in base.iter().chain(overlay) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}
