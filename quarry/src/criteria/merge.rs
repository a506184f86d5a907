//! The conjunction-merge algorithm for criteria documents.
//!
//! AND-combines two already-normalized source maps. A pre-pass folds
//! competing `$or` clauses into a single `$and` list (two disjunctions must
//! stay conjoined, never unioned); the generic per-key pass then combines
//! colliding values by shape: map-shaped values merge recursively, a modifier
//! map absorbs a colliding scalar into its first modifier's operand, and
//! bare scalars union into `$in`. Structurally incompatible shapes are a
//! defined failure, not a silent drop.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::common::{is_modifier, ModifierMap, Value, AND_OPERATOR, IN_OPERATOR, OR_OPERATOR};
use crate::criteria::CriteriaDocument;
use crate::errors::{ErrorKind, QuarryError, QuarryResult};

type Source = IndexMap<String, Value>;

/// Merges `new` into a copy of `old`, returning the combined source map.
/// Neither input is mutated.
pub(crate) fn merge_sources(old: &Source, new: &Source) -> QuarryResult<Source> {
    let mut old = old.clone();
    let mut new = new.clone();
    fold_or_clauses(&mut old, &mut new);

    for (key, new_value) in new {
        match old.get(&key).cloned() {
            Some(old_value) => {
                let combined = combine(&key, old_value, new_value)?;
                old.insert(key, combined);
            }
            None => {
                old.insert(key, new_value);
            }
        }
    }
    Ok(old)
}

/// The compound-operator pre-pass.
///
/// Two top-level `$or` arrays turn into one `$and` holding both disjunctions.
/// A fresh `$or` meeting an `$and` that already contains an `$or` clause is
/// appended to that `$and` instead of opening a second one; symmetric for the
/// reverse pairing. Anything else is left for the generic merge.
fn fold_or_clauses(old: &mut Source, new: &mut Source) {
    let old_has_or = old.contains_key(OR_OPERATOR);
    let new_has_or = new.contains_key(OR_OPERATOR);

    if old_has_or && new_has_or {
        if !matches!(old.get(AND_OPERATOR), None | Some(Value::Documents(_))) {
            // malformed $and; let the generic merge surface it
            return;
        }
        let old_or = old.shift_remove(OR_OPERATOR);
        let new_or = new.shift_remove(OR_OPERATOR);
        if !matches!(old.get(AND_OPERATOR), Some(Value::Documents(_))) {
            old.insert(AND_OPERATOR.to_string(), Value::Documents(Vec::new()));
        }
        if let Some(Value::Documents(clauses)) = old.get_mut(AND_OPERATOR) {
            if let Some(or_value) = old_or {
                clauses.push(or_clause(or_value));
            }
            if let Some(or_value) = new_or {
                clauses.push(or_clause(or_value));
            }
        }
    } else if new_has_or && old.contains_key(AND_OPERATOR) {
        append_or_to_and(old, new);
    } else if old_has_or && new.contains_key(AND_OPERATOR) {
        append_or_to_and(new, old);
    }
}

/// Moves `source`'s `$or` into `target`'s `$and` list, but only when that
/// list already carries an `$or` clause.
fn append_or_to_and(target: &mut Source, source: &mut Source) {
    let has_or_clause = match target.get(AND_OPERATOR) {
        Some(Value::Documents(clauses)) => clauses
            .iter()
            .any(|clause| clause.contains_key(OR_OPERATOR)),
        _ => false,
    };
    if !has_or_clause {
        return;
    }
    if let Some(or_value) = source.shift_remove(OR_OPERATOR) {
        if let Some(Value::Documents(clauses)) = target.get_mut(AND_OPERATOR) {
            clauses.push(or_clause(or_value));
        }
    }
}

fn or_clause(or_value: Value) -> CriteriaDocument {
    let mut source = Source::new();
    source.insert(OR_OPERATOR.to_string(), or_value);
    CriteriaDocument::from_normalized(source)
}

/// Combines the two values stored under the same key.
fn combine(key: &str, old: Value, new: Value) -> QuarryResult<Value> {
    match (old, new) {
        (Value::Documents(mut old_docs), Value::Documents(new_docs)) => {
            // AND-composition of clause lists: concatenate, drop repeats
            old_docs.extend(new_docs);
            let documents: Vec<CriteriaDocument> = old_docs.into_iter().unique().collect();
            Ok(Value::Documents(documents))
        }
        (old @ Value::Documents(_), new) | (old, new @ Value::Documents(_)) => {
            incompatible(key, &old, &new)
        }
        (old, new) if old.is_mapping() && new.is_mapping() => {
            let old_map = old.into_map().unwrap_or_default();
            let new_map = new.into_map().unwrap_or_default();
            let merged = merge_sources(&old_map, &new_map)?;
            Ok(Value::classify_map(merged))
        }
        (old, new) if old.is_mapping() => absorb(key, old, new),
        (old, new) if new.is_mapping() => absorb(key, new, old),
        (old, new) => Ok(union_values(key, old, new)),
    }
}

/// Absorbs a colliding non-map value into a modifier map: the first modifier
/// key in insertion order accumulates it into its operand array. A map with
/// no modifier key at all is a plain nested document and cannot conjoin with
/// a scalar.
fn absorb(key: &str, mapping: Value, value: Value) -> QuarryResult<Value> {
    let type_names = (mapping.type_name(), value.type_name());
    let mut map = match mapping.into_map() {
        Some(map) => map,
        None => {
            return Err(QuarryError::new(
                &format!("expected a map-shaped value at key '{}'", key),
                ErrorKind::InternalError,
            ))
        }
    };

    let modifier_key = map.keys().find(|k| is_modifier(k.as_str())).cloned();
    match modifier_key {
        Some(operator) => {
            if let Some(operand) = map.get_mut(&operator) {
                *operand = union_values(&operator, std::mem::take(operand), value);
            }
            Ok(Value::Modifiers(map))
        }
        None => {
            log::error!(
                "Cannot merge {} with {} at key '{}'",
                type_names.0,
                type_names.1,
                key
            );
            Err(QuarryError::new(
                &format!(
                    "cannot merge {} with {} at key '{}'",
                    type_names.0, type_names.1, key
                ),
                ErrorKind::IncompatibleMerge,
            ))
        }
    }
}

/// Unions two non-map values. In a field slot the union becomes `$in` (or
/// collapses back to the lone survivor); in a modifier's operand slot it
/// stays a bare array, except that two equal scalar operands keep their
/// scalar shape so self-merge is a no-op.
fn union_values(key: &str, old: Value, new: Value) -> Value {
    let either_is_array = matches!(old, Value::Array(_)) || matches!(new, Value::Array(_));
    let mut items = to_vec(old);
    items.extend(to_vec(new));
    let mut items: Vec<Value> = items.into_iter().unique().collect();

    if is_modifier(key) {
        if items.len() == 1 && !either_is_array {
            items.remove(0)
        } else {
            Value::Array(items)
        }
    } else if items.len() == 1 {
        items.remove(0)
    } else {
        let mut modifiers = ModifierMap::new();
        modifiers.insert(IN_OPERATOR.to_string(), Value::Array(items));
        Value::Modifiers(modifiers)
    }
}

/// Treats a value as a one-element list unless it already is a list. An
/// object id is a single element, never unpacked into its bytes.
fn to_vec(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn incompatible(key: &str, old: &Value, new: &Value) -> QuarryResult<Value> {
    log::error!(
        "Cannot merge {} with {} at key '{}'",
        old.type_name(),
        new.type_name(),
        key
    );
    Err(QuarryError::new(
        &format!(
            "cannot merge {} with {} at key '{}'",
            old.type_name(),
            new.type_name(),
            key
        ),
        ErrorKind::IncompatibleMerge,
    ))
}
