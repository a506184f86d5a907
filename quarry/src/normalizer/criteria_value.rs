use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::common::{is_modifier, is_nesting_operator, ModifierMap, RawMap, Value, IN_OPERATOR};
use crate::criteria::CriteriaDocument;
use crate::normalizer::KeyNormalizer;
use crate::to_object_id;

/// The context a value normalizer runs in: the object-id field set of the
/// document being built, plus the strategy objects to thread through when a
/// nested criteria document has to be constructed recursively.
pub struct NormalizerContext<'a> {
    object_id_fields: &'a BTreeSet<String>,
    key_normalizer: &'a Arc<dyn KeyNormalizer>,
    value_normalizer: &'a Arc<dyn ValueNormalizer>,
}

impl<'a> NormalizerContext<'a> {
    pub fn new(
        object_id_fields: &'a BTreeSet<String>,
        key_normalizer: &'a Arc<dyn KeyNormalizer>,
        value_normalizer: &'a Arc<dyn ValueNormalizer>,
    ) -> Self {
        NormalizerContext {
            object_id_fields,
            key_normalizer,
            value_normalizer,
        }
    }

    /// Returns true if string values for `key` should be converted to object
    /// ids.
    pub fn is_object_id_field(&self, key: &str) -> bool {
        self.object_id_fields.contains(key)
    }

    /// Builds a nested criteria document from a raw clause map, carrying this
    /// context's object-id field set and strategy objects into the nested
    /// document so its keys and values normalize the same way.
    pub fn nested_document(&self, clause: RawMap) -> CriteriaDocument {
        let mut document = CriteriaDocument::with_normalizers(
            Arc::clone(self.key_normalizer),
            Arc::clone(self.value_normalizer),
        );
        document.set_object_id_fields(self.object_id_fields.iter().cloned());
        for (key, value) in clause {
            document.set(key, value);
        }
        document
    }
}

/// Converts an input value into canonical form given its (parent key, key)
/// context.
///
/// Implementations are called recursively while a document is built and must
/// be permissive: unrecognized shapes pass through unchanged, never error.
pub trait ValueNormalizer: Send + Sync {
    fn normalize(
        &self,
        cx: &NormalizerContext<'_>,
        parent_key: &str,
        key: &str,
        value: Value,
    ) -> Value;
}

/// The default criteria value normalizer.
///
/// Dispatches on the shape of the input value:
///
/// 1. Sequences become `{"$in": [...]}` unless they are the operand of an
///    existing modifier (kept as a bare array) or of a nesting operator
///    (each element becomes a nested criteria document). Empty sequences are
///    not special-cased: an empty array still becomes `{"$in": []}`,
///    matching nothing.
/// 2. Timestamps are folded to a zero UTC offset; already-UTC timestamps are
///    untouched.
/// 3. Strings for fields in the object-id set are converted to object ids
///    when they parse; anything else is left as the original string.
/// 4. Maps normalize each pair recursively with `key` as the new parent, and
///    classify as a modifier map or a nested document by their keys.
/// 5. Everything else is identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaValueNormalizer;

impl CriteriaValueNormalizer {
    fn normalize_map(
        &self,
        cx: &NormalizerContext<'_>,
        key: &str,
        map: RawMap,
    ) -> ModifierMap {
        map.into_iter()
            .map(|(sub_key, sub_value)| {
                let normalized = self.normalize(cx, key, &sub_key, sub_value);
                (sub_key, normalized)
            })
            .collect()
    }

    fn normalize_clause_list(&self, cx: &NormalizerContext<'_>, items: Vec<Value>) -> Value {
        let all_clauses = items
            .iter()
            .all(|item| matches!(item, Value::Map(_) | Value::Document(_)));
        if !all_clauses {
            log::warn!("Nesting operator operand contains non-document entries; left unnormalized");
            return Value::Array(items);
        }

        let documents = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Map(clause) => Some(cx.nested_document(clause)),
                Value::Document(document) => Some(document),
                _ => None,
            })
            .collect();
        Value::Documents(documents)
    }
}

impl ValueNormalizer for CriteriaValueNormalizer {
    fn normalize(
        &self,
        cx: &NormalizerContext<'_>,
        parent_key: &str,
        key: &str,
        value: Value,
    ) -> Value {
        match value {
            Value::Array(items) => {
                let items: Vec<Value> = if cx.is_object_id_field(parent_key) {
                    items.into_iter().map(to_object_id).collect()
                } else {
                    items
                };

                if is_nesting_operator(key) {
                    self.normalize_clause_list(cx, items)
                } else if parent_key == key && !is_modifier(key) {
                    // un-nested and not the operand of a comparator: field IN list
                    let mut modifiers = ModifierMap::new();
                    modifiers.insert(IN_OPERATOR.to_string(), Value::Array(items));
                    Value::Modifiers(modifiers)
                } else {
                    // operand of a comparator or part of a nested map
                    Value::Array(items)
                }
            }
            Value::DateTime(timestamp) => {
                Value::DateTime(timestamp.with_timezone(&Utc).fixed_offset())
            }
            Value::String(candidate) => {
                if cx.is_object_id_field(key) {
                    return to_object_id(Value::String(candidate));
                }
                Value::String(candidate)
            }
            Value::Map(map) => {
                let normalized = self.normalize_map(cx, key, map);
                Value::classify_map(normalized)
            }
            Value::Modifiers(map) => {
                let normalized = self.normalize_map(cx, key, map);
                Value::Modifiers(normalized)
            }
            other => other,
        }
    }
}
