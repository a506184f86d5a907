use std::sync::Arc;

use crate::common::{SortOrder, Value, NATURAL_ORDER};
use crate::criteria::{CriteriaDocument, FieldToken};
use crate::normalizer::{flatten_values, KeyNormalizer, OptionValueNormalizer};

/// Normalizes a sort specification into an ordered sequence of
/// `[field, direction]` pairs with direction `1` or `-1`.
///
/// Accepted shapes:
///
/// - a map already keyed by field with numeric directions (passed through)
/// - a field token (`field("age").desc()`) or an array of them
/// - a delimited string: `"foo desc, bar, baz"`, direction case-insensitive
///   and defaulting to ascending
/// - an array of `[field, direction]` pairs
/// - a bare field name (ascending)
/// - an array mixing any of the above; `Null` entries are discarded, and a
///   nested single-element array holding one string collapses to that string
///   before parsing
///
/// Field names fold `id` to `_id` through the injected key normalizer;
/// `$natural` is never rewritten.
pub struct SortValueNormalizer {
    key_normalizer: Arc<dyn KeyNormalizer>,
}

impl SortValueNormalizer {
    pub fn new(key_normalizer: Arc<dyn KeyNormalizer>) -> Self {
        SortValueNormalizer { key_normalizer }
    }

    fn pair(&self, field: &str, direction: i64) -> Value {
        let name = if field == NATURAL_ORDER {
            field.to_string()
        } else {
            self.key_normalizer.normalize(field)
        };
        Value::Array(vec![Value::String(name), Value::I64(direction)])
    }

    fn token_pair(&self, token: &FieldToken) -> Value {
        let order = SortOrder::from_word(Some(token.comparator().as_str()));
        self.pair(token.field(), order.direction())
    }

    fn string_pairs(&self, spec: &str) -> Vec<Value> {
        spec.split(',')
            .filter_map(|piece| {
                let mut words = piece.split_whitespace();
                let field = words.next()?;
                let order = SortOrder::from_word(words.next());
                Some(self.pair(field, order.direction()))
            })
            .collect()
    }

    fn slice_pairs(&self, items: Vec<Value>) -> Vec<Value> {
        let flat = flatten_values(items);
        if flat.len() == 1 {
            // a nested single-element array of one string collapses to the
            // string form before parsing
            if let Value::String(spec) = &flat[0] {
                return self.string_pairs(spec);
            }
        }
        flat.chunks(2)
            .filter_map(|slice| {
                let field = match &slice[0] {
                    Value::String(name) => name.clone(),
                    Value::Token(token) => return Some(self.token_pair(token)),
                    other => {
                        log::warn!("Ignoring unrecognized sort field entry: {}", other);
                        return None;
                    }
                };
                Some(self.pair(&field, direction_of(slice.get(1))))
            })
            .collect()
    }

    fn map_pairs(&self, doc: &CriteriaDocument) -> Vec<Value> {
        doc.to_map()
            .iter()
            .map(|(name, direction)| {
                Value::Array(vec![
                    Value::String(name.clone()),
                    Value::I64(direction.as_i64().unwrap_or(1)),
                ])
            })
            .collect()
    }

    fn pieces(&self, value: Value) -> Vec<Value> {
        match value {
            Value::Token(token) => vec![self.token_pair(&token)],
            Value::String(spec) => self.string_pairs(&spec),
            Value::Array(inner) => self.slice_pairs(inner),
            Value::Document(doc) => self.map_pairs(&doc),
            Value::Map(map) => self.map_pairs(&CriteriaDocument::from_normalized(map)),
            other => {
                log::warn!("Ignoring unrecognized sort entry: {}", other);
                vec![]
            }
        }
    }
}

impl OptionValueNormalizer for SortValueNormalizer {
    fn normalize(&self, value: Value) -> Value {
        match value {
            Value::Array(items) => {
                let pairs: Vec<Value> = items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .flat_map(|item| self.pieces(item))
                    .collect();
                Value::Array(pairs)
            }
            Value::String(_) | Value::Token(_) => Value::Array(self.pieces(value)),
            // a map already keyed by field with numeric directions
            Value::Document(_) => value,
            Value::Map(map) => Value::Document(CriteriaDocument::from_normalized(map)),
            other => other,
        }
    }
}

fn direction_of(value: Option<&Value>) -> i64 {
    match value {
        None => SortOrder::Ascending.direction(),
        Some(v) => {
            if let Some(direction) = v.as_i64() {
                if direction == -1 {
                    return SortOrder::Descending.direction();
                }
                return SortOrder::Ascending.direction();
            }
            match v.as_str() {
                Some(word) => SortOrder::from_word(Some(word)).direction(),
                None => SortOrder::Ascending.direction(),
            }
        }
    }
}
