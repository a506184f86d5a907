use indexmap::IndexMap;
use std::sync::Arc;

use crate::common::{Value, FIELDS_KEY, LIMIT_KEY, SKIP_KEY, SORT_KEY};
use crate::normalizer::{
    FieldsValueNormalizer, IntegerNormalizer, KeyNormalizer, SortValueNormalizer,
};

/// Normalizes the value of a single recognized option key.
///
/// Implementations are pure value-to-value functions; the per-key dispatch is
/// done by [OptionsValueNormalizer].
pub trait OptionValueNormalizer: Send + Sync {
    fn normalize(&self, value: Value) -> Value;
}

/// Per-key value normalization for options documents.
///
/// Holds one [OptionValueNormalizer] per recognized key (`fields`, `sort`,
/// `skip`, `limit`); values for keys without an entry pass through
/// unnormalized so driver-specific extensions (batch size, hints) survive
/// untouched. Entries can be added or replaced with
/// [`with_normalizer`](OptionsValueNormalizer::with_normalizer).
pub struct OptionsValueNormalizer {
    normalizers: IndexMap<String, Arc<dyn OptionValueNormalizer>>,
}

impl OptionsValueNormalizer {
    /// Creates the default table.
    ///
    /// # Arguments
    ///
    /// * `sort_key_normalizer` - The key normalizer applied to the field
    ///   portion of sort entries. Field names only fold `id` to `_id`; the
    ///   option alias table is never applied to fields, so sorting by a field
    ///   literally named `order` works.
    pub fn new(sort_key_normalizer: Arc<dyn KeyNormalizer>) -> Self {
        let mut normalizers: IndexMap<String, Arc<dyn OptionValueNormalizer>> = IndexMap::new();
        normalizers.insert(
            FIELDS_KEY.to_string(),
            Arc::new(FieldsValueNormalizer) as Arc<dyn OptionValueNormalizer>,
        );
        normalizers.insert(
            SORT_KEY.to_string(),
            Arc::new(SortValueNormalizer::new(sort_key_normalizer)),
        );
        normalizers.insert(SKIP_KEY.to_string(), Arc::new(IntegerNormalizer));
        normalizers.insert(LIMIT_KEY.to_string(), Arc::new(IntegerNormalizer));
        OptionsValueNormalizer { normalizers }
    }

    /// Adds a normalizer for a new key or overrides an existing default.
    pub fn with_normalizer(
        mut self,
        key: &str,
        normalizer: Arc<dyn OptionValueNormalizer>,
    ) -> Self {
        self.normalizers.insert(key.to_string(), normalizer);
        self
    }

    /// Normalizes `value` with the normalizer registered for `key`, or
    /// returns it unchanged when no normalizer is registered.
    pub fn normalize(&self, key: &str, value: Value) -> Value {
        match self.normalizers.get(key) {
            Some(normalizer) => normalizer.normalize(value),
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::CriteriaKeyNormalizer;

    fn default_normalizer() -> OptionsValueNormalizer {
        OptionsValueNormalizer::new(Arc::new(CriteriaKeyNormalizer))
    }

    #[test]
    fn test_dispatches_by_key() {
        let normalizer = default_normalizer();
        assert_eq!(
            normalizer.normalize("limit", Value::from("25")),
            Value::I64(25)
        );
        assert_eq!(
            normalizer.normalize("skip", Value::from(10)),
            Value::I64(10)
        );
        assert_eq!(
            normalizer.normalize("fields", Value::from("name")),
            Value::Array(vec![Value::from("name")])
        );
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let normalizer = default_normalizer();
        assert_eq!(
            normalizer.normalize("batch_size", Value::from("500")),
            Value::from("500")
        );
    }

    #[test]
    fn test_with_normalizer_overrides_default() {
        struct Upcase;
        impl OptionValueNormalizer for Upcase {
            fn normalize(&self, value: Value) -> Value {
                match value {
                    Value::String(s) => Value::String(s.to_uppercase()),
                    other => other,
                }
            }
        }

        let normalizer = default_normalizer().with_normalizer("fields", Arc::new(Upcase));
        assert_eq!(
            normalizer.normalize("fields", Value::from("name")),
            Value::from("NAME")
        );
    }

    #[test]
    fn test_with_normalizer_adds_new_key() {
        struct Zero;
        impl OptionValueNormalizer for Zero {
            fn normalize(&self, _value: Value) -> Value {
                Value::I64(0)
            }
        }

        let normalizer = default_normalizer().with_normalizer("timeout", Arc::new(Zero));
        assert_eq!(
            normalizer.normalize("timeout", Value::from("whatever")),
            Value::I64(0)
        );
    }
}
