use indexmap::IndexMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::common::{write_map, Value, FIELDS_KEY, LIMIT_KEY, SKIP_KEY, SORT_KEY};
use crate::normalizer::{
    options_key_normalizer, CriteriaKeyNormalizer, KeyNormalizer, OptionsValueNormalizer,
};

/// The canonical options document.
///
/// An `OptionsDocument` carries the non-filter half of a query: projection
/// (`fields`), ordering (`sort`), and paging (`skip`, `limit`). Input keys
/// fold the ergonomic aliases (`select → fields`, `order → sort`,
/// `offset → skip`, `id → _id`), values go through per-key normalizers, and
/// unrecognized keys pass through unnormalized so driver-specific extensions
/// (batch size, hints) survive untouched.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::options::OptionsDocument;
///
/// let mut options = OptionsDocument::new();
/// options.set("order", "created_at desc, name");
/// options.set("select", "name, email");
/// options.set("offset", 20);
/// options.set("limit", "10");
///
/// assert_eq!(options.skip(), Some(20));
/// assert_eq!(options.limit(), Some(10));
/// ```
#[derive(Clone)]
pub struct OptionsDocument {
    source: IndexMap<String, Value>,
    key_normalizer: Arc<dyn KeyNormalizer>,
    value_normalizer: Arc<OptionsValueNormalizer>,
}

impl OptionsDocument {
    /// Creates an empty document with the default alias table and per-key
    /// normalizers.
    pub fn new() -> Self {
        OptionsDocument::with_normalizers(
            Arc::new(options_key_normalizer()),
            Arc::new(OptionsValueNormalizer::new(Arc::new(CriteriaKeyNormalizer))),
        )
    }

    /// Creates an empty document with custom strategy objects.
    pub fn with_normalizers(
        key_normalizer: Arc<dyn KeyNormalizer>,
        value_normalizer: Arc<OptionsValueNormalizer>,
    ) -> Self {
        OptionsDocument {
            source: IndexMap::new(),
            key_normalizer,
            value_normalizer,
        }
    }

    /// Builds a document by normalizing every pair of a raw input map.
    pub fn from_map(map: IndexMap<String, Value>) -> Self {
        let mut document = OptionsDocument::new();
        for (key, value) in map {
            document.set(&key, value);
        }
        document
    }

    /// Sets an option, folding key aliases and normalizing the value.
    ///
    /// A `fields` value that normalizes to nothing (empty string, empty
    /// array) unsets the key entirely: an absent projection, not an empty
    /// one.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let key = self.key_normalizer.normalize(key);
        let value = self.value_normalizer.normalize(&key, value.into());
        if key == FIELDS_KEY && value.is_null() {
            self.source.shift_remove(&key);
        } else {
            self.source.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.source.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.source.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.source.keys().map(|key| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// The canonical key-value mapping, ready to hand to a query-execution
    /// call as the options half of `(filter, options)`.
    pub fn to_map(&self) -> &IndexMap<String, Value> {
        &self.source
    }

    pub fn into_map(self) -> IndexMap<String, Value> {
        self.source
    }

    /// Returns true when a projection is set.
    pub fn has_fields(&self) -> bool {
        self.source
            .get(FIELDS_KEY)
            .map(|value| !value.is_null())
            .unwrap_or(false)
    }

    /// The canonical sort as `(field, direction)` pairs, when a sort is set.
    pub fn sort_pairs(&self) -> Option<Vec<(String, i64)>> {
        match self.source.get(SORT_KEY)? {
            Value::Array(pairs) => Some(
                pairs
                    .iter()
                    .filter_map(|pair| match pair {
                        Value::Array(entry) if entry.len() == 2 => {
                            let field = entry[0].as_str()?.to_string();
                            let direction = entry[1].as_i64()?;
                            Some((field, direction))
                        }
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Document(doc) => Some(
                doc.to_map()
                    .iter()
                    .map(|(field, direction)| {
                        (field.clone(), direction.as_i64().unwrap_or(1))
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn skip(&self) -> Option<i64> {
        self.source.get(SKIP_KEY).and_then(|value| value.as_i64())
    }

    pub fn limit(&self) -> Option<i64> {
        self.source.get(LIMIT_KEY).and_then(|value| value.as_i64())
    }

    /// Overlays another options document on this one, returning a new
    /// document. Colliding keys take the other side's value wholesale; the
    /// result keeps this document's normalizers.
    pub fn merge(&self, other: &OptionsDocument) -> OptionsDocument {
        let mut source = self.source.clone();
        for (key, value) in &other.source {
            source.insert(key.clone(), value.clone());
        }
        OptionsDocument {
            source,
            key_normalizer: Arc::clone(&self.key_normalizer),
            value_normalizer: Arc::clone(&self.value_normalizer),
        }
    }

    /// Overlays another options document on this one in place.
    pub fn merge_in_place(&mut self, other: &OptionsDocument) {
        for (key, value) in &other.source {
            self.source.insert(key.clone(), value.clone());
        }
    }
}

impl Default for OptionsDocument {
    fn default() -> Self {
        OptionsDocument::new()
    }
}

impl PartialEq for OptionsDocument {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for OptionsDocument {}

impl Display for OptionsDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_map(f, &self.source)
    }
}

impl Debug for OptionsDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// Builds an [OptionsDocument] from raw key-value pairs, normalizing each
/// one.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::options;
///
/// let opts = options! { order: "created_at desc", limit: 25 };
/// ```
#[macro_export]
macro_rules! options {
    // match an empty document
    () => {
        $crate::options::OptionsDocument::new()
    };

    // match a document with key value pairs (with outer braces)
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::options!($($key : $value),*)
    };

    // match a document with key value pairs
    ($($key:tt : $value:tt),* $(,)? ) => {
        {
            #[allow(unused_imports)]
            use $crate::raw_value;

            let mut doc = $crate::options::OptionsDocument::new();
            $(
                doc.set(
                    $crate::common::unquote_key(stringify!($key)),
                    $crate::raw_value!($value),
                );
            )*
            doc
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;

    #[test]
    fn test_set_folds_aliases() {
        let mut options = OptionsDocument::new();
        options.set("order", "foo");
        options.set("select", "name");
        options.set("offset", 10);

        assert!(options.contains_key("sort"));
        assert!(options.contains_key("fields"));
        assert!(options.contains_key("skip"));
        assert!(!options.contains_key("order"));
        assert!(!options.contains_key("select"));
        assert!(!options.contains_key("offset"));
    }

    #[test]
    fn test_sort_normalizes_to_pairs() {
        let options = options! { order: "foo desc, bar" };
        assert_eq!(
            options.sort_pairs(),
            Some(vec![("foo".to_string(), -1), ("bar".to_string(), 1)])
        );
    }

    #[test]
    fn test_sort_field_named_order_is_not_aliased() {
        let options = options! { sort: "order desc" };
        assert_eq!(options.sort_pairs(), Some(vec![("order".to_string(), -1)]));
    }

    #[test]
    fn test_skip_and_limit_coerce_to_integers() {
        let options = options! { skip: "10", limit: 25.0 };
        assert_eq!(options.skip(), Some(10));
        assert_eq!(options.limit(), Some(25));
    }

    #[test]
    fn test_fields_string_splits() {
        let options = options! { fields: "name, email" };
        assert_eq!(
            options.get("fields"),
            Some(&Value::Array(vec![
                Value::from("name"),
                Value::from("email")
            ]))
        );
        assert!(options.has_fields());
    }

    #[test]
    fn test_empty_fields_unsets_key() {
        let mut options = options! { fields: "name" };
        assert!(options.has_fields());
        options.set("fields", "");
        assert!(!options.has_fields());
        assert!(!options.contains_key("fields"));
    }

    #[test]
    fn test_empty_fields_array_never_sets_key() {
        let options = options! { fields: [] };
        assert!(!options.contains_key("fields"));
        assert!(!options.has_fields());
    }

    #[test]
    fn test_unrecognized_keys_pass_through() {
        let options = options! { batch_size: 500, hint: "by_name" };
        assert_eq!(options.get("batch_size"), Some(&Value::I32(500)));
        assert_eq!(options.get("hint"), Some(&Value::from("by_name")));
    }

    #[test]
    fn test_merge_other_side_wins() {
        let base = options! { limit: 10, skip: 0 };
        let update = options! { limit: 20 };
        let merged = base.merge(&update);
        assert_eq!(merged.limit(), Some(20));
        assert_eq!(merged.skip(), Some(0));
        // inputs untouched
        assert_eq!(base.limit(), Some(10));
    }

    #[test]
    fn test_merge_in_place() {
        let mut base = options! { limit: 10 };
        base.merge_in_place(&options! { skip: 5 });
        assert_eq!(base.limit(), Some(10));
        assert_eq!(base.skip(), Some(5));
    }

    #[test]
    fn test_id_alias_folds_in_sort_fields() {
        let options = options! { order: "id desc" };
        assert_eq!(options.sort_pairs(), Some(vec![("_id".to_string(), -1)]));
    }

    #[test]
    fn test_equality_compares_source_only() {
        let a = options! { limit: 10 };
        let b = options! { limit: 10 };
        assert_eq!(a, b);
        assert_ne!(a, options! { limit: 11 });
    }

    #[test]
    fn test_display_renders_canonical_shape() {
        let options = options! { limit: "25" };
        assert_eq!(format!("{}", options), "{\"limit\": 25}");
    }

    #[test]
    fn test_null_skip_stays_null() {
        let options = options! { skip: (Value::Null) };
        assert_eq!(options.get("skip"), Some(&Value::Null));
        assert_eq!(options.skip(), None);
    }
}
