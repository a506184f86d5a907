use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::common::{
    unordered_map_hash, write_map, ModifierMap, Value, CONDITIONS_KEY, DOC_ID, TYPE_NAME,
};
use crate::criteria::merge::merge_sources;
use crate::criteria::FieldToken;
use crate::errors::{ErrorKind, QuarryError, QuarryResult};
use crate::normalizer::{
    flatten_values, CriteriaKeyNormalizer, CriteriaValueNormalizer, KeyNormalizer,
    NormalizerContext, ValueNormalizer,
};

/// An input key for [`CriteriaDocument::set`]: a plain field name or a
/// [FieldToken] carrying a comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Name(String),
    Token(FieldToken),
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Name(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Name(value)
    }
}

impl From<FieldToken> for Key {
    fn from(value: FieldToken) -> Self {
        Key::Token(value)
    }
}

/// The canonical filter document.
///
/// A `CriteriaDocument` maps canonical keys to canonical [Value]s. Input goes
/// through the injected key and value normalizers on every [`set`], so the
/// stored mapping is always in the shape the execution layer expects: field
/// comparators live in modifier maps, sequences are `$in`-wrapped, nested
/// clauses of `$or`/`$and`/`$nor` are themselves criteria documents, and
/// strings for flagged fields are converted to [ObjectId]s.
///
/// # Invariants
///
/// Every key except the three nesting operators maps to a scalar, a modifier
/// map, or a nested document; the nesting operators map only to document
/// arrays. [`merge`](CriteriaDocument::merge) preserves these invariants and
/// never mutates its inputs.
///
/// # Concurrency
///
/// A document is plain owned data: share it freely for concurrent reads, but
/// a single instance must be owned by one writer. Clone before branching into
/// independent query variants; clones are deep copies that share no
/// structure, including the object-id field set.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::criteria::{field, CriteriaDocument};
///
/// let mut criteria = CriteriaDocument::new();
/// criteria.set("author", "cormac");
/// criteria.set(field("age").gt(), 12);
/// criteria.set(field("age").lt(), 20);
/// // {"author": "cormac", "age": {"$gt": 12, "$lt": 20}}
/// ```
#[derive(Clone)]
pub struct CriteriaDocument {
    source: IndexMap<String, Value>,
    object_id_fields: BTreeSet<String>,
    key_normalizer: Arc<dyn KeyNormalizer>,
    value_normalizer: Arc<dyn ValueNormalizer>,
}

impl CriteriaDocument {
    /// Creates an empty document with the default normalizers.
    pub fn new() -> Self {
        CriteriaDocument::with_normalizers(
            Arc::new(CriteriaKeyNormalizer),
            Arc::new(CriteriaValueNormalizer),
        )
    }

    /// Creates an empty document with custom strategy objects, e.g. a wider
    /// alias table.
    pub fn with_normalizers(
        key_normalizer: Arc<dyn KeyNormalizer>,
        value_normalizer: Arc<dyn ValueNormalizer>,
    ) -> Self {
        CriteriaDocument {
            source: IndexMap::new(),
            object_id_fields: BTreeSet::new(),
            key_normalizer,
            value_normalizer,
        }
    }

    /// Builds a document by normalizing every pair of a raw input map.
    pub fn from_map(map: IndexMap<String, Value>) -> Self {
        let mut document = CriteriaDocument::new();
        for (key, value) in map {
            document.set(key, value);
        }
        document
    }

    /// Wraps an already-normalized source map without running normalizers.
    pub(crate) fn from_normalized(source: IndexMap<String, Value>) -> Self {
        let mut document = CriteriaDocument::new();
        document.source = source;
        document
    }

    /// Sets a key to a value, normalizing both.
    ///
    /// Three entry paths share the same value normalizer:
    ///
    /// 1. A [FieldToken] key expands to a modifier entry and merges into the
    ///    modifier map already stored for that field, so
    ///    `set(field("age").gt(), 5)` and `set(field("age").lt(), 10)`
    ///    compose instead of overwriting each other.
    /// 2. The `conditions` key treats its value as a raw map and sets each of
    ///    its pairs (bulk raw injection).
    /// 3. Any other key is canonicalized and its value stored.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        match key.into() {
            Key::Token(token) => {
                let field = self.key_normalizer.normalize(token.field());
                let operator = token.comparator().modifier();
                let normalized = self.normalized_value(&field, operator, value.into());
                self.set_modifier(field, operator, normalized);
            }
            Key::Name(name) => {
                if name == CONDITIONS_KEY {
                    match value.into() {
                        Value::Map(map) => {
                            for (sub_key, sub_value) in map {
                                self.set(sub_key, sub_value);
                            }
                        }
                        Value::Document(document) => {
                            for (sub_key, sub_value) in document.into_map() {
                                self.set(sub_key, sub_value);
                            }
                        }
                        Value::Modifiers(map) => {
                            for (sub_key, sub_value) in map {
                                self.set(sub_key, sub_value);
                            }
                        }
                        other => {
                            // not a map; store it like any other key
                            let key = self.key_normalizer.normalize(&name);
                            let normalized = self.normalized_value(&key, &key, other);
                            self.source.insert(key, normalized);
                        }
                    }
                } else {
                    let key = self.key_normalizer.normalize(&name);
                    let normalized = self.normalized_value(&key, &key, value.into());
                    self.source.insert(key, normalized);
                }
            }
        }
    }

    fn set_modifier(&mut self, field: String, operator: &str, value: Value) {
        match self.source.get_mut(&field) {
            Some(slot) => match slot {
                Value::Modifiers(modifiers) => {
                    modifiers.insert(operator.to_string(), value);
                }
                Value::Document(_) => {
                    // a plain nested document gains a modifier key; the slot
                    // reclassifies as a (mixed) modifier map
                    if let Value::Document(document) = std::mem::take(slot) {
                        let mut map = document.into_map();
                        map.insert(operator.to_string(), value);
                        *slot = Value::Modifiers(map);
                    }
                }
                _ => {
                    // anything else loses the slot to a fresh modifier map
                    let mut modifiers = ModifierMap::new();
                    modifiers.insert(operator.to_string(), value);
                    *slot = Value::Modifiers(modifiers);
                }
            },
            None => {
                let mut modifiers = ModifierMap::new();
                modifiers.insert(operator.to_string(), value);
                self.source.insert(field, Value::Modifiers(modifiers));
            }
        }
    }

    fn normalized_value(&self, parent_key: &str, key: &str, value: Value) -> Value {
        let cx = NormalizerContext::new(
            &self.object_id_fields,
            &self.key_normalizer,
            &self.value_normalizer,
        );
        self.value_normalizer.normalize(&cx, parent_key, key, value)
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
    /// call as the filter half of `(filter, options)`.
    pub fn to_map(&self) -> &IndexMap<String, Value> {
        &self.source
    }

    pub fn into_map(self) -> IndexMap<String, Value> {
        self.source
    }

    /// The fields whose string values are converted to object ids.
    pub fn object_id_fields(&self) -> &BTreeSet<String> {
        &self.object_id_fields
    }

    pub fn is_object_id_field(&self, key: &str) -> bool {
        self.object_id_fields.contains(key)
    }

    /// Replaces the object-id field set.
    pub fn set_object_id_fields(&mut self, fields: impl IntoIterator<Item = String>) {
        self.object_id_fields = fields.into_iter().collect();
    }

    /// Replaces the object-id field set from a raw value. The value must be
    /// an array of field names (nested arrays are flattened); anything else
    /// is rejected. This is the one validated input at this layer.
    pub fn set_object_ids(&mut self, value: Value) -> QuarryResult<()> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                log::error!("object_ids must be an array, got {}", other.type_name());
                return Err(QuarryError::new(
                    &format!("object_ids must be an array, got {}", other.type_name()),
                    ErrorKind::ValidationError,
                ));
            }
        };

        let mut fields = BTreeSet::new();
        for item in flatten_values(items) {
            match item {
                Value::String(name) => {
                    fields.insert(name);
                }
                other => {
                    log::error!(
                        "object_ids entries must be field names, got {}",
                        other.type_name()
                    );
                    return Err(QuarryError::new(
                        &format!(
                            "object_ids entries must be field names, got {}",
                            other.type_name()
                        ),
                        ErrorKind::ValidationError,
                    ));
                }
            }
        }
        self.object_id_fields = fields;
        Ok(())
    }

    /// Returns true when the key set is exactly `{_id}` or `{_id, _type}`,
    /// the fast-path signal that a caller may answer this filter from an
    /// identity map instead of running a query.
    pub fn is_simple(&self) -> bool {
        match self.source.len() {
            1 => self.source.contains_key(DOC_ID),
            2 => self.source.contains_key(DOC_ID) && self.source.contains_key(TYPE_NAME),
            _ => false,
        }
    }

    /// AND-combines this document with another, returning a new document.
    ///
    /// Neither input is mutated, and the result shares no structure with
    /// either; it carries this document's object-id field set and
    /// normalizers. Compound `$or` clauses on both sides fold into a single
    /// `$and` so both disjunctions keep applying conjunctively.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::IncompatibleMerge` when the two values at a key
    /// have shapes that cannot be conjoined (e.g. a document array against a
    /// scalar) rather than silently dropping one side.
    pub fn merge(&self, other: &CriteriaDocument) -> QuarryResult<CriteriaDocument> {
        let source = merge_sources(&self.source, &other.source)?;
        Ok(CriteriaDocument {
            source,
            object_id_fields: self.object_id_fields.clone(),
            key_normalizer: Arc::clone(&self.key_normalizer),
            value_normalizer: Arc::clone(&self.value_normalizer),
        })
    }

    /// AND-combines another document into this one in place.
    pub fn merge_in_place(&mut self, other: &CriteriaDocument) -> QuarryResult<()> {
        self.source = merge_sources(&self.source, &other.source)?;
        Ok(())
    }
}

impl Default for CriteriaDocument {
    fn default() -> Self {
        CriteriaDocument::new()
    }
}

impl PartialEq for CriteriaDocument {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CriteriaDocument {}

impl Hash for CriteriaDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        unordered_map_hash(&self.source, state);
    }
}

impl Display for CriteriaDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_map(f, &self.source)
    }
}

impl Debug for CriteriaDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// Builds a [CriteriaDocument] from raw key-value pairs, normalizing each
/// one.
///
/// Keys can be bare identifiers or string literals (for `$`-prefixed
/// operators); values can be literals, expressions in parentheses, arrays,
/// or nested maps in braces.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::criteria;
///
/// let simple = criteria! { author: "cormac" };
/// let ranged = criteria! { age: { "$gt": 20, "$lt": 40 } };
/// let either = criteria! { "$or": [{ age: 20 }, { age: 40 }] };
/// ```
#[macro_export]
macro_rules! criteria {
    // match an empty document
    () => {
        $crate::criteria::CriteriaDocument::new()
    };

    // match a document with key value pairs (with outer braces)
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::criteria!($($key : $value),*)
    };

    // match a document with key value pairs
    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::raw_value;

            let mut doc = $crate::criteria::CriteriaDocument::new();
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
