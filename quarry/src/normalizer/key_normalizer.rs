use indexmap::IndexMap;

use crate::common::{
    DOC_ID, FIELDS_KEY, ID_ALIAS, OFFSET_ALIAS, ORDER_ALIAS, SELECT_ALIAS, SKIP_KEY, SORT_KEY,
};

/// Maps an input key to its canonical form.
///
/// Criteria and options documents hold one of these behind a trait object so
/// each can fold a different set of aliases. Implementations must be pure:
/// the same input always maps to the same output.
pub trait KeyNormalizer: Send + Sync {
    /// Returns the canonical form of `key`.
    fn normalize(&self, key: &str) -> String;
}

/// The criteria-side key normalizer: folds `id` to `_id` and passes every
/// other key through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaKeyNormalizer;

impl KeyNormalizer for CriteriaKeyNormalizer {
    fn normalize(&self, key: &str) -> String {
        if key == ID_ALIAS {
            DOC_ID.to_string()
        } else {
            key.to_string()
        }
    }
}

/// A key normalizer backed by a fixed alias table. Keys found in the table
/// are replaced by their canonical form; all other keys pass through.
#[derive(Debug, Clone, Default)]
pub struct AliasKeyNormalizer {
    aliases: IndexMap<String, String>,
}

impl AliasKeyNormalizer {
    pub fn new<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        AliasKeyNormalizer {
            aliases: aliases
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyNormalizer for AliasKeyNormalizer {
    fn normalize(&self, key: &str) -> String {
        match self.aliases.get(key) {
            Some(canonical) => canonical.clone(),
            None => key.to_string(),
        }
    }
}

/// The options-side alias table: `order → sort`, `select → fields`,
/// `offset → skip`, `id → _id`.
pub fn options_key_normalizer() -> AliasKeyNormalizer {
    AliasKeyNormalizer::new([
        (ORDER_ALIAS, SORT_KEY),
        (SELECT_ALIAS, FIELDS_KEY),
        (OFFSET_ALIAS, SKIP_KEY),
        (ID_ALIAS, DOC_ID),
    ])
}
