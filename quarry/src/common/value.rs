use chrono::{DateTime, FixedOffset, Local, Utc};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

use crate::criteria::{CriteriaDocument, FieldToken, ObjectId};

/// An insertion-ordered mapping from modifier name (`$gt`, `$in`, ...) to its
/// operand value.
pub type ModifierMap = IndexMap<String, Value>;

/// An insertion-ordered mapping used for raw, not-yet-normalized map input.
pub type RawMap = IndexMap<String, Value>;

/// Compare two floats for equality with proper NaN handling.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Canonical bit pattern for hashing floats consistently with `num_eq_float`.
#[inline]
fn canonical_f64_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        // -0.0 == 0.0, so they must hash the same
        0f64.to_bits()
    } else {
        f.to_bits()
    }
}

/// Represents a single value inside a criteria or options document.
///
/// # Purpose
/// Provides the closed tagged union every normalizer dispatches on. It covers
/// the canonical scalar types, the structured shapes a normalized document is
/// built from, and raw input shapes (`Map`, `Token`) that only appear before
/// normalization.
///
/// # Variants
/// - Scalars: `Null`, `Bool`, `I32`, `I64`, `F64`, `String`, `DateTime`,
///   `ObjectId`, `Pattern`
/// - `Array`: an ordered sequence of values (raw input, or the operand of a
///   modifier such as `$in` or `$all`)
/// - `Modifiers`: an ordered map of `$`-prefixed operator names to operands
/// - `Document`: a nested criteria document for nested field paths
/// - `Documents`: an ordered sequence of criteria documents; only ever the
///   operand of `$or`, `$and`, or `$nor`
/// - `Map`: raw, not-yet-normalized map input
/// - `Token`: raw field/comparator token input, consumed by normalizers
///
/// # Characteristics
/// - **Comparable**: equality is structural; integers compare across widths
///   and NaN equals NaN, so merge deduplication behaves predictably
/// - **Hashable**: `Hash` is consistent with `Eq`, including for maps whose
///   keys were inserted in different orders
/// - **Default**: defaults to `Null`
#[derive(Clone, Default)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 32-bit integer value.
    I32(i32),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a string value.
    String(String),
    /// Represents a timestamp. Canonical documents always carry these with a
    /// zero UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Represents an opaque document identifier.
    ObjectId(ObjectId),
    /// Represents a regular expression pattern. Compared by pattern source.
    Pattern(Regex),
    /// Represents an ordered sequence of values.
    Array(Vec<Value>),
    /// Represents an ordered modifier map (`$gt`, `$in`, ...).
    Modifiers(ModifierMap),
    /// Represents a nested criteria document.
    Document(CriteriaDocument),
    /// Represents the operand of a nesting operator (`$or`, `$and`, `$nor`).
    Documents(Vec<CriteriaDocument>),
    /// Raw map input; normalizers convert this to `Modifiers` or `Document`.
    Map(RawMap),
    /// Raw field/comparator token input.
    Token(FieldToken),
}

impl Value {
    /// Returns true if the value is `Null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value is one of the map-shaped variants
    /// (`Modifiers`, `Document`, or raw `Map`).
    #[inline]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Modifiers(_) | Value::Document(_) | Value::Map(_))
    }

    /// Returns the inner map for any map-shaped variant.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Modifiers(map) | Value::Map(map) => Some(map),
            Value::Document(doc) => Some(doc.to_map()),
            _ => None,
        }
    }

    /// Consumes a map-shaped variant and returns the inner map.
    pub fn into_map(self) -> Option<IndexMap<String, Value>> {
        match self {
            Value::Modifiers(map) | Value::Map(map) => Some(map),
            Value::Document(doc) => Some(doc.into_map()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::I32(_) | Value::I64(_))
    }

    pub(crate) fn as_integer(&self) -> Option<i128> {
        match self {
            Value::I32(v) => Some(*v as i128),
            Value::I64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Wraps an already-normalized map as `Modifiers` when any key is a
    /// modifier, else as a nested `Document`. Mixed maps keep every key and
    /// classify as `Modifiers`.
    pub(crate) fn classify_map(map: IndexMap<String, Value>) -> Value {
        if map.keys().any(|key| crate::common::is_modifier(key)) {
            Value::Modifiers(map)
        } else {
            Value::Document(CriteriaDocument::from_normalized(map))
        }
    }

    /// A short name for the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I32(_) | Value::I64(_) => "integer",
            Value::F64(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::ObjectId(_) => "object id",
            Value::Pattern(_) => "pattern",
            Value::Array(_) => "array",
            Value::Modifiers(_) => "modifier map",
            Value::Document(_) => "document",
            Value::Documents(_) => "document array",
            Value::Map(_) => "map",
            Value::Token(_) => "field token",
        }
    }
}

/// Hashes a map so that two maps holding the same pairs in different
/// insertion orders hash identically, matching map equality.
pub fn unordered_map_hash<H: Hasher>(map: &IndexMap<String, Value>, state: &mut H) {
    let mut acc: u64 = 0;
    for (key, value) in map {
        let mut pair_hasher = DefaultHasher::new();
        key.hash(&mut pair_hasher);
        value.hash(&mut pair_hasher);
        acc = acc.wrapping_add(pair_hasher.finish());
    }
    state.write_u64(acc);
    state.write_usize(map.len());
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.is_integer() && other.is_integer() {
            return self.as_integer() == other.as_integer();
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => num_eq_float(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::ObjectId(a), Value::ObjectId(b)) => a == b,
            (Value::Pattern(a), Value::Pattern(b)) => a.as_str() == b.as_str(),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Modifiers(a), Value::Modifiers(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (Value::Documents(a), Value::Documents(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Token(a), Value::Token(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Bool(v) => {
                state.write_u8(1);
                v.hash(state);
            }
            // all integer widths share one tag so cross-width equality holds
            Value::I32(_) | Value::I64(_) => {
                state.write_u8(2);
                self.as_integer().hash(state);
            }
            Value::F64(v) => {
                state.write_u8(3);
                state.write_u64(canonical_f64_bits(*v));
            }
            Value::String(v) => {
                state.write_u8(4);
                v.hash(state);
            }
            Value::DateTime(v) => {
                state.write_u8(5);
                v.timestamp().hash(state);
                v.timestamp_subsec_nanos().hash(state);
            }
            Value::ObjectId(v) => {
                state.write_u8(6);
                v.hash(state);
            }
            Value::Pattern(v) => {
                state.write_u8(7);
                v.as_str().hash(state);
            }
            Value::Array(items) => {
                state.write_u8(8);
                items.hash(state);
            }
            Value::Modifiers(map) => {
                state.write_u8(9);
                unordered_map_hash(map, state);
            }
            Value::Document(doc) => {
                state.write_u8(10);
                doc.hash(state);
            }
            Value::Documents(docs) => {
                state.write_u8(11);
                docs.hash(state);
            }
            Value::Map(map) => {
                state.write_u8(12);
                unordered_map_hash(map, state);
            }
            Value::Token(token) => {
                state.write_u8(13);
                token.hash(state);
            }
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::DateTime(v) => write!(f, "\"{}\"", v.to_rfc3339()),
            Value::ObjectId(v) => write!(f, "ObjectId(\"{}\")", v),
            Value::Pattern(v) => write!(f, "/{}/", v.as_str()),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Modifiers(map) | Value::Map(map) => write_map(f, map),
            Value::Document(doc) => write!(f, "{}", doc),
            Value::Documents(docs) => {
                write!(f, "[")?;
                for (i, doc) in docs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", doc)?;
                }
                write!(f, "]")
            }
            Value::Token(token) => write!(f, "{}", token),
        }
    }
}

/// Renders a map in the canonical `{"key": value}` form used by [Display]
/// impls across the crate.
pub fn write_map(f: &mut Formatter<'_>, map: &IndexMap<String, Value>) -> std::fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:?}: {}", key, value)?;
    }
    write!(f, "}}")
}

/// Strips the quotes a string-literal key keeps after `stringify!`, so the
/// `criteria!`/`options!` macros accept both identifier and `"$gt"` keys.
pub fn unquote_key(key: &str) -> &str {
    key.trim_matches('"')
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::I64(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value.fixed_offset())
    }
}

impl From<DateTime<Local>> for Value {
    fn from(value: DateTime<Local>) -> Self {
        Value::DateTime(value.fixed_offset())
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::ObjectId(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Value::Pattern(value)
    }
}

impl From<FieldToken> for Value {
    fn from(value: FieldToken) -> Self {
        Value::Token(value)
    }
}

impl From<CriteriaDocument> for Value {
    fn from(value: CriteriaDocument) -> Self {
        Value::Document(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(|v| v.into()).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Creates a [Value] from any convertible expression.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::val;
///
/// let int_value = val!(42);
/// let string_value = val!("hello");
/// let list = val!(vec![1, 2, 3]);
/// ```
#[macro_export]
macro_rules! val {
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

/// Helper macro converting values for the `criteria!` and `options!` macros.
/// Handles nested maps, arrays, and expressions.
#[macro_export]
macro_rules! raw_value {
    // match a nested raw map
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            #[allow(unused_mut)]
            let mut map = $crate::common::RawMap::new();
            $(
                map.insert(
                    $crate::common::unquote_key(stringify!($key)).to_string(),
                    $crate::raw_value!($value),
                );
            )*
            $crate::common::Value::Map(map)
        }
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::raw_value!($value)),*])
    };

    // match an expression (variable, function call, arithmetic in parens, literals, etc.)
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
