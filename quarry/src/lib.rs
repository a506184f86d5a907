#![allow(
    dead_code,
    unused_imports,
)]
//! # Quarry - Criteria and Options Normalization Engine
//!
//! Quarry compiles loosely-typed, ergonomic query fragments into the two
//! canonical documents a document-database query call expects: a filter
//! (criteria) document and an options document. It also defines the
//! conjunction-merge algorithm that AND-combines two normalized filters
//! while preserving boolean semantics.
//!
//! ## Key Features
//!
//! - **Permissive input**: field names, `$`-operator maps, arrays, strings,
//!   timestamps, and fluent field tokens all normalize through one recursive
//!   value normalizer
//! - **Fluent tokens**: `field("age").gt()` builds typed (field, comparator)
//!   tokens that compose into modifier maps without clobbering each other
//! - **Conjunction merge**: `$or`/`$and`/`$nor` folding, modifier-map
//!   combination, and order-preserving `$in` unions, with no mutation of the
//!   inputs
//! - **Object-id folding**: fields flagged as identifier fields convert
//!   legal id strings to opaque [ObjectId](criteria::ObjectId)s and leave
//!   everything else alone
//! - **Canonical options**: `sort`/`fields`/`skip`/`limit` canonicalization
//!   with alias folding and passthrough for driver-specific keys
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quarry::criteria::{field, CriteriaDocument};
//! use quarry::options::OptionsDocument;
//!
//! let mut criteria = CriteriaDocument::new();
//! criteria.set("author", "cormac");
//! criteria.set(field("age").gt(), 12);
//! criteria.set(field("age").lt(), 20);
//!
//! let mut options = OptionsDocument::new();
//! options.set("order", "created_at desc");
//! options.set("limit", 25);
//!
//! // hand off to the execution layer
//! let filter = criteria.to_map();
//! let opts = options.to_map();
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - The [Value](common::Value) union, constants, and shared
//!   helpers
//! - [`criteria`] - The criteria document, merge algorithm, field tokens,
//!   and object ids
//! - [`errors`] - Error types and result definitions
//! - [`normalizer`] - Key and value normalizers (the injectable strategy
//!   objects)
//! - [`options`] - The options document
//!
//! Quarry performs no I/O, executes no queries, and validates nothing beyond
//! producing well-formed documents; cursors, pagination, and fluent query
//! builders are layers on top of it.

use crate::common::*;

pub mod common;
pub mod criteria;
pub mod errors;
pub mod normalizer;
pub mod options;

use crate::criteria::ObjectId;

/// Converts a string value to an [ObjectId] when it parses as one.
///
/// This is the lenient conversion the value normalizer uses for flagged
/// object-id fields: a value that is not a string, or a string that is not a
/// legal id, is returned unchanged. It never errors, so ordinary string
/// fields are never mistakenly rejected.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::{to_object_id, common::Value};
///
/// let converted = to_object_id(Value::from("4f8d8c66e5a4e45396000009"));
/// let untouched = to_object_id(Value::from("not an id"));
/// ```
pub fn to_object_id(value: Value) -> Value {
    match value {
        Value::String(candidate) => match ObjectId::parse_str(&candidate) {
            Ok(id) => Value::ObjectId(id),
            Err(_) => Value::String(candidate),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_object_id_converts_legal_strings() {
        let hex = "4f8d8c66e5a4e45396000009";
        let converted = to_object_id(Value::from(hex));
        assert_eq!(converted, Value::ObjectId(ObjectId::parse_str(hex).unwrap()));
    }

    #[test]
    fn test_to_object_id_keeps_illegal_strings() {
        let original = Value::from("not an id");
        assert_eq!(to_object_id(original.clone()), original);
    }

    #[test]
    fn test_to_object_id_keeps_non_strings() {
        assert_eq!(to_object_id(Value::Null), Value::Null);
        assert_eq!(to_object_id(Value::I64(42)), Value::I64(42));
    }

    #[test]
    fn test_is_modifier_helper() {
        assert!(is_modifier("$gt"));
        assert!(!is_modifier("age"));
    }
}
