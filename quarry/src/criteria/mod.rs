//! The canonical filter document and its building blocks.
//!
//! A [CriteriaDocument] maps canonical keys to canonical values and is the
//! filter half of the `(filter, options)` pair handed to a query-execution
//! layer. Criteria are built from loose input through [`set`], composed
//! fluently with [FieldToken]s from [`field`], and AND-combined with
//! [`merge`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use quarry::criteria::{field, CriteriaDocument};
//!
//! let mut criteria = CriteriaDocument::new();
//! criteria.set("author", "cormac");
//! criteria.set(field("age").gt(), 12);
//! criteria.set(field("age").lt(), 20);
//!
//! let merged = criteria.merge(&other_criteria)?;
//! assert!(!merged.is_simple());
//! ```
//!
//! [`set`]: CriteriaDocument::set
//! [`merge`]: CriteriaDocument::merge

mod criteria_document;
mod field_token;
mod merge;
mod object_id;

pub use criteria_document::*;
pub use field_token::*;
pub use object_id::*;
