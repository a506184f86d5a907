//! The canonical options document.
//!
//! An [OptionsDocument] canonicalizes the query options that accompany a
//! filter: projection (`fields`), ordering (`sort`), and paging
//! (`skip`/`limit`), with alias folding for the ergonomic spellings
//! (`select`, `order`, `offset`). Keys it does not recognize pass through
//! untouched for driver-specific extensions.

mod options_document;

pub use options_document::*;
