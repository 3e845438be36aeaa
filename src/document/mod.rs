//! Document model for docquery
//!
//! Documents are addressed by key paths. A key path names a collection
//! (`["people"]`) or, extended with an identifier, a single document
//! (`["people", 7]`).
//!
//! Documents are never mutated once read: filtering and projection
//! always produce new values.

mod document;
mod key_path;

pub use document::Document;
pub use key_path::{DocumentId, KeyPath, Segment};
