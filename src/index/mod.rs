//! Secondary index subsystem for docquery
//!
//! Indexes are ordered, in-memory structures mapping one field of one
//! collection to document identifiers. The query core only reads them
//! through the store's `IndexReader`; this module backs the in-memory
//! store.
//!
//! # Invariants
//!
//! - Reads return identifiers in key order
//! - Identifiers sharing a key are sorted ascending
//! - Every JSON value is indexed; null, arrays and objects support
//!   equality reads only
//! - A range read over stored keys of another kind fails

mod btree;
mod registry;

pub use btree::{IndexKey, IndexTree, KindMismatch};
pub use registry::IndexRegistry;

use std::fmt;

/// The five ordered-comparison read modes an index supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexReadMode {
    /// Exact match
    Eq,
    /// Open lower bound
    Gt,
    /// Closed lower bound
    Gte,
    /// Open upper bound
    Lt,
    /// Closed upper bound
    Lte,
}

impl IndexReadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexReadMode::Eq => "eq",
            IndexReadMode::Gt => "gt",
            IndexReadMode::Gte => "gte",
            IndexReadMode::Lt => "lt",
            IndexReadMode::Lte => "lte",
        }
    }
}

impl fmt::Display for IndexReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
