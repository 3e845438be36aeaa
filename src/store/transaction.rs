//! Collaborator interfaces consumed by the query core
//!
//! A transaction reads documents by key path; its index reader answers
//! whether a (collection, field) index exists and performs ordered reads
//! against it. Both return boxed futures so implementations can suspend
//! on real I/O.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use super::errors::StoreResult;
use crate::document::{Document, DocumentId, KeyPath, Segment};
use crate::index::IndexReadMode;

/// Future returned by store reads
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// An ordered key-value transaction holding documents
pub trait Transaction: Send + Sync {
    /// Index reader bound to this transaction
    type Index: IndexReader;

    /// Field carrying document identifiers
    fn id_prop(&self) -> &str;

    /// Reads every document directly under a collection key path, or the
    /// single document at a collection path extended by an identifier.
    ///
    /// A missing document yields an empty sequence, not an error.
    fn get<'a>(&'a self, key_path: &'a KeyPath) -> StoreFuture<'a, Vec<Document>>;

    /// Index reader reading through this transaction
    fn index(&self) -> &Self::Index;
}

/// Read access to secondary indexes
pub trait IndexReader: Send + Sync {
    /// Returns true if `field` is indexed for the collection at `key_path`
    fn index_exists<'a>(&'a self, key_path: &'a KeyPath, field: &'a str) -> StoreFuture<'a, bool>;

    /// Performs an index-accelerated read.
    ///
    /// Hits come back in the index's key order.
    fn read_index<'a>(
        &'a self,
        mode: IndexReadMode,
        tuple: &'a IndexTuple,
    ) -> StoreFuture<'a, Vec<IndexHit>>;
}

/// Addresses one index read: (key path..., field, value)
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTuple {
    pub key_path: KeyPath,
    pub field: String,
    pub value: Value,
}

impl IndexTuple {
    pub fn new(key_path: KeyPath, field: impl Into<String>, value: Value) -> Self {
        Self {
            key_path,
            field: field.into(),
            value,
        }
    }

    /// The index subspace the tuple reads from: key path segments
    /// followed by the field name
    pub fn subspace(&self) -> KeyPath {
        self.key_path.child(Segment::from(self.field.as_str()))
    }
}

/// One result of an index read
#[derive(Debug, Clone, PartialEq)]
pub enum IndexHit {
    /// Bare identifier; the document must be fetched separately
    Id(DocumentId),
    /// Document (possibly partial) carried by the index
    Document(Document),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tuple_subspace() {
        let tuple = IndexTuple::new(KeyPath::from(["tests", "people"]), "balance", json!(30));
        assert_eq!(tuple.subspace().to_string(), "tests/people/balance");
        assert_eq!(tuple.value, json!(30));
    }
}
