//! Registry of secondary indexes keyed by (collection key path, field)

use std::collections::HashMap;

use super::btree::{IndexKey, IndexTree, KindMismatch};
use super::IndexReadMode;
use crate::document::{Document, DocumentId, KeyPath};

/// All secondary indexes of a store.
///
/// Indexes are derived state: they mirror the documents of their
/// collection and are updated after every write.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    indexes: HashMap<(KeyPath, String), IndexTree>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `field` is indexed for the collection at `key_path`
    pub fn contains(&self, key_path: &KeyPath, field: &str) -> bool {
        self.indexes
            .contains_key(&(key_path.clone(), field.to_string()))
    }

    /// Creates (or rebuilds) the index over the given documents.
    ///
    /// Documents without an identifier or with a non-indexable value are
    /// left out.
    pub fn create<'a>(
        &mut self,
        key_path: &KeyPath,
        field: &str,
        id_prop: &str,
        documents: impl IntoIterator<Item = &'a Document>,
    ) {
        let mut tree = IndexTree::new();
        for doc in documents {
            if let Some((key, id)) = Self::entry(doc, field, id_prop) {
                tree.insert(key, id);
            }
        }
        self.indexes
            .insert((key_path.clone(), field.to_string()), tree);
    }

    /// Reads identifiers from one index.
    ///
    /// Returns None when the index does not exist.
    pub fn read(
        &self,
        key_path: &KeyPath,
        field: &str,
        mode: IndexReadMode,
        value: &serde_json::Value,
    ) -> Option<Result<Vec<DocumentId>, KindMismatch>> {
        let tree = self.indexes.get(&(key_path.clone(), field.to_string()))?;
        Some(tree.read(mode, &IndexKey::from_json(value)))
    }

    /// Adds a freshly written document to every index of its collection
    pub fn on_insert(&mut self, key_path: &KeyPath, id_prop: &str, doc: &Document) {
        for ((path, field), tree) in self.indexes.iter_mut() {
            if path != key_path {
                continue;
            }
            if let Some((key, id)) = Self::entry(doc, field, id_prop) {
                tree.insert(key, id);
            }
        }
    }

    /// Removes a document from every index of its collection
    pub fn on_remove(&mut self, key_path: &KeyPath, id_prop: &str, doc: &Document) {
        for ((path, field), tree) in self.indexes.iter_mut() {
            if path != key_path {
                continue;
            }
            if let Some((key, id)) = Self::entry(doc, field, id_prop) {
                tree.remove(&key, &id);
            }
        }
    }

    /// Empties every index of a removed collection.
    ///
    /// Index definitions survive so new documents keep being indexed.
    pub fn clear_collection(&mut self, key_path: &KeyPath) {
        for ((path, _), tree) in self.indexes.iter_mut() {
            if path == key_path {
                tree.clear();
            }
        }
    }

    fn entry(doc: &Document, field: &str, id_prop: &str) -> Option<(IndexKey, DocumentId)> {
        let key = IndexKey::from_json(doc.get(field)?);
        let id = doc.id(id_prop)?;
        Some((key, id))
    }
}
