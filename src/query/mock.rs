//! Scripted transaction for pipeline tests

use std::collections::HashSet;
use std::sync::Mutex;

use crate::document::{Document, KeyPath};
use crate::index::IndexReadMode;
use crate::store::{IndexHit, IndexReader, IndexTuple, StoreError, StoreFuture, Transaction};

/// Index returning canned hits for the configured fields
#[derive(Debug, Default)]
pub(crate) struct MockIndex {
    pub fields: HashSet<String>,
    pub hits: Vec<IndexHit>,
    pub reads: Mutex<Vec<(IndexReadMode, IndexTuple)>>,
}

impl IndexReader for MockIndex {
    fn index_exists<'a>(&'a self, _key_path: &'a KeyPath, field: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.fields.contains(field)) })
    }

    fn read_index<'a>(
        &'a self,
        mode: IndexReadMode,
        tuple: &'a IndexTuple,
    ) -> StoreFuture<'a, Vec<IndexHit>> {
        Box::pin(async move {
            self.reads.lock().unwrap().push((mode, tuple.clone()));
            Ok(self.hits.clone())
        })
    }
}

/// One collection of documents, with every get recorded
#[derive(Debug)]
pub(crate) struct MockTransaction {
    pub collection: KeyPath,
    pub docs: Vec<Document>,
    pub index: MockIndex,
    pub gets: Mutex<Vec<KeyPath>>,
    pub fail_gets: bool,
}

impl MockTransaction {
    pub fn new(collection: impl Into<KeyPath>, docs: Vec<serde_json::Value>) -> Self {
        Self {
            collection: collection.into(),
            docs: docs
                .into_iter()
                .map(|v| Document::try_from(v).unwrap())
                .collect(),
            index: MockIndex::default(),
            gets: Mutex::new(Vec::new()),
            fail_gets: false,
        }
    }

    pub fn with_index(mut self, field: &str, hits: Vec<IndexHit>) -> Self {
        self.index.fields.insert(field.to_string());
        self.index.hits = hits;
        self
    }

    /// Single-document gets issued so far
    pub fn document_gets(&self) -> Vec<KeyPath> {
        self.gets
            .lock()
            .unwrap()
            .iter()
            .filter(|p| **p != self.collection)
            .cloned()
            .collect()
    }

    pub fn collection_gets(&self) -> usize {
        self.gets
            .lock()
            .unwrap()
            .iter()
            .filter(|p| **p == self.collection)
            .count()
    }
}

impl Transaction for MockTransaction {
    type Index = MockIndex;

    fn id_prop(&self) -> &str {
        "_id"
    }

    fn get<'a>(&'a self, key_path: &'a KeyPath) -> StoreFuture<'a, Vec<Document>> {
        Box::pin(async move {
            self.gets.lock().unwrap().push(key_path.clone());
            if self.fail_gets {
                return Err(StoreError::unavailable("scripted failure"));
            }
            if *key_path == self.collection {
                return Ok(self.docs.clone());
            }
            let (parent, leaf) = key_path.parent_and_leaf().unwrap();
            assert_eq!(parent, self.collection);
            Ok(self
                .docs
                .iter()
                .filter(|d| d.id("_id").as_ref() == Some(leaf))
                .cloned()
                .collect())
        })
    }

    fn index(&self) -> &MockIndex {
        &self.index
    }
}
