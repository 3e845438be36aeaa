//! In-memory ordered document store
//!
//! Collections live in a `BTreeMap` keyed by key path; documents inside a
//! collection are kept in identifier order. Secondary indexes are
//! maintained on every write.
//!
//! Transactions here offer no isolation: writes apply immediately and
//! `abort` only poisons the transaction handle. Fetch counters make the
//! store usable as an instrumented test double.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::transaction::{IndexHit, IndexReader, IndexTuple, StoreFuture, Transaction};
use crate::config::StoreConfig;
use crate::document::{Document, DocumentId, KeyPath};
use crate::index::{IndexReadMode, IndexRegistry};
use crate::observability::{log_event_with_fields, Event};

#[derive(Debug, Default)]
struct StoreState {
    collections: BTreeMap<KeyPath, BTreeMap<DocumentId, Document>>,
    indexes: IndexRegistry,
}

/// Read counters of a store.
///
/// Relaxed atomics: counts are exact once the counted calls completed.
#[derive(Debug, Default)]
struct FetchCounters {
    collection_gets: AtomicU64,
    document_gets: AtomicU64,
    index_reads: AtomicU64,
    per_document: Mutex<HashMap<KeyPath, u64>>,
}

impl FetchCounters {
    fn record_document_get(&self, key_path: &KeyPath) {
        self.document_gets.fetch_add(1, Ordering::Relaxed);
        let mut per_document = self
            .per_document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *per_document.entry(key_path.clone()).or_default() += 1;
    }

    fn snapshot(&self) -> FetchStats {
        let per_document = self
            .per_document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        FetchStats {
            collection_gets: self.collection_gets.load(Ordering::Relaxed),
            document_gets: self.document_gets.load(Ordering::Relaxed),
            index_reads: self.index_reads.load(Ordering::Relaxed),
            max_gets_per_document: per_document.values().copied().max().unwrap_or(0),
        }
    }

    fn reset(&self) {
        self.collection_gets.store(0, Ordering::Relaxed);
        self.document_gets.store(0, Ordering::Relaxed);
        self.index_reads.store(0, Ordering::Relaxed);
        self.per_document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

/// A point-in-time snapshot of store read counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Whole-collection reads
    pub collection_gets: u64,
    /// Single-document reads
    pub document_gets: u64,
    /// Index reads
    pub index_reads: u64,
    /// Highest number of single-document reads of any one document
    pub max_gets_per_document: u64,
}

/// In-memory document store.
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    config: Arc<StoreConfig>,
    state: Arc<RwLock<StoreState>>,
    counters: Arc<FetchCounters>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(RwLock::new(StoreState::default())),
            counters: Arc::new(FetchCounters::default()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates a secondary index on `field` for the collection at
    /// `key_path`, indexing the documents already stored there.
    pub async fn add_index(&self, key_path: impl Into<KeyPath>, field: &str) -> StoreResult<()> {
        let key_path = key_path.into();
        if key_path.is_empty() {
            return Err(StoreError::invalid_key_path("index on empty key path"));
        }

        let mut state = self.state.write().await;
        let StoreState {
            collections,
            indexes,
        } = &mut *state;
        let docs = collections.get(&key_path).into_iter().flat_map(|c| c.values());
        indexes.create(&key_path, field, &self.config.id_prop, docs);

        let path = key_path.to_string();
        log_event_with_fields(
            Event::IndexCreated,
            &[("field", field), ("key_path", path.as_str())],
        );
        Ok(())
    }

    /// Opens a transaction on this store
    pub fn transaction(&self) -> MemoryTransaction {
        let aborted = Arc::new(AtomicBool::new(false));
        MemoryTransaction {
            store: self.clone(),
            aborted: aborted.clone(),
            index: MemoryIndex {
                state: self.state.clone(),
                counters: self.counters.clone(),
                aborted,
            },
        }
    }

    pub fn stats(&self) -> FetchStats {
        self.counters.snapshot()
    }

    pub fn reset_stats(&self) {
        self.counters.reset();
    }
}

/// A transaction against a [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryTransaction {
    store: MemoryStore,
    aborted: Arc<AtomicBool>,
    index: MemoryIndex,
}

impl MemoryTransaction {
    /// Stores a document under the collection at `key_path`.
    ///
    /// A document without an identifier gets a fresh UUID. Writing an
    /// existing identifier replaces the stored document.
    pub async fn create(
        &self,
        key_path: impl Into<KeyPath>,
        document: Document,
    ) -> StoreResult<DocumentId> {
        self.check_open()?;
        let key_path = key_path.into();
        if key_path.is_empty() {
            return Err(StoreError::invalid_key_path("create on empty key path"));
        }

        let id_prop = self.store.config.id_prop.as_str();
        let mut document = document;
        let id = match document.get(id_prop) {
            Some(value) => DocumentId::from_value(value).ok_or_else(|| {
                StoreError::invalid_document(format!("{} must be an integer or string", id_prop))
            })?,
            None => {
                let id = DocumentId::Str(Uuid::new_v4().to_string());
                document.insert(id_prop, id.to_value());
                id
            }
        };

        let mut state = self.store.state.write().await;
        let previous = state
            .collections
            .entry(key_path.clone())
            .or_default()
            .insert(id.clone(), document.clone());
        if let Some(previous) = previous {
            state.indexes.on_remove(&key_path, id_prop, &previous);
        }
        state.indexes.on_insert(&key_path, id_prop, &document);

        Ok(id)
    }

    /// Removes everything under `key_path`: the document it names, the
    /// collection it names and every nested collection.
    ///
    /// Returns the number of removed documents.
    pub async fn remove(&self, key_path: impl Into<KeyPath>) -> StoreResult<usize> {
        self.check_open()?;
        let key_path = key_path.into();
        let id_prop = self.store.config.id_prop.as_str();

        let mut state = self.store.state.write().await;
        let doomed: Vec<KeyPath> = state
            .collections
            .keys()
            .filter(|path| path.starts_with(&key_path))
            .cloned()
            .collect();

        let mut removed = 0;
        for path in &doomed {
            if let Some(collection) = state.collections.remove(path) {
                removed += collection.len();
            }
            state.indexes.clear_collection(path);
        }

        if let Some((parent, leaf)) = key_path.parent_and_leaf() {
            let document = state
                .collections
                .get_mut(&parent)
                .and_then(|collection| collection.remove(leaf));
            if let Some(document) = document {
                state.indexes.on_remove(&parent, id_prop, &document);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Aborts the transaction; every later call fails
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> StoreResult<()> {
        if self.is_aborted() {
            return Err(StoreError::Aborted);
        }
        Ok(())
    }
}

impl Transaction for MemoryTransaction {
    type Index = MemoryIndex;

    fn id_prop(&self) -> &str {
        &self.store.config.id_prop
    }

    fn get<'a>(&'a self, key_path: &'a KeyPath) -> StoreFuture<'a, Vec<Document>> {
        Box::pin(async move {
            self.check_open()?;
            if key_path.is_empty() {
                return Err(StoreError::invalid_key_path("get on empty key path"));
            }

            let state = self.store.state.read().await;
            let counters = &self.store.counters;

            // A stored document wins over a nested collection at the same path
            let parent = key_path
                .parent_and_leaf()
                .and_then(|(parent, leaf)| Some((state.collections.get(&parent)?, leaf)));
            if let Some((collection, leaf)) = parent {
                if let Some(document) = collection.get(leaf) {
                    counters.record_document_get(key_path);
                    return Ok(vec![document.clone()]);
                }
            }

            if let Some(collection) = state.collections.get(key_path) {
                counters.collection_gets.fetch_add(1, Ordering::Relaxed);
                return Ok(collection.values().cloned().collect());
            }

            if parent.is_some() {
                counters.record_document_get(key_path);
                return Ok(Vec::new());
            }

            // Unknown collection: empty
            counters.collection_gets.fetch_add(1, Ordering::Relaxed);
            Ok(Vec::new())
        })
    }

    fn index(&self) -> &MemoryIndex {
        &self.index
    }
}

/// Index reader of a [`MemoryTransaction`]
#[derive(Debug)]
pub struct MemoryIndex {
    state: Arc<RwLock<StoreState>>,
    counters: Arc<FetchCounters>,
    aborted: Arc<AtomicBool>,
}

impl MemoryIndex {
    fn check_open(&self) -> StoreResult<()> {
        if self.aborted.load(Ordering::SeqCst) {
            return Err(StoreError::Aborted);
        }
        Ok(())
    }
}

impl IndexReader for MemoryIndex {
    fn index_exists<'a>(&'a self, key_path: &'a KeyPath, field: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.check_open()?;
            let state = self.state.read().await;
            Ok(state.indexes.contains(key_path, field))
        })
    }

    fn read_index<'a>(
        &'a self,
        mode: IndexReadMode,
        tuple: &'a IndexTuple,
    ) -> StoreFuture<'a, Vec<IndexHit>> {
        Box::pin(async move {
            self.check_open()?;
            let state = self.state.read().await;
            self.counters.index_reads.fetch_add(1, Ordering::Relaxed);

            let ids = state
                .indexes
                .read(&tuple.key_path, &tuple.field, mode, &tuple.value)
                .ok_or_else(|| StoreError::IndexNotFound(tuple.subspace().to_string()))?
                .map_err(|m| {
                    StoreError::type_mismatch(tuple.field.as_str(), m.expected, m.found)
                })?;
            Ok(ids.into_iter().map(IndexHit::Id).collect())
        })
    }
}
