//! docquery - query execution over an ordered, transactional document store
//!
//! Collections live under hierarchical key paths. A query filters one
//! collection with a chain of predicates, using secondary indexes when
//! they exist, and returns complete (optionally projected) documents.

pub mod config;
pub mod document;
pub mod index;
pub mod observability;
pub mod query;
pub mod store;

pub use config::StoreConfig;
pub use document::{Document, DocumentId, KeyPath, Segment};
pub use query::{find, Operator, Query, QueryError, QueryOptions, QueryResult};
pub use store::{MemoryStore, MemoryTransaction, StoreError, Transaction};
