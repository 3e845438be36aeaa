//! Document store collaborators for docquery
//!
//! The query core consumes two interfaces: a [`Transaction`] reading
//! documents by key path and an [`IndexReader`] performing ordered index
//! reads. [`MemoryStore`] implements both in process.

mod errors;
mod memory;
mod transaction;

pub use errors::{StoreError, StoreResult};
pub use memory::{FetchStats, MemoryIndex, MemoryStore, MemoryTransaction};
pub use transaction::{IndexHit, IndexReader, IndexTuple, StoreFuture, Transaction};
