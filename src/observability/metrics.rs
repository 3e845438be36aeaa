//! Query metrics
//!
//! - Counters only, monotonic
//! - Thread-safe, Relaxed ordering (exact once the counted work finished)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static GLOBAL: MetricsRegistry = MetricsRegistry::new();

/// Registry of query execution counters
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Successful executions
    queries_executed: AtomicU64,
    /// Failed executions
    queries_failed: AtomicU64,
    /// Stages satisfied by an index read
    index_reads: AtomicU64,
    /// Stages satisfied by a full collection scan
    full_scans: AtomicU64,
    /// Stages filtered in memory
    in_memory_stages: AtomicU64,
    /// Single-document fetches issued by the pipeline
    document_fetches: AtomicU64,
}

impl MetricsRegistry {
    pub const fn new() -> Self {
        Self {
            queries_executed: AtomicU64::new(0),
            queries_failed: AtomicU64::new(0),
            index_reads: AtomicU64::new(0),
            full_scans: AtomicU64::new(0),
            in_memory_stages: AtomicU64::new(0),
            document_fetches: AtomicU64::new(0),
        }
    }

    /// Process-wide registry fed by `Query::exec`
    pub fn global() -> &'static MetricsRegistry {
        &GLOBAL
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_index_reads(&self) {
        self.index_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_full_scans(&self) {
        self.full_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_in_memory_stages(&self) {
        self.in_memory_stages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_document_fetches(&self, count: u64) {
        self.document_fetches.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            index_reads: self.index_reads.load(Ordering::Relaxed),
            full_scans: self.full_scans.load(Ordering::Relaxed),
            in_memory_stages: self.in_memory_stages.load(Ordering::Relaxed),
            document_fetches: self.document_fetches.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_failed: u64,
    pub index_reads: u64,
    pub full_scans: u64,
    pub in_memory_stages: u64,
    pub document_fetches: u64,
}
