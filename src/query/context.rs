//! Per-execution state
//!
//! Everything an execution accumulates lives here and is dropped when the
//! execution ends, so one `Query` can run any number of times, including
//! concurrently.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::operator::Operator;
use super::query::Command;
use crate::document::{Document, DocumentId};

/// How one command was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPath {
    /// Index-accelerated read against the raw collection
    IndexRead,
    /// Whole collection fetched and filtered in memory
    FullScan,
    /// Previous stage's documents filtered in memory
    InMemory,
}

impl AccessPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPath::IndexRead => "index_read",
            AccessPath::FullScan => "full_scan",
            AccessPath::InMemory => "in_memory",
        }
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub operator: Operator,
    pub field: String,
    pub access: AccessPath,
    /// Documents surviving the stage
    pub documents: usize,
}

/// Summary of one execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub stages: Vec<StageReport>,
    /// Fields whose stage was answered by an index
    pub selected_fields: Vec<String>,
    /// Identifiers fully materialized during the execution
    pub populated: usize,
    /// Single-document fetches issued
    pub document_fetches: u64,
}

/// Result documents plus the execution report
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub documents: Vec<Document>,
    pub report: ExecutionReport,
}

/// Mutable state threaded through one execution.
///
/// Invariant: an identifier enters `populated` once, at the first stage
/// that fetches its full document. Sets only grow.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    populated: HashSet<DocumentId>,
    selected: BTreeSet<String>,
    stages: Vec<StageReport>,
    document_fetches: u64,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as fully materialized.
    ///
    /// Returns false if it already was.
    pub fn mark_populated(&mut self, id: DocumentId) -> bool {
        self.populated.insert(id)
    }

    pub fn populated_count(&self) -> usize {
        self.populated.len()
    }

    pub fn select_field(&mut self, field: &str) {
        self.selected.insert(field.to_string());
    }

    pub fn selected_fields(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn add_document_fetches(&mut self, count: usize) {
        self.document_fetches += count as u64;
    }

    pub fn document_fetches(&self) -> u64 {
        self.document_fetches
    }

    pub fn record_stage(&mut self, command: &Command, access: AccessPath, documents: usize) {
        self.stages.push(StageReport {
            operator: command.operator,
            field: command.field.clone(),
            access,
            documents,
        });
    }

    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    pub fn into_report(self) -> ExecutionReport {
        ExecutionReport {
            stages: self.stages,
            selected_fields: self.selected.into_iter().collect(),
            populated: self.populated.len(),
            document_fetches: self.document_fetches,
        }
    }
}
