//! Query pipeline
//!
//! Commands are folded left to right over a two-state machine:
//!
//! - `Unmaterialized`: nothing fetched yet. The next command reads the
//!   index for its field if one exists, otherwise scans the collection.
//! - `Materialized`: documents in hand. The next command filters them in
//!   memory, first fetching any document that lacks its field.
//!
//! Every transition returns `Materialized`.

use std::collections::HashMap;

use futures_util::future::try_join_all;

use super::context::{AccessPath, ExecutionContext};
use super::errors::{QueryError, QueryResult};
use super::query::Command;
use crate::document::{Document, DocumentId, KeyPath};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::store::{IndexHit, IndexReader, IndexTuple, Transaction};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Unmaterialized,
    Materialized(Vec<Document>),
}

impl PipelineState {
    /// Decides how the next command is satisfied
    pub fn access_path(&self, index_exists: bool) -> AccessPath {
        match self {
            PipelineState::Materialized(_) => AccessPath::InMemory,
            PipelineState::Unmaterialized if index_exists => AccessPath::IndexRead,
            PipelineState::Unmaterialized => AccessPath::FullScan,
        }
    }

    /// Documents in hand; empty when unmaterialized
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            PipelineState::Materialized(documents) => documents,
            PipelineState::Unmaterialized => Vec::new(),
        }
    }
}

/// Applies one command, producing the next state
pub async fn apply_command<T: Transaction>(
    tr: &T,
    key_path: &KeyPath,
    ctx: &mut ExecutionContext,
    state: PipelineState,
    command: &Command,
) -> QueryResult<PipelineState> {
    let Command {
        operator,
        field,
        value,
    } = command;
    operator.ensure_implemented()?;

    let index_exists = match state {
        PipelineState::Unmaterialized => tr.index().index_exists(key_path, field).await?,
        PipelineState::Materialized(_) => false,
    };
    let access = state.access_path(index_exists);
    let metrics = MetricsRegistry::global();

    let documents = match access {
        AccessPath::InMemory => {
            metrics.increment_in_memory_stages();
            let documents =
                fetch_missing_field(tr, key_path, ctx, state.into_documents(), field).await?;
            operator.filter(documents, field, value)?
        }
        AccessPath::IndexRead => {
            metrics.increment_index_reads();
            ctx.select_field(field);
            let tuple = IndexTuple::new(key_path.clone(), field.as_str(), value.clone());
            let hits = tr.index().read_index(operator.index_mode()?, &tuple).await?;
            hits_to_documents(hits, tr.id_prop())
        }
        AccessPath::FullScan => {
            metrics.increment_full_scans();
            let documents = scan_collection(tr, key_path, ctx).await?;
            operator.filter(documents, field, value)?
        }
    };

    ctx.record_stage(command, access, documents.len());
    let count = documents.len().to_string();
    log_event_with_fields(
        Event::QueryStageApplied,
        &[
            ("access", access.as_str()),
            ("documents", count.as_str()),
            ("field", field.as_str()),
            ("operator", operator.name()),
        ],
    );

    Ok(PipelineState::Materialized(documents))
}

/// Fetches the whole collection; every returned document counts as populated
pub async fn scan_collection<T: Transaction>(
    tr: &T,
    key_path: &KeyPath,
    ctx: &mut ExecutionContext,
) -> QueryResult<Vec<Document>> {
    let documents = tr.get(key_path).await?;
    for doc in &documents {
        ctx.mark_populated(document_id(doc, tr.id_prop())?);
    }
    Ok(documents)
}

/// Replaces documents lacking `field` by their full version, fetching each
/// identifier not yet populated.
async fn fetch_missing_field<T: Transaction>(
    tr: &T,
    key_path: &KeyPath,
    ctx: &mut ExecutionContext,
    documents: Vec<Document>,
    field: &str,
) -> QueryResult<Vec<Document>> {
    let id_prop = tr.id_prop();
    let mut wanted = Vec::new();
    for doc in &documents {
        if doc.contains_field(field) {
            continue;
        }
        let id = document_id(doc, id_prop)?;
        if ctx.mark_populated(id.clone()) {
            wanted.push(id);
        }
    }

    if wanted.is_empty() {
        return Ok(documents);
    }
    ctx.add_document_fetches(wanted.len());
    let fetched = fetch_documents(tr, key_path, wanted).await?;
    Ok(substitute(documents, &fetched, id_prop))
}

/// Fetches full documents concurrently, keyed by identifier.
///
/// An identifier with no stored document is a `MissingDocument` error.
pub(crate) async fn fetch_documents<T: Transaction>(
    tr: &T,
    key_path: &KeyPath,
    ids: Vec<DocumentId>,
) -> QueryResult<HashMap<DocumentId, Document>> {
    MetricsRegistry::global().add_document_fetches(ids.len() as u64);

    let fetches = ids.into_iter().map(|id| async move {
        let path = key_path.child(id.clone());
        let mut documents = tr.get(&path).await?;
        if documents.is_empty() {
            return Err(QueryError::missing_document(&path));
        }
        Ok::<_, QueryError>((id, documents.swap_remove(0)))
    });

    Ok(try_join_all(fetches).await?.into_iter().collect())
}

/// Swaps in fetched documents, keeping sequence order
pub(crate) fn substitute(
    documents: Vec<Document>,
    fetched: &HashMap<DocumentId, Document>,
    id_prop: &str,
) -> Vec<Document> {
    documents
        .into_iter()
        .map(|doc| match doc.id(id_prop).and_then(|id| fetched.get(&id)) {
            Some(full) => full.clone(),
            None => doc,
        })
        .collect()
}

pub(crate) fn document_id(doc: &Document, id_prop: &str) -> QueryResult<DocumentId> {
    doc.id(id_prop)
        .ok_or_else(|| QueryError::missing_identifier(id_prop))
}

fn hits_to_documents(hits: Vec<IndexHit>, id_prop: &str) -> Vec<Document> {
    hits.into_iter()
        .map(|hit| match hit {
            IndexHit::Id(id) => Document::stub(id_prop, &id),
            IndexHit::Document(doc) => doc,
        })
        .collect()
}
