//! Query execution
//!
//! `exec` validates every command, folds the commands through the
//! pipeline, then runs the population and projection passes. Execution
//! state is allocated per call; the `Query` itself is never mutated.

use serde_json::{Map, Value};

use super::context::{ExecutionContext, QueryOutput};
use super::errors::QueryResult;
use super::pipeline::{apply_command, scan_collection, PipelineState};
use super::populate::{populate, project};
use super::query::Query;
use crate::document::{Document, KeyPath};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::store::Transaction;

impl Query {
    /// Runs the query inside `tr` and returns the matching documents
    pub async fn exec<T: Transaction>(&self, tr: &T) -> QueryResult<Vec<Document>> {
        Ok(self.exec_with_report(tr).await?.documents)
    }

    /// Runs the query and also reports how each stage was satisfied
    pub async fn exec_with_report<T: Transaction>(&self, tr: &T) -> QueryResult<QueryOutput> {
        let key_path = self.key_path().to_string();
        let commands = self.commands().len().to_string();
        log_event_with_fields(
            Event::QueryExecBegin,
            &[("commands", commands.as_str()), ("key_path", key_path.as_str())],
        );

        let metrics = MetricsRegistry::global();
        match self.run(tr).await {
            Ok(output) => {
                metrics.increment_queries_executed();
                let returned = output.documents.len().to_string();
                let fetches = output.report.document_fetches.to_string();
                log_event_with_fields(
                    Event::QueryExecComplete,
                    &[
                        ("document_fetches", fetches.as_str()),
                        ("documents", returned.as_str()),
                        ("key_path", key_path.as_str()),
                    ],
                );
                Ok(output)
            }
            Err(err) => {
                metrics.increment_queries_failed();
                let message = err.to_string();
                log_event_with_fields(
                    Event::QueryExecFailed,
                    &[
                        ("code", err.code()),
                        ("error", message.as_str()),
                        ("key_path", key_path.as_str()),
                    ],
                );
                Err(err)
            }
        }
    }

    async fn run<T: Transaction>(&self, tr: &T) -> QueryResult<QueryOutput> {
        self.validate()?;

        let key_path = self.key_path();
        let mut ctx = ExecutionContext::new();

        let documents = if self.commands().is_empty() {
            MetricsRegistry::global().increment_full_scans();
            scan_collection(tr, key_path, &mut ctx).await?
        } else {
            let mut state = PipelineState::Unmaterialized;
            for command in self.commands() {
                state = apply_command(tr, key_path, &mut ctx, state, command).await?;
            }
            state.into_documents()
        };

        let documents = populate(tr, key_path, documents, &mut ctx).await?;
        let documents = project(documents, self.fields());

        Ok(QueryOutput {
            documents,
            report: ctx.into_report(),
        })
    }
}

/// Finds documents whose fields equal every entry of `conditions`.
///
/// One `eql` command is issued per entry, in map order. An empty map
/// returns the whole collection.
pub async fn find<T: Transaction>(
    tr: &T,
    key_path: impl Into<KeyPath>,
    conditions: &Map<String, Value>,
    fields: Option<&[&str]>,
) -> QueryResult<Vec<Document>> {
    let mut query = conditions
        .iter()
        .fold(Query::new(key_path)?, |query, (field, value)| {
            query.eql(field.as_str(), value.clone())
        });
    if let Some(fields) = fields {
        query = query.with_fields(fields.iter().copied());
    }
    query.exec(tr).await
}
