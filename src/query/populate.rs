//! Population and projection
//!
//! After the last stage every surviving document must be complete. A
//! document whose identifier is in the populated set is already the stored
//! document, so only unpopulated identifiers are fetched; a second pass
//! over the same sequence fetches nothing.

use super::context::ExecutionContext;
use super::errors::QueryResult;
use super::pipeline::{document_id, fetch_documents, substitute};
use crate::document::{Document, KeyPath};
use crate::observability::{log_event_with_fields, Event};
use crate::store::Transaction;

/// Replaces every unpopulated document by its full stored version
pub async fn populate<T: Transaction>(
    tr: &T,
    key_path: &KeyPath,
    documents: Vec<Document>,
    ctx: &mut ExecutionContext,
) -> QueryResult<Vec<Document>> {
    let id_prop = tr.id_prop();
    let mut wanted = Vec::new();
    for doc in &documents {
        let id = document_id(doc, id_prop)?;
        if ctx.mark_populated(id.clone()) {
            wanted.push(id);
        }
    }

    if wanted.is_empty() {
        return Ok(documents);
    }

    let count = wanted.len();
    ctx.add_document_fetches(count);
    let fetched = fetch_documents(tr, key_path, wanted).await?;

    let fetched_count = count.to_string();
    log_event_with_fields(
        Event::QueryPopulated,
        &[
            ("fetched", fetched_count.as_str()),
            ("key_path", key_path.to_string().as_str()),
        ],
    );

    Ok(substitute(documents, &fetched, id_prop))
}

/// Reduces each document to the requested fields.
///
/// Absent fields are omitted, never synthesized. `None` keeps documents
/// whole.
pub fn project(documents: Vec<Document>, fields: Option<&[String]>) -> Vec<Document> {
    match fields {
        Some(fields) => documents.iter().map(|doc| doc.project(fields)).collect(),
        None => documents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentId;
    use crate::query::mock::MockTransaction;
    use serde_json::json;

    fn stub(id: i64) -> Document {
        Document::stub("_id", &DocumentId::Int(id))
    }

    fn tr() -> MockTransaction {
        MockTransaction::new(
            "people",
            vec![
                json!({"_id": 1, "name": "Josh", "balance": 30}),
                json!({"_id": 2, "name": "Jim", "balance": 12}),
            ],
        )
    }

    #[tokio::test]
    async fn test_populate_fetches_unpopulated_only() {
        let tr = tr();
        let path = KeyPath::from("people");
        let mut ctx = ExecutionContext::new();
        ctx.mark_populated(DocumentId::Int(2));

        let partial = Document::try_from(json!({"_id": 2, "name": "Jim"})).unwrap();
        let docs = populate(&tr, &path, vec![stub(1), partial.clone()], &mut ctx)
            .await
            .unwrap();

        assert_eq!(docs[0].get("name"), Some(&json!("Josh")));
        assert_eq!(docs[1], partial);
        assert_eq!(tr.document_gets(), vec![KeyPath::from("people").child(1)]);
    }

    #[tokio::test]
    async fn test_populate_idempotent() {
        let tr = tr();
        let path = KeyPath::from("people");
        let mut ctx = ExecutionContext::new();

        let once = populate(&tr, &path, vec![stub(1), stub(2)], &mut ctx)
            .await
            .unwrap();
        let twice = populate(&tr, &path, once.clone(), &mut ctx).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(tr.document_gets().len(), 2);
        assert_eq!(ctx.document_fetches(), 2);
    }

    #[tokio::test]
    async fn test_populate_empty_sequence() {
        let tr = tr();
        let mut ctx = ExecutionContext::new();

        let docs = populate(&tr, &KeyPath::from("people"), Vec::new(), &mut ctx)
            .await
            .unwrap();
        assert!(docs.is_empty());
        assert!(tr.gets.lock().unwrap().is_empty());
    }

    #[test]
    fn test_project_omits_absent_fields() {
        let docs = vec![
            Document::try_from(json!({"_id": 1, "name": "Josh", "balance": 30})).unwrap(),
            Document::try_from(json!({"_id": 2, "balance": 12})).unwrap(),
        ];
        let fields = vec!["name".to_string(), "balance".to_string()];

        let projected = project(docs, Some(&fields));
        assert_eq!(projected[0].clone().into_value(), json!({"name": "Josh", "balance": 30}));
        assert_eq!(projected[1].clone().into_value(), json!({"balance": 12}));
    }

    #[test]
    fn test_project_none_keeps_documents() {
        let docs = vec![Document::try_from(json!({"_id": 1, "name": "Josh"})).unwrap()];
        assert_eq!(project(docs.clone(), None), docs);
    }
}
