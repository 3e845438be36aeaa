//! Schemaless JSON documents

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::key_path::DocumentId;

/// A document: an unordered mapping from field name to value.
///
/// One field (configured per store, usually `_id`) carries the
/// document identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an identifier-only document.
    ///
    /// Index reads that return bare identifiers are carried through the
    /// pipeline as stubs until the full document is fetched.
    pub fn stub(id_prop: &str, id: &DocumentId) -> Self {
        let mut fields = Map::new();
        fields.insert(id_prop.to_string(), id.to_value());
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Reads the identifier stored under `id_prop`
    pub fn id(&self, id_prop: &str) -> Option<DocumentId> {
        self.fields.get(id_prop).and_then(DocumentId::from_value)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Returns a new document restricted to `fields`.
    ///
    /// Fields missing from this document are omitted, never synthesized.
    pub fn project(&self, fields: &[String]) -> Document {
        let fields = fields
            .iter()
            .filter_map(|f| self.fields.get(f).map(|v| (f.clone(), v.clone())))
            .collect();
        Document { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Document {
    type Error = Value;

    /// Only JSON objects are documents; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(other),
        }
    }
}
