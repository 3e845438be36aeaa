//! Query construction
//!
//! A query accumulates predicate commands without touching a store.
//! Commands compose as a logical AND, applied in the order given; the
//! first command decides the access path, so put an indexed field first.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{QueryError, QueryResult};
use super::operator::Operator;
use crate::document::{Document, KeyPath};

/// One predicate step: `field <operator> value`
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub operator: Operator,
    pub field: String,
    pub value: Value,
}

impl Command {
    pub fn new(operator: Operator, field: impl Into<String>, value: Value) -> Self {
        Self {
            operator,
            field: field.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Advisory query options.
///
/// `exec` passes these through untouched; [`QueryOptions::apply_window`]
/// enforces them for callers that want it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub sort: Option<SortDirection>,
    /// Max documents to return
    #[serde(default)]
    pub limit: Option<usize>,
    /// Documents to skip
    #[serde(default)]
    pub skip: Option<usize>,
}

impl QueryOptions {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn sort(mut self, direction: SortDirection) -> Self {
        self.sort = Some(direction);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Orders documents by identifier (when `sort` is set), then applies
    /// `skip` and `limit`.
    ///
    /// The sort is stable; documents without an identifier sort first.
    pub fn apply_window(&self, mut documents: Vec<Document>, id_prop: &str) -> Vec<Document> {
        if let Some(direction) = self.sort {
            documents.sort_by(|a, b| {
                let ordering = a.id(id_prop).cmp(&b.id(id_prop));
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        documents.into_iter().skip(skip).take(limit).collect()
    }
}

/// A document query over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    key_path: KeyPath,
    fields: Option<Vec<String>>,
    options: QueryOptions,
    commands: Vec<Command>,
}

impl Query {
    /// Creates a query over the collection at `key_path`.
    ///
    /// A scalar key path is coerced to a one-segment path. Fails if the
    /// path is empty.
    pub fn new(key_path: impl Into<KeyPath>) -> QueryResult<Self> {
        let key_path = key_path.into();
        if key_path.is_empty() {
            return Err(QueryError::InvalidKeyPath(
                "query needs a collection key path".to_string(),
            ));
        }
        Ok(Self {
            key_path,
            fields: None,
            options: QueryOptions::default(),
            commands: Vec::new(),
        })
    }

    /// Restricts result documents to `fields`
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Appends a command
    pub fn command(
        mut self,
        operator: Operator,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.commands.push(Command::new(operator, field, value.into()));
        self
    }

    pub fn eql(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.command(Operator::Eql, field, value)
    }

    /// Reserved; executing a query holding it fails with `NotImplemented`
    pub fn neql(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.command(Operator::Neql, field, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.command(Operator::Gt, field, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.command(Operator::Gte, field, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.command(Operator::Lt, field, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.command(Operator::Lte, field, value)
    }

    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Checks every command can run, before any I/O
    pub(crate) fn validate(&self) -> QueryResult<()> {
        self.commands
            .iter()
            .try_for_each(|cmd| cmd.operator.ensure_implemented())
    }
}
