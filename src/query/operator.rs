//! Operator table
//!
//! Each operator pairs an in-memory filter with an index read mode.
//! `Neql` is reserved: it is part of the builder surface but has no
//! filter or index mode, and executing it fails with `NotImplemented`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::compare::{compare, values_equal};
use super::errors::{QueryError, QueryResult};
use crate::document::Document;
use crate::index::IndexReadMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// field == value
    Eql,
    /// Reserved, not implemented
    Neql,
    /// field > value
    Gt,
    /// field >= value
    Gte,
    /// field < value
    Lt,
    /// field <= value
    Lte,
}

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Eql => "eql",
            Operator::Neql => "neql",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
        }
    }

    /// Returns true if the operator can be executed
    pub fn is_implemented(&self) -> bool {
        !matches!(self, Operator::Neql)
    }

    /// Fails with `NotImplemented` for reserved operators
    pub fn ensure_implemented(&self) -> QueryResult<()> {
        if self.is_implemented() {
            Ok(())
        } else {
            Err(QueryError::not_implemented(self.name()))
        }
    }

    /// Index read mode backing this operator
    pub fn index_mode(&self) -> QueryResult<IndexReadMode> {
        match self {
            Operator::Eql => Ok(IndexReadMode::Eq),
            Operator::Gt => Ok(IndexReadMode::Gt),
            Operator::Gte => Ok(IndexReadMode::Gte),
            Operator::Lt => Ok(IndexReadMode::Lt),
            Operator::Lte => Ok(IndexReadMode::Lte),
            Operator::Neql => Err(QueryError::not_implemented(self.name())),
        }
    }

    /// Evaluates the predicate against one stored field value.
    ///
    /// A missing field never matches. A null field only matches `eql null`.
    pub fn matches(
        &self,
        field: &str,
        actual: Option<&Value>,
        expected: &Value,
    ) -> QueryResult<bool> {
        let actual = match actual {
            Some(v) => v,
            None => return Ok(false),
        };

        if let Operator::Eql = self {
            return Ok(values_equal(actual, expected));
        }
        if actual.is_null() {
            return Ok(false);
        }

        let ordering = compare(field, actual, expected)?;
        match self {
            Operator::Gt => Ok(ordering.is_gt()),
            Operator::Gte => Ok(ordering.is_ge()),
            Operator::Lt => Ok(ordering.is_lt()),
            Operator::Lte => Ok(ordering.is_le()),
            Operator::Eql => Ok(ordering.is_eq()),
            Operator::Neql => Err(QueryError::not_implemented(self.name())),
        }
    }

    /// Keeps the documents matching `field <op> value`.
    ///
    /// Stable: surviving documents keep their relative order.
    pub fn filter(
        &self,
        documents: Vec<Document>,
        field: &str,
        value: &Value,
    ) -> QueryResult<Vec<Document>> {
        self.ensure_implemented()?;

        let mut kept = Vec::with_capacity(documents.len());
        for doc in documents {
            if self.matches(field, doc.get(field), value)? {
                kept.push(doc);
            }
        }
        Ok(kept)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    /// Parses an operator name; unknown names are not implemented.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eql" => Ok(Operator::Eql),
            "neql" => Ok(Operator::Neql),
            "gt" => Ok(Operator::Gt),
            "gte" => Ok(Operator::Gte),
            "lt" => Ok(Operator::Lt),
            "lte" => Ok(Operator::Lte),
            other => Err(QueryError::not_implemented(other)),
        }
    }
}
