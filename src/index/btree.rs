//! BTreeMap-based index structures
//!
//! An index maps field values to the identifiers of the documents holding
//! them. Reads return identifiers in key order; identifiers sharing a key
//! are kept sorted ascending.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use serde_json::Value;

use super::IndexReadMode;
use crate::document::DocumentId;

/// Index key representing a serialized field value.
///
/// Every JSON value has a key. Ordering is deterministic:
/// Null < Bool < Number < String < Array < Object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    Null,
    /// Boolean value (false < true)
    Bool(bool),
    /// Numeric value, stored as order-preserving bits.
    ///
    /// Integers and floats share this variant so `30` and `30.0` land on
    /// the same key. Integers beyond 2^53 lose precision.
    Number(u64),
    /// String value
    String(String),
    /// Compact JSON text of an array; equality only
    Array(String),
    /// Compact JSON text of an object; equality only
    Object(String),
}

impl IndexKey {
    pub fn from_bool(v: bool) -> Self {
        IndexKey::Bool(v)
    }

    /// Create a key from a float
    ///
    /// Uses bit representation for total ordering.
    pub fn from_f64(v: f64) -> Self {
        // -0.0 and 0.0 must share a key
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits // Negative: flip all bits
        } else {
            bits ^ (1 << 63) // Positive: flip sign bit
        };
        IndexKey::Number(ordered)
    }

    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Create a key from a JSON value.
    ///
    /// Objects serialize with sorted member names, so equal values always
    /// produce equal keys.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => IndexKey::Null,
            Value::Bool(b) => IndexKey::from_bool(*b),
            Value::Number(n) => IndexKey::from_f64(n.as_f64().unwrap_or_default()),
            Value::String(s) => IndexKey::from_string(s.as_str()),
            Value::Array(_) => IndexKey::Array(value.to_string()),
            Value::Object(_) => IndexKey::Object(value.to_string()),
        }
    }

    /// Returns true if both keys hold the same kind of value
    pub fn same_kind(&self, other: &IndexKey) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Returns true for kinds that range reads can order
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            IndexKey::Bool(_) | IndexKey::Number(_) | IndexKey::String(_)
        )
    }

    /// Kind name, as used in type mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            IndexKey::Null => "null",
            IndexKey::Bool(_) => "bool",
            IndexKey::Number(_) => "number",
            IndexKey::String(_) => "string",
            IndexKey::Array(_) => "array",
            IndexKey::Object(_) => "object",
        }
    }
}

/// A range read met a stored key it cannot order against the bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindMismatch {
    /// Kind of the bound
    pub expected: &'static str,
    /// Kind of the offending stored key
    pub found: &'static str,
}

impl fmt::Display for KindMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot compare {} with {}", self.found, self.expected)
    }
}

/// A single field index using BTreeMap for deterministic ordering.
#[derive(Debug, Default)]
pub struct IndexTree {
    tree: BTreeMap<IndexKey, Vec<DocumentId>>,
}

impl IndexTree {
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert an identifier for a key.
    ///
    /// Maintains sorted ascending order.
    pub fn insert(&mut self, key: IndexKey, id: DocumentId) {
        let ids = self.tree.entry(key).or_default();

        match ids.binary_search(&id) {
            Ok(_) => {} // Already exists
            Err(pos) => ids.insert(pos, id),
        }
    }

    /// Remove an identifier for a key.
    ///
    /// If the key has no more identifiers, removes the key entirely.
    pub fn remove(&mut self, key: &IndexKey, id: &DocumentId) {
        if let Some(ids) = self.tree.get_mut(key) {
            if let Ok(pos) = ids.binary_search(id) {
                ids.remove(pos);
            }
            if ids.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// Reads identifiers matching `mode` against `key`, in key order.
    ///
    /// Null entries never satisfy a range read. Any other stored key of a
    /// different kind than `key`, or a range bound that cannot be ordered,
    /// fails the read, the same way comparing the stored values would.
    pub fn read(
        &self,
        mode: IndexReadMode,
        key: &IndexKey,
    ) -> Result<Vec<DocumentId>, KindMismatch> {
        let range: (Bound<&IndexKey>, Bound<&IndexKey>) = match mode {
            IndexReadMode::Eq => (Bound::Included(key), Bound::Included(key)),
            IndexReadMode::Gt => (Bound::Excluded(key), Bound::Unbounded),
            IndexReadMode::Gte => (Bound::Included(key), Bound::Unbounded),
            IndexReadMode::Lt => (Bound::Unbounded, Bound::Excluded(key)),
            IndexReadMode::Lte => (Bound::Unbounded, Bound::Included(key)),
        };
        if mode != IndexReadMode::Eq {
            self.check_orderable(key)?;
            if !key.is_orderable() {
                return Ok(Vec::new());
            }
        }

        Ok(self
            .tree
            .range(range)
            .filter(|(k, _)| k.same_kind(key))
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect())
    }

    /// Keys sort by kind, so the first and last non-null keys bound every
    /// kind present.
    fn check_orderable(&self, key: &IndexKey) -> Result<(), KindMismatch> {
        let mut stored = self.tree.keys().filter(|k| **k != IndexKey::Null);
        for other in [stored.next(), stored.next_back()].into_iter().flatten() {
            if !key.is_orderable() || !other.same_kind(key) {
                return Err(KindMismatch {
                    expected: key.kind_name(),
                    found: other.kind_name(),
                });
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }
}
