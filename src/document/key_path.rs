//! Key paths and their segments

use std::fmt;

use serde_json::Value;

/// A single key path segment.
///
/// Segments are totally ordered: integers sort before strings, and
/// each kind uses its natural order. Collections enumerate their
/// documents in this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Integer segment
    Int(i64),
    /// String segment
    Str(String),
}

/// Document identifiers are plain segments appended to a collection path.
pub type DocumentId = Segment;

impl Segment {
    /// Converts a JSON value into a segment.
    ///
    /// Only integers and strings can address a document.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Segment::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(Segment::Int),
            _ => None,
        }
    }

    /// Converts the segment back into a JSON value
    pub fn to_value(&self) -> Value {
        match self {
            Segment::Int(i) => Value::from(*i),
            Segment::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Int(i) => write!(f, "{}", i),
            Segment::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Str(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Str(s)
    }
}

impl From<i32> for Segment {
    fn from(i: i32) -> Self {
        Segment::Int(i64::from(i))
    }
}

impl From<i64> for Segment {
    fn from(i: i64) -> Self {
        Segment::Int(i)
    }
}

/// Ordered sequence of segments addressing a collection or a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Creates a key path from segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Returns a new key path extended by one segment.
    ///
    /// `self` is left untouched.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Splits off the last segment.
    ///
    /// Returns None for an empty path.
    pub fn parent_and_leaf(&self) -> Option<(KeyPath, &Segment)> {
        let (leaf, parent) = self.segments.split_last()?;
        Some((KeyPath::new(parent.to_vec()), leaf))
    }

    /// Returns true if `prefix` is a leading run of this path's segments
    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<Segment> for KeyPath {
    fn from(segment: Segment) -> Self {
        Self::new(vec![segment])
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        Self::from(Segment::from(s))
    }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self {
        Self::from(Segment::from(s))
    }
}

impl<S: Into<Segment>> From<Vec<S>> for KeyPath {
    fn from(segments: Vec<S>) -> Self {
        Self::new(segments.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<Segment>, const N: usize> From<[S; N]> for KeyPath {
    fn from(segments: [S; N]) -> Self {
        Self::new(segments.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_coerced_to_path() {
        let path = KeyPath::from("people");
        assert_eq!(path.segments(), &[Segment::from("people")]);
    }

    #[test]
    fn test_child_does_not_mutate_parent() {
        let collection = KeyPath::from(["tests", "people"]);
        let doc = collection.child(7);

        assert_eq!(collection.len(), 2);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.to_string(), "tests/people/7");
    }

    #[test]
    fn test_parent_and_leaf() {
        let doc = KeyPath::from(["people", "abc"]);
        let (parent, leaf) = doc.parent_and_leaf().unwrap();
        assert_eq!(parent, KeyPath::from("people"));
        assert_eq!(leaf, &Segment::from("abc"));

        assert!(KeyPath::default().parent_and_leaf().is_none());
    }

    #[test]
    fn test_starts_with() {
        let root = KeyPath::from("tests");
        let people = KeyPath::from(["tests", "people"]);
        assert!(people.starts_with(&root));
        assert!(people.starts_with(&people));
        assert!(!root.starts_with(&people));
    }

    #[test]
    fn test_segment_ordering_ints_before_strings() {
        assert!(Segment::Int(100) < Segment::Str("0".into()));
        assert!(Segment::Int(2) < Segment::Int(10));
        assert!(Segment::from("a") < Segment::from("b"));
    }

    #[test]
    fn test_segment_from_value() {
        assert_eq!(Segment::from_value(&json!(13)), Some(Segment::Int(13)));
        assert_eq!(Segment::from_value(&json!("x")), Some(Segment::from("x")));
        assert_eq!(Segment::from_value(&json!(1.5)), None);
        assert_eq!(Segment::from_value(&json!(null)), None);
        assert_eq!(Segment::Int(13).to_value(), json!(13));
    }
}
