//! Observable events
//!
//! Events are explicit and typed; each renders to one upper-snake name.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Query execution starts
    QueryExecBegin,
    /// One command transitioned the pipeline
    QueryStageApplied,
    /// Population pass fetched missing documents
    QueryPopulated,
    /// Query execution finished
    QueryExecComplete,
    /// Query execution aborted with an error
    QueryExecFailed,
    /// Secondary index created
    IndexCreated,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryExecBegin => "QUERY_EXEC_BEGIN",
            Event::QueryStageApplied => "QUERY_STAGE_APPLIED",
            Event::QueryPopulated => "QUERY_POPULATED",
            Event::QueryExecComplete => "QUERY_EXEC_COMPLETE",
            Event::QueryExecFailed => "QUERY_EXEC_FAILED",
            Event::IndexCreated => "INDEX_CREATED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::QueryExecFailed)
    }

    /// Returns true for high-volume, per-stage events
    pub fn is_detail(&self) -> bool {
        matches!(self, Event::QueryStageApplied | Event::QueryPopulated)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_upper_snake() {
        let events = [
            Event::QueryExecBegin,
            Event::QueryStageApplied,
            Event::QueryPopulated,
            Event::QueryExecComplete,
            Event::QueryExecFailed,
            Event::IndexCreated,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::QueryExecFailed.is_failure());
        assert!(!Event::QueryExecComplete.is_failure());
        assert!(Event::QueryStageApplied.is_detail());
    }
}
