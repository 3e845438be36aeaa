//! Query subsystem
//!
//! A [`Query`] names a collection and a chain of predicate commands.
//! Executing it folds the commands through a two-state pipeline:
//!
//! - the first command reads a secondary index when one covers its field,
//!   otherwise scans the whole collection;
//! - every later command filters in memory, fetching a full document only
//!   when it lacks the command's field and has not been fetched yet.
//!
//! A final pass completes every surviving document and applies the field
//! projection. All execution state is scoped to one `exec` call.

mod compare;
mod context;
mod errors;
mod exec;
mod operator;
mod pipeline;
mod populate;
mod query;

#[cfg(test)]
mod mock;

pub use compare::{compare, kind_name, values_equal};
pub use context::{AccessPath, ExecutionContext, ExecutionReport, QueryOutput, StageReport};
pub use errors::{QueryError, QueryResult};
pub use exec::find;
pub use operator::Operator;
pub use pipeline::{apply_command, scan_collection, PipelineState};
pub use populate::{populate, project};
pub use query::{Command, Query, QueryOptions, SortDirection};
