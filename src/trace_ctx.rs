//! Task-local trace context.
//!
//! Every HTTP request is tagged with a trace id by the tracing middleware;
//! error responses and audit-path log lines pick it up through this module
//! instead of threading it through every call signature. Uses Tokio
//! task-local storage, so the id follows the request future wherever it is
//! polled.

use std::cell::RefCell;
use std::fmt::{Display, Formatter, Result as FmtResult};

use tokio::task_local;

/// Typed key under which the per-request trace id lives in request
/// extensions. A newtype, so no other extension keyed by `String` can
/// collide with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl Display for TraceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

task_local! {
    static TRACE_ID: RefCell<Option<String>>;
}

/// Get the trace_id for the current task.
/// Returns "unknown" outside of a request scope (startup, spawned jobs).
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|cell| {
            cell.borrow()
                .as_ref()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string())
        })
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Run a future with the given trace id installed.
/// Called by middleware once per request to establish the task-local scope.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(RefCell::new(Some(trace_id)), future).await
}
