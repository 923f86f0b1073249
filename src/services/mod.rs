//! Service layer: orchestration between auth, domain rules, and stores.

pub mod decision;
pub mod leaves;
pub mod snapshot;

use std::future::Future;

use tracing::warn;

use crate::store::StoreError;
use crate::AppError;

/// Run a store future under the configured deadline. A timeout and a
/// store-reported outage both surface as the retriable
/// `BACKEND_UNAVAILABLE`; callers never hang on a dead backend.
pub(crate) async fn store_call<T>(
    deadline: std::time::Duration,
    what: &'static str,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, AppError> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(error = %e, what, "store call failed");
            Err(e.into())
        }
        Err(_) => {
            warn!(what, timeout_ms = deadline.as_millis() as u64, "store call timed out");
            Err(AppError::backend_unavailable(format!("{what} timed out")))
        }
    }
}
