//! Edge snapshot assembly.
//!
//! Bundles everything an edge scanner needs to keep deciding offline:
//! the full subject directory, closures out to the configured horizon,
//! and the key registry's version/revocation view. Signing secrets stay
//! on the server; the wire shape has no field that could carry them.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::auth::keyring::Keyring;
use crate::config::engine::EngineConfig;
use crate::edge::cache::{EdgeSnapshot, EdgeSubject};
use crate::store::{ClosureCalendar, SubjectDirectory};
use crate::AppError;

pub async fn build_edge_snapshot(
    keyring: &Keyring,
    subjects: &Arc<dyn SubjectDirectory>,
    closures: &Arc<dyn ClosureCalendar>,
    config: &EngineConfig,
    now: OffsetDateTime,
) -> Result<EdgeSnapshot, AppError> {
    let today = now.to_offset(config.facility_offset).date();
    let horizon_end = today.saturating_add(Duration::days(config.snapshot_horizon_days));

    let directory = super::store_call(
        config.store_timeout,
        "directory dump",
        subjects.snapshot_all(),
    )
    .await?;
    let upcoming = super::store_call(
        config.store_timeout,
        "closure lookup",
        closures.closures_in(today, horizon_end),
    )
    .await?;

    let snapshot = EdgeSnapshot {
        taken_at: now,
        current_key_version: keyring.current_version(),
        revoked_key_versions: keyring.revoked_versions(),
        subjects: directory
            .into_iter()
            .map(|(id, state)| EdgeSubject { id, state })
            .collect(),
        closures: upcoming,
    };
    info!(
        subjects = snapshot.subjects.len(),
        closures = snapshot.closures.len(),
        key_version = snapshot.current_key_version,
        "edge snapshot built"
    );
    Ok(snapshot)
}
