use std::collections::HashMap;

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::extractors::staff_session::StaffSession;
use crate::services::snapshot::build_edge_snapshot;
use crate::services::store_call;
use crate::state::app_state::AppState;
use crate::store::{DecisionOrigin, DecisionRecord};
use crate::AppError;

/// Snapshot pull for a scanner going on battery or into a dead zone.
async fn snapshot(
    session: StaffSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = build_edge_snapshot(
        &app_state.keyring,
        &app_state.subjects,
        &app_state.closures,
        &app_state.config,
        OffsetDateTime::now_utc(),
    )
    .await?;

    info!(device = %session.0.dev, subjects = snapshot.subjects.len(), "snapshot pulled");
    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct ReplayRequest {
    pub records: Vec<DecisionRecord>,
}

#[derive(Debug, Serialize)]
pub struct ReplayResponse {
    pub accepted: usize,
}

/// Flush a reconnected device's queued decisions into the audit log.
///
/// Records are appended exactly as submitted, in submitted order, marked
/// offline. The server never re-evaluates them; a provisional grant that
/// would have been denied live is a billing correction, not a rewrite.
async fn replay(
    session: StaffSession,
    req: web::Json<ReplayRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let records = req.into_inner().records;

    // Within the batch each device's records must be in decision order,
    // or per-device ordering in the audit log would silently break.
    let mut last_per_device: HashMap<&str, OffsetDateTime> = HashMap::new();
    for record in &records {
        if let Some(previous) = last_per_device.get(record.device.as_str()) {
            if record.decided_at < *previous {
                return Err(AppError::bad_request(
                    "REPLAY_OUT_OF_ORDER",
                    format!(
                        "record {} for device {} precedes an earlier submission",
                        record.record_id, record.device
                    ),
                ));
            }
        }
        last_per_device.insert(record.device.as_str(), record.decided_at);
    }

    let mut accepted = 0;
    for mut record in records {
        record.origin = DecisionOrigin::Offline;
        store_call(
            app_state.config.store_timeout,
            "audit append",
            app_state.audit.append(record),
        )
        .await?;
        accepted += 1;
    }

    info!(device = %session.0.dev, accepted, "offline decisions replayed");
    Ok(HttpResponse::Ok().json(ReplayResponse { accepted }))
}

/// Mounted under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/edge/snapshot").route(web::get().to(snapshot)))
        .service(web::resource("/edge/replay").route(web::post().to(replay)));
}
