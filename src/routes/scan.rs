use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::domain::slot::{Meal, MealSlot};
use crate::extractors::staff_session::StaffSession;
use crate::state::app_state::AppState;
use crate::store::{DecisionRecord, ReasonCode, Verdict};
use crate::AppError;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Credential text exactly as read from the QR code.
    pub token: String,
    pub meal: Meal,
    /// Facility-local slot date. Defaults to today at the facility.
    pub date: Option<Date>,
    /// Free-form scanner detail (lane, firmware). Logged, not stored; the
    /// audit row's device label comes from the session.
    pub device_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub record_id: Uuid,
    pub verdict: Verdict,
    pub reason: ReasonCode,
    pub subject: Option<Uuid>,
    pub slot: MealSlot,
    pub decided_at: OffsetDateTime,
}

impl From<DecisionRecord> for ScanResponse {
    fn from(record: DecisionRecord) -> Self {
        Self {
            record_id: record.record_id,
            verdict: record.verdict,
            reason: record.reason,
            subject: record.subject,
            slot: record.slot,
            decided_at: record.decided_at,
        }
    }
}

/// Decide one credential scan. A policy denial is a successful request;
/// only unusable input, auth failures, and backend trouble are errors.
async fn scan(
    session: StaffSession,
    req: web::Json<ScanRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(device_info) = req.device_info.as_deref() {
        debug!(device = %session.0.dev, device_info, "scan context");
    }

    let record = app_state
        .decision_service()
        .scan(
            &session.0,
            &req.token,
            req.meal,
            req.date,
            OffsetDateTime::now_utc(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ScanResponse::from(record)))
}

/// Mounted under `/api/scan`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(scan)));
}
