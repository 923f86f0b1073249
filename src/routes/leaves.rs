use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::subject::{AppliedBy, LeaveRange};
use crate::extractors::staff_session::AdminSession;
use crate::services::leaves::submit_leave;
use crate::state::app_state::AppState;
use crate::AppError;

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub subject: Uuid,
    pub from: Date,
    pub to: Date,
    /// Who the submission is on behalf of. The member-portal backend
    /// submits as MEMBER; office staff submit as ADMIN.
    #[serde(default)]
    pub applied_by: Option<AppliedBy>,
    /// Admin-only escape hatch for a missed cutoff. The resulting leave
    /// is marked so billing can review it.
    #[serde(default)]
    pub override_cutoff: bool,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub subject: Uuid,
    pub leave: LeaveRange,
}

async fn submit(
    _admin: AdminSession,
    req: web::Json<LeaveRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let applied_by = req.applied_by.unwrap_or(AppliedBy::Member);
    let leave = submit_leave(
        &app_state.subjects,
        &app_state.config,
        req.subject,
        req.from,
        req.to,
        applied_by,
        req.override_cutoff,
        OffsetDateTime::now_utc(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(LeaveResponse {
        subject: req.subject,
        leave,
    }))
}

/// Mounted under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/leaves").route(web::post().to(submit)));
}
