use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::extractors::staff_session::AdminSession;
use crate::services::store_call;
use crate::state::app_state::AppState;
use crate::store::DecisionRecord;
use crate::AppError;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Inclusive range bounds, RFC 3339.
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub count: usize,
    /// Chronological; ties keep per-device decision order.
    pub records: Vec<DecisionRecord>,
}

fn parse_bound(field: &str, value: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|_| {
        AppError::bad_request(
            "INVALID_RANGE",
            format!("{field} must be an RFC 3339 timestamp, got {value:?}"),
        )
    })
}

/// Time-range export for billing reconciliation.
async fn export(
    _admin: AdminSession,
    query: web::Query<AuditQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let from = parse_bound("from", &query.from)?;
    let to = parse_bound("to", &query.to)?;
    if from > to {
        return Err(AppError::bad_request(
            "INVALID_RANGE",
            format!("from {from} is after to {to}"),
        ));
    }

    let records = store_call(
        app_state.config.store_timeout,
        "audit read",
        app_state.audit.read_range(from, to),
    )
    .await?;

    Ok(HttpResponse::Ok().json(AuditResponse {
        count: records.len(),
        records,
    }))
}

/// Mounted under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/audit").route(web::get().to(export)));
}
