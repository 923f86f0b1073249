use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::state::app_state::AppState;
use crate::AppError;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    subject_store: &'static str,
    audit_store: &'static str,
}

/// Liveness plus store reachability. Always 200; a degraded store shows
/// up in the body so gate devices can decide to switch to offline mode.
async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let subject_store = match app_state.subjects.ping().await {
        Ok(()) => "ok",
        Err(_) => "down",
    };
    let audit_store = match app_state.audit.count().await {
        Ok(_) => "ok",
        Err(_) => "down",
    };
    let status = if subject_store == "ok" && audit_store == "ok" {
        "ok"
    } else {
        "degraded"
    };

    Ok(HttpResponse::Ok().json(HealthResponse {
        status,
        subject_store,
        audit_store,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
