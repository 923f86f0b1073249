use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::codec::encode_credential;
use crate::auth::keyring::KeyVersion;
use crate::extractors::staff_session::AdminSession;
use crate::services::store_call;
use crate::state::app_state::AppState;
use crate::AppError;

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub subject: Uuid,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub subject: Uuid,
    /// Credential text for the QR code.
    pub token: String,
    pub key_version: KeyVersion,
    pub issued_at: OffsetDateTime,
}

/// Issue (or re-issue) a subject's credential under the current signing
/// key. Re-issuing does not invalidate older tokens; only key revocation
/// does.
async fn issue(
    admin: AdminSession,
    req: web::Json<IssueRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let state = store_call(
        app_state.config.store_timeout,
        "subject lookup",
        app_state.subjects.subject_state(req.subject),
    )
    .await?;
    if state.is_none() {
        return Err(AppError::subject_not_found(format!(
            "no subject {} to issue a credential for",
            req.subject
        )));
    }

    let now = OffsetDateTime::now_utc();
    let version = app_state.keyring.current_version();
    let token = encode_credential(req.subject, version, now, &app_state.keyring)?;

    info!(by = %admin.0.dev, subject = %req.subject, version, "credential issued");
    Ok(HttpResponse::Ok().json(IssueResponse {
        subject: req.subject,
        token,
        key_version: version,
        issued_at: now,
    }))
}

/// Mounted under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/credentials").route(web::post().to(issue)));
}
