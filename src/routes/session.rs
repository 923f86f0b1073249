use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::session::{mint_session_token, SessionScope};
use crate::domain::slot::{Meal, MealWindows};
use crate::extractors::staff_session::StaffSession;
use crate::state::app_state::AppState;
use crate::AppError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Operator-assigned device label ("gate-1", "office").
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session_id: Uuid,
    pub scope: SessionScope,
    pub expires_at: OffsetDateTime,
}

// Compare via fixed-size digests so the comparison cost does not depend
// on where the strings diverge, and length is never leaked.
fn password_matches(presented: &str, expected: &str) -> bool {
    blake3::hash(presented.as_bytes()) == blake3::hash(expected.as_bytes())
}

/// Staff login for scanner stations and the office console. The password
/// decides the scope: the device password opens a scan session, the admin
/// password an admin one.
async fn login(
    req: web::Json<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if req.device.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_DEVICE",
            "Device label cannot be empty".to_string(),
        ));
    }

    let scope = if password_matches(&req.password, &app_state.security.admin_password) {
        SessionScope::Admin
    } else if password_matches(&req.password, &app_state.security.device_password) {
        SessionScope::Scan
    } else {
        warn!(device = %req.device, "login rejected: wrong password");
        return Err(AppError::unauthorized_staff());
    };

    let now = OffsetDateTime::now_utc();
    let (token, claims) = mint_session_token(&req.device, scope, now, &app_state.security)?;
    info!(device = %req.device, scope = ?scope, session = %claims.sid, "staff session opened");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        session_id: claims.sid,
        scope,
        expires_at: OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| AppError::internal(format!("session expiry out of range: {e}")))?,
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub device: String,
    pub session_id: Uuid,
    pub scope: SessionScope,
    pub expires_at: OffsetDateTime,
    pub server_time: OffsetDateTime,
    /// Meal currently being served at the facility, if any.
    pub current_meal: Option<Meal>,
    pub meal_windows: MealWindows,
}

/// Session introspection for scanner displays: who am I, when do I
/// expire, and which meal is on right now.
async fn status(
    session: StaffSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let claims = session.0;
    let now = OffsetDateTime::now_utc();
    let local = now.to_offset(app_state.config.facility_offset);

    Ok(HttpResponse::Ok().json(StatusResponse {
        device: claims.dev.clone(),
        session_id: claims.sid,
        scope: claims.scope,
        expires_at: OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| AppError::internal(format!("session expiry out of range: {e}")))?,
        server_time: now,
        current_meal: app_state.config.meal_windows.current(local.time()),
        meal_windows: app_state.config.meal_windows,
    }))
}

/// Mounted under `/api/session`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/login").route(web::post().to(login)))
        .service(web::resource("/status").route(web::get().to(status)));
}
