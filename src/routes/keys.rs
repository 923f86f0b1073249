use actix_web::{web, HttpResponse, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::auth::keyring::{KeyInfo, KeyVersion, KeyringError};
use crate::extractors::staff_session::AdminSession;
use crate::state::app_state::AppState;
use crate::AppError;

#[derive(Debug, Serialize)]
pub struct RotateResponse {
    /// Freshly current key version.
    pub version: KeyVersion,
    /// Superseded versions revoked in the same pass because their grace
    /// window had already lapsed.
    pub swept: Vec<KeyVersion>,
}

/// Rotate the subject signing key. New credentials are issued under the
/// new version; existing ones keep verifying until revoked or swept.
async fn rotate(
    admin: AdminSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut secret = [0u8; 32];
    StdRng::try_from_os_rng()
        .map_err(|e| AppError::internal(format!("OS RNG unavailable: {e}")))?
        .fill_bytes(&mut secret);

    let now = OffsetDateTime::now_utc();
    let version = app_state.keyring.rotate(secret, now);
    // Rotation is the natural moment to expire overdue predecessors.
    let swept = app_state.keyring.sweep(now, app_state.config.key_grace);

    info!(
        by = %admin.0.dev,
        version,
        swept = ?swept,
        "signing key rotated"
    );
    Ok(HttpResponse::Ok().json(RotateResponse { version, swept }))
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub version: KeyVersion,
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub revoked: KeyVersion,
}

/// Immediately invalidate every credential signed under one version.
/// The incident response path for a leaked batch of QR codes.
async fn revoke(
    admin: AdminSession,
    req: web::Json<RevokeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state
        .keyring
        .revoke(req.version)
        .map_err(|e| match e {
            KeyringError::UnknownVersion(version) => AppError::unknown_key_version(version),
            KeyringError::RevokeCurrent(version) => AppError::bad_request(
                "REVOKE_CURRENT",
                format!("version {version} is current; rotate before revoking it"),
            ),
        })?;

    info!(by = %admin.0.dev, version = req.version, "signing key revoked");
    Ok(HttpResponse::Ok().json(RevokeResponse {
        revoked: req.version,
    }))
}

#[derive(Debug, Serialize)]
pub struct KeyListResponse {
    pub current: KeyVersion,
    pub keys: Vec<KeyInfo>,
}

/// Version metadata only; secrets never leave the registry.
async fn list(
    _admin: AdminSession,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(KeyListResponse {
        current: app_state.keyring.current_version(),
        keys: app_state.keyring.list(),
    }))
}

/// Mounted under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/keys/rotate").route(web::post().to(rotate)))
        .service(web::resource("/admin/keys/revoke").route(web::post().to(revoke)))
        .service(web::resource("/admin/keys").route(web::get().to(list)));
}
