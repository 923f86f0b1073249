//! Staff session tokens.
//!
//! Scanner stations and admin consoles authenticate with short-lived HS256
//! JWTs. These live in a different key namespace from subject credentials
//! (see [`crate::state::security_config::SecurityConfig`]), carry an
//! explicit `typ` tag, and expire on their own; none of that applies to
//! subject credentials, which only die by key revocation.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::security_config::SecurityConfig;
use crate::AppError;

pub const STAFF_TOKEN_TYPE: &str = "staff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionScope {
    /// May submit scans and pull edge snapshots.
    Scan,
    /// May additionally rotate/revoke keys, issue credentials, and read
    /// the audit log.
    Admin,
}

/// Claims included in staff session tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Session identifier, minted fresh at login.
    pub sid: Uuid,
    /// Operator-assigned device label ("gate-1", "office").
    pub dev: String,
    pub scope: SessionScope,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    /// Token type tag, always [`STAFF_TOKEN_TYPE`].
    pub typ: String,
}

/// Mint a staff session token. TTL comes from the security config.
pub fn mint_session_token(
    device: &str,
    scope: SessionScope,
    now: OffsetDateTime,
    security: &SecurityConfig,
) -> Result<(String, SessionClaims), AppError> {
    let iat = now.unix_timestamp();
    let exp = iat + security.session_ttl.whole_seconds();

    let claims = SessionClaims {
        sid: Uuid::new_v4(),
        dev: device.to_string(),
        scope,
        iat,
        exp,
        typ: STAFF_TOKEN_TYPE.to_string(),
    };

    let token = encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(security.staff_jwt_secret()),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

    Ok((token, claims))
}

/// Verify a staff session token and return its claims.
///
/// Errors:
/// - Expired token → `AppError::session_expired()`
/// - Anything else (bad signature, wrong namespace, wrong `typ`, not a
///   JWT at all) → `AppError::unauthorized_staff()`
pub fn verify_session_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<SessionClaims, AppError> {
    // Default Validation already checks exp; pin algorithm to configured algorithm.
    let validation = Validation::new(security.algorithm);

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(security.staff_jwt_secret()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::session_expired(),
        _ => AppError::unauthorized_staff(),
    })?;

    if claims.typ != STAFF_TOKEN_TYPE {
        return Err(AppError::unauthorized_staff());
    }

    Ok(claims)
}
