//! Staff session token helpers for tests

use messgate::auth::session::{mint_session_token, SessionClaims, SessionScope};
use messgate::state::security_config::SecurityConfig;
use time::{Duration, OffsetDateTime};

/// Mint a session token for the given device and scope
pub fn mint_test_token(device: &str, scope: SessionScope, sec: &SecurityConfig) -> String {
    let (token, _) = mint_session_token(device, scope, OffsetDateTime::now_utc(), sec)
        .expect("should mint session token");
    token
}

/// Mint a session token and return its claims alongside
pub fn mint_test_session(
    device: &str,
    scope: SessionScope,
    sec: &SecurityConfig,
) -> (String, SessionClaims) {
    mint_session_token(device, scope, OffsetDateTime::now_utc(), sec)
        .expect("should mint session token")
}

/// Full Authorization header value including the "Bearer " prefix
pub fn bearer_header(device: &str, scope: SessionScope, sec: &SecurityConfig) -> String {
    format!("Bearer {}", mint_test_token(device, scope, sec))
}

/// Mint a token that expired well before now, past any validation leeway
pub fn expired_token(device: &str, scope: SessionScope, sec: &SecurityConfig) -> String {
    let minted_at = OffsetDateTime::now_utc() - sec.session_ttl - Duration::hours(1);
    let (token, _) =
        mint_session_token(device, scope, minted_at, sec).expect("should mint session token");
    token
}
