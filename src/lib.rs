#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod config;
pub mod domain;
pub mod edge;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod trace_ctx;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use auth::codec::{decode_credential, encode_credential, CodecError, CredentialClaims};
pub use auth::keyring::{KeyVersion, Keyring, KeyringError};
pub use auth::session::{mint_session_token, verify_session_token, SessionClaims, SessionScope};
pub use edge::cache::{EdgeCache, EdgeSnapshot};
pub use error::AppError;
pub use extractors::staff_session::{AdminSession, StaffSession};
pub use middleware::cors::cors_middleware;
pub use middleware::request_trace::RequestTrace;
pub use middleware::structured_logger::StructuredLogger;
pub use middleware::trace_span::TraceSpan;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Prelude for test convenience
pub mod prelude {
    pub use super::auth::*;
    pub use super::domain::*;
    pub use super::error::*;
    pub use super::extractors::*;
    pub use super::middleware::*;
    pub use super::state::*;
    pub use super::store::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
