use jsonwebtoken::Algorithm;
use time::Duration;

// blake3 derivation contexts. Globally unique strings, never reused; the
// staff-session namespace and the subject-credential namespace must stay
// disjoint so a token minted in one can never verify in the other.
const STAFF_SESSION_KEY_CONTEXT: &str = "messgate 2026-03-01 staff session signing key";
const SUBJECT_KEY_SEED_CONTEXT: &str = "messgate 2026-03-01 subject credential key seed";

/// Security material and policy knobs, derived once from the master secret.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// HMAC secret for staff session tokens (derived, never the master).
    staff_jwt_secret: [u8; 32],
    /// Seed for the first subject signing key (derived, never the master).
    subject_key_seed: [u8; 32],
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Shared password presented by scanner devices at login.
    pub device_password: String,
    /// Password for admin-scoped sessions.
    pub admin_password: String,
    /// Lifetime of a staff session token.
    pub session_ttl: Duration,
}

impl SecurityConfig {
    pub fn new(
        master_secret: impl AsRef<[u8]>,
        device_password: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        let master = master_secret.as_ref();
        Self {
            staff_jwt_secret: blake3::derive_key(STAFF_SESSION_KEY_CONTEXT, master),
            subject_key_seed: blake3::derive_key(SUBJECT_KEY_SEED_CONTEXT, master),
            algorithm: Algorithm::HS256,
            device_password: device_password.into(),
            admin_password: admin_password.into(),
            session_ttl: Duration::hours(12),
        }
    }

    pub fn staff_jwt_secret(&self) -> &[u8] {
        &self.staff_jwt_secret
    }

    pub fn subject_key_seed(&self) -> [u8; 32] {
        self.subject_key_seed
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_master_for_tests_only", "scan-pw", "admin-pw")
    }
}
