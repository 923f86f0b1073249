//! Credentials, key registry, and staff sessions.

pub mod codec;
pub mod keyring;
pub mod session;

pub use codec::{decode_credential, encode_credential, CodecError, CredentialClaims};
pub use keyring::{KeyVersion, Keyring, KeyringError};
pub use session::{mint_session_token, verify_session_token, SessionClaims, SessionScope};
