//! Subject credential codec.
//!
//! Wire form is `base64url(payload) "." base64url(tag)` with no padding:
//! the payload is a small JSON claims document and the tag is a 32-byte
//! keyed BLAKE3 MAC over the exact payload bytes. The MAC key is derived
//! from the per-version registry secret under a credential-only context
//! string, so staff session secrets can never validate a subject token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::keyring::{KeyVersion, Keyring};

pub const SUBJECT_TOKEN_TYPE: &str = "subject";
/// Hard ceiling on encoded length; tokens are printed as QR codes and
/// anything beyond this hurts scan reliability.
pub const MAX_TOKEN_LEN: usize = 200;

const MAC_CONTEXT: &str = "messgate 2026-03-01 subject credential mac";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Not parseable as a credential: bad structure, bad base64, or a
    /// payload that is not a subject claims document.
    InvalidFormat,
    /// Well-formed, but the tag does not match the payload under the
    /// named key version.
    InvalidSignature,
    /// The named key version was never issued or has been revoked.
    UnknownKeyVersion(KeyVersion),
    /// Claims could not be serialized while issuing. Not a verification
    /// outcome; surfaces as an internal error.
    Encode(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CodecError::InvalidFormat => write!(f, "invalid credential format"),
            CodecError::InvalidSignature => write!(f, "credential signature mismatch"),
            CodecError::UnknownKeyVersion(v) => write!(f, "unknown key version {v}"),
            CodecError::Encode(detail) => write!(f, "credential encoding failed: {detail}"),
        }
    }
}

impl Error for CodecError {}

/// Claims carried by a subject credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Token type tag, always [`SUBJECT_TOKEN_TYPE`].
    pub typ: String,
    /// Key version the tag was computed under.
    pub v: KeyVersion,
    /// Subject identifier.
    pub sub: Uuid,
    /// Issued-at (seconds since epoch). Informational; credentials do not
    /// expire, they are invalidated by key revocation.
    pub iat: i64,
}

fn mac_tag(secret: &[u8; 32], payload: &[u8]) -> blake3::Hash {
    let mac_key = blake3::derive_key(MAC_CONTEXT, secret);
    blake3::keyed_hash(&mac_key, payload)
}

/// Encode a credential for `subject` under the given key version.
/// Deterministic: the same inputs always produce the same token.
pub fn encode_credential(
    subject: Uuid,
    version: KeyVersion,
    issued_at: OffsetDateTime,
    keyring: &Keyring,
) -> Result<String, CodecError> {
    let secret = keyring
        .secret_for(version)
        .ok_or(CodecError::UnknownKeyVersion(version))?;
    let claims = CredentialClaims {
        typ: SUBJECT_TOKEN_TYPE.to_string(),
        v: version,
        sub: subject,
        iat: issued_at.unix_timestamp(),
    };
    let payload = serde_json::to_vec(&claims).map_err(|e| CodecError::Encode(e.to_string()))?;
    let tag = mac_tag(&secret, &payload);

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(tag.as_bytes())
    ))
}

// Shared structural parse: splits, base64-decodes, and checks the claims
// document. Returns the raw payload bytes alongside the claims so the MAC
// is computed over exactly what was presented, never a re-serialization.
fn parse_parts(token: &str) -> Result<(Vec<u8>, [u8; 32], CredentialClaims), CodecError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(CodecError::InvalidFormat);
    }
    let (payload_b64, tag_b64) = token.split_once('.').ok_or(CodecError::InvalidFormat)?;
    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| CodecError::InvalidFormat)?;
    let tag_bytes = URL_SAFE_NO_PAD
        .decode(tag_b64)
        .map_err(|_| CodecError::InvalidFormat)?;
    let tag: [u8; 32] = tag_bytes
        .try_into()
        .map_err(|_| CodecError::InvalidFormat)?;
    let claims: CredentialClaims =
        serde_json::from_slice(&payload).map_err(|_| CodecError::InvalidFormat)?;
    if claims.typ != SUBJECT_TOKEN_TYPE {
        return Err(CodecError::InvalidFormat);
    }
    Ok((payload, tag, claims))
}

/// Decode and verify a credential against the registry.
pub fn decode_credential(token: &str, keyring: &Keyring) -> Result<CredentialClaims, CodecError> {
    let (payload, tag, claims) = parse_parts(token)?;
    let secret = keyring
        .secret_for(claims.v)
        .ok_or(CodecError::UnknownKeyVersion(claims.v))?;
    // blake3::Hash equality is constant-time.
    if mac_tag(&secret, &payload) != blake3::Hash::from(tag) {
        return Err(CodecError::InvalidSignature);
    }
    Ok(claims)
}

/// Parse claims without verifying the tag.
///
/// For edge devices only: snapshots deliberately carry no signing
/// secrets, so an edge can check structure and key-version revocation but
/// must treat the result as provisional until server replay.
pub fn decode_claims_unverified(token: &str) -> Result<CredentialClaims, CodecError> {
    let (_, _, claims) = parse_parts(token)?;
    Ok(claims)
}
