use actix_web::error::ResponseError;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::auth::codec::CodecError;
use crate::store::StoreError;
use crate::trace_ctx;

/// RFC 7807 problem document returned for every error response.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Presented credential is not parseable as a token (bad structure,
    /// bad encoding, malformed payload).
    #[error("Invalid credential format")]
    InvalidFormat,
    /// Credential parsed but its authenticity tag does not match.
    #[error("Credential signature mismatch")]
    InvalidSignature,
    /// Credential names a key version the registry does not hold
    /// (revoked or never issued).
    #[error("Unknown signing key version {version}")]
    UnknownKeyVersion { version: u32 },
    /// Missing, malformed, or unverifiable staff session token.
    #[error("Unauthorized staff session")]
    UnauthorizedStaff,
    /// Staff session token was valid once but is past its expiry.
    #[error("Staff session expired")]
    SessionExpired,
    /// Staff session is valid but its scope does not permit the operation.
    #[error("Forbidden: {detail}")]
    ForbiddenScope { detail: String },
    #[error("Subject not found: {detail}")]
    SubjectNotFound { detail: String },
    /// Backing store did not answer within the deadline, or reported
    /// itself down. Retriable; edge devices fall back to cached state.
    #[error("Backend unavailable: {detail}")]
    BackendUnavailable { detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: &'static str, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Helper method to extract error code from any error variant
    fn code(&self) -> String {
        match self {
            AppError::InvalidFormat => "INVALID_FORMAT".to_string(),
            AppError::InvalidSignature => "INVALID_SIGNATURE".to_string(),
            AppError::UnknownKeyVersion { .. } => "UNKNOWN_KEY_VERSION".to_string(),
            AppError::UnauthorizedStaff => "UNAUTHORIZED_STAFF".to_string(),
            AppError::SessionExpired => "SESSION_EXPIRED".to_string(),
            AppError::ForbiddenScope { .. } => "FORBIDDEN_SCOPE".to_string(),
            AppError::SubjectNotFound { .. } => "SUBJECT_NOT_FOUND".to_string(),
            AppError::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE".to_string(),
            AppError::BadRequest { code, .. } => code.to_string(),
            AppError::Config { .. } => "CONFIG_ERROR".to_string(),
            AppError::Internal { .. } => "INTERNAL".to_string(),
        }
    }

    /// Helper method to extract error detail from any error variant
    fn detail(&self) -> String {
        match self {
            AppError::InvalidFormat => "Credential is not a well-formed token".to_string(),
            AppError::InvalidSignature => "Credential failed signature verification".to_string(),
            AppError::UnknownKeyVersion { version } => {
                format!("Credential signed with unknown key version {version}")
            }
            AppError::UnauthorizedStaff => "Missing or invalid staff session token".to_string(),
            AppError::SessionExpired => "Staff session has expired".to_string(),
            AppError::ForbiddenScope { detail } => detail.clone(),
            AppError::SubjectNotFound { detail } => detail.clone(),
            AppError::BackendUnavailable { detail } => detail.clone(),
            AppError::BadRequest { detail, .. } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
            AppError::Internal { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidFormat => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature => StatusCode::BAD_REQUEST,
            AppError::UnknownKeyVersion { .. } => StatusCode::BAD_REQUEST,
            AppError::UnauthorizedStaff => StatusCode::UNAUTHORIZED,
            AppError::SessionExpired => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenScope { .. } => StatusCode::FORBIDDEN,
            AppError::SubjectNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether a client should treat this failure as transient and retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, AppError::BackendUnavailable { .. })
    }

    pub fn invalid_format() -> Self {
        Self::InvalidFormat
    }

    pub fn invalid_signature() -> Self {
        Self::InvalidSignature
    }

    pub fn unknown_key_version(version: u32) -> Self {
        Self::UnknownKeyVersion { version }
    }

    pub fn unauthorized_staff() -> Self {
        Self::UnauthorizedStaff
    }

    pub fn session_expired() -> Self {
        Self::SessionExpired
    }

    pub fn forbidden_scope(detail: String) -> Self {
        Self::ForbiddenScope { detail }
    }

    pub fn subject_not_found(detail: String) -> Self {
        Self::SubjectNotFound { detail }
    }

    pub fn backend_unavailable(detail: String) -> Self {
        Self::BackendUnavailable { detail }
    }

    pub fn bad_request(code: &'static str, detail: String) -> Self {
        Self::BadRequest { code, detail }
    }

    pub fn config(detail: String) -> Self {
        Self::Config { detail }
    }

    pub fn internal(detail: String) -> Self {
        Self::Internal { detail }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl From<CodecError> for AppError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::InvalidFormat => AppError::invalid_format(),
            CodecError::InvalidSignature => AppError::invalid_signature(),
            CodecError::UnknownKeyVersion(version) => AppError::unknown_key_version(version),
            CodecError::Encode(detail) => AppError::internal(detail),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(detail) => AppError::backend_unavailable(detail),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();
        let detail = self.detail();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://messgate.app/errors/{}", code.to_uppercase()),
            title: Self::humanize_code(&code),
            status: status.as_u16(),
            detail,
            code,
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id));

        // RFC 7235 wants WWW-Authenticate on 401; RFC 7231 wants
        // Retry-After on 503 so scanners know a retry is worthwhile.
        match status {
            StatusCode::UNAUTHORIZED => {
                builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                builder.insert_header((header::RETRY_AFTER, "1"));
            }
            _ => {}
        }

        builder.json(problem_details)
    }
}
