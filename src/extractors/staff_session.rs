use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::auth::session::{self, SessionClaims, SessionScope};
use crate::state::app_state::AppState;
use crate::AppError;

/// Verified staff session extracted from the Authorization header.
/// Any scope is accepted; scan stations and admin consoles both pass.
#[derive(Debug, Clone)]
pub struct StaffSession(pub SessionClaims);

/// Verified staff session restricted to admin scope. Key management,
/// credential issuance, leave overrides, and audit reads require this.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(AppError::unauthorized_staff)?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::unauthorized_staff())?;

    // Parse "Bearer <token>" format
    let parts: Vec<&str> = auth_value.split_whitespace().collect();
    if parts.len() != 2 || parts[0] != "Bearer" || parts[1].is_empty() {
        return Err(AppError::unauthorized_staff());
    }

    Ok(parts[1].to_string())
}

fn verified_session(req: &HttpRequest) -> Result<SessionClaims, AppError> {
    let token = bearer_token(req)?;
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not available".to_string()))?;
    session::verify_session_token(&token, &state.security)
}

impl FromRequest for StaffSession {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { verified_session(&req).map(StaffSession) })
    }
}

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let claims = verified_session(&req)?;
            if claims.scope != SessionScope::Admin {
                return Err(AppError::forbidden_scope(format!(
                    "device {} holds a scan session; this operation needs admin scope",
                    claims.dev
                )));
            }
            Ok(AdminSession(claims))
        })
    }
}
