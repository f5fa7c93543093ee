//! Bearer-token authentication for handlers
//!
//! Any handler taking a [`CurrentUser`] argument is authenticated. The
//! principal is resolved once per request and cached in the extensions.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// The raw token from `Authorization: Bearer <token>`
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let Some(value) = parts.headers.get(http::header::AUTHORIZATION) else {
        security_log!("WARN", "auth_missing", uri = parts.uri.to_string());
        return Err(AppError::not_authenticated());
    };

    value
        .to_str()
        .ok()
        .and_then(JwtService::extract_from_header)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
}

fn rejection(err: &JwtError) -> AppError {
    match err {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    }
}

/// Validate the token and map its claims onto a shop principal
fn resolve(jwt: &JwtService, token: &str, uri: &http::Uri) -> Result<CurrentUser, AppError> {
    let claims = jwt.validate_token(token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = e.to_string(), uri = uri.to_string());
        rejection(&e)
    })?;

    match CurrentUser::try_from(claims) {
        Ok(user) if user.id > 0 => Ok(user),
        Ok(user) => Err(AppError::invalid_token(format!(
            "Malformed JWT claims: user id {}",
            user.id
        ))),
        Err(e) => Err(AppError::invalid_token(format!("Malformed JWT claims: {e}"))),
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let user = resolve(&state.get_jwt_service(), token, &parts.uri)?;
        tracing::trace!(user_id = user.id, role = ?user.role, "Request authenticated");

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
