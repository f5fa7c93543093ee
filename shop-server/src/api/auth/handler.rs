//! Auth Handlers

use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State, http::StatusCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::api::{ApiResult, json_body};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::auth as auth_service;

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let request = json_body(payload)?;
    let response = auth_service::register(&state.pool, &state.jwt_service, &request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let request = json_body(payload)?;
    let response = auth_service::login(&state.pool, &state.jwt_service, &request).await?;
    Ok(Json(response))
}

/// GET /api/v1/auth/profile
pub async fn profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(auth_service::profile(&state.pool, &current_user).await?))
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{app, send};

    #[tokio::test]
    async fn test_register_login_profile() {
        let (app, _) = app().await;

        let (status, registered) = send(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "ann@example.com", "name": "Ann", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(registered["user"]["role"], "USER");
        assert!(registered["user"].get("passwordHash").is_none());

        let (status, logged_in) = send(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ann@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = logged_in["accessToken"].as_str().unwrap();

        let (status, profile) = send(&app, Method::GET, "/api/v1/auth/profile", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["email"], "ann@example.com");
    }

    #[tokio::test]
    async fn test_auth_failures() {
        let (app, _) = app().await;

        let (status, body) = send(&app, Method::GET, "/api/v1/auth/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 1001);

        let (status, _) =
            send(&app, Method::GET, "/api/v1/auth/profile", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ghost@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "ann@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
