//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness
//! - [`auth`] - register, login, profile
//! - [`categories`], [`products`], [`variants`] - catalog
//! - [`carts`] - the caller's active cart
//! - [`checkout`] - cart checkout and the payment webhook
//! - [`orders`] - direct orders and order queries
//! - [`inventory`] - stock levels, movements, adjustments
//! - [`statistics`] - admin reports
//!
//! Business routes live under `/api/v1`; health is also served at the root.

use axum::Router;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use shared::{AppError, ErrorCode};

use crate::core::ServerState;
use crate::db::repository::RepoError;

pub mod auth;
pub mod carts;
pub mod categories;
pub mod checkout;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod statistics;
pub mod variants;

/// Handler result
pub type ApiResult<T> = Result<T, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, without middleware or state
fn routes() -> Router<ServerState> {
    let v1 = Router::new()
        .merge(auth::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(variants::router())
        .merge(carts::router())
        .merge(checkout::router())
        .merge(orders::router())
        .merge(inventory::router())
        .merge(statistics::router());

    Router::new()
        .merge(health::router())
        .nest("/api/v1", v1)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// The application router with middleware and state
pub fn build_router(state: ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    routes()
        .layer(cors_layer(&state.config.cors_origins))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .with_state(state)
}

// ── Extraction helpers ──────────────────────────────────────────────
//
// Handlers take `Result<Json<T>, JsonRejection>` (and friends) so a
// malformed request becomes a 400 in the usual error envelope.

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

pub(crate) fn query<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

pub(crate) fn path<T>(param: Result<Path<T>, PathRejection>) -> ApiResult<T> {
    param
        .map(|Path(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

/// Report a unique violation under `code` instead of the generic 409
pub(crate) fn duplicate_as(code: ErrorCode) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::Duplicate(msg) => AppError::with_message(code, msg),
        other => other.into(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::Body;
    use http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::build_router;
    use crate::core::{Config, ServerState};
    use crate::db::repository::user;
    use crate::db::test_support::{memory_pool, seed_user};

    pub async fn app() -> (Router, ServerState) {
        let state = ServerState::new(Config::for_tests(), memory_pool().await);
        (build_router(state.clone()), state)
    }

    /// Seed a user and issue a token for it
    pub async fn login_as(state: &ServerState, email: &str, role: &str) -> (i64, String) {
        let id = seed_user(&state.pool, email, role).await;
        let found = user::find_by_id(&state.pool, id).await.unwrap().unwrap();
        (id, state.jwt_service.generate_token(&found).unwrap())
    }

    /// Send one request; returns the status and the JSON body (`Null` when empty)
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
