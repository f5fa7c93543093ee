//! Health check routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | / | GET | none |
//! | /health | GET | none |

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use crate::api::test_support::{app, send};

    #[tokio::test]
    async fn test_health_routes() {
        let (app, _) = app().await;
        for uri in ["/", "/health"] {
            let (status, body) = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "ok");
            assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        }
    }
}
