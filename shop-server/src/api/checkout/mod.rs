//! Checkout routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/v1/checkout | POST | bearer |
//! | /api/v1/checkout/webhook | POST | none |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/checkout", post(handler::checkout))
        .route("/checkout/webhook", post(handler::webhook))
}
