//! Auth routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/v1/auth/register | POST | none |
//! | /api/v1/auth/login | POST | none |
//! | /api/v1/auth/profile | GET | bearer |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/profile", get(handler::profile))
}
