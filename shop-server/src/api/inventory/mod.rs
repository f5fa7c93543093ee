//! Inventory routes (MANAGER / ADMIN)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/inventory", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/movements", get(handler::movements))
        .route("/adjust", post(handler::adjust))
        .route("/{variant_id}", get(handler::get_by_variant))
}
