//! Cart routes (authenticated, always the caller's own cart)
//!
//! | Path | Method |
//! |------|--------|
//! | /api/v1/carts/active | GET |
//! | /api/v1/carts/items | POST, PUT, DELETE |
//! | /api/v1/carts/items/{variantId} | DELETE |
//! | /api/v1/carts/checkout | POST |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/carts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/active", get(handler::active))
        .route(
            "/items",
            post(handler::set_item)
                .put(handler::set_item)
                .delete(handler::clear),
        )
        .route("/items/{variant_id}", delete(handler::remove_item))
        .route("/checkout", post(handler::close))
}
