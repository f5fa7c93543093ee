//! Statistics routes (ADMIN)
//!
//! | Path | Method |
//! |------|--------|
//! | /api/v1/statistics/admin-overview | GET |
//! | /api/v1/statistics/sales/periods | GET |
//! | /api/v1/statistics/sales/categories | GET |
//! | /api/v1/statistics/sales/top-sku | GET |
//! | /api/v1/statistics/conversion | GET |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/admin-overview", get(handler::overview))
        .route("/sales/periods", get(handler::sales_by_period))
        .route("/sales/categories", get(handler::sales_by_category))
        .route("/sales/top-sku", get(handler::top_skus))
        .route("/conversion", get(handler::conversion))
}
