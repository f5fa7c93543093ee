//! Shop Server - e-commerce backend
//!
//! # Architecture
//!
//! Catalog browsing, carts, checkout, inventory, orders, authentication and
//! administrative statistics over a single SQLite database. The checkout core
//! turns an active cart into an order inside one transaction: stock is
//! reserved through the ledger, the order and its payment intent are
//! created, and a payment webhook later reconciles the order status.
//!
//! # Module structure
//!
//! ```text
//! shop-server/src/
//! ├── core/          # config, state, errors, server
//! ├── auth/          # JWT, extractor, password hashing, policy
//! ├── db/            # pool, migrations, repositories
//! ├── pricing/       # decimal money
//! ├── services/      # ledger, checkout, status machine, reconciliation
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logger, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod pricing;
pub mod services;
pub mod utils;

// Re-export public types
pub use crate::auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use shared::error::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use crate::utils::logger::init_logger;

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
