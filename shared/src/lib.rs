//! Shared types for the shop backend
//!
//! Wire types used by the server and its clients: the unified error system,
//! domain models and request/response DTOs, and the pagination envelope.

pub mod error;
pub mod models;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use pagination::{PageQuery, PaginatedResponse};
