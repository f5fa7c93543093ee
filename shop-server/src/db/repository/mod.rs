//! Repository Module
//!
//! Free functions over a `SqlitePool` (reads, single-statement writes) or a
//! `Transaction` (steps of a larger unit of work).

// Auth
pub mod user;

// Catalog
pub mod category;
pub mod product;
pub mod variant;

// Inventory
pub mod stock;

// Carts & Orders
pub mod cart;
pub mod order;
pub mod payment;

// Reports
pub mod statistics;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Still referenced by another row (foreign key)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return RepoError::Duplicate(db_err.message().to_string());
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return RepoError::Conflict(db_err.message().to_string());
                }
                sqlx::error::ErrorKind::CheckViolation => {
                    return RepoError::Validation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Conflict(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// `COUNT(*)` result as a page total
pub(crate) fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
