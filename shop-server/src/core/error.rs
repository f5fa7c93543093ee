//! Server and service-layer errors
//!
//! - [`ServerError`]: startup failures (database, migrations, socket)
//! - [`ServiceError`]: bridges DB-layer errors (`sqlx::Error`, [`RepoError`])
//!   and the API-layer [`AppError`], so services can use `?` on both

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::repository::RepoError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bootstrap failed: {0}")]
    Bootstrap(String),
}

/// Result type for server startup
pub type Result<T> = std::result::Result<T, ServerError>;

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: Business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(err) => write!(f, "database error: {err}"),
            ServiceError::App(err) => write!(f, "{err}"),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Database(err) => ServiceError::Db(err.into()),
            other => ServiceError::App(other.into()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_is_hidden() {
        let err = ServiceError::from(sqlx::Error::RowNotFound);
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn test_app_error_passes_through() {
        let err = ServiceError::from(AppError::new(ErrorCode::CartEmpty));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::CartEmpty);
    }

    #[test]
    fn test_repo_error_mapping() {
        let err = ServiceError::from(RepoError::NotFound("Variant 9 not found".into()));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::NotFound);
        assert_eq!(app.message, "Variant 9 not found");
    }
}
