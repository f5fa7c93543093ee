use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::DbService;

/// Server state, cloned into every handler
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Arc<Config> | Immutable configuration |
/// | pool | SqlitePool | Database pool |
/// | jwt_service | Arc<JwtService> | Token issuing and validation |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        Self {
            config: Arc::new(config),
            pool,
            jwt_service,
        }
    }

    /// Open the database (applying migrations) and build the state
    pub async fn initialize(config: Config) -> Result<Self> {
        let db = DbService::new(&config.database_url, config.db_max_connections).await?;
        Ok(Self::new(config, db.pool))
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
