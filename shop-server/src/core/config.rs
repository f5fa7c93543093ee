use crate::auth::JwtConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | PORT | 3000 | HTTP port |
/// | DATABASE_URL | sqlite:shop.db | SQLite database URL |
/// | DB_MAX_CONNECTIONS | 5 | Pool size |
/// | JWT_SECRET | dev fallback | HMAC secret (required outside development) |
/// | JWT_EXPIRES_IN | 1h | Token lifetime (`30s`, `15m`, `1h`, `7d` or seconds) |
/// | JWT_ISSUER | shop-server | Token issuer |
/// | JWT_AUDIENCE | shop-clients | Token audience |
/// | ENVIRONMENT | development | development / staging / production |
/// | CORS_ORIGINS | * | Comma-separated allowed origins |
/// | LOG_LEVEL | info | Default log level |
/// | LOG_FORMAT | text | `json` for structured output |
/// | LOG_DIR | - | Daily rolling log files |
/// | ADMIN_EMAIL / ADMIN_PASSWORD | - | Bootstrap ADMIN account |
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// SQLite URL (`sqlite:path/to/file.db`)
    pub database_url: String,
    /// Connection pool size
    pub db_max_connections: u32,
    /// JWT settings
    pub jwt: JwtConfig,
    /// Environment: development | staging | production
    pub environment: String,
    /// Allowed CORS origins (`*` = any)
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// Bootstrap administrator credentials
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let expires_in = std::env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| "1h".into());
        let expiration_seconds = parse_duration_secs(&expires_in)
            .ok_or_else(|| format!("JWT_EXPIRES_IN has an invalid value: {expires_in}"))?;

        Ok(Self {
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:shop.db".into()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            jwt: JwtConfig {
                secret: Self::require_secret("JWT_SECRET", &environment)?,
                expiration_seconds,
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "shop-server".into()),
                audience: std::env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| "shop-clients".into()),
            },
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    /// Whether this is the production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Fixed configuration for tests (in-memory database, known secret)
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            database_url: "sqlite::memory:".into(),
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "test-secret-with-enough-length-0123456789".into(),
                expiration_seconds: 3600,
                issuer: "shop-server".into(),
                audience: "shop-clients".into(),
            },
            environment: "development".into(),
            cors_origins: vec!["*".into()],
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            admin_email: None,
            admin_password: None,
        }
    }
}

/// Parse a lifetime such as `30s`, `15m`, `1h`, `7d` or a bare number of seconds
pub fn parse_duration_secs(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let (digits, multiplier) = match value.chars().last()? {
        's' => (&value[..value.len() - 1], 1),
        'm' => (&value[..value.len() - 1], 60),
        'h' => (&value[..value.len() - 1], 3600),
        'd' => (&value[..value.len() - 1], 86_400),
        _ => (value, 1),
    };
    let amount: i64 = digits.parse().ok()?;
    if amount <= 0 {
        return None;
    }
    amount.checked_mul(multiplier)
}
