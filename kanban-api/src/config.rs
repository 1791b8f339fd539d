/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first when present. [`Config::from_lookup`] does the actual parsing over
/// any key lookup, so tests never touch the process environment.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing secret, at least 32 characters (required)
/// - `JWT_EXPIRATION_HOURS`: access token lifetime (default: 24)
/// - `RANK_POLICY`: `append` or `dense` (default: append)
/// - `CORS_ORIGINS`: comma-separated allowed origins, or `*` (default: *)
/// - `PRODUCTION`: enables HSTS (default: false)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: tracing filter
///
/// # Example
///
/// ```no_run
/// use kanban_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::{bail, Context};
use kanban_shared::store::ranking::RankPolicy;
use std::env;

/// Minimum accepted `JWT_SECRET` length
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub log_format: LogFormat,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Production mode adds HSTS
    pub production: bool,
}

/// Which store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Present whenever `backend` is [`StorageBackend::Postgres`]
    pub database: Option<DatabaseConfig>,

    pub rank_policy: RankPolicy,
}

/// PostgreSQL configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret. Generate with `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in hours
    pub expiration_hours: i64,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Loads configuration from the process environment (and `.env`)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parses configuration from a key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value fails
    /// to parse.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = get("API_HOST", "0.0.0.0");
        let port = get("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let cors_origins = get("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = parse_bool(&get("PRODUCTION", "false")).context("PRODUCTION must be a boolean")?;

        let backend = match get("STORAGE_BACKEND", "postgres").to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        };

        let database = match backend {
            StorageBackend::Postgres => {
                let url = lookup("DATABASE_URL")
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
                let max_connections = get("DATABASE_MAX_CONNECTIONS", "10")
                    .parse::<u32>()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

                Some(DatabaseConfig { url, max_connections })
            }
            StorageBackend::Memory => None,
        };

        let rank_policy = get("RANK_POLICY", "append")
            .parse::<RankPolicy>()
            .map_err(anyhow::Error::msg)?;

        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LENGTH);
        }

        let expiration_hours = get("JWT_EXPIRATION_HOURS", "24")
            .parse::<i64>()
            .context("JWT_EXPIRATION_HOURS must be an integer")?;
        if expiration_hours <= 0 {
            bail!("JWT_EXPIRATION_HOURS must be positive");
        }

        let log_format = match get("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            storage: StorageConfig {
                backend,
                database,
                rank_policy,
            },
            jwt: JwtConfig {
                secret,
                expiration_hours,
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("'{}' is not a boolean", other),
    }
}
