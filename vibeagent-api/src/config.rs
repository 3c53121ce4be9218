//! Configuration management for the API server
//!
//! Configuration comes from environment variables (a `.env` file is loaded
//! first when present).
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8080)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
//! - `REQUEST_CAPTURE_ENABLED`: Mount the `/test` capture endpoint (default: true)
//! - `STORE_BACKEND`: `postgres` (default) or `memory`
//! - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `LOG_FORMAT`: `text` (default) or `json`
//! - `RUST_LOG`: Log filter, read directly by the tracing subscriber
//!
//! # Example
//!
//! ```no_run
//! use vibeagent_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::{env, fmt, str::FromStr};
use vibeagent_shared::db::pool::DatabaseConfig;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub log: LogConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,

    /// Whether `/test` records incoming requests
    pub request_capture: bool,
}

/// Which document store backs the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("Unknown STORE_BACKEND '{}' (expected postgres or memory)", other),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Postgres => f.write_str("postgres"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Present when `backend` is `Postgres`
    pub database: Option<DatabaseConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Emit JSON log lines instead of human-readable text
    pub json: bool,
}

impl Default for Config {
    /// In-memory store, local bind, permissive CORS
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                request_capture: true,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                database: None,
            },
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value, or if
    /// `DATABASE_URL` is missing while the Postgres backend is selected.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT must be a valid port number: {}", e))?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let request_capture = parse_bool(
            "REQUEST_CAPTURE_ENABLED",
            lookup("REQUEST_CAPTURE_ENABLED").as_deref(),
            true,
        )?;

        let backend: StoreBackend = lookup("STORE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .parse()?;

        let database = match backend {
            StoreBackend::Postgres => {
                let url = lookup("DATABASE_URL")
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
                let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse::<u32>()?;

                Some(DatabaseConfig {
                    url,
                    max_connections,
                    ..Default::default()
                })
            }
            StoreBackend::Memory => None,
        };

        let json = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => false,
            Some("json") => true,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                request_capture,
            },
            store: StoreConfig { backend, database },
            log: LogConfig { json },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS allows any origin
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_bool(key: &str, value: Option<&str>, default: bool) -> anyhow::Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => anyhow::bail!("{} must be a boolean, got '{}'", key, v),
        },
    }
}
