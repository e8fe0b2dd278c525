//! Server configuration read from the environment.

use std::net::SocketAddr;

use crate::error::AppError;

/// Which storage backend the server runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local stores with an open user/film directory.
    Memory,
    /// PostgreSQL at the given URL.
    Postgres {
        /// Connection string.
        database_url: String,
        /// Pool size.
        max_connections: u32,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the server binds to.
    pub addr: SocketAddr,
    /// Storage backend.
    pub storage: StorageBackend,
    /// Log output format.
    pub log_format: LogFormat,
    /// OTLP collector endpoint; tracing export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns a variable's
    /// value or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;

        let database_url = var("DATABASE_URL");
        let backend = var("STORAGE_BACKEND").unwrap_or_else(|| {
            if database_url.is_some() {
                "postgres".to_string()
            } else {
                "memory".to_string()
            }
        });
        let storage = match backend.as_str() {
            "memory" => StorageBackend::Memory,
            "postgres" => {
                let database_url = database_url.ok_or_else(|| {
                    AppError::Config(
                        "DATABASE_URL must be set for the postgres backend".to_string(),
                    )
                })?;
                let max_connections: u32 = var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse()
                    .map_err(|e| {
                        AppError::Config(format!(
                            "DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"
                        ))
                    })?;
                StorageBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            other => {
                return Err(AppError::Config(format!(
                    "STORAGE_BACKEND must be memory or postgres, got {other}"
                )));
            }
        };

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "LOG_FORMAT must be json or pretty, got {other}"
                )));
            }
        };

        Ok(Self {
            addr,
            storage,
            log_format,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
