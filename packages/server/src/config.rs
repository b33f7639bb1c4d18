//! Server configuration from environment variables.

use bakery_map_geography_models::BoundarySource;
use bakery_map_view::{ConfigError, MapConfig};
use thiserror::Error;

/// Errors reading the server configuration.
#[derive(Debug, Error)]
pub enum ServerConfigError {
    /// A required variable is not set.
    #[error("Missing environment variable {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },

    /// A variable is set but unusable.
    #[error("Invalid value for {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What is wrong.
        message: String,
    },

    /// The `MAP_CONFIG` file could not be read.
    #[error("Failed to read map config {path}: {source}")]
    Io {
        /// Path from `MAP_CONFIG`.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The map configuration is invalid.
    #[error(transparent)]
    Map(#[from] ConfigError),
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Where the boundary document lives.
    pub boundary: BoundarySource,
    /// Root URL of the statistics service.
    pub stats_base_url: String,
    /// Bearer token for the statistics service.
    pub stats_token: Option<String>,
    /// Retries for transient statistics failures.
    pub stats_max_retries: u32,
    /// Map view defaults.
    pub map: MapConfig,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerConfigError`] if a required variable is missing or a
    /// value is invalid.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// `BIND_ADDR` defaults to `127.0.0.1`, `PORT` to `8080` and
    /// `STATS_MAX_RETRIES` to `3`.
    /// `BOUNDARY_URL` takes precedence over `BOUNDARY_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerConfigError`] if a required variable is missing or a
    /// value is invalid.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ServerConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match var("PORT") {
            Some(p) => p.trim().parse().map_err(|e| ServerConfigError::Invalid {
                name: "PORT",
                message: format!("{e}"),
            })?,
            None => 8080,
        };

        let stats_max_retries = match var("STATS_MAX_RETRIES") {
            Some(n) => n.trim().parse().map_err(|e| ServerConfigError::Invalid {
                name: "STATS_MAX_RETRIES",
                message: format!("{e}"),
            })?,
            None => 3,
        };

        let boundary = if let Some(url) = var("BOUNDARY_URL") {
            BoundarySource::Url { url }
        } else if let Some(path) = var("BOUNDARY_PATH") {
            BoundarySource::File { path }
        } else {
            return Err(ServerConfigError::Missing {
                name: "BOUNDARY_URL",
            });
        };

        let stats_base_url = var("STATS_BASE_URL").ok_or(ServerConfigError::Missing {
            name: "STATS_BASE_URL",
        })?;

        let map = match var("MAP_CONFIG") {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .map_err(|source| ServerConfigError::Io { path, source })?;
                MapConfig::embedded().merge_toml(&contents)?
            }
            None => MapConfig::embedded(),
        };

        Ok(Self {
            bind_addr,
            port,
            boundary,
            stats_base_url,
            stats_token: var("STATS_TOKEN"),
            stats_max_retries,
            map,
        })
    }
}
