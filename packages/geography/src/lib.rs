#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Department boundary loading and normalization.
//!
//! Loads the static `GeoJSON` department boundary document from a
//! versioned URL or a local file and turns its features into
//! [`Region`](bakery_map_geography_models::Region) values. The loader is
//! behind the [`BoundaryLoader`] trait so the refresh cycle can be driven
//! by in-memory documents in tests.

pub mod fetch;
pub mod normalize;

use bakery_map_geography_models::BoundarySource;
use geojson::GeoJson;
use thiserror::Error;

/// Errors that can occur while loading the boundary document.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a local boundary file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Something that can produce the boundary document for a refresh cycle.
#[async_trait::async_trait]
pub trait BoundaryLoader: Send + Sync {
    /// Loads the boundary document.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the document cannot be fetched or is
    /// not valid `GeoJSON`.
    async fn load(&self) -> Result<GeoJson, BoundaryError>;
}

/// Loads the boundary document from a configured [`BoundarySource`].
pub struct SourceLoader {
    client: reqwest::Client,
    source: BoundarySource,
}

impl SourceLoader {
    /// Creates a loader for `source`, reusing `client` for HTTP sources.
    #[must_use]
    pub const fn new(client: reqwest::Client, source: BoundarySource) -> Self {
        Self { client, source }
    }

    /// Returns the configured source.
    #[must_use]
    pub const fn source(&self) -> &BoundarySource {
        &self.source
    }
}

#[async_trait::async_trait]
impl BoundaryLoader for SourceLoader {
    async fn load(&self) -> Result<GeoJson, BoundaryError> {
        log::debug!("Loading boundary document from {}", self.source);
        let document = match &self.source {
            BoundarySource::Url { url } => fetch::fetch_url(&self.client, url).await?,
            BoundarySource::File { path } => fetch::read_file(path).await?,
        };
        log::info!("Loaded boundary document from {}", self.source);
        Ok(document)
    }
}

/// A loader that always returns the same in-memory document.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    document: GeoJson,
}

impl StaticLoader {
    /// Wraps an already-parsed document.
    #[must_use]
    pub const fn new(document: GeoJson) -> Self {
        Self { document }
    }
}

#[async_trait::async_trait]
impl BoundaryLoader for StaticLoader {
    async fn load(&self) -> Result<GeoJson, BoundaryError> {
        Ok(self.document.clone())
    }
}
