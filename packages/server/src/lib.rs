#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the bakery stock map.
//!
//! Serves the enriched department document, the status summary and legend
//! for the national dashboard, and a rendered SVG choropleth for the home
//! page. A refresh coordinator holds the last good document; refreshes are
//! triggered at startup and by `POST /api/refresh`.

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use bakery_map_enrich::RefreshCoordinator;
use bakery_map_geography::SourceLoader;
use bakery_map_stats::retry::RetryPolicy;
use bakery_map_stats::{HttpStatisticsSource, Session};
use bakery_map_view::MapConfig;

pub use config::{ServerConfig, ServerConfigError};

/// Shared application state.
pub struct AppState {
    /// Refresh coordinator holding the published document.
    pub coordinator: Arc<RefreshCoordinator>,
    /// Map view defaults for rendered maps.
    pub map: MapConfig,
    /// Statistics service session, torn down on shutdown.
    pub session: Arc<Session>,
}

impl AppState {
    /// Wires the HTTP statistics client and boundary loader described by
    /// `config` into a coordinator.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        let client = reqwest::Client::new();
        let session = Session::init(config.stats_token.clone());

        let stats = HttpStatisticsSource::new(client.clone(), &config.stats_base_url, session.clone())
            .with_retry(RetryPolicy {
                max_retries: config.stats_max_retries,
                ..RetryPolicy::default()
            });
        let boundaries = SourceLoader::new(client, config.boundary.clone());

        Self {
            coordinator: Arc::new(RefreshCoordinator::new(
                Arc::new(stats),
                Arc::new(boundaries),
                config.map.fields.clone(),
            )),
            map: config.map.clone(),
            session,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/regions", web::get().to(handlers::regions))
            .route("/regions/{code}", web::get().to(handlers::region))
            .route("/summary", web::get().to(handlers::summary))
            .route("/legend", web::get().to(handlers::legend))
            .route("/map.svg", web::get().to(handlers::map_svg))
            .route("/refresh", web::post().to(handlers::refresh))
            .route("/refresh/status", web::get().to(handlers::refresh_status)),
    );
}

/// Starts the bakery stock map API server.
///
/// Reads [`ServerConfig`] from the environment, runs an initial refresh
/// and starts the Actix-Web HTTP server. A failed initial refresh is
/// logged and the server starts anyway; the map endpoints report the
/// failure until a refresh succeeds.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid, or
/// if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    log::info!("Boundary document: {}", config.boundary);
    log::info!("Statistics service: {}", config.stats_base_url);

    let state = web::Data::new(AppState::from_config(&config));

    log::info!("Running initial refresh...");
    if let Err(e) = state.coordinator.refresh().await {
        log::warn!("Initial refresh failed, starting without a map: {e}");
    }

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    let app_state = state.clone();
    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await;

    state.session.teardown();
    result
}
