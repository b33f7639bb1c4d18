#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive stock-status choropleth.
//!
//! [`MapView`] holds the zoom, center, status filter and selection for one
//! map over an [`bakery_map_enrich::EnrichedBoundaryDocument`]. Region
//! geometry is placed with a Web Mercator [`projection`] and pointer
//! events are resolved with an R-tree in [`hit`]. Each call to
//! [`MapView::frame`] produces a [`MapFrame`] that [`svg::render`] turns
//! into a standalone SVG.
//!
//! In [`DisplayMode::DisplayOnly`] the zoom and filter controls and the
//! [`popup::RegionDetailPopup`] are never rendered; clicks still select
//! regions and reach the click callback.

pub mod config;
pub mod frame;
pub mod hit;
pub mod popup;
pub mod projection;
pub mod state;
pub mod svg;
pub mod view;

use thiserror::Error;

pub use config::{DisplayMode, MapConfig, ViewportSize};
pub use frame::MapFrame;
pub use popup::{PopupView, RegionDetailPopup};
pub use state::{InteractionMode, StatusFilter, ViewState};
pub use view::{MapView, RegionClickHandler};

/// Errors loading a [`MapConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML could not be parsed.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// The configuration parsed but is unusable.
    #[error("Invalid map configuration: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}
