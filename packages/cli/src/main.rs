#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Offline tool for the bakery stock map.
//!
//! Runs one refresh cycle over local statistics snapshots (the
//! `{ "data": [...] }` files the statistics service answers with) and a
//! boundary document from disk or a URL, then either writes the enriched
//! `GeoJSON` or renders the choropleth to SVG.

use std::path::PathBuf;
use std::sync::Arc;

use bakery_map_enrich::{EnrichedBoundaryDocument, RefreshCoordinator};
use bakery_map_geography::SourceLoader;
use bakery_map_geography_models::BoundarySource;
use bakery_map_stats::FileStatisticsSource;
use bakery_map_view::{MapConfig, MapView, StatusFilter, svg};
use clap::{Args, Parser, Subcommand};

/// Enrich stock snapshots and render the stock map.
#[derive(Parser)]
#[command(name = "bakery_map_cli")]
#[command(about = "Enrich stock snapshots and render the stock map")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Write the enriched boundary document as `GeoJSON`.
    Enrich {
        #[command(flatten)]
        inputs: Inputs,

        /// Output file (stdout if omitted).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Render the choropleth as SVG.
    Render {
        #[command(flatten)]
        inputs: Inputs,

        /// Output file (stdout if omitted).
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Status filter: `all` or a status such as `critical`.
        #[arg(long, default_value = "all")]
        filter: StatusFilter,

        /// Zoom level.
        #[arg(long)]
        zoom: Option<f64>,

        /// Code of the region to select.
        #[arg(long)]
        selected: Option<String>,

        /// Render without controls and popup.
        #[arg(long)]
        display_only: bool,
    },
}

/// Input files shared by every subcommand.
#[derive(Args)]
struct Inputs {
    /// Boundary document: a file path or an `http(s)://` URL.
    #[arg(long)]
    boundaries: String,

    /// Department statistics snapshot.
    #[arg(long)]
    departments: PathBuf,

    /// Branch details snapshot.
    #[arg(long)]
    branches: PathBuf,

    /// TOML overriding the map defaults (field mapping, viewport, zoom).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Inputs {
    fn map_config(&self) -> Result<MapConfig, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(MapConfig::embedded().merge_toml(&std::fs::read_to_string(path)?)?),
            None => Ok(MapConfig::embedded()),
        }
    }

    fn boundary_source(&self) -> BoundarySource {
        if self.boundaries.starts_with("http://") || self.boundaries.starts_with("https://") {
            BoundarySource::Url {
                url: self.boundaries.clone(),
            }
        } else {
            BoundarySource::File {
                path: self.boundaries.clone(),
            }
        }
    }

    /// Runs one refresh cycle over the inputs.
    async fn load(
        &self,
        config: &MapConfig,
    ) -> Result<Arc<EnrichedBoundaryDocument>, Box<dyn std::error::Error>> {
        let loader = SourceLoader::new(reqwest::Client::new(), self.boundary_source());
        log::info!("Loading boundaries from {}", loader.source());

        let coordinator = RefreshCoordinator::new(
            Arc::new(FileStatisticsSource::new(&self.departments, &self.branches)),
            Arc::new(loader),
            config.fields.clone(),
        );
        coordinator.refresh().await?;

        coordinator
            .document()
            .ok_or_else(|| "refresh produced no document".into())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Enrich { inputs, output } => cmd_enrich(&inputs, output).await,
        Commands::Render {
            inputs,
            output,
            filter,
            zoom,
            selected,
            display_only,
        } => {
            let options = RenderOptions {
                filter,
                zoom,
                selected,
                display_only,
            };
            cmd_render(&inputs, output, &options).await
        }
    }
}

/// Writes the enriched document as pretty-printed `GeoJSON`.
async fn cmd_enrich(
    inputs: &Inputs,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = inputs.map_config()?;
    let document = inputs.load(&config).await?;

    let summary = document.summary();
    log::info!(
        "Enriched {} regions ({} branches, {} needing reorder)",
        document.len(),
        summary.total_branches,
        summary.branches_needing_reorder
    );

    let json = serde_json::to_string_pretty(&document.to_feature_collection())?;
    write_output(output, &json).await
}

struct RenderOptions {
    filter: StatusFilter,
    zoom: Option<f64>,
    selected: Option<String>,
    display_only: bool,
}

/// Renders the choropleth to SVG.
async fn cmd_render(
    inputs: &Inputs,
    output: Option<PathBuf>,
    options: &RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = inputs.map_config()?;
    if options.display_only {
        config = config.display_only();
    }
    let document = inputs.load(&config).await?;

    let svg = render(config, document, options);
    write_output(output, &svg).await
}

fn render(
    config: MapConfig,
    document: Arc<EnrichedBoundaryDocument>,
    options: &RenderOptions,
) -> String {
    let mut view = MapView::new(config);
    view.set_document(document);
    view.set_status_filter(options.filter);
    if let Some(zoom) = options.zoom {
        view.set_zoom(zoom);
    }
    if let Some(code) = options.selected.as_deref()
        && !view.click_region(code)
    {
        log::warn!("No region with code {code}, rendering without selection");
    }
    svg::render(&view.frame())
}

async fn write_output(
    output: Option<PathBuf>,
    contents: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            tokio::fs::write(&path, contents).await?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}
