use routemap::cache::CachedRouteService;
use routemap::config::{Config, RouteBackend};
use routemap::coordinator::MapCoordinator;
use routemap::render::JsonLinesRenderer;
use routemap::replay::{parse_script, replay};
use routemap::services::mapbox::{AuthMode, MapboxClient};
use routemap::services::{LocationTracker, RouteService, StraightLineRouteService};
use routemap::AppError;

use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_help() {
    eprintln!(
        "\
Usage: routemap [OPTIONS]

Replays a script of location fixes and destination selections through the map
coordinator and prints the resulting render commands as JSON lines.

Options:
  --script=PATH     JSON-lines event script (default: read stdin)
  --help            Show this help message

Environment variables:
  ROUTE_BACKEND     mapbox | straight_line (default: mapbox)
  MAPBOX_API_KEY    Mapbox access token (required for the mapbox backend)
  MAPBOX_BASE_URL   Proxy URL (optional, uses direct Mapbox if unset)
  TRANSPORT_MODE    drive | walk | bike (default: drive)
  MAP_OVERLAY_COLOR Route stroke as #RRGGBB (default: #007AFF)
  RUST_LOG          Log filter (default: routemap=debug), logs go to stderr"
    );
}

fn build_route_service(config: &Config) -> Result<Arc<CachedRouteService>, AppError> {
    let backend: Arc<dyn RouteService> = match config.route_backend {
        RouteBackend::Mapbox => {
            let api_key = config
                .mapbox_api_key
                .clone()
                .ok_or_else(|| AppError::Config("MAPBOX_API_KEY is not set".to_string()))?;
            let client = if let Some(ref base_url) = config.mapbox_base_url {
                tracing::info!("Using Mapbox proxy at {}", base_url);
                MapboxClient::with_config(
                    api_key,
                    base_url.clone(),
                    AuthMode::BearerHeader,
                    config.transport_mode,
                )
            } else {
                MapboxClient::new(api_key, config.transport_mode)
            };
            Arc::new(client)
        }
        RouteBackend::StraightLine => {
            Arc::new(StraightLineRouteService::new(config.transport_mode))
        }
    };

    Ok(Arc::new(CachedRouteService::new(
        backend,
        config.transport_mode,
        config.route_cache_ttl,
        config.route_cache_max_entries,
    )))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let script_path = args
        .iter()
        .find_map(|a| a.strip_prefix("--script="))
        .map(str::to_string);

    // Initialize tracing; stdout carries render commands
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routemap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env().map_err(AppError::Config)?;
    tracing::info!(
        backend = ?config.route_backend,
        mode = %config.transport_mode,
        "Configuration loaded successfully"
    );

    let events = match script_path {
        Some(ref path) => {
            tracing::info!("Reading script: {}", path);
            let file = File::open(path)
                .map_err(|e| format!("Failed to open script '{}': {}", path, e))?;
            parse_script(BufReader::new(file))?
        }
        None => parse_script(io::stdin().lock())?,
    };

    let route_service = build_route_service(&config)?;
    let (coordinator, handle) = MapCoordinator::new(
        config.viewport.clone(),
        route_service.clone(),
        JsonLinesRenderer::new(io::stdout()),
    );
    let coordinator = coordinator.with_overlay_style(config.overlay_style.clone());
    let tracker = LocationTracker::new(config.location_min_distance_m);

    let running = tokio::spawn(coordinator.run());

    let summary = replay(&events, &tracker, &handle).await?;
    drop(handle);

    running.await?;

    tracing::info!(
        selections = summary.selections,
        clears = summary.clears,
        "Replay finished: {} location fix(es) accepted, {} filtered",
        summary.locations_accepted,
        summary.locations_filtered
    );

    let stats = route_service.get_stats();
    tracing::debug!(
        "Route cache: {} hit(s), {} miss(es), {:.1}% hit rate",
        stats.hits,
        stats.misses,
        stats.hit_rate
    );

    Ok(())
}
