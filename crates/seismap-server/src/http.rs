//! HTTP surface: `GET /{product}?bbox=...&z=...`.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, StartupError};
use crate::service::{LocatedEstimate, TileQuery, TileService};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The tile router. Every origin and method is allowed.
pub fn router(service: Arc<TileService>) -> Router {
    Router::new()
        .route("/{product}", get(get_tiles))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn get_tiles(
    State(service): State<Arc<TileService>>,
    Path(product): Path<String>,
    Query(query): Query<TileQuery>,
) -> Result<Json<Vec<LocatedEstimate>>, ServiceError> {
    // Refinement is CPU work; keep it off the async workers.
    let tiles = tokio::task::spawn_blocking(move || service.handle(&product, &query))
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))??;
    Ok(Json(tiles))
}

/// Build the products and serve them until the process is stopped.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    config.validate()?;

    install_metrics(&config)?;

    let build_config = config.clone();
    let service = tokio::task::spawn_blocking(move || TileService::from_config(&build_config))
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))??;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.bind,
            source,
        })?;
    info!("Server: Listening on http://{}", config.bind);

    axum::serve(listener, router(Arc::new(service))).await?;
    Ok(())
}

#[cfg(feature = "prometheus")]
fn install_metrics(config: &ServiceConfig) -> Result<(), StartupError> {
    match config.metrics_bind {
        Some(addr) => {
            seismap_metrics::install_prometheus(addr)
                .map_err(|e| StartupError::Metrics(e.to_string()))?;
            info!("Metrics: Prometheus exporter listening on {}", addr);
        }
        None => seismap_metrics::describe_metrics(),
    }
    Ok(())
}

#[cfg(not(feature = "prometheus"))]
fn install_metrics(config: &ServiceConfig) -> Result<(), StartupError> {
    if config.metrics_bind.is_some() {
        tracing::warn!("Metrics: metrics_bind is set but seismap was built without the prometheus feature");
    }
    seismap_metrics::describe_metrics();
    Ok(())
}
