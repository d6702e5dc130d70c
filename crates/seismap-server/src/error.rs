//! Request, service and startup errors, and their HTTP representation.

use crate::config::ConfigError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use seismap_grid::GridError;
use seismap_pyramid::PyramidError;
use std::net::SocketAddr;
use thiserror::Error;

/// A request the service refuses to process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unknown product '{0}' (expected intensity, exposure or updatedExposure)")]
    UnknownProduct(String),

    #[error("Missing query parameter 'bbox' (lonMin,latMin,lonMax,latMax)")]
    MissingBbox,

    #[error(transparent)]
    InvalidBbox(GridError),

    #[error("Invalid level '{0}' (expected a positive integer)")]
    InvalidZoom(String),

    #[error("Level {z} is outside the grid (must be 1-{nr_levels})")]
    ZoomOutOfRange { z: u32, nr_levels: u32 },
}

impl ValidationError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::UnknownProduct(_) => "unknown_product",
            ValidationError::MissingBbox => "missing_bbox",
            ValidationError::InvalidBbox(_) => "invalid_bbox",
            ValidationError::InvalidZoom(_) => "invalid_zoom",
            ValidationError::ZoomOutOfRange { .. } => "zoom_out_of_range",
        }
    }
}

/// Errors answering a tile request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A wiring fault in the pyramids; not caused by the request.
    #[error("Pyramid error: {0}")]
    Pyramid(#[from] PyramidError),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors bringing the server up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build products: {0}")]
    Service(#[from] ServiceError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install metrics exporter: {0}")]
    Metrics(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = ServiceError::from(ValidationError::MissingBbox);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ServiceError::from(GridError::InvalidLevelCount(0));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(ValidationError::UnknownProduct("x".into()).reason(), "unknown_product");
        assert_eq!(
            ValidationError::ZoomOutOfRange { z: 12, nr_levels: 10 }.reason(),
            "zoom_out_of_range"
        );
    }
}
