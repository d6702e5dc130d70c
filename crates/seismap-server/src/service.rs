//! Translating bbox queries into tile estimates.

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ValidationError};
use crate::products::{Product, Products, TileEstimate};
use seismap_grid::{Bbox, GeoGrid, Location};
use seismap_metrics::metric_defs;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Raw query parameters of a tile request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileQuery {
    /// `lonMin,latMin,lonMax,latMax`
    pub bbox: Option<String>,
    /// Tile level; chosen automatically when absent.
    pub z: Option<String>,
}

/// A validated tile request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    pub product: Product,
    pub bbox: Bbox,
    pub z: u32,
}

/// One entry of a tile response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedEstimate {
    pub location: Location,
    pub bbox: Bbox,
    pub estimate: TileEstimate,
}

/// Answers tile requests from the product pyramids.
pub struct TileService {
    products: Products,
    target_tiles_per_side: u32,
    poll_deadline: Duration,
}

impl TileService {
    pub fn new(products: Products, target_tiles_per_side: u32, poll_deadline: Duration) -> Self {
        Self {
            products,
            target_tiles_per_side,
            poll_deadline,
        }
    }

    /// Build the service and its synthetic products from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let geo = GeoGrid::new(config.nr_levels, config.bbox)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!("TileService: Using seed {}", seed);
        let products = Products::synthetic(geo, seed)?;
        Ok(Self::new(
            products,
            config.target_tiles_per_side,
            Duration::from_millis(config.poll_deadline_ms),
        ))
    }

    pub fn products(&self) -> &Products {
        &self.products
    }

    fn geo(&self) -> &GeoGrid {
        self.products.geo()
    }

    /// Check a request and resolve its level.
    pub fn validate(&self, product: &str, query: &TileQuery) -> Result<TileRequest, ValidationError> {
        let product: Product = product.parse()?;
        let bbox: Bbox = query
            .bbox
            .as_deref()
            .ok_or(ValidationError::MissingBbox)?
            .parse::<Bbox>()
            .map_err(ValidationError::InvalidBbox)?;

        let nr_levels = self.geo().grid().nr_levels();
        let z = match query.z.as_deref() {
            None => self.geo().level_for(&bbox, self.target_tiles_per_side),
            Some(raw) => {
                let z: u32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ValidationError::InvalidZoom(raw.to_string()))?;
                if z == 0 || z > nr_levels {
                    return Err(ValidationError::ZoomOutOfRange { z, nr_levels });
                }
                z
            }
        };

        Ok(TileRequest { product, bbox, z })
    }

    /// Poll every tile of the request once, in row-major order.
    ///
    /// Once the poll deadline has passed, the remaining tiles report their
    /// latest estimate without refining, or an empty one if they were never
    /// visited.
    pub fn tiles(&self, request: &TileRequest) -> Result<Vec<LocatedEstimate>, ServiceError> {
        let start = Instant::now();
        let locations = self.geo().tiles_inside(&request.bbox, request.z)?;

        let mut skipped = 0usize;
        let mut tiles = Vec::with_capacity(locations.len());
        for location in locations {
            let estimate = if start.elapsed() < self.poll_deadline {
                self.products.stream_at(request.product, location)?.next()?
            } else {
                // Past the deadline no new streams are created.
                skipped += 1;
                match self.products.cached_stream_at(request.product, location) {
                    Some(stream) => stream.latest(),
                    None => TileEstimate::empty(request.product),
                }
            };
            tiles.push(LocatedEstimate {
                location,
                bbox: self.geo().bbox_for(location)?,
                estimate,
            });
        }

        if skipped > 0 {
            metrics::counter!(metric_defs::SERVICE_DEADLINE_HITS.name, "product" => request.product.as_str())
                .increment(1);
            warn!(
                "TileService: Deadline of {:?} reached, {} of {} {} tiles not refined",
                self.poll_deadline,
                skipped,
                tiles.len(),
                request.product
            );
        }
        Ok(tiles)
    }

    /// Validate and answer a request, recording service metrics.
    pub fn handle(&self, product: &str, query: &TileQuery) -> Result<Vec<LocatedEstimate>, ServiceError> {
        let start = Instant::now();
        let request = match self.validate(product, query) {
            Ok(request) => request,
            Err(err) => {
                metrics::counter!(metric_defs::SERVICE_REJECTED.name, "reason" => err.reason()).increment(1);
                debug!("TileService: Rejected /{}: {}", product, err);
                return Err(err.into());
            }
        };

        let label = request.product.as_str();
        metrics::counter!(metric_defs::SERVICE_REQUESTS.name, "product" => label).increment(1);
        let tiles = self.tiles(&request)?;

        metrics::histogram!(metric_defs::SERVICE_TILES_SERVED.name, "product" => label)
            .record(tiles.len() as f64);
        metrics::histogram!(metric_defs::SERVICE_REQUEST_TIME.name, "product" => label)
            .record(start.elapsed().as_micros() as f64);
        debug!(
            "TileService: Served {} {} tiles at z={} for {}",
            tiles.len(),
            label,
            request.z,
            request.bbox
        );
        Ok(tiles)
    }
}
