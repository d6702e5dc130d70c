//! The three served products and the pyramids behind them.

use crate::error::ValidationError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use seismap_grid::{GeoGrid, Location};
use seismap_hazard::{
    create_exposure_raster, create_intensity_raster, Exposure, ExposureReduce, MeanReduce,
    UpdateExposureMap,
};
use seismap_pyramid::{Estimate, EstimateStream, Input, Pyramid, PyramidError, SharedStream};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// A product that can be requested by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    Intensity,
    Exposure,
    UpdatedExposure,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::Intensity, Product::Exposure, Product::UpdatedExposure];

    /// The name used in request paths.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Product::Intensity => "intensity",
            Product::Exposure => "exposure",
            Product::UpdatedExposure => "updatedExposure",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Product::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownProduct(s.to_string()))
    }
}

pub type IntensityPyramid = Pyramid<f64, (Input<f64>,)>;
pub type ExposurePyramid = Pyramid<Exposure, (Input<Exposure>,)>;
pub type UpdatedExposurePyramid = Pyramid<Exposure, (Input<f64>, Input<Exposure>)>;

/// A tile's stream, whichever product it belongs to.
#[derive(Clone)]
pub enum TileStream {
    Intensity(SharedStream<f64>),
    Exposure(SharedStream<Exposure>),
}

impl TileStream {
    /// Refine once.
    pub fn next(&self) -> Result<TileEstimate, PyramidError> {
        Ok(match self {
            TileStream::Intensity(stream) => TileEstimate::Intensity(stream.next()?),
            TileStream::Exposure(stream) => TileEstimate::Exposure(stream.next()?),
        })
    }

    /// The latest estimate, without refining.
    pub fn latest(&self) -> TileEstimate {
        match self {
            TileStream::Intensity(stream) => TileEstimate::Intensity(stream.latest()),
            TileStream::Exposure(stream) => TileEstimate::Exposure(stream.latest()),
        }
    }
}

/// One estimate of any product, serialized as `{degree, estimate}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TileEstimate {
    Intensity(Estimate<f64>),
    Exposure(Estimate<Exposure>),
}

impl TileEstimate {
    /// The estimate of a tile nothing has been learned about yet.
    pub fn empty(product: Product) -> Self {
        match product {
            Product::Intensity => TileEstimate::Intensity(Estimate::empty()),
            Product::Exposure | Product::UpdatedExposure => TileEstimate::Exposure(Estimate::empty()),
        }
    }

    pub fn degree(&self) -> f64 {
        match self {
            TileEstimate::Intensity(estimate) => estimate.degree,
            TileEstimate::Exposure(estimate) => estimate.degree,
        }
    }
}

/// The product pyramids, all on one geographic grid.
///
/// Updated exposure takes the intensity and exposure pyramids as inputs, so
/// its bottom tiles share their refinement with the other two products.
pub struct Products {
    geo: GeoGrid,
    intensity: Arc<IntensityPyramid>,
    exposure: Arc<ExposurePyramid>,
    updated_exposure: Arc<UpdatedExposurePyramid>,
}

impl Products {
    /// Build the products over synthetic bottom-level rasters.
    ///
    /// The rasters and every pyramid's refinement order derive from `seed`.
    pub fn synthetic(geo: GeoGrid, seed: u64) -> Result<Self, PyramidError> {
        let grid = *geo.grid();
        let dim = grid.bottom_dimension() as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let intensity = Pyramid::builder(Product::Intensity.as_str(), grid)
            .seed(seed)
            .over_raster(create_intensity_raster(dim, dim, &mut rng), MeanReduce)?;
        let exposure = Pyramid::builder(Product::Exposure.as_str(), grid)
            .seed(seed.wrapping_add(1))
            .over_raster(create_exposure_raster(dim, dim, &mut rng), ExposureReduce)?;

        let intensity_input: Input<f64> = intensity.clone();
        let exposure_input: Input<Exposure> = exposure.clone();
        let updated_exposure = Pyramid::builder(Product::UpdatedExposure.as_str(), grid)
            .seed(seed.wrapping_add(2))
            .build((intensity_input, exposure_input), UpdateExposureMap, ExposureReduce)?;

        info!(
            "Products: Built {} over {}x{} bottom tiles ({} levels, bbox {})",
            Product::ALL.map(|p| p.as_str()).join(", "),
            dim,
            dim,
            grid.nr_levels(),
            geo.bbox()
        );

        Ok(Self {
            geo,
            intensity,
            exposure,
            updated_exposure,
        })
    }

    pub fn geo(&self) -> &GeoGrid {
        &self.geo
    }

    pub fn intensity(&self) -> &Arc<IntensityPyramid> {
        &self.intensity
    }

    pub fn exposure(&self) -> &Arc<ExposurePyramid> {
        &self.exposure
    }

    pub fn updated_exposure(&self) -> &Arc<UpdatedExposurePyramid> {
        &self.updated_exposure
    }

    /// The shared stream of a product at a tile.
    pub fn stream_at(&self, product: Product, location: Location) -> Result<TileStream, PyramidError> {
        Ok(match product {
            Product::Intensity => TileStream::Intensity(self.intensity.estimate_stream_at(location)?),
            Product::Exposure => TileStream::Exposure(self.exposure.estimate_stream_at(location)?),
            Product::UpdatedExposure => {
                TileStream::Exposure(self.updated_exposure.estimate_stream_at(location)?)
            }
        })
    }

    /// The stream of a product at a tile, only if it already exists.
    pub fn cached_stream_at(&self, product: Product, location: Location) -> Option<TileStream> {
        match product {
            Product::Intensity => self.intensity.cached_stream_at(location).map(TileStream::Intensity),
            Product::Exposure => self.exposure.cached_stream_at(location).map(TileStream::Exposure),
            Product::UpdatedExposure => self
                .updated_exposure
                .cached_stream_at(location)
                .map(TileStream::Exposure),
        }
    }

    /// Number of streams a product's pyramid holds.
    pub fn cached_streams(&self, product: Product) -> usize {
        match product {
            Product::Intensity => self.intensity.cached_streams(),
            Product::Exposure => self.exposure.cached_streams(),
            Product::UpdatedExposure => self.updated_exposure.cached_streams(),
        }
    }
}
