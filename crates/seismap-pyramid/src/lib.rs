//! # seismap-pyramid
//!
//! Anytime estimates over a quadtree of tiles.
//!
//! A [`Pyramid`] produces, for any tile at any level, an [`EstimateStream`]:
//! each poll returns an [`Estimate`] with a completeness `degree` in `[0, 1]`
//! and a value that converges to the exact aggregate as the degree reaches 1.
//! Streams are cached per pyramid and location, so repeated or concurrent
//! requests for the same tile share refinement progress.
//!
//! ## Overview
//!
//! - **Bottom tiles** poll every input provider at the same location once,
//!   multiply their degrees and apply the map function to their values.
//! - **Interior tiles** advance one child per poll, chosen at random with
//!   weight `1 - degree` so complete children are never revisited, and
//!   reduce the four latest child estimates into the parent estimate.
//! - **Raster sources** expose a materialized 2-D array as always-complete
//!   bottom-level inputs.
//!
//! ## Example
//!
//! ```
//! use seismap_grid::{Grid, Location};
//! use seismap_pyramid::{resolve, DirectionEstimates, Pyramid};
//!
//! let grid = Grid::new(2)?;
//! let mean = |children: &DirectionEstimates<f64>, _: Location| {
//!     children.values().sum::<f64>() / 4.0
//! };
//! let pyramid = Pyramid::builder("demo", grid)
//!     .seed(7)
//!     .over_raster(vec![vec![1.0, 2.0], vec![3.0, 4.0]], mean)?;
//!
//! let stream = pyramid.estimate_stream_at(Location::ROOT)?;
//! let estimate = resolve(stream.as_ref(), 16)?;
//! assert_eq!(estimate.degree, 1.0);
//! assert_eq!(estimate.value, Some(2.5));
//! # Ok::<(), seismap_pyramid::PyramidError>(())
//! ```

mod choice;
mod error;
mod estimate;
mod input;
mod pyramid;
mod raster;
mod stream;
mod strategy;

pub use choice::pick_direction;
pub use error::PyramidError;
pub use estimate::{DirectionEstimates, Estimate};
pub use input::{EstimateSource, Input, InputSet};
pub use pyramid::{Pyramid, PyramidBuilder};
pub use raster::RasterSource;
pub use stream::{resolve, EstimateStream, ImmediateStream, ProgressiveStream, Refine, SharedStream};
pub use strategy::{IdentityMap, MapFunction, ReduceFunction};

/// Result type for pyramid operations.
pub type Result<T> = std::result::Result<T, PyramidError>;
