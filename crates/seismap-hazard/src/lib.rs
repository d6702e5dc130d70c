//! # seismap-hazard
//!
//! The domain plug-ins of the seismap pyramids:
//!
//! - [`MeanReduce`] averages seismic intensity over a tile's children.
//! - [`ExposureReduce`] aggregates building counts and damage distributions.
//! - [`UpdateExposureMap`] applies the [`fragility`] model to a tile's
//!   exposure given its intensity.
//! - [`create_intensity_raster`] and [`create_exposure_raster`] generate
//!   synthetic bottom-level data.
//!
//! ```
//! use seismap_hazard::{fragility, DamageDegrees, Material};
//!
//! let quiet = fragility(0.0, &DamageDegrees::UNDAMAGED, Material::Wood);
//! assert_eq!(quiet, DamageDegrees::UNDAMAGED);
//! ```

mod exposure;
mod fragility;
mod intensity;
mod synthetic;

pub use exposure::{aggregate_exposure, DamageDegrees, Exposure, ExposureReduce, Material, PerMaterial};
pub use fragility::{fragility, normalized_triangle, p_transition, update_exposure, UpdateExposureMap, MAX_INTENSITY};
pub use intensity::{mean, MeanReduce};
pub use synthetic::{create_exposure_raster, create_intensity_raster};
