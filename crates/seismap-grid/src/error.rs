//! Error types for the grid crate.

use crate::Location;
use thiserror::Error;

/// Errors that can occur when addressing tiles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Requested children of a tile on (or below) the bottom level.
    #[error("No children below level {nr_levels}. Requested level {}", location.z)]
    NoChildren {
        /// The tile whose children were requested.
        location: Location,
        /// Number of levels in the grid.
        nr_levels: u32,
    },

    /// The location does not exist in this grid.
    #[error("Location {location} is outside a grid of {nr_levels} levels")]
    OutOfRange {
        /// The offending location.
        location: Location,
        /// Number of levels in the grid.
        nr_levels: u32,
    },

    /// Invalid level count for a grid.
    #[error("Invalid level count {0} (must be 1-{})", crate::MAX_LEVELS)]
    InvalidLevelCount(u32),

    /// Level outside the grid.
    #[error("Invalid level {level} (must be 1-{nr_levels})")]
    InvalidLevel {
        /// Requested level.
        level: u32,
        /// Number of levels in the grid.
        nr_levels: u32,
    },

    /// A bounding box that is inverted, empty or not finite.
    #[error("Invalid bounding box: {0}")]
    InvalidBbox(String),

    /// A location string that is not of the form `z/x/y`.
    #[error("Invalid location '{0}' (expected z/x/y)")]
    InvalidLocation(String),
}
