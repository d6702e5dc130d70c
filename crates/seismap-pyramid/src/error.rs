//! Error types for the pyramid crate.

use seismap_grid::{GridError, Location};
use thiserror::Error;

/// Errors that can occur when building or refining pyramids.
///
/// All of these are structural: they indicate a wiring or configuration
/// mistake rather than a transient condition, so nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PyramidError {
    /// Tile addressing error (location outside the grid, children below the bottom).
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Raster is not sized to the bottom level of its grid.
    #[error("Raster is {rows}x{cols} but the bottom level of a {nr_levels}-level grid is {expected}x{expected}")]
    RasterShape {
        /// Number of raster rows.
        rows: usize,
        /// Number of columns in the first raster row.
        cols: usize,
        /// Required rows and columns.
        expected: usize,
        /// Number of levels in the grid.
        nr_levels: u32,
    },

    /// A raster row whose length differs from the others.
    #[error("Raster row {row} has {len} cells, expected {expected}")]
    RaggedRaster {
        /// Index of the offending row (0-based).
        row: usize,
        /// Its length.
        len: usize,
        /// Required length.
        expected: usize,
    },

    /// Raster sources only hold bottom-level values.
    #[error("Raster sources only cover the bottom level {nr_levels}, requested {location}")]
    NotBottom {
        /// Requested location.
        location: Location,
        /// Bottom level of the raster's grid.
        nr_levels: u32,
    },

    /// An input provider built on a grid of a different depth.
    #[error("Input {index} has {input_levels} levels but the pyramid grid has {nr_levels}")]
    GridMismatch {
        /// Position of the input in the input set.
        index: usize,
        /// Levels of the input's grid.
        input_levels: u32,
        /// Levels of the pyramid's grid.
        nr_levels: u32,
    },

    /// A stream outlived the pyramid that refines it.
    #[error("Pyramid '{name}' was dropped while its stream at {location} was still refining")]
    PyramidDropped {
        /// Name of the dropped pyramid.
        name: String,
        /// Location of the orphaned stream.
        location: Location,
    },
}
