//! # seismap-grid
//!
//! Quadtree ("pyramid") tile addressing over a square raster domain, and the
//! mapping between geographic bounding boxes and tiles.
//!
//! ## Tile Coordinate System
//!
//! Tiles are addressed as `z/x/y`, counting from 1:
//! - `z` is the level, `1` is the single root tile covering the whole domain
//! - `x` is the column (1 to 2^(z-1), from west to east)
//! - `y` is the row (1 to 2^(z-1), from north to south)
//!
//! ```text
//! 1/1/1
//!       2/1/1  2/2/1
//!       2/1/2  2/2/2
//!                    3/1/1  3/2/1   3/3/1  3/4/1
//!                    3/1/2  3/2/2   3/3/2  3/4/2
//!
//!                    3/1/3  3/2/3   3/3/3  3/4/3
//!                    3/1/4  3/2/4   3/3/4  3/4/4
//! ```
//!
//! Every tile above the bottom level has exactly four children, returned in
//! the order top-left, top-right, bottom-right, bottom-left.
//!
//! ## Example
//!
//! ```
//! use seismap_grid::{Bbox, GeoGrid, Grid, Location};
//!
//! let grid = Grid::new(3)?;
//! let children = grid.children(Location::ROOT)?;
//! assert_eq!(children.br, Location::new(2, 2, 2));
//!
//! let geo = GeoGrid::new(3, Bbox::WORLD)?;
//! let tiles = geo.tiles_inside(&Bbox::WORLD, 2)?;
//! assert_eq!(tiles.len(), 4);
//! # Ok::<(), seismap_grid::GridError>(())
//! ```

mod bbox;
mod error;
mod geo;
mod grid;
mod location;

pub use bbox::Bbox;
pub use error::GridError;
pub use geo::GeoGrid;
pub use grid::{BottomSpan, Grid, MAX_LEVELS};
pub use location::{Children, Direction, Location};

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
