//! Materialized bottom-level values as an input provider.

use crate::{EstimateSource, ImmediateStream, PyramidError, Result, SharedStream};
use seismap_grid::{Grid, Location};
use std::sync::Arc;

/// A 2-D array of values covering the bottom level of a grid.
///
/// Raster row `r` and column `c` (0-based) hold the value of the bottom tile
/// at `x = c + 1`, `y = r + 1`. The raster must be exactly
/// `bottom_dimension x bottom_dimension`; this is checked on construction.
/// Every stream is complete on its first poll.
#[derive(Debug, Clone)]
pub struct RasterSource<T> {
    grid: Grid,
    dimension: usize,
    cells: Vec<T>,
}

impl<T> RasterSource<T> {
    /// Wrap a raster of rows.
    pub fn new(grid: Grid, raster: Vec<Vec<T>>) -> Result<Self> {
        let expected = grid.bottom_dimension() as usize;
        let cols = raster.first().map_or(0, Vec::len);
        if raster.len() != expected || cols != expected {
            return Err(PyramidError::RasterShape {
                rows: raster.len(),
                cols,
                expected,
                nr_levels: grid.nr_levels(),
            });
        }
        if let Some((row, cells)) = raster.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(PyramidError::RaggedRaster {
                row,
                len: cells.len(),
                expected,
            });
        }

        Ok(Self {
            grid,
            dimension: expected,
            cells: raster.into_iter().flatten().collect(),
        })
    }

    /// The grid the raster covers.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The value of a bottom-level tile.
    pub fn value_at(&self, location: Location) -> Result<&T> {
        if location.z != self.grid.nr_levels() {
            return Err(PyramidError::NotBottom {
                location,
                nr_levels: self.grid.nr_levels(),
            });
        }
        self.grid.check(location)?;
        let row = (location.y - 1) as usize;
        let col = (location.x - 1) as usize;
        Ok(&self.cells[row * self.dimension + col])
    }
}

impl<T: Clone + Send + Sync + 'static> EstimateSource<T> for RasterSource<T> {
    fn nr_levels(&self) -> u32 {
        self.grid.nr_levels()
    }

    fn estimate_stream_at(&self, location: Location) -> Result<SharedStream<T>> {
        let value = self.value_at(location)?.clone();
        Ok(Arc::new(ImmediateStream::new(value)))
    }
}
