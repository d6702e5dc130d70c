//! Mapping between geographic bounding boxes and grid tiles.

use crate::{Bbox, Grid, GridError, Location, Result};
use std::ops::RangeInclusive;

/// A [`Grid`] laid over a fixed geographic bounding box.
///
/// Columns split the longitude extent evenly and rows split the latitude
/// extent evenly (row 1 is the northern edge), so every tile at a level
/// covers the same number of degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoGrid {
    grid: Grid,
    bbox: Bbox,
}

impl GeoGrid {
    /// Create a geographic grid of `nr_levels` levels over `bbox`.
    pub fn new(nr_levels: u32, bbox: Bbox) -> Result<Self> {
        bbox.validate()?;
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(GridError::InvalidBbox(format!("zero-area grid bounds {}", bbox)));
        }
        Ok(Self {
            grid: Grid::new(nr_levels)?,
            bbox,
        })
    }

    /// The underlying quadtree.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The geographic bounds covered by the root tile.
    pub fn bbox(&self) -> Bbox {
        self.bbox
    }

    /// All tiles at level `z` overlapping `bbox`, in row-major order.
    ///
    /// The column range is `floor(cols * (lonMin - full.lonMin) / width)` up to
    /// the matching ceiling for `lonMax`, and rows likewise from the northern
    /// edge, clipped to `[1, cols]` and `[1, rows]`. A box entirely outside the
    /// grid yields no tiles.
    pub fn tiles_inside(&self, bbox: &Bbox, z: u32) -> Result<Vec<Location>> {
        self.grid.check_level(z)?;
        bbox.validate()?;

        let Some((cols, rows)) = self.cover(bbox, z) else {
            return Ok(Vec::new());
        };

        let mut tiles = Vec::with_capacity(cols.clone().count() * rows.clone().count());
        for y in rows {
            for x in cols.clone() {
                tiles.push(Location::new(z, x, y));
            }
        }
        Ok(tiles)
    }

    /// Geographic bounds of a single tile.
    pub fn bbox_for(&self, location: Location) -> Result<Bbox> {
        self.grid.check(location)?;
        let (rows, cols) = self.grid.rows_cols_at_level(location.z);
        let tile_width = self.bbox.width() / cols as f64;
        let tile_height = self.bbox.height() / rows as f64;

        let lon_min = self.bbox.lon_min + (location.x - 1) as f64 * tile_width;
        let lat_max = self.bbox.lat_max - (location.y - 1) as f64 * tile_height;
        Ok(Bbox::new(lon_min, lat_max - tile_height, lon_min + tile_width, lat_max))
    }

    /// Pick a level for viewing `bbox`.
    ///
    /// Returns the coarsest level at which the tiles covering `bbox` span at
    /// least `target_per_side` tiles along the longer side, or the bottom
    /// level if no level does.
    pub fn level_for(&self, bbox: &Bbox, target_per_side: u32) -> u32 {
        for z in 1..=self.grid.nr_levels() {
            if let Some((cols, rows)) = self.cover(bbox, z) {
                let span = cols.count().max(rows.count());
                if span >= target_per_side as usize {
                    return z;
                }
            }
        }
        self.grid.nr_levels()
    }

    /// Column and row ranges at level `z` overlapping `bbox`.
    fn cover(&self, bbox: &Bbox, z: u32) -> Option<(RangeInclusive<u32>, RangeInclusive<u32>)> {
        if !bbox.intersects(&self.bbox) {
            return None;
        }
        let (rows, cols) = self.grid.rows_cols_at_level(z);
        let full = &self.bbox;

        let col_start = cols as f64 * (bbox.lon_min - full.lon_min) / full.width();
        let col_end = cols as f64 * (bbox.lon_max - full.lon_min) / full.width();
        let row_start = rows as f64 * (full.lat_max - bbox.lat_max) / full.height();
        let row_end = rows as f64 * (full.lat_max - bbox.lat_min) / full.height();

        Some((
            index_range(col_start, col_end, cols)?,
            index_range(row_start, row_end, rows)?,
        ))
    }
}

/// Convert a fractional 0-based span into a clipped 1-based index range.
fn index_range(start: f64, end: f64, count: u32) -> Option<RangeInclusive<u32>> {
    let first = start.floor() as i64 + 1;
    // A zero-width span still touches the tile it starts in.
    let last = (end.ceil() as i64).max(first);

    let first = first.max(1);
    let last = last.min(count as i64);
    if first > last {
        return None;
    }
    Some(first as u32..=last as u32)
}
