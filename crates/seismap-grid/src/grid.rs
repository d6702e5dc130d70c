//! Quadtree geometry: levels, tile counts and parent/child subdivision.

use crate::{Children, Direction, GridError, Location, Result};
use std::ops::RangeInclusive;

/// Maximum number of levels a grid may have.
///
/// At 24 levels the bottom row already holds 2^23 tiles; tile counts are
/// reported as `u64` so `4^(z-1)` never overflows.
pub const MAX_LEVELS: u32 = 24;

/// An immutable quadtree of `nr_levels` levels.
///
/// Level `z` holds `2^(z-1) x 2^(z-1)` tiles. The bottom level is `nr_levels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    nr_levels: u32,
}

/// The bottom-level tiles covered by a tile, as inclusive column and row ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BottomSpan {
    /// Columns of the bottom level.
    pub cols: RangeInclusive<u32>,
    /// Rows of the bottom level.
    pub rows: RangeInclusive<u32>,
}

impl Grid {
    /// Create a grid with the given number of levels.
    pub fn new(nr_levels: u32) -> Result<Self> {
        if nr_levels == 0 || nr_levels > MAX_LEVELS {
            return Err(GridError::InvalidLevelCount(nr_levels));
        }
        Ok(Self { nr_levels })
    }

    /// Number of levels; also the level of the bottom tiles.
    pub fn nr_levels(&self) -> u32 {
        self.nr_levels
    }

    /// Whether the location is on (or below) the bottom level.
    pub fn is_bottom(&self, location: Location) -> bool {
        location.z >= self.nr_levels
    }

    /// Whether the location addresses a tile of this grid.
    pub fn contains(&self, location: Location) -> bool {
        if location.z == 0 || location.z > self.nr_levels {
            return false;
        }
        let dim = dimension(location.z);
        (1..=dim).contains(&location.x) && (1..=dim).contains(&location.y)
    }

    /// Check that `location` is a tile of this grid.
    pub fn check(&self, location: Location) -> Result<()> {
        if self.contains(location) {
            Ok(())
        } else {
            Err(GridError::OutOfRange {
                location,
                nr_levels: self.nr_levels,
            })
        }
    }

    /// Check that `z` is a level of this grid.
    pub fn check_level(&self, z: u32) -> Result<()> {
        if z == 0 || z > self.nr_levels {
            return Err(GridError::InvalidLevel {
                level: z,
                nr_levels: self.nr_levels,
            });
        }
        Ok(())
    }

    /// The four children of a tile.
    ///
    /// Fails with [`GridError::NoChildren`] for tiles on the bottom level.
    pub fn children(&self, location: Location) -> Result<Children> {
        if self.is_bottom(location) {
            return Err(GridError::NoChildren {
                location,
                nr_levels: self.nr_levels,
            });
        }
        Ok(Children::of(location))
    }

    /// Number of bottom-level tiles under a tile: `4^(nr_levels - z)`.
    pub fn count_bottom_under(&self, location: Location) -> u64 {
        let delta_z = self.nr_levels.saturating_sub(location.z);
        4u64.pow(delta_z)
    }

    /// Number of tiles at level `z`: `4^(z-1)`.
    pub fn tiles_at_level(&self, z: u32) -> u64 {
        4u64.pow(z.saturating_sub(1))
    }

    /// Rows and columns at level `z`. The grid is square at every level.
    pub fn rows_cols_at_level(&self, z: u32) -> (u32, u32) {
        let dim = dimension(z);
        (dim, dim)
    }

    /// Rows (and columns) of the bottom level.
    pub fn bottom_dimension(&self) -> u32 {
        dimension(self.nr_levels)
    }

    /// The bottom-level columns and rows covered by a tile.
    pub fn bottom_span(&self, location: Location) -> Result<BottomSpan> {
        self.check(location)?;
        let scale = 1u32 << (self.nr_levels - location.z);
        let first_col = (location.x - 1) * scale + 1;
        let first_row = (location.y - 1) * scale + 1;
        Ok(BottomSpan {
            cols: first_col..=first_col + scale - 1,
            rows: first_row..=first_row + scale - 1,
        })
    }

    /// The quadrant of `ancestor` that contains `descendant`.
    ///
    /// Returns `None` when `descendant` is not strictly below `ancestor`.
    pub fn direction_within(&self, ancestor: Location, descendant: Location) -> Option<Direction> {
        if descendant.z <= ancestor.z {
            return None;
        }
        let delta_z = descendant.z - ancestor.z;
        if descendant.ancestor(delta_z)? != ancestor {
            return None;
        }
        let child = descendant.ancestor(delta_z - 1)?;
        let top = child.y % 2 == 1;
        let left = child.x % 2 == 1;
        Some(Direction::from_halves(top, left))
    }
}

/// Rows (and columns) at level `z`: `2^(z-1)`.
fn dimension(z: u32) -> u32 {
    1u32 << z.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_partition_parent() {
        let grid = Grid::new(4).unwrap();
        let children = grid.children(Location::new(2, 2, 1)).unwrap();

        assert_eq!(children.tl, Location::new(3, 3, 1));
        assert_eq!(children.tr, Location::new(3, 4, 1));
        assert_eq!(children.br, Location::new(3, 4, 2));
        assert_eq!(children.bl, Location::new(3, 3, 2));

        // Disjoint and exhaustive: the children's bottom spans tile the parent's span.
        let parent_span = grid.bottom_span(Location::new(2, 2, 1)).unwrap();
        let mut covered = 0;
        for (_, child) in children.iter() {
            let span = grid.bottom_span(child).unwrap();
            assert!(parent_span.cols.contains(span.cols.start()));
            assert!(parent_span.cols.contains(span.cols.end()));
            assert!(parent_span.rows.contains(span.rows.start()));
            assert!(parent_span.rows.contains(span.rows.end()));
            covered += span.cols.clone().count() * span.rows.clone().count();
        }
        assert_eq!(covered as u64, grid.count_bottom_under(Location::new(2, 2, 1)));
    }

    #[test]
    fn test_no_children_at_bottom() {
        let grid = Grid::new(2).unwrap();
        assert!(grid.is_bottom(Location::new(2, 1, 1)));
        assert!(matches!(
            grid.children(Location::new(2, 1, 1)),
            Err(GridError::NoChildren { nr_levels: 2, .. })
        ));
        assert!(grid.children(Location::new(3, 1, 1)).is_err());
        assert!(grid.children(Location::ROOT).is_ok());
    }

    #[test]
    fn test_counts() {
        let grid = Grid::new(5).unwrap();
        assert_eq!(grid.tiles_at_level(1), 1);
        assert_eq!(grid.tiles_at_level(3), 16);
        assert_eq!(grid.rows_cols_at_level(3), (4, 4));
        assert_eq!(grid.count_bottom_under(Location::ROOT), 256);
        assert_eq!(grid.count_bottom_under(Location::new(5, 3, 3)), 1);
        assert_eq!(grid.bottom_dimension(), 16);
    }

    #[test]
    fn test_invalid_level_count() {
        assert!(Grid::new(0).is_err());
        assert!(Grid::new(MAX_LEVELS + 1).is_err());
        assert!(Grid::new(MAX_LEVELS).is_ok());
    }

    #[test]
    fn test_contains() {
        let grid = Grid::new(3).unwrap();
        assert!(grid.contains(Location::new(3, 4, 4)));
        assert!(!grid.contains(Location::new(3, 5, 1)));
        assert!(!grid.contains(Location::new(2, 0, 1)));
        assert!(!grid.contains(Location::new(4, 1, 1)));
        assert!(grid.check(Location::new(0, 1, 1)).is_err());
        assert!(grid.check_level(3).is_ok());
        assert!(grid.check_level(4).is_err());
    }

    #[test]
    fn test_bottom_span() {
        let grid = Grid::new(3).unwrap();
        let span = grid.bottom_span(Location::new(2, 2, 1)).unwrap();
        assert_eq!(span.cols, 3..=4);
        assert_eq!(span.rows, 1..=2);

        let span = grid.bottom_span(Location::new(3, 4, 2)).unwrap();
        assert_eq!(span.cols, 4..=4);
        assert_eq!(span.rows, 2..=2);
    }

    #[test]
    fn test_bottom_span_rejects_tiles_off_the_grid() {
        let grid = Grid::new(3).unwrap();
        for location in [
            Location::new(2, 0, 1),
            Location::new(2, 1, 0),
            Location::new(2, 3, 1),
            Location::new(4, 1, 1),
        ] {
            assert_eq!(
                grid.bottom_span(location),
                Err(GridError::OutOfRange { location, nr_levels: 3 })
            );
        }
    }

    #[test]
    fn test_direction_within() {
        let grid = Grid::new(4).unwrap();
        let root = Location::ROOT;

        assert_eq!(grid.direction_within(root, Location::new(2, 1, 1)), Some(Direction::TopLeft));
        assert_eq!(grid.direction_within(root, Location::new(2, 2, 1)), Some(Direction::TopRight));
        assert_eq!(grid.direction_within(root, Location::new(2, 2, 2)), Some(Direction::BottomRight));
        assert_eq!(grid.direction_within(root, Location::new(2, 1, 2)), Some(Direction::BottomLeft));

        // Deeper descendants resolve to the quadrant one level below the ancestor.
        assert_eq!(grid.direction_within(root, Location::new(4, 8, 1)), Some(Direction::TopRight));
        assert_eq!(
            grid.direction_within(Location::new(2, 2, 2), Location::new(4, 5, 8)),
            Some(Direction::BottomLeft)
        );

        // Not contained, or not strictly below.
        assert_eq!(grid.direction_within(Location::new(2, 1, 1), Location::new(3, 4, 4)), None);
        assert_eq!(grid.direction_within(root, root), None);
    }
}
