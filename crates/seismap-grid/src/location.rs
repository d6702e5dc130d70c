//! Tile locations and quadrant directions.

use crate::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address of a tile in the quadtree (z, x, y), counting from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Level (1 is the root).
    pub z: u32,
    /// Column (1 at the western edge, increases eastward).
    pub x: u32,
    /// Row (1 at the northern edge, increases southward).
    pub y: u32,
}

impl Location {
    /// The single tile at level 1.
    pub const ROOT: Location = Location { z: 1, x: 1, y: 1 };

    /// Create a new location.
    pub const fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// The tile one level up that contains this one, or `None` for the root level.
    pub fn parent(&self) -> Option<Location> {
        if self.z <= 1 {
            return None;
        }
        Some(Location {
            z: self.z - 1,
            x: self.x.div_ceil(2),
            y: self.y.div_ceil(2),
        })
    }

    /// The tile `n` levels up that contains this one.
    ///
    /// `ancestor(0)` is the location itself. Returns `None` when `n` would
    /// go above the root level.
    pub fn ancestor(&self, n: u32) -> Option<Location> {
        let mut current = *self;
        for _ in 0..n {
            current = current.parent()?;
        }
        Some(current)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

impl FromStr for Location {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidLocation(s.to_string());
        let mut parts = s.trim().split('/');
        let mut next = || -> Result<u32, GridError> {
            parts
                .next()
                .ok_or_else(invalid)?
                .parse::<u32>()
                .map_err(|_| invalid())
        };
        let location = Location::new(next()?, next()?, next()?);
        if parts.next().is_some() || location.z == 0 || location.x == 0 || location.y == 0 {
            return Err(invalid());
        }
        Ok(location)
    }
}

/// One of the four quadrants of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Top-left quadrant.
    #[serde(rename = "tl")]
    TopLeft,
    /// Top-right quadrant.
    #[serde(rename = "tr")]
    TopRight,
    /// Bottom-right quadrant.
    #[serde(rename = "br")]
    BottomRight,
    /// Bottom-left quadrant.
    #[serde(rename = "bl")]
    BottomLeft,
}

impl Direction {
    /// All directions in child order.
    pub const ALL: [Direction; 4] = [
        Direction::TopLeft,
        Direction::TopRight,
        Direction::BottomRight,
        Direction::BottomLeft,
    ];

    /// Position of this direction in [`Direction::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            Direction::TopLeft => 0,
            Direction::TopRight => 1,
            Direction::BottomRight => 2,
            Direction::BottomLeft => 3,
        }
    }

    /// Short name (`tl`, `tr`, `br`, `bl`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::TopLeft => "tl",
            Direction::TopRight => "tr",
            Direction::BottomRight => "br",
            Direction::BottomLeft => "bl",
        }
    }

    pub(crate) fn from_halves(top: bool, left: bool) -> Self {
        match (top, left) {
            (true, true) => Direction::TopLeft,
            (true, false) => Direction::TopRight,
            (false, false) => Direction::BottomRight,
            (false, true) => Direction::BottomLeft,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four children of a tile, one level down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Children {
    /// Top-left child.
    pub tl: Location,
    /// Top-right child.
    pub tr: Location,
    /// Bottom-right child.
    pub br: Location,
    /// Bottom-left child.
    pub bl: Location,
}

impl Children {
    /// Derive the children of `parent` from its bottom-right child.
    pub(crate) fn of(parent: Location) -> Self {
        let br = Location::new(parent.z + 1, 2 * parent.x, 2 * parent.y);
        let bl = Location { x: br.x - 1, ..br };
        let tl = Location { y: bl.y - 1, ..bl };
        let tr = Location { x: tl.x + 1, ..tl };
        Self { tl, tr, br, bl }
    }

    /// The child in the given direction.
    pub fn get(&self, direction: Direction) -> Location {
        match direction {
            Direction::TopLeft => self.tl,
            Direction::TopRight => self.tr,
            Direction::BottomRight => self.br,
            Direction::BottomLeft => self.bl,
        }
    }

    /// Iterate over `(direction, child)` pairs in child order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Location)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_inverts_children() {
        let parent = Location::new(3, 2, 3);
        let children = Children::of(parent);
        for (_, child) in children.iter() {
            assert_eq!(child.parent(), Some(parent));
        }
    }

    #[test]
    fn test_root_has_no_parent() {
        assert_eq!(Location::ROOT.parent(), None);
        assert_eq!(Location::ROOT.ancestor(0), Some(Location::ROOT));
        assert_eq!(Location::new(4, 8, 5).ancestor(3), Some(Location::ROOT));
        assert_eq!(Location::new(4, 8, 5).ancestor(4), None);
    }

    #[test]
    fn test_display_and_parse() {
        let loc = Location::new(4, 7, 2);
        assert_eq!(loc.to_string(), "4/7/2");
        assert_eq!("4/7/2".parse::<Location>().unwrap(), loc);

        assert!("4/7".parse::<Location>().is_err());
        assert!("4/7/2/1".parse::<Location>().is_err());
        assert!("0/1/1".parse::<Location>().is_err());
        assert!("a/b/c".parse::<Location>().is_err());
    }

    #[test]
    fn test_direction_serializes_short_name() {
        let json = serde_json::to_string(&Direction::BottomLeft).unwrap();
        assert_eq!(json, "\"bl\"");
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }
}
