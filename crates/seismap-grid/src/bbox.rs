//! Geographic bounding boxes.

use crate::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic bounds in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bbox {
    /// Minimum longitude (west edge).
    pub lon_min: f64,
    /// Minimum latitude (south edge).
    pub lat_min: f64,
    /// Maximum longitude (east edge).
    pub lon_max: f64,
    /// Maximum latitude (north edge).
    pub lat_max: f64,
}

impl Bbox {
    /// The whole globe in plate carrée coordinates.
    pub const WORLD: Bbox = Bbox {
        lon_min: -180.0,
        lat_min: -90.0,
        lon_max: 180.0,
        lat_max: 90.0,
    };

    /// Create a bounding box, in `lonMin, latMin, lonMax, latMax` order.
    pub const fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }

    /// Longitude extent in degrees.
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Latitude extent in degrees.
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Check that all edges are finite and the box is not inverted.
    ///
    /// Zero-area boxes (a single point or line) are accepted.
    pub fn validate(&self) -> Result<(), GridError> {
        let edges = [self.lon_min, self.lat_min, self.lon_max, self.lat_max];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(GridError::InvalidBbox(format!("non-finite edge in {}", self)));
        }
        if self.lon_min > self.lon_max || self.lat_min > self.lat_max {
            return Err(GridError::InvalidBbox(format!("inverted bounds {}", self)));
        }
        Ok(())
    }

    /// Whether the two boxes share any area or edge.
    pub fn intersects(&self, other: &Bbox) -> bool {
        self.lon_min <= other.lon_max
            && other.lon_min <= self.lon_max
            && self.lat_min <= other.lat_max
            && other.lat_min <= self.lat_max
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.lon_min, self.lat_min, self.lon_max, self.lat_max)
    }
}

impl FromStr for Bbox {
    type Err = GridError;

    /// Parse `lonMin,latMin,lonMax,latMax`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GridError::InvalidBbox(format!("'{}': {}", s, e)))?;

        let [lon_min, lat_min, lon_max, lat_max] = values[..] else {
            return Err(GridError::InvalidBbox(format!(
                "'{}': expected 4 values, got {}",
                s,
                values.len()
            )));
        };

        let bbox = Bbox::new(lon_min, lat_min, lon_max, lat_max);
        bbox.validate()?;
        Ok(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox: Bbox = "-10.5, 40,  5 ,52.25".parse().unwrap();
        assert_eq!(bbox, Bbox::new(-10.5, 40.0, 5.0, 52.25));
        assert_eq!(bbox.to_string(), "-10.5,40,5,52.25");
    }

    #[test]
    fn test_parse_bbox_rejects_malformed() {
        assert!("1,2,3".parse::<Bbox>().is_err());
        assert!("1,2,3,4,5".parse::<Bbox>().is_err());
        assert!("a,2,3,4".parse::<Bbox>().is_err());
        assert!("".parse::<Bbox>().is_err());
        // Inverted
        assert!("10,0,-10,5".parse::<Bbox>().is_err());
        assert!("NaN,0,1,1".parse::<Bbox>().is_err());
    }

    #[test]
    fn test_intersects() {
        let europe = Bbox::new(-10.0, 35.0, 30.0, 60.0);

        assert!(europe.intersects(&Bbox::new(20.0, 50.0, 40.0, 70.0)));
        assert!(europe.intersects(&Bbox::new(0.0, 40.0, 5.0, 45.0)));
        // Shared edge only.
        assert!(europe.intersects(&Bbox::new(30.0, 35.0, 50.0, 60.0)));
        assert!(!europe.intersects(&Bbox::new(31.0, 35.0, 50.0, 60.0)));
        assert!(!europe.intersects(&Bbox::new(-10.0, -60.0, 30.0, -35.0)));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(Bbox::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json["lonMin"], 1.0);
        assert_eq!(json["latMin"], 2.0);
        assert_eq!(json["lonMax"], 3.0);
        assert_eq!(json["latMax"], 4.0);
    }
}
