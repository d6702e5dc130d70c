//! Estimates and per-direction estimate records.

use seismap_grid::Direction;
use serde::Serialize;

/// A value together with how complete it is.
///
/// `degree = 1` means `value` is the exact, fully resolved result;
/// `degree = 0` means no information is available yet and `value` is
/// meaningless (usually `None`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate<T> {
    /// Completeness in `[0, 1]`.
    pub degree: f64,
    /// Current best value, if any.
    #[serde(rename = "estimate")]
    pub value: Option<T>,
}

impl<T> Estimate<T> {
    /// Create an estimate.
    pub fn new(degree: f64, value: Option<T>) -> Self {
        Self { degree, value }
    }

    /// An estimate with no information.
    pub fn empty() -> Self {
        Self {
            degree: 0.0,
            value: None,
        }
    }

    /// An exact, final estimate.
    pub fn complete(value: T) -> Self {
        Self {
            degree: 1.0,
            value: Some(value),
        }
    }

    /// Whether the estimate is final.
    pub fn is_complete(&self) -> bool {
        self.degree >= 1.0
    }
}

impl<T> Default for Estimate<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// The latest known estimate of each of a tile's four children.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionEstimates<T> {
    estimates: [Estimate<T>; 4],
}

impl<T> DirectionEstimates<T> {
    /// All four directions without information.
    pub fn empty() -> Self {
        Self {
            estimates: std::array::from_fn(|_| Estimate::empty()),
        }
    }

    /// Build from estimates in [`Direction::ALL`] order (tl, tr, br, bl).
    pub fn from_array(estimates: [Estimate<T>; 4]) -> Self {
        Self { estimates }
    }

    /// The estimate for one direction.
    pub fn get(&self, direction: Direction) -> &Estimate<T> {
        &self.estimates[direction.index()]
    }

    /// Replace the estimate for one direction.
    pub fn set(&mut self, direction: Direction, estimate: Estimate<T>) {
        self.estimates[direction.index()] = estimate;
    }

    /// Iterate over `(direction, estimate)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &Estimate<T>)> {
        Direction::ALL.into_iter().zip(self.estimates.iter())
    }

    /// Iterate over the estimates that carry a value.
    pub fn present(&self) -> impl Iterator<Item = &Estimate<T>> {
        self.estimates.iter().filter(|e| e.value.is_some())
    }

    /// Iterate over the values that are present.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.estimates.iter().filter_map(|e| e.value.as_ref())
    }

    /// Degrees in [`Direction::ALL`] order.
    pub fn degrees(&self) -> [f64; 4] {
        std::array::from_fn(|i| self.estimates[i].degree)
    }

    /// Combined degree: each quadrant contributes a quarter.
    pub fn degree(&self) -> f64 {
        self.estimates.iter().map(|e| e.degree).sum::<f64>() / 4.0
    }

    /// Whether every direction is final.
    pub fn all_complete(&self) -> bool {
        self.estimates.iter().all(Estimate::is_complete)
    }
}

impl<T> Default for DirectionEstimates<T> {
    fn default() -> Self {
        Self::empty()
    }
}
