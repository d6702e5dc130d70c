//! Pluggable map and reduce functions.

use crate::DirectionEstimates;
use seismap_grid::Location;

/// Combines the input values at a bottom-level tile into the tile's value.
///
/// `I` is the tuple of optional input values produced by the pyramid's
/// [`InputSet`](crate::InputSet). Returning `None` means the tile has no
/// value (for example because an input has none yet).
pub trait MapFunction<I, T>: Send + Sync + 'static {
    /// Compute the tile value.
    fn map(&self, inputs: I, location: Location) -> Option<T>;
}

impl<I, T, F> MapFunction<I, T> for F
where
    F: Fn(I, Location) -> Option<T> + Send + Sync + 'static,
{
    fn map(&self, inputs: I, location: Location) -> Option<T> {
        self(inputs, location)
    }
}

/// Combines the latest estimates of a tile's four children into its value.
///
/// Implementations may weight each child by its degree; the pyramid only
/// guarantees that once every child is complete the result is exact.
pub trait ReduceFunction<T>: Send + Sync + 'static {
    /// Compute the parent value.
    fn reduce(&self, children: &DirectionEstimates<T>, location: Location) -> T;
}

impl<T, F> ReduceFunction<T> for F
where
    F: Fn(&DirectionEstimates<T>, Location) -> T + Send + Sync + 'static,
{
    fn reduce(&self, children: &DirectionEstimates<T>, location: Location) -> T {
        self(children, location)
    }
}

/// Pass a single input through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMap;

impl<T: 'static> MapFunction<(Option<T>,), T> for IdentityMap {
    fn map(&self, (value,): (Option<T>,), _location: Location) -> Option<T> {
        value
    }
}
