//! Input providers and typed input tuples.

use crate::{PyramidError, Result, SharedStream};
use seismap_grid::Location;
use std::sync::Arc;

/// Anything that can hand out an estimate stream per tile.
///
/// Implemented by [`Pyramid`](crate::Pyramid) and
/// [`RasterSource`](crate::RasterSource), so pyramids can feed other pyramids.
pub trait EstimateSource<T>: Send + Sync {
    /// Number of levels of the grid this source is defined on.
    fn nr_levels(&self) -> u32;

    /// The stream of estimates for a tile.
    fn estimate_stream_at(&self, location: Location) -> Result<SharedStream<T>>;
}

/// A shared input provider.
pub type Input<T> = Arc<dyn EstimateSource<T>>;

/// A fixed, typed tuple of input providers.
///
/// Polling the set at a bottom tile advances each input's stream once and
/// yields the product of their degrees alongside the tuple of their values.
pub trait InputSet: Send + Sync + 'static {
    /// The tuple of optional input values handed to the map function.
    type Values: Send;

    /// Fail unless every input is defined on a grid of `nr_levels` levels.
    fn check_levels(&self, nr_levels: u32) -> Result<()>;

    /// Poll each input once at `location`.
    fn poll_at(&self, location: Location) -> Result<(f64, Self::Values)>;
}

fn check_input<T>(index: usize, input: &Input<T>, nr_levels: u32) -> Result<()> {
    let input_levels = input.nr_levels();
    if input_levels != nr_levels {
        return Err(PyramidError::GridMismatch {
            index,
            input_levels,
            nr_levels,
        });
    }
    Ok(())
}

impl InputSet for () {
    type Values = ();

    fn check_levels(&self, _nr_levels: u32) -> Result<()> {
        Ok(())
    }

    fn poll_at(&self, _location: Location) -> Result<(f64, ())> {
        Ok((1.0, ()))
    }
}

impl<A: Send + 'static> InputSet for (Input<A>,) {
    type Values = (Option<A>,);

    fn check_levels(&self, nr_levels: u32) -> Result<()> {
        check_input(0, &self.0, nr_levels)
    }

    fn poll_at(&self, location: Location) -> Result<(f64, Self::Values)> {
        let a = self.0.estimate_stream_at(location)?.next()?;
        Ok((a.degree, (a.value,)))
    }
}

impl<A: Send + 'static, B: Send + 'static> InputSet for (Input<A>, Input<B>) {
    type Values = (Option<A>, Option<B>);

    fn check_levels(&self, nr_levels: u32) -> Result<()> {
        check_input(0, &self.0, nr_levels)?;
        check_input(1, &self.1, nr_levels)
    }

    fn poll_at(&self, location: Location) -> Result<(f64, Self::Values)> {
        let a = self.0.estimate_stream_at(location)?.next()?;
        let b = self.1.estimate_stream_at(location)?.next()?;
        Ok((a.degree * b.degree, (a.value, b.value)))
    }
}
