//! Intensity aggregation.

use seismap_grid::Location;
use seismap_pyramid::{DirectionEstimates, ReduceFunction};

/// Degree-weighted mean of the four children.
///
/// Each present child contributes `degree * value`; the sum is always divided
/// by four, so missing and partial children pull the estimate towards zero
/// until they resolve.
pub fn mean(children: &DirectionEstimates<f64>) -> f64 {
    children
        .present()
        .map(|estimate| estimate.degree * estimate.value.unwrap_or_default())
        .sum::<f64>()
        / 4.0
}

/// [`mean`] as a reduce strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReduce;

impl ReduceFunction<f64> for MeanReduce {
    fn reduce(&self, children: &DirectionEstimates<f64>, _location: Location) -> f64 {
        mean(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seismap_grid::Direction;
    use seismap_pyramid::Estimate;

    #[test]
    fn test_mean_of_complete_children() {
        let children = DirectionEstimates::from_array([
            Estimate::complete(1.0),
            Estimate::complete(2.0),
            Estimate::complete(3.0),
            Estimate::complete(4.0),
        ]);
        assert_eq!(mean(&children), 2.5);
    }

    #[test]
    fn test_mean_tolerates_missing_and_partial() {
        let mut children = DirectionEstimates::empty();
        assert_eq!(mean(&children), 0.0);

        children.set(Direction::TopLeft, Estimate::complete(8.0));
        children.set(Direction::BottomRight, Estimate::new(0.5, Some(4.0)));
        assert_eq!(MeanReduce.reduce(&children, Location::ROOT), (8.0 + 2.0) / 4.0);
    }
}
