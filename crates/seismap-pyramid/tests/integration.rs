//! End-to-end behavior of pyramids built over rasters and other pyramids.

use approx::assert_relative_eq;
use seismap_grid::{Grid, Location};
use seismap_pyramid::{
    resolve, DirectionEstimates, Estimate, EstimateSource, EstimateStream, IdentityMap, Input,
    ProgressiveStream, Pyramid, PyramidError, RasterSource, SharedStream,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

fn mean(children: &DirectionEstimates<f64>, _: Location) -> f64 {
    children
        .present()
        .map(|e| e.degree * e.value.unwrap_or_default())
        .sum::<f64>()
        / 4.0
}

/// A `dim x dim` raster numbered 1, 2, 3, ... row by row.
fn numbered_raster(dim: usize) -> Vec<Vec<f64>> {
    (0..dim)
        .map(|row| (0..dim).map(|col| (row * dim + col + 1) as f64).collect())
        .collect()
}

#[test]
fn test_raster_streams_are_immediate() {
    let grid = Grid::new(3).unwrap();
    let raster = RasterSource::new(grid, numbered_raster(4)).unwrap();

    for y in 1..=4 {
        for x in 1..=4 {
            let stream = raster.estimate_stream_at(Location::new(3, x, y)).unwrap();
            for _ in 0..3 {
                let estimate = stream.next().unwrap();
                assert_eq!(estimate.degree, 1.0);
                assert_eq!(estimate.value, Some(((y - 1) * 4 + x) as f64));
            }
        }
    }
}

#[test]
fn test_raster_rejects_interior_levels() {
    let grid = Grid::new(3).unwrap();
    let raster = RasterSource::new(grid, numbered_raster(4)).unwrap();
    assert!(matches!(
        raster.estimate_stream_at(Location::new(2, 1, 1)),
        Err(PyramidError::NotBottom { .. })
    ));
}

#[test]
fn test_two_level_mean_resolves_in_four_polls() {
    let pyramid = Pyramid::builder("mean", Grid::new(2).unwrap())
        .seed(11)
        .over_raster(vec![vec![1.0, 2.0], vec![3.0, 4.0]], mean)
        .unwrap();
    let root = pyramid.estimate_stream_at(Location::ROOT).unwrap();

    let degrees: Vec<f64> = (0..4).map(|_| root.next().unwrap().degree).collect();
    assert_eq!(degrees, vec![0.25, 0.5, 0.75, 1.0]);

    let last = root.latest();
    assert_eq!(last.degree, 1.0);
    assert_relative_eq!(last.value.unwrap(), 2.5);
}

#[test]
fn test_degree_is_monotone_and_frozen_after_completion() {
    let pyramid = Pyramid::builder("mean", Grid::new(4).unwrap())
        .seed(3)
        .over_raster(numbered_raster(8), mean)
        .unwrap();
    let root = pyramid.estimate_stream_at(Location::ROOT).unwrap();

    let mut previous = 0.0;
    let mut polls = 0;
    let done = loop {
        let estimate = root.next().unwrap();
        polls += 1;
        assert!(estimate.degree >= previous, "degree decreased at poll {}", polls);
        previous = estimate.degree;
        if estimate.is_complete() {
            break estimate;
        }
        assert!(polls < 1000, "root never completed");
    };

    // Every bottom tile is reached exactly once, one per root poll.
    assert_eq!(polls, 64);
    assert_relative_eq!(done.value.unwrap(), 32.5);

    for _ in 0..10 {
        assert_eq!(root.next().unwrap(), done);
    }
}

#[test]
fn test_exhausting_small_pyramid() {
    let pyramid = Pyramid::builder("mean", Grid::new(3).unwrap())
        .seed(5)
        .over_raster(numbered_raster(4), mean)
        .unwrap();
    let root = pyramid.estimate_stream_at(Location::ROOT).unwrap();

    for poll in 1..=16 {
        let estimate = root.next().unwrap();
        assert_relative_eq!(estimate.degree, poll as f64 / 16.0);
    }
    assert!(root.is_complete());
    assert_relative_eq!(root.latest().value.unwrap(), 8.5);

    // Every tile of the grid was visited once and is now frozen.
    assert_eq!(pyramid.cached_streams(), 1 + 4 + 16);
    let grid = *pyramid.grid();
    for (_, child) in grid.children(Location::ROOT).unwrap().iter() {
        let stream = pyramid.estimate_stream_at(child).unwrap();
        assert!(stream.is_complete());
        // Each level-2 quadrant is the mean of its four cells.
        let span = grid.bottom_span(child).unwrap();
        let expected: f64 = span
            .rows
            .clone()
            .flat_map(|y| span.cols.clone().map(move |x| ((y - 1) * 4 + x) as f64))
            .sum::<f64>()
            / 4.0;
        assert_relative_eq!(stream.latest().value.unwrap(), expected);
    }
}

#[test]
fn test_streams_are_shared_per_location() {
    let pyramid = Pyramid::builder("mean", Grid::new(3).unwrap())
        .seed(1)
        .over_raster(numbered_raster(4), mean)
        .unwrap();
    let a = pyramid.estimate_stream_at(Location::new(2, 1, 2)).unwrap();
    let b = pyramid.estimate_stream_at(Location::new(2, 1, 2)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    a.next().unwrap();
    assert_eq!(b.latest().degree, 0.25);

    // Another pyramid over the same data has its own cache.
    let other = Pyramid::builder("mean", Grid::new(3).unwrap())
        .seed(1)
        .over_raster(numbered_raster(4), mean)
        .unwrap();
    let c = other.estimate_stream_at(Location::new(2, 1, 2)).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(c.latest().degree, 0.0);
}

#[test]
fn test_concurrent_polls_share_progress() {
    let pyramid = Pyramid::builder("mean", Grid::new(4).unwrap())
        .seed(9)
        .over_raster(numbered_raster(8), mean)
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pyramid = Arc::clone(&pyramid);
            thread::spawn(move || {
                let root = pyramid.estimate_stream_at(Location::ROOT).unwrap();
                resolve(root.as_ref(), 1000).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let estimate = handle.join().unwrap();
        assert_eq!(estimate.degree, 1.0);
        assert_relative_eq!(estimate.value.unwrap(), 32.5);
    }
    assert_eq!(pyramid.cached_streams(), 1 + 4 + 16 + 64);
}

#[test]
fn test_two_inputs_of_different_types() {
    let grid = Grid::new(2).unwrap();
    let values: Input<f64> = Arc::new(RasterSource::new(grid, vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
    let counts: Input<u32> = Arc::new(RasterSource::new(grid, vec![vec![10, 0], vec![1, 2]]).unwrap());

    let product = |(value, count): (Option<f64>, Option<u32>), _: Location| -> Option<f64> {
        Some(value? * f64::from(count?))
    };
    let pyramid = Pyramid::builder("product", grid)
        .seed(2)
        .build((values, counts), product, mean)
        .unwrap();

    let bottom = pyramid.estimate_stream_at(Location::new(2, 1, 1)).unwrap();
    assert_eq!(bottom.next().unwrap(), Estimate::complete(10.0));

    let root = pyramid.estimate_stream_at(Location::ROOT).unwrap();
    let estimate = resolve(root.as_ref(), 4).unwrap();
    assert_eq!(estimate.degree, 1.0);
    assert_relative_eq!(estimate.value.unwrap(), (10.0 + 0.0 + 3.0 + 8.0) / 4.0);
}

#[test]
fn test_pyramid_without_inputs() {
    let column = |_: (), location: Location| -> Option<f64> { Some(f64::from(location.x)) };
    let pyramid = Pyramid::builder("columns", Grid::new(3).unwrap())
        .seed(4)
        .build((), column, mean)
        .unwrap();

    let root = pyramid.estimate_stream_at(Location::ROOT).unwrap();
    let estimate = resolve(root.as_ref(), 16).unwrap();
    assert!(estimate.is_complete());
    assert_relative_eq!(estimate.value.unwrap(), 2.5);
}

/// Bottom values that need two polls: half known, then exact.
struct TwoStepSource {
    grid: Grid,
}

impl EstimateSource<f64> for TwoStepSource {
    fn nr_levels(&self) -> u32 {
        self.grid.nr_levels()
    }

    fn estimate_stream_at(&self, location: Location) -> Result<SharedStream<f64>, PyramidError> {
        let value = f64::from(location.x);
        let mut polls = 0;
        Ok(Arc::new(ProgressiveStream::new(move || -> Result<Estimate<f64>, PyramidError> {
            polls += 1;
            Ok(if polls == 1 {
                Estimate::new(0.5, Some(value / 2.0))
            } else {
                Estimate::complete(value)
            })
        })))
    }
}

/// A cached source whose tile (2, 1, 1) first falls one ulp short of
/// complete; every other tile is immediately exact.
struct AlmostCompleteSource {
    grid: Grid,
    streams: Mutex<HashMap<Location, SharedStream<f64>>>,
}

impl EstimateSource<f64> for AlmostCompleteSource {
    fn nr_levels(&self) -> u32 {
        self.grid.nr_levels()
    }

    fn estimate_stream_at(&self, location: Location) -> Result<SharedStream<f64>, PyramidError> {
        let mut streams = self.streams.lock();
        let stream = streams.entry(location).or_insert_with(|| {
            let mut polls = 0;
            let lagging = location == Location::new(2, 1, 1);
            let stream: SharedStream<f64> =
                Arc::new(ProgressiveStream::new(move || -> Result<Estimate<f64>, PyramidError> {
                    polls += 1;
                    Ok(if lagging && polls == 1 {
                        Estimate::new(1.0 - f64::EPSILON / 2.0, Some(0.0))
                    } else {
                        Estimate::complete(100.0)
                    })
                }));
            stream
        });
        Ok(Arc::clone(stream))
    }
}

#[test]
fn test_nearly_complete_children_do_not_complete_parent() {
    let grid = Grid::new(2).unwrap();
    let source: Input<f64> = Arc::new(AlmostCompleteSource {
        grid,
        streams: Mutex::new(HashMap::new()),
    });
    let pyramid = Pyramid::builder("almost", grid)
        .seed(0)
        .build((source,), IdentityMap, mean)
        .unwrap();

    let root = pyramid.estimate_stream_at(Location::ROOT).unwrap();
    let mut polls = 0;
    while !root.is_complete() {
        let estimate = root.next().unwrap();
        if estimate.degree >= 1.0 {
            assert_eq!(estimate.value, Some(100.0));
        }
        polls += 1;
        assert!(polls <= 8, "root did not complete");
    }
    // Four children, one of which needs a second poll.
    assert_eq!(polls, 5);
    assert_eq!(root.latest(), Estimate::complete(100.0));
}

#[test]
fn test_bottom_degree_is_product_of_input_degrees() {
    let grid = Grid::new(2).unwrap();
    let exact: Input<f64> = Arc::new(RasterSource::new(grid, vec![vec![1.0; 2]; 2]).unwrap());
    let stepwise: Input<f64> = Arc::new(TwoStepSource { grid });

    let add = |(a, b): (Option<f64>, Option<f64>), _: Location| -> Option<f64> { Some(a? + b?) };
    let pyramid = Pyramid::builder("sum", grid)
        .build((exact, stepwise), add, mean)
        .unwrap();

    // A fresh input stream is created on every poll, so the input never
    // advances past its first step and the tile stays partial.
    let bottom = pyramid.estimate_stream_at(Location::new(2, 2, 1)).unwrap();
    assert_eq!(bottom.next().unwrap(), Estimate::new(0.5, Some(2.0)));
    assert_eq!(bottom.next().unwrap(), Estimate::new(0.5, Some(2.0)));
    assert!(!bottom.is_complete());
}

#[test]
fn test_pyramid_as_input_of_pyramid() {
    let grid = Grid::new(3).unwrap();
    let base = Pyramid::builder("base", grid)
        .seed(8)
        .over_raster(numbered_raster(4), mean)
        .unwrap();
    let doubled = |(value,): (Option<f64>,), _: Location| -> Option<f64> { value.map(|v| v * 2.0) };
    let input: Input<f64> = base.clone();
    let derived = Pyramid::builder("doubled", grid)
        .seed(8)
        .build((input,), doubled, mean)
        .unwrap();

    let root = derived.estimate_stream_at(Location::ROOT).unwrap();
    let estimate = resolve(root.as_ref(), 16).unwrap();
    assert!(estimate.is_complete());
    assert_relative_eq!(estimate.value.unwrap(), 17.0);

    // Only the bottom level of the base pyramid was consulted.
    assert_eq!(base.cached_streams(), 16);
}

#[test]
fn test_structural_errors_propagate() {
    let grid = Grid::new(2).unwrap();
    assert!(matches!(
        Pyramid::builder("bad", grid).over_raster(vec![vec![1.0; 3]; 3], mean),
        Err(PyramidError::RasterShape { expected: 2, .. })
    ));

    let pyramid = Pyramid::builder("mean", grid)
        .over_raster(vec![vec![1.0; 2]; 2], mean)
        .unwrap();
    assert!(matches!(
        pyramid.estimate_stream_at(Location::new(3, 1, 1)),
        Err(PyramidError::Grid(_))
    ));
}
