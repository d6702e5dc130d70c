//! The pyramid engine: cached, recursively refined streams per tile.

use crate::{
    pick_direction, DirectionEstimates, Estimate, EstimateSource, EstimateStream, IdentityMap,
    Input, InputSet, MapFunction, ProgressiveStream, PyramidError, RasterSource, ReduceFunction,
    Refine, Result, SharedStream,
};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use seismap_grid::{Children, Grid, Location};
use seismap_metrics::metric_defs;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// A quadtree of progressively refined estimates.
///
/// Bottom tiles combine the pyramid's inputs through its [`MapFunction`];
/// interior tiles combine their four children through its
/// [`ReduceFunction`]. Every stream handed out is cached by location for the
/// lifetime of the pyramid, so callers asking for the same tile share one
/// refinement history.
pub struct Pyramid<T, I: InputSet> {
    name: String,
    grid: Grid,
    inputs: I,
    map: Box<dyn MapFunction<I::Values, T>>,
    reduce: Box<dyn ReduceFunction<T>>,
    seed: u64,
    streams: Mutex<HashMap<Location, SharedStream<T>>>,
    /// Handed to refiners so streams never keep their pyramid alive.
    this: Weak<Self>,
}

/// Builder for [`Pyramid`].
#[derive(Debug, Clone)]
pub struct PyramidBuilder {
    name: String,
    grid: Grid,
    seed: Option<u64>,
}

impl PyramidBuilder {
    /// Seed the per-tile random sources. Without a seed, one is drawn from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build a pyramid over `inputs`.
    ///
    /// Fails with [`PyramidError::GridMismatch`] when an input is defined on
    /// a grid with a different number of levels.
    pub fn build<T, I>(
        self,
        inputs: I,
        map: impl MapFunction<I::Values, T>,
        reduce: impl ReduceFunction<T>,
    ) -> Result<Arc<Pyramid<T, I>>>
    where
        T: Clone + Send + Sync + 'static,
        I: InputSet,
    {
        inputs.check_levels(self.grid.nr_levels())?;
        let seed = self.seed.unwrap_or_else(rand::random);
        debug!(
            "Pyramid[{}]: Built over {} levels with seed {}",
            self.name,
            self.grid.nr_levels(),
            seed
        );

        Ok(Arc::new_cyclic(|this| Pyramid {
            name: self.name,
            grid: self.grid,
            inputs,
            map: Box::new(map),
            reduce: Box::new(reduce),
            seed,
            streams: Mutex::new(HashMap::new()),
            this: this.clone(),
        }))
    }

    /// Build a pyramid whose only input is a raster of bottom-level values,
    /// passed through unchanged.
    pub fn over_raster<T>(
        self,
        raster: Vec<Vec<T>>,
        reduce: impl ReduceFunction<T>,
    ) -> Result<Arc<Pyramid<T, (Input<T>,)>>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let source: Input<T> = Arc::new(RasterSource::new(self.grid, raster)?);
        self.build((source,), IdentityMap, reduce)
    }
}

impl Pyramid<(), ()> {
    /// Start building a pyramid named `name` on `grid`.
    ///
    /// The element and input types are fixed later by
    /// [`PyramidBuilder::build`] or [`PyramidBuilder::over_raster`].
    pub fn builder(name: impl Into<String>, grid: Grid) -> PyramidBuilder {
        PyramidBuilder {
            name: name.into(),
            grid,
            seed: None,
        }
    }
}

impl<T, I> Pyramid<T, I>
where
    T: Clone + Send + Sync + 'static,
    I: InputSet,
{
    /// The pyramid's name, used in logs and metric labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The grid the pyramid is defined on.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The seed of the per-tile random sources.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of streams created so far.
    pub fn cached_streams(&self) -> usize {
        self.streams.lock().len()
    }

    /// The stream of a tile if it has been requested before.
    pub fn cached_stream_at(&self, location: Location) -> Option<SharedStream<T>> {
        self.streams.lock().get(&location).cloned()
    }

    /// The shared stream of estimates for a tile, created on first request.
    pub fn estimate_stream_at(&self, location: Location) -> Result<SharedStream<T>> {
        self.grid.check(location)?;

        let mut streams = self.streams.lock();
        if let Some(stream) = streams.get(&location) {
            metrics::counter!(metric_defs::PYRAMID_CACHE_HITS.name, "pyramid" => self.name.clone())
                .increment(1);
            return Ok(Arc::clone(stream));
        }

        metrics::counter!(metric_defs::PYRAMID_CACHE_MISSES.name, "pyramid" => self.name.clone())
            .increment(1);
        debug!("Pyramid[{}]: Creating stream at {}", self.name, location);

        let stream: SharedStream<T> = if self.grid.is_bottom(location) {
            Arc::new(ProgressiveStream::new(BottomRefiner {
                pyramid: self.this.clone(),
                name: self.name.clone(),
                location,
            }))
        } else {
            Arc::new(ProgressiveStream::new(InteriorRefiner {
                pyramid: self.this.clone(),
                name: self.name.clone(),
                location,
                children: self.grid.children(location)?,
                latest: DirectionEstimates::empty(),
                rng: ChaCha8Rng::seed_from_u64(stream_seed(self.seed, location)),
            }))
        };
        streams.insert(location, Arc::clone(&stream));
        Ok(stream)
    }

    fn record_completion(&self, location: Location) {
        metrics::counter!(metric_defs::STREAM_COMPLETED.name, "pyramid" => self.name.clone())
            .increment(1);
        debug!("Pyramid[{}]: Stream at {} complete", self.name, location);
    }
}

impl<T, I> EstimateSource<T> for Pyramid<T, I>
where
    T: Clone + Send + Sync + 'static,
    I: InputSet,
{
    fn nr_levels(&self) -> u32 {
        self.grid.nr_levels()
    }

    fn estimate_stream_at(&self, location: Location) -> Result<SharedStream<T>> {
        Pyramid::estimate_stream_at(self, location)
    }
}

impl<T, I: InputSet> fmt::Debug for Pyramid<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pyramid")
            .field("name", &self.name)
            .field("grid", &self.grid)
            .field("seed", &self.seed)
            .field("cached_streams", &self.streams.lock().len())
            .finish()
    }
}

/// Largest degree below 1.
const MAX_PARTIAL_DEGREE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Derive the seed of one tile's random source from the pyramid seed.
fn stream_seed(seed: u64, location: Location) -> u64 {
    let packed = (u64::from(location.z) << 48) ^ (u64::from(location.x) << 24) ^ u64::from(location.y);
    packed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(seed)
}

fn upgrade<T, I: InputSet>(
    pyramid: &Weak<Pyramid<T, I>>,
    name: &str,
    location: Location,
) -> Result<Arc<Pyramid<T, I>>> {
    pyramid.upgrade().ok_or_else(|| PyramidError::PyramidDropped {
        name: name.to_string(),
        location,
    })
}

/// Refines a bottom tile by polling every input once.
struct BottomRefiner<T, I: InputSet> {
    pyramid: Weak<Pyramid<T, I>>,
    name: String,
    location: Location,
}

impl<T, I> Refine<T> for BottomRefiner<T, I>
where
    T: Clone + Send + Sync + 'static,
    I: InputSet,
{
    fn refine(&mut self) -> Result<Estimate<T>> {
        let pyramid = upgrade(&self.pyramid, &self.name, self.location)?;
        let (degree, values) = pyramid.inputs.poll_at(self.location)?;
        let estimate = Estimate::new(degree, pyramid.map.map(values, self.location));

        metrics::counter!(
            metric_defs::STREAM_REFINEMENTS.name,
            "pyramid" => self.name.clone(),
            "kind" => "bottom"
        )
        .increment(1);
        trace!("Pyramid[{}]: Mapped inputs at {} (degree {})", self.name, self.location, degree);

        if estimate.is_complete() {
            pyramid.record_completion(self.location);
        }
        Ok(estimate)
    }
}

/// Refines an interior tile one child at a time.
///
/// Holds the latest estimate of each child; every step advances one child
/// chosen with weight `1 - degree` and re-reduces all four.
struct InteriorRefiner<T, I: InputSet> {
    pyramid: Weak<Pyramid<T, I>>,
    name: String,
    location: Location,
    children: Children,
    latest: DirectionEstimates<T>,
    rng: ChaCha8Rng,
}

impl<T, I> Refine<T> for InteriorRefiner<T, I>
where
    T: Clone + Send + Sync + 'static,
    I: InputSet,
{
    fn refine(&mut self) -> Result<Estimate<T>> {
        let pyramid = upgrade(&self.pyramid, &self.name, self.location)?;

        // With every child final there is nothing left to draw from.
        if self.latest.all_complete() {
            let value = pyramid.reduce.reduce(&self.latest, self.location);
            return Ok(Estimate::complete(value));
        }

        let u: f64 = self.rng.gen();
        if let Some(direction) = pick_direction(&self.latest.degrees(), u) {
            let child = self.children.get(direction);
            let estimate = pyramid.estimate_stream_at(child)?.next()?;
            trace!(
                "Pyramid[{}]: {} advanced {} child {} to degree {}",
                self.name,
                self.location,
                direction,
                child,
                estimate.degree
            );
            self.latest.set(direction, estimate);
        }

        metrics::counter!(
            metric_defs::STREAM_REFINEMENTS.name,
            "pyramid" => self.name.clone(),
            "kind" => "interior"
        )
        .increment(1);

        let value = pyramid.reduce.reduce(&self.latest, self.location);
        if self.latest.all_complete() {
            pyramid.record_completion(self.location);
            return Ok(Estimate::complete(value));
        }
        // The quarter sum can round up to 1 while a child is still partial.
        let degree = self.latest.degree().min(MAX_PARTIAL_DEGREE);
        Ok(Estimate::new(degree, Some(value)))
    }
}
