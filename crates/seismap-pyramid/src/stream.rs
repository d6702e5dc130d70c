//! Estimate streams: values that improve each time they are polled.

use crate::{Estimate, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// A progressively refined value.
///
/// While the degree is below 1 each call to [`next`](EstimateStream::next)
/// may do new work and return an improved estimate. Once a call returns a
/// degree of 1, the stream is frozen: every later call returns that exact
/// estimate without doing any work.
///
/// Streams are shared between callers; implementations serialize
/// refinement internally so each call observes a consistent prior state.
pub trait EstimateStream<T>: Send + Sync {
    /// Refine once (unless frozen) and return the new estimate.
    fn next(&self) -> Result<Estimate<T>>;

    /// The most recent estimate, without refining.
    fn latest(&self) -> Estimate<T>;

    /// Whether the stream is frozen at degree 1.
    fn is_complete(&self) -> bool {
        self.latest().is_complete()
    }
}

/// A stream shared between the pyramid cache and its callers.
pub type SharedStream<T> = Arc<dyn EstimateStream<T>>;

/// A constant, always complete stream.
#[derive(Debug, Clone)]
pub struct ImmediateStream<T> {
    value: T,
}

impl<T> ImmediateStream<T> {
    /// Wrap a known value.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + Send + Sync> EstimateStream<T> for ImmediateStream<T> {
    fn next(&self) -> Result<Estimate<T>> {
        Ok(Estimate::complete(self.value.clone()))
    }

    fn latest(&self) -> Estimate<T> {
        Estimate::complete(self.value.clone())
    }

    fn is_complete(&self) -> bool {
        true
    }
}

/// One refinement step of a [`ProgressiveStream`].
///
/// A refiner owns whatever state it needs between steps. It is dropped as
/// soon as it produces a complete estimate.
pub trait Refine<T>: Send {
    /// Do one unit of work and return the resulting estimate.
    fn refine(&mut self) -> Result<Estimate<T>>;
}

impl<T, F> Refine<T> for F
where
    F: FnMut() -> Result<Estimate<T>> + Send,
{
    fn refine(&mut self) -> Result<Estimate<T>> {
        self()
    }
}

/// A stream driven by a [`Refine`] step that freezes on completion.
pub struct ProgressiveStream<T> {
    state: Mutex<Progress<T>>,
}

struct Progress<T> {
    /// `None` once the stream is frozen.
    refiner: Option<Box<dyn Refine<T>>>,
    latest: Estimate<T>,
}

impl<T> ProgressiveStream<T> {
    /// Create a stream around a refinement step.
    pub fn new(refiner: impl Refine<T> + 'static) -> Self {
        Self {
            state: Mutex::new(Progress {
                refiner: Some(Box::new(refiner)),
                latest: Estimate::empty(),
            }),
        }
    }
}

impl<T: Clone + Send> EstimateStream<T> for ProgressiveStream<T> {
    fn next(&self) -> Result<Estimate<T>> {
        let mut state = self.state.lock();
        let Some(refiner) = state.refiner.as_mut() else {
            return Ok(state.latest.clone());
        };

        let estimate = refiner.refine()?;
        if estimate.is_complete() {
            state.refiner = None;
        }
        state.latest = estimate.clone();
        Ok(estimate)
    }

    fn latest(&self) -> Estimate<T> {
        self.state.lock().latest.clone()
    }

    fn is_complete(&self) -> bool {
        self.state.lock().refiner.is_none()
    }
}

impl<T> std::fmt::Debug for ProgressiveStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ProgressiveStream")
            .field("degree", &state.latest.degree)
            .field("frozen", &state.refiner.is_none())
            .finish()
    }
}

/// Poll `stream` until it completes or `max_polls` polls have been made.
///
/// Returns the last estimate observed, which is complete unless the poll
/// budget ran out first.
pub fn resolve<T>(stream: &(impl EstimateStream<T> + ?Sized), max_polls: usize) -> Result<Estimate<T>> {
    let mut estimate = stream.latest();
    for _ in 0..max_polls {
        if estimate.is_complete() {
            break;
        }
        estimate = stream.next()?;
    }
    Ok(estimate)
}
