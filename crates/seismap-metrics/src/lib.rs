//! Metric declarations for seismap.
//!
//! Every metric recorded by the pyramid engine and the tile service is
//! declared here as a const [`Metric`], so names and units live in one place.
//! The `metrics` crate is re-exported for convenience.
//!
//! # Example
//!
//! ```rust
//! use seismap_metrics::{metric_defs, Metric, MetricKind};
//! use metrics::Unit;
//!
//! const TILES: Metric = Metric::histogram("my.tiles")
//!     .with_description("Tiles per response")
//!     .with_unit(Unit::Count)
//!     .with_labels(&["product"]);
//! assert_eq!(TILES.kind, MetricKind::Histogram);
//!
//! metrics::counter!(metric_defs::PYRAMID_CACHE_HITS.name, "pyramid" => "intensity").increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "seismap.pyramid.cache_hits").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// Unit of measurement, if any.
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn with_kind(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// A counter with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Counter)
    }

    /// A gauge with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Gauge)
    }

    /// A histogram with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Histogram)
    }

    /// Sets the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    ///
    /// Call once at startup, after the recorder is installed.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => describe_counter!(self.name, unit, self.description),
            (MetricKind::Counter, None) => describe_counter!(self.name, self.description),
            (MetricKind::Gauge, Some(unit)) => describe_gauge!(self.name, unit, self.description),
            (MetricKind::Gauge, None) => describe_gauge!(self.name, self.description),
            (MetricKind::Histogram, Some(unit)) => describe_histogram!(self.name, unit, self.description),
            (MetricKind::Histogram, None) => describe_histogram!(self.name, self.description),
        }
    }
}

/// All metric definitions.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Pyramid engine
    // ========================================================================

    /// Stream lookups answered from a pyramid's cache.
    pub const PYRAMID_CACHE_HITS: Metric = Metric::counter("seismap.pyramid.cache_hits")
        .with_description("Estimate stream lookups answered from the cache")
        .with_unit(Unit::Count)
        .with_labels(&["pyramid"]);

    /// Stream lookups that created a new stream.
    pub const PYRAMID_CACHE_MISSES: Metric = Metric::counter("seismap.pyramid.cache_misses")
        .with_description("Estimate stream lookups that created a new stream")
        .with_unit(Unit::Count)
        .with_labels(&["pyramid"]);

    /// Refinement steps performed by progressive streams.
    ///
    /// Labels: pyramid, kind (`bottom` or `interior`)
    pub const STREAM_REFINEMENTS: Metric = Metric::counter("seismap.stream.refinements")
        .with_description("Refinement steps performed")
        .with_unit(Unit::Count)
        .with_labels(&["pyramid", "kind"]);

    /// Streams that reached degree 1 and froze.
    pub const STREAM_COMPLETED: Metric = Metric::counter("seismap.stream.completed")
        .with_description("Streams that reached degree 1")
        .with_unit(Unit::Count)
        .with_labels(&["pyramid"]);

    // ========================================================================
    // Tile service
    // ========================================================================

    /// Tile requests received.
    pub const SERVICE_REQUESTS: Metric = Metric::counter("seismap.service.requests")
        .with_description("Tile requests received")
        .with_unit(Unit::Count)
        .with_labels(&["product"]);

    /// Requests rejected by validation.
    pub const SERVICE_REJECTED: Metric = Metric::counter("seismap.service.rejected")
        .with_description("Tile requests rejected by validation")
        .with_unit(Unit::Count)
        .with_labels(&["reason"]);

    /// Tiles returned per response.
    pub const SERVICE_TILES_SERVED: Metric = Metric::histogram("seismap.service.tiles_served")
        .with_description("Tiles returned per response")
        .with_unit(Unit::Count)
        .with_labels(&["product"]);

    /// Wall-clock time spent answering a request.
    pub const SERVICE_REQUEST_TIME: Metric = Metric::histogram("seismap.service.request_time_us")
        .with_description("Time spent answering a tile request")
        .with_unit(Unit::Microseconds)
        .with_labels(&["product"]);

    /// Responses cut short by the poll deadline.
    pub const SERVICE_DEADLINE_HITS: Metric = Metric::counter("seismap.service.deadline_hits")
        .with_description("Responses that hit the poll deadline before every tile was polled")
        .with_unit(Unit::Count)
        .with_labels(&["product"]);

    /// Every metric above.
    pub const ALL: &[Metric] = &[
        PYRAMID_CACHE_HITS,
        PYRAMID_CACHE_MISSES,
        STREAM_REFINEMENTS,
        STREAM_COMPLETED,
        SERVICE_REQUESTS,
        SERVICE_REJECTED,
        SERVICE_TILES_SERVED,
        SERVICE_REQUEST_TIME,
        SERVICE_DEADLINE_HITS,
    ];
}

/// Describe every metric in [`metric_defs::ALL`] to the installed recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Install a Prometheus recorder serving scrapes on `addr`, then describe all metrics.
#[cfg(feature = "prometheus")]
pub fn install_prometheus(
    addr: std::net::SocketAddr,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}
