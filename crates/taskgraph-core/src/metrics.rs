//! Per-invocation operation counters.
//!
//! A [`Metrics`] value is owned by the caller and handed to the
//! `*_with_metrics` variant of an engine operation as `&mut Metrics`. Nothing
//! here is global: two analyses running side by side each carry their own
//! counters, and the counters never influence what an algorithm computes.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

/// Advisory counters and elapsed time for one algorithm invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Vertices entered by a depth-first search.
    pub dfs_visits: u64,
    /// Adjacency entries examined by a depth-first search.
    pub edge_traversals: u64,
    /// Vertices enqueued by Kahn's algorithm.
    pub queue_pushes: u64,
    /// Vertices dequeued by Kahn's algorithm.
    pub queue_pops: u64,
    /// Edges relaxed by a path computation.
    pub relaxations: u64,
    /// Wall-clock time spent inside [`Metrics::timed`] closures.
    #[serde(rename = "elapsed_us", serialize_with = "serialize_micros")]
    pub elapsed: Duration,
}

impl Metrics {
    /// Zero every counter and the elapsed time.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Run `f`, adding its wall-clock duration to [`Metrics::elapsed`].
    pub fn timed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let started = Instant::now();
        let result = f(self);
        self.elapsed += started.elapsed();
        result
    }

    /// Add another invocation's counters into this one.
    pub fn merge(&mut self, other: &Self) {
        self.dfs_visits += other.dfs_visits;
        self.edge_traversals += other.edge_traversals;
        self.queue_pushes += other.queue_pushes;
        self.queue_pops += other.queue_pops;
        self.relaxations += other.relaxations;
        self.elapsed += other.elapsed;
    }

    /// Elapsed time in fractional milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1_000.0
    }

    /// Returns true when no counter has moved.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dfs_visits == 0
            && self.edge_traversals == 0
            && self.queue_pushes == 0
            && self.queue_pops == 0
            && self.relaxations == 0
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dfs_visits={} edge_traversals={} queue_pushes={} queue_pops={} relaxations={} time={:.3}ms",
            self.dfs_visits,
            self.edge_traversals,
            self.queue_pushes,
            self.queue_pops,
            self.relaxations,
            self.elapsed_ms()
        )
    }
}

fn serialize_micros<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
}
