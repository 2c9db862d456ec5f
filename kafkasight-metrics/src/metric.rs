//! Metric kinds and their point-in-time snapshots.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use parking_lot::Mutex;

/// Default number of buffered samples a [`Histogram`] keeps.
pub const DEFAULT_SAMPLE_WINDOW: usize = 1028;

/// A distribution-style metric: a bounded window of buffered samples plus a
/// cumulative count of every update ever made.
///
/// The window holds the most recent observations; once full, the oldest sample
/// is evicted. The cumulative count is never decremented, so it can exceed the
/// number of currently buffered samples.
#[derive(Debug, Clone)]
pub struct Histogram {
    inner: Arc<Mutex<HistogramInner>>,
}

#[derive(Debug)]
struct HistogramInner {
    samples: VecDeque<i64>,
    window: usize,
    count: u64,
}

impl Histogram {
    /// Create a histogram buffering at most `window` samples.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            inner: Arc::new(Mutex::new(HistogramInner {
                samples: VecDeque::with_capacity(window.min(DEFAULT_SAMPLE_WINDOW)),
                window,
                count: 0,
            })),
        }
    }

    /// Record one observation.
    pub fn update(&self, value: i64) {
        let mut inner = self.inner.lock();
        if inner.samples.len() == inner.window {
            inner.samples.pop_front();
        }
        inner.samples.push_back(value);
        inner.count += 1;
    }

    /// Take a point-in-time snapshot of the buffered samples and the
    /// cumulative count.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let inner = self.inner.lock();
        HistogramSnapshot {
            samples: inner.samples.iter().copied().collect(),
            count: inner.count,
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_WINDOW)
    }
}

/// Point-in-time view of a [`Histogram`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramSnapshot {
    samples: Vec<i64>,
    count: u64,
}

impl HistogramSnapshot {
    /// The samples buffered at snapshot time.
    pub fn samples(&self) -> &[i64] {
        &self.samples
    }

    /// Cumulative number of updates ever made.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean of the buffered samples, or `None` if no samples are
    /// currently buffered.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: i64 = self.samples.iter().sum();
        Some(sum as f64 / self.samples.len() as f64)
    }
}

/// A rate-style metric: a cumulative event count only.
#[derive(Debug, Clone, Default)]
pub struct Meter {
    count: Arc<AtomicU64>,
}

impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `n` events.
    pub fn mark(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of the cumulative count.
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            count: self.count.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a [`Meter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterSnapshot {
    count: u64,
}

impl MeterSnapshot {
    /// Cumulative number of events ever marked.
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// A signed running total.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicI64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, n: i64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self, n: i64) {
        self.value.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A settable instantaneous value.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    value: Arc<Mutex<f64>>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        *self.value.lock() = value;
    }

    pub fn value(&self) -> f64 {
        *self.value.lock()
    }
}

/// A registered metric of any kind.
///
/// Clones share state with the original, so a registry can hand out live
/// handles during iteration.
#[derive(Debug, Clone)]
pub enum Metric {
    Histogram(Histogram),
    Meter(Meter),
    Counter(Counter),
    Gauge(Gauge),
}

impl Metric {
    /// Human-readable kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Metric::Histogram(_) => "histogram",
            Metric::Meter(_) => "meter",
            Metric::Counter(_) => "counter",
            Metric::Gauge(_) => "gauge",
        }
    }
}
