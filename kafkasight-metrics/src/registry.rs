//! Named metric registry and the iteration seam consumed by exporters.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::metric::{Counter, Gauge, Histogram, Meter, Metric, DEFAULT_SAMPLE_WINDOW};

/// Read-side interface over a metrics registry.
///
/// `each` invokes the callback once per currently known metric with its name
/// and a live handle. Within one call the callback observes a single
/// point-in-time snapshot of the entry set; metrics registered concurrently
/// may or may not be visited, and no visiting order is guaranteed.
pub trait MetricSource {
    fn each(&self, f: &mut dyn FnMut(&str, &Metric));
}

/// Thread-safe, named registry of metrics.
///
/// Registration is get-or-create: registering a name that already exists
/// returns the existing metric untouched. Metrics are never removed.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    metrics: RwLock<HashMap<String, Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `metric` under `name`, or return the already registered
    /// metric if the name is taken.
    pub fn get_or_register(&self, name: impl Into<String>, metric: Metric) -> Metric {
        let mut metrics = self.metrics.write();
        metrics.entry(name.into()).or_insert(metric).clone()
    }

    /// Get-or-create a [`Histogram`] under `name`.
    ///
    /// Returns `None` if the name is already registered as a different kind.
    pub fn histogram(&self, name: &str) -> Option<Histogram> {
        match self.get_or_register(name, Metric::Histogram(Histogram::new(DEFAULT_SAMPLE_WINDOW)))
        {
            Metric::Histogram(h) => Some(h),
            _ => None,
        }
    }

    /// Get-or-create a [`Meter`] under `name`.
    ///
    /// Returns `None` if the name is already registered as a different kind.
    pub fn meter(&self, name: &str) -> Option<Meter> {
        match self.get_or_register(name, Metric::Meter(Meter::new())) {
            Metric::Meter(m) => Some(m),
            _ => None,
        }
    }

    /// Get-or-create a [`Counter`] under `name`.
    ///
    /// Returns `None` if the name is already registered as a different kind.
    pub fn counter(&self, name: &str) -> Option<Counter> {
        match self.get_or_register(name, Metric::Counter(Counter::new())) {
            Metric::Counter(c) => Some(c),
            _ => None,
        }
    }

    /// Get-or-create a [`Gauge`] under `name`.
    ///
    /// Returns `None` if the name is already registered as a different kind.
    pub fn gauge(&self, name: &str) -> Option<Gauge> {
        match self.get_or_register(name, Metric::Gauge(Gauge::new())) {
            Metric::Gauge(g) => Some(g),
            _ => None,
        }
    }

    /// Look up a metric by name.
    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics.read().get(name).cloned()
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }
}

impl MetricSource for MetricRegistry {
    fn each(&self, f: &mut dyn FnMut(&str, &Metric)) {
        // Snapshot the entry set first so the callback runs without the lock
        // held and registrations made from inside it cannot deadlock.
        let entries: Vec<(String, Metric)> = self
            .metrics
            .read()
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect();

        for (name, metric) in &entries {
            f(name, metric);
        }
    }
}
