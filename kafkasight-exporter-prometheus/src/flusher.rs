//! Flush cycles: translating source-registry snapshots into Prometheus gauges.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use prometheus::{GaugeVec, Opts, Registry};
use regex::Regex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use kafkasight_metrics::{HistogramSnapshot, MeterSnapshot, Metric, MetricSource};

use crate::config::FlusherConfig;
use crate::mapping::{decode_name, flatten_key};

const AVG_SUFFIX: &str = "avg";
const COUNT_SUFFIX: &str = "count";

/// Errors raised by a flush cycle.
///
/// Both variants are cycle-fatal: the cycle stops at the failing metric and
/// the vector cache keeps whatever state it reached.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// Creating or registering a new gauge family failed. Registering the
    /// same identity twice with the exporter lands here.
    #[error("failed to register gauge family '{key}': {source}")]
    Register {
        key: String,
        source: prometheus::Error,
    },
    /// The observed dimension values do not match the shape the family was
    /// created with. The family's dimension set is fixed at first sight, so
    /// this means the source emitted the same identity with a different
    /// number of embedded dimensions.
    #[error("label values for '{key}' do not match the registered family: {source}")]
    Dimension {
        key: String,
        source: prometheus::Error,
    },
}

/// Per-cycle counters, reported at `debug!` level and returned to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Source metrics visited this cycle.
    pub metrics_visited: u64,
    /// Metrics rejected by the name filter.
    pub metrics_filtered: u64,
    /// Series values written to the exporter.
    pub series_exported: u64,
    /// Metrics skipped because their kind is not exportable.
    pub unsupported: u64,
}

/// Compiled metric-name filter.
///
/// The empty pattern matches nothing: absence of an explicit pattern means
/// "export nothing", not "export everything". A pattern that fails to compile
/// is reported once and likewise matches nothing.
struct NameFilter {
    pattern: Option<Regex>,
}

impl NameFilter {
    fn new(pattern: &str) -> Self {
        if pattern.is_empty() {
            return Self { pattern: None };
        }
        match Regex::new(pattern) {
            Ok(re) => Self { pattern: Some(re) },
            Err(error) => {
                warn!(%pattern, %error, "Invalid filter pattern, no metrics will be exported");
                Self { pattern: None }
            }
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(name))
    }
}

/// Bridge from a pull-style metrics registry to dimensioned Prometheus gauges.
///
/// Each flush cycle walks the source registry, decodes embedded broker/topic
/// dimensions out of the flat metric names, and sets the values on lazily
/// registered `GaugeVec` families. A family's dimension set is fixed the
/// first time its identity is seen and never changes afterwards.
///
/// All state is owned by the instance: independent flushers with their own
/// [`Registry`] never collide.
pub struct MetricFlusher {
    namespace: String,
    subsystem: String,
    flush_interval: Duration,
    filter: NameFilter,
    source: Arc<dyn MetricSource + Send + Sync>,
    registry: Registry,
    gauges: Mutex<HashMap<String, GaugeVec>>,
}

impl MetricFlusher {
    /// Create a flusher reading from `source` and registering families with
    /// `registry`.
    pub fn new(
        config: &FlusherConfig,
        source: Arc<dyn MetricSource + Send + Sync>,
        registry: Registry,
    ) -> Self {
        Self {
            namespace: flatten_key(&config.namespace),
            subsystem: flatten_key(&config.subsystem),
            flush_interval: Duration::from_secs(config.flush_interval_secs),
            filter: NameFilter::new(&config.filter_pattern),
            source,
            registry,
            gauges: Mutex::new(HashMap::new()),
        }
    }

    /// The exporter registry families are registered with.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of gauge families created so far.
    pub fn family_count(&self) -> usize {
        self.gauges.lock().len()
    }

    /// Run one full pass over the source registry.
    ///
    /// Per-metric problems (unsupported kinds, filtered names) are isolated
    /// and the pass continues; registration and dimensionality faults abort
    /// the pass with the error, leaving the cache in its partial state.
    pub fn flush_once(&self) -> Result<FlushStats, FlushError> {
        let mut stats = FlushStats::default();
        let mut failure: Option<FlushError> = None;

        self.source.each(&mut |name, metric| {
            if failure.is_some() {
                return;
            }
            stats.metrics_visited += 1;

            if !self.filter.matches(name) {
                stats.metrics_filtered += 1;
                return;
            }

            let result = match metric {
                Metric::Histogram(h) => self.export_histogram(name, &h.snapshot(), &mut stats),
                Metric::Meter(m) => self.export_meter(name, &m.snapshot(), &mut stats),
                other => {
                    warn!(
                        metric = %name,
                        kind = other.kind_name(),
                        "Unsupported metric kind, skipping"
                    );
                    stats.unsupported += 1;
                    Ok(())
                }
            };

            if let Err(e) = result {
                failure = Some(e);
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }

        debug!(
            visited = stats.metrics_visited,
            filtered = stats.metrics_filtered,
            exported = stats.series_exported,
            unsupported = stats.unsupported,
            "Flush cycle complete"
        );

        Ok(stats)
    }

    /// Run flush cycles at the configured interval until the shutdown signal
    /// flips to `true` (or its sender is dropped).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), FlushError> {
        let mut interval = tokio::time::interval(self.flush_interval);

        info!(
            interval_secs = self.flush_interval.as_secs(),
            "Starting flush loop"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.flush_once()?;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Flush loop stopped");
        Ok(())
    }

    fn export_histogram(
        &self,
        name: &str,
        snapshot: &HistogramSnapshot,
        stats: &mut FlushStats,
    ) -> Result<(), FlushError> {
        if let Some(avg) = snapshot.mean() {
            self.set_gauge(name, AVG_SUFFIX, avg)?;
            stats.series_exported += 1;
        }
        self.set_gauge(name, COUNT_SUFFIX, snapshot.count() as f64)?;
        stats.series_exported += 1;
        Ok(())
    }

    fn export_meter(
        &self,
        name: &str,
        snapshot: &MeterSnapshot,
        stats: &mut FlushStats,
    ) -> Result<(), FlushError> {
        self.set_gauge(name, COUNT_SUFFIX, snapshot.count() as f64)?;
        stats.series_exported += 1;
        Ok(())
    }

    /// Resolve the gauge family for a raw metric name and set one series value.
    fn set_gauge(&self, raw_name: &str, suffix: &str, value: f64) -> Result<(), FlushError> {
        let decoded = decode_name(&flatten_key(raw_name));
        let name = format!("{}_{}", decoded.name, suffix);
        let key = format!("{}_{}_{}", self.namespace, self.subsystem, name);

        let mut label_names = Vec::new();
        let mut label_values = Vec::new();
        if let Some(broker) = decoded.broker.as_deref().filter(|v| !v.is_empty()) {
            label_names.push("broker");
            label_values.push(broker);
        }
        if let Some(topic) = decoded.topic.as_deref().filter(|v| !v.is_empty()) {
            label_names.push("topic");
            label_values.push(topic);
        }

        // One lock region covers resolve-or-create and the set, so the first
        // observation's dimension list wins atomically even under concurrent
        // cycles.
        let mut gauges = self.gauges.lock();
        let gauge = match gauges.get(&key) {
            Some(existing) => existing.clone(),
            None => {
                let opts = Opts::new(name.clone(), name.clone())
                    .namespace(self.namespace.clone())
                    .subsystem(self.subsystem.clone());
                let gauge = GaugeVec::new(opts, &label_names).map_err(|source| {
                    FlushError::Register {
                        key: key.clone(),
                        source,
                    }
                })?;
                self.registry
                    .register(Box::new(gauge.clone()))
                    .map_err(|source| FlushError::Register {
                        key: key.clone(),
                        source,
                    })?;
                gauges.insert(key.clone(), gauge.clone());
                gauge
            }
        };

        gauge
            .get_metric_with_label_values(&label_values)
            .map_err(|source| FlushError::Dimension { key, source })?
            .set(value);

        Ok(())
    }
}
