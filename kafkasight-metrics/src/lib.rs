//! Kafkasight Metrics Model
//!
//! This crate models the pull-style, in-process metrics registry that a Kafka
//! client library writes into:
//!
//! - [`metric`] - Metric kinds (`Histogram`, `Meter`, `Counter`, `Gauge`) and
//!   their point-in-time snapshots
//! - [`registry`] - Named registry of metrics (`MetricRegistry`) and the
//!   iteration seam consumed by exporters (`MetricSource`)
//!
//! Metric handles are cheap to clone and share their underlying state, so the
//! instrumented client keeps a handle per metric while the registry hands out
//! the same state to readers.

pub mod metric;
pub mod registry;

// Re-export commonly used types at the crate root
pub use metric::{
    Counter, DEFAULT_SAMPLE_WINDOW, Gauge, Histogram, HistogramSnapshot, Meter, MeterSnapshot,
    Metric,
};
pub use registry::{MetricRegistry, MetricSource};
