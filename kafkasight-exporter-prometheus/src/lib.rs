//! Prometheus exporter bridge for Kafka client metrics.
//!
//! The Kafka client library accumulates its metrics in a flat-named,
//! pull-style registry with no label concept: per-broker and per-topic
//! metrics encode their dimension inside the metric name
//! (`request-latency-in-ms_for_broker_3`). This crate decodes that structure
//! and republishes the metrics as dimensioned Prometheus gauge families.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ Metric Registry │────>│  MetricFlusher  │────>│ prometheus      │
//! │  (flat names)   │     │ (decode + cache)│     │ Registry        │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let registry = Arc::new(MetricRegistry::new());
//! let config = FlusherConfig {
//!     filter_pattern: ".*".to_string(),
//!     ..Default::default()
//! };
//! let flusher = MetricFlusher::new(&config, registry, prometheus::Registry::new());
//!
//! flusher.flush_once()?;                 // one pass, e.g. from a test
//! flusher.run(shutdown_rx).await?;       // or periodically until shutdown
//! ```
//!
//! # Configuration
//!
//! See [`config::FlusherConfig`] for configuration options. Note that the
//! default filter pattern is empty, which exports nothing: export is opt-in
//! per metric-name pattern.

pub mod config;
pub mod flusher;
pub mod mapping;

pub use config::{ConfigError, FlusherConfig, LogFormat, LoggingConfig};
pub use flusher::{FlushError, FlushStats, MetricFlusher};
pub use mapping::{DecodedName, decode_name, flatten_key};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| {
                    ConfigError::Logging(format!("Failed to initialize tracing: {}", e))
                })?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| {
                    ConfigError::Logging(format!("Failed to initialize tracing: {}", e))
                })?;
        }
    }

    Ok(())
}
