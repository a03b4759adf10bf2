//! # arpvakt-telemetry
//!
//! Observability layer: structured logging via `tracing` and Prometheus
//! metrics for the supervisor and notification pipeline.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
