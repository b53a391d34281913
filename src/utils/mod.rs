//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: tracing-subscriber setup driven by `LoggingConfig`
//! - **Metrics**: Thread-safe counters for encoded/decoded datagrams

pub mod logging;
pub mod metrics;

pub use metrics::{global_metrics, MetricsSnapshot};
