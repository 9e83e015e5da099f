//! Prometheus implementation of [`canary_core::MetricsBackend`].
//!
//! ```rust
//! use std::sync::Arc;
//! use canary_core::MetricsHandle;
//! use canary_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: MetricsHandle = Arc::new(metrics.clone());
//! # let _ = handle;
//!
//! let mut buf = Vec::new();
//! TextEncoder::new().encode(&metrics.gather(), &mut buf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `canary_mutations_total{op, outcome}` - Counter
//! - `canary_health_ticks_total{outcome}` - Counter
//! - `canary_health_tick_duration_seconds{outcome}` - Histogram
//! - `canary_alerts_total{delivered}` - Counter
//!
//! No HTTP endpoint is provided; serve [`PrometheusMetrics::gather`] from the host application.
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
