//! Push-based observability for EDMAS
//!
//! Agent health is exported as Prometheus gauges rendered to text; nothing
//! listens for incoming requests.

pub mod metrics;

pub use metrics::Metrics;
