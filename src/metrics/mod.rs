//! Metrics for the ntuplizer job
//!
//! Each part of the job defines its own metrics in a dedicated submodule with
//! a shared naming convention, and registers them through [`registry`].

pub mod pipeline;
pub mod registry;
pub mod sink;

pub use pipeline::PipelineMetrics;
pub use sink::SinkMetrics;

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

/// Environment variable holding the Prometheus listen address
pub const METRICS_ADDR_ENV: &str = "HH_METRICS_ADDR";

static INIT: Once = Once::new();

/// Install the Prometheus exporter when `HH_METRICS_ADDR` is set.
///
/// Idempotent. Without the variable the `metrics` macros fall through to the
/// no-op recorder and the job runs unchanged.
pub fn init_metrics() {
    INIT.call_once(|| {
        let Ok(addr_str) = std::env::var(METRICS_ADDR_ENV) else {
            return;
        };
        let addr = match addr_str.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Invalid {} '{}': {}", METRICS_ADDR_ENV, addr_str, e);
                return;
            }
        };

        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => {
                info!("Prometheus exporter listening at http://{}/metrics", addr);
                registry::register_all_metrics();
            }
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    });
}

/// Per-phase metric collection
pub trait PhaseMetrics {
    /// Pre-register every metric so it shows up before first use
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a metric name following `hh_{phase}_{name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("hh_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("hh_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("hh_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
