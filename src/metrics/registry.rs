//! Registration of every phase's metrics, with early detection of name clashes.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register all metrics from all phases
pub fn register_all_metrics() {
    let all = collect_metrics();
    info!("Registered {} metrics across all phases", all.len());
}

fn collect_metrics() -> HashMap<&'static str, (&'static str, MetricDoc)> {
    let mut all = HashMap::new();
    register_phase_metrics::<super::pipeline::PipelineMetrics>(&mut all);
    register_phase_metrics::<super::sink::SinkMetrics>(&mut all);
    all
}

fn register_phase_metrics<T: PhaseMetrics>(
    all: &mut HashMap<&'static str, (&'static str, MetricDoc)>,
) {
    T::register_metrics();
    let phase = T::phase_name();

    for doc in T::metrics_documentation() {
        if let Some((owner, _)) = all.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' is defined by both '{}' and '{}'",
                doc.name, owner, phase
            );
            continue;
        }
        if extract_phase_from_metric_name(doc.name) != phase {
            warn!("Metric '{}' is not prefixed with its phase '{}'", doc.name, phase);
        }
        debug!("  - {} ({:?}): {}", doc.name, doc.metric_type, doc.help);
        all.insert(doc.name, (phase, doc));
    }
}

/// Phase segment of a metric name, e.g. `hh_sink_entries` -> `sink`
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    metric_name
        .strip_prefix("hh_")
        .and_then(|rest| rest.split('_').next())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_conflicts_and_phase_prefixes_match() {
        let all = collect_metrics();
        assert_eq!(all.len(), 8);
        for (name, (phase, _)) in &all {
            assert_eq!(extract_phase_from_metric_name(name), *phase);
        }
    }

    #[test]
    fn test_extract_phase_from_metric_name() {
        assert_eq!(extract_phase_from_metric_name("hh_pipeline_events_aborted_total"), "pipeline");
        assert_eq!(extract_phase_from_metric_name("hh_sink_entries"), "sink");
        assert_eq!(extract_phase_from_metric_name("invalid_metric"), "unknown");
    }
}
