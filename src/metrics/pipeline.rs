//! Event pipeline metrics: outcomes, object multiplicities and timing.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_persisted(n_jets: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "events_persisted")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "jets_per_event"))
            .record(n_jets as f64);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "event_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_aborted() {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "events_aborted")).increment(1);
    }

    pub fn record_veto_electrons(count: usize) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "veto_electrons"))
            .increment(count as u64);
    }
}

impl PhaseMetrics for PipelineMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "pipeline", "events_persisted"));
        let _ = counter!(phase_metric!(counter, "pipeline", "events_aborted"));
        let _ = counter!(phase_metric!(counter, "pipeline", "veto_electrons"));
        let _ = histogram!(phase_metric!(histogram, "pipeline", "jets_per_event"));
        let _ = histogram!(phase_metric!(histogram, "pipeline", "event_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "pipeline"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "events_persisted"),
                metric_type: MetricType::Counter,
                help: "Events whose record reached the output sink",
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "events_aborted"),
                metric_type: MetricType::Counter,
                help: "Events dropped by an event-fatal error",
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "veto_electrons"),
                metric_type: MetricType::Counter,
                help: "Veto-quality electrons seen in persisted events",
            },
            MetricDoc {
                name: phase_metric!(histogram, "pipeline", "jets_per_event"),
                metric_type: MetricType::Histogram,
                help: "Cleaned jet multiplicity of persisted events",
            },
            MetricDoc {
                name: phase_metric!(histogram, "pipeline", "event_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time spent processing one event",
            },
        ]
    }
}
