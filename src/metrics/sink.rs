//! Output metrics for the record sink and histogram book.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct SinkMetrics;

impl SinkMetrics {
    pub fn record_finished(entries: usize, duration_secs: f64) {
        ::metrics::gauge!(phase_metric!(gauge, "sink", "entries")).set(entries as f64);
        ::metrics::histogram!(phase_metric!(histogram, "sink", "finish_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_histograms_written(count: usize) {
        ::metrics::counter!(phase_metric!(counter, "sink", "histograms_written"))
            .increment(count as u64);
    }
}

impl PhaseMetrics for SinkMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = gauge!(phase_metric!(gauge, "sink", "entries"));
        let _ = histogram!(phase_metric!(histogram, "sink", "finish_duration_seconds"));
        let _ = counter!(phase_metric!(counter, "sink", "histograms_written"));
    }

    fn phase_name() -> &'static str {
        "sink"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(gauge, "sink", "entries"),
                metric_type: MetricType::Gauge,
                help: "Rows written to the columnar output",
            },
            MetricDoc {
                name: phase_metric!(histogram, "sink", "finish_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent flushing field files and writing the manifest",
            },
            MetricDoc {
                name: phase_metric!(counter, "sink", "histograms_written"),
                metric_type: MetricType::Counter,
                help: "Histograms saved at job end",
            },
        ]
    }
}
