use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AnalyzerError, Result};
use crate::event::{Event, EventId, EventSource, JsonLinesSource};
use crate::histograms::{load_hist_spec, HistogramBook, HistogramSink};
use crate::metrics::{PipelineMetrics, SinkMetrics};
use crate::pipeline::{EventOutcome, EventPipeline};
use crate::providers::Providers;
use crate::storage::{ColumnarSink, RecordSink};

pub const DEFAULT_HIST_OUTPUT: &str = "histograms.json";

/// Abort messages kept in the summary; later aborts are only counted
pub const MAX_REPORTED_ERRORS: usize = 100;

/// Result of a complete job
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: Uuid,
    pub events_read: usize,
    pub events_persisted: usize,
    pub events_aborted: usize,
    /// Veto-quality electrons across persisted events; diagnostic only
    pub veto_electrons: usize,
    /// First `MAX_REPORTED_ERRORS` abort messages
    pub errors: Vec<String>,
}

impl JobSummary {
    pub fn new(job_id: Uuid) -> Self {
        Self {
            job_id,
            events_read: 0,
            events_persisted: 0,
            events_aborted: 0,
            veto_electrons: 0,
            errors: Vec::new(),
        }
    }
}

/// Drives events through the pipeline one at a time and routes each outcome.
///
/// Only a persisted event touches the sink, the histograms and the job
/// counters; an aborted event leaves all three unchanged.
pub struct Job<S: RecordSink, H: HistogramSink> {
    pipeline: EventPipeline,
    sink: S,
    histograms: H,
    seen: HashSet<EventId>,
    summary: JobSummary,
}

impl<S: RecordSink, H: HistogramSink> Job<S, H> {
    pub fn new(pipeline: EventPipeline, sink: S, histograms: H, job_id: Uuid) -> Self {
        Self {
            pipeline,
            sink,
            histograms,
            seen: HashSet::new(),
            summary: JobSummary::new(job_id),
        }
    }

    pub fn summary(&self) -> &JobSummary {
        &self.summary
    }

    pub fn histograms(&self) -> &H {
        &self.histograms
    }

    /// Process one event. Event-fatal errors become `Aborted`; anything
    /// else stops the job.
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub fn process_event(&mut self, event: &Event) -> Result<EventOutcome> {
        self.summary.events_read += 1;
        let started = Instant::now();

        let processed = if self.seen.contains(&event.id) {
            Err(AnalyzerError::DuplicateEvent(event.id))
        } else {
            self.pipeline.process(event)
        };

        let processed = match processed {
            Ok(p) => p,
            Err(e) if e.is_event_fatal() => {
                warn!("Aborting event {}: {}", event.id, e);
                self.summary.events_aborted += 1;
                if self.summary.errors.len() < MAX_REPORTED_ERRORS {
                    self.summary.errors.push(format!("{}: {}", event.id, e));
                }
                PipelineMetrics::record_aborted();
                return Ok(EventOutcome::Aborted {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        self.sink.append(&processed.record)?;
        self.histograms.apply(&processed.fills);
        self.seen.insert(event.id);
        self.summary.events_persisted += 1;
        self.summary.veto_electrons += processed.veto_electrons;

        PipelineMetrics::record_veto_electrons(processed.veto_electrons);
        PipelineMetrics::record_persisted(
            processed.record.jets.len(),
            started.elapsed().as_secs_f64(),
        );
        debug!("Persisted event {}", event.id);
        Ok(EventOutcome::Persisted)
    }

    /// Pull events from `source` until it is exhausted or `max_events` have been read.
    pub fn run<E: EventSource>(&mut self, source: &mut E, max_events: Option<usize>) -> Result<()> {
        while max_events.map_or(true, |max| self.summary.events_read < max) {
            let Some(event) = source.next_event()? else {
                break;
            };
            self.process_event(&event)?;
            if self.summary.events_read % 1000 == 0 {
                info!(
                    "Processed {} events ({} aborted)",
                    self.summary.events_read, self.summary.events_aborted
                );
            }
        }
        Ok(())
    }

    /// Close the sink and hand back the collaborators with the final summary.
    pub fn finish(mut self) -> Result<(JobSummary, S, H)> {
        let started = Instant::now();
        self.sink.finish()?;
        SinkMetrics::record_finished(self.sink.len(), started.elapsed().as_secs_f64());
        Ok((self.summary, self.sink, self.histograms))
    }
}

/// Paths and limits for one `run` invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub hist_output: Option<PathBuf>,
    pub max_events: Option<usize>,
}

impl RunOptions {
    pub fn hist_output_path(&self) -> PathBuf {
        self.hist_output
            .clone()
            .unwrap_or_else(|| self.output.join(DEFAULT_HIST_OUTPUT))
    }
}

/// Run a full job: acquire every resource, process the input, release
/// everything and report.
pub fn run_job(config: &Config, options: &RunOptions) -> Result<JobSummary> {
    let job_id = Uuid::new_v4();
    info!("🚀 Starting job {}", job_id);

    let specs = load_hist_spec(&config.hist_file)?;
    let book = HistogramBook::from_specs(&specs);
    info!("📊 Booked {} histograms from {}", book.len(), config.hist_file.display());

    let mut source = JsonLinesSource::open(&options.input)?;
    let providers = Providers::from_config(config, source.catalog())?;
    let pipeline = EventPipeline::new(providers, config.cleaning_delta_r);
    let sink = ColumnarSink::create(&options.output, job_id)?;

    let mut job = Job::new(pipeline, sink, book, job_id);
    info!("🔧 Processing events from {}", options.input.display());
    job.run(&mut source, options.max_events)?;

    let (summary, _sink, book) = job.finish()?;
    book.write_json(&options.hist_output_path())?;
    SinkMetrics::record_histograms_written(book.len());

    info!(
        "✅ Job {} finished: {} read, {} persisted, {} aborted, {} veto electrons",
        summary.job_id,
        summary.events_read,
        summary.events_persisted,
        summary.events_aborted,
        summary.veto_electrons
    );
    Ok(summary)
}
