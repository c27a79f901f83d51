pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod histograms;
pub mod job;
pub mod logging;
pub mod metrics;
pub mod physics;
pub mod pipeline;
pub mod providers;
pub mod storage;

pub use config::Config;
pub use error::{AnalyzerError, Result};
pub use event::{Event, EventId, EventSource};
pub use job::{run_job, Job, JobSummary, RunOptions};
pub use pipeline::{EventOutcome, EventPipeline, OutputRecord};
