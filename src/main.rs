use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use hh_ntuplizer::histograms::{load_hist_spec, HistogramDir};
use hh_ntuplizer::{logging, metrics, run_job, Config, RunOptions};

#[derive(Parser)]
#[command(name = "hh-ntuplizer")]
#[command(about = "Per-event HH -> 4b ntuple production")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an event file into columnar output and histograms
    Run {
        /// Job configuration (TOML)
        #[arg(long)]
        config: PathBuf,
        /// Newline-delimited JSON events
        #[arg(long)]
        input: PathBuf,
        /// Output directory for the field files and manifest
        #[arg(long)]
        output: PathBuf,
        /// Histogram JSON path (default: <output>/histograms.json)
        #[arg(long)]
        hist_output: Option<PathBuf>,
        /// Stop after this many events
        #[arg(long)]
        max_events: Option<usize>,
        /// Debug-level logging
        #[arg(long, short)]
        verbose: bool,
    },
    /// Validate a configuration and its histogram specification
    Check {
        #[arg(long)]
        config: PathBuf,
    },
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            input,
            output,
            hist_output,
            max_events,
            verbose,
        } => {
            let config = load_config(&config)?;
            let _guard = logging::init_logging(&output.join("logs"), verbose || config.verbose);
            metrics::init_metrics();

            let options = RunOptions {
                input,
                output,
                hist_output,
                max_events,
            };
            let summary = run_job(&config, &options)?;

            println!("\n📊 Job Results ({}):", summary.job_id);
            println!("   Events read: {}", summary.events_read);
            println!("   Persisted: {}", summary.events_persisted);
            println!("   Aborted: {}", summary.events_aborted);
            println!("   Veto electrons: {}", summary.veto_electrons);
            println!("   Output: {}", options.output.display());
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            let specs = load_hist_spec(&config.hist_file)
                .with_context(|| format!("loading {}", config.hist_file.display()))?;
            println!("✅ Configuration valid, {} histograms booked", specs.len());
            for dir in [HistogramDir::All, HistogramDir::Gen, HistogramDir::Jets] {
                let names: Vec<&str> = specs
                    .iter()
                    .filter(|s| s.dir == dir)
                    .map(|s| s.name.as_str())
                    .collect();
                println!("   {}: {}", dir.name(), names.join(", "));
            }
        }
    }

    Ok(())
}
