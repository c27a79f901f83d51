use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AnalyzerError, Result};
use crate::event::EventId;
use crate::pipeline::{Branch, OutputRecord};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Destination for persisted output records
pub trait RecordSink {
    /// Append one complete record. Every field of the record lands in the same
    /// row, or the call fails.
    fn append(&mut self, record: &OutputRecord) -> Result<()>;

    /// Flush and close the sink. Further appends are an error.
    fn finish(&mut self) -> Result<()>;

    /// Number of records appended so far
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Checksum entry for one field file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestField {
    pub name: String,
    pub file: String,
    pub sha256: String,
}

/// Written beside the field files when the sink is closed
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub job_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub entries: usize,
    pub fields: Vec<ManifestField>,
}

/// Columnar output: one newline-delimited JSON file per field, where row `i`
/// of every file belongs to the `i`-th persisted event.
pub struct ColumnarSink {
    dir: PathBuf,
    job_id: Uuid,
    writers: Option<BTreeMap<Branch, BufWriter<File>>>,
    entries: usize,
    manifest: Option<Manifest>,
}

impl ColumnarSink {
    pub fn create(dir: &Path, job_id: Uuid) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let mut writers = BTreeMap::new();
        for branch in Branch::ALL {
            let file = File::create(dir.join(field_file(branch)))?;
            writers.insert(branch, BufWriter::new(file));
        }
        debug!("Opened {} field files in {}", writers.len(), dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            job_id,
            writers: Some(writers),
            entries: 0,
            manifest: None,
        })
    }

    /// Manifest written by `finish`, if the sink has been closed
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }
}

fn field_file(branch: Branch) -> String {
    format!("{}.jsonl", branch.name())
}

fn sha256_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

fn closed() -> AnalyzerError {
    AnalyzerError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "record sink already finished",
    ))
}

impl RecordSink for ColumnarSink {
    fn append(&mut self, record: &OutputRecord) -> Result<()> {
        let writers = self.writers.as_mut().ok_or_else(closed)?;

        // Serialize the whole row before touching any file
        let mut lines = Vec::with_capacity(Branch::ALL.len());
        for branch in Branch::ALL {
            lines.push((branch, serde_json::to_string(&record.branch_value(branch)?)?));
        }
        for (branch, line) in lines {
            if let Some(w) = writers.get_mut(&branch) {
                writeln!(w, "{}", line)?;
            }
        }
        self.entries += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let Some(writers) = self.writers.take() else {
            return Ok(());
        };
        for (_, mut w) in writers {
            w.flush()?;
        }

        let mut fields = Vec::with_capacity(Branch::ALL.len());
        for branch in Branch::ALL {
            let file = field_file(branch);
            fields.push(ManifestField {
                name: branch.name().to_string(),
                sha256: sha256_file(&self.dir.join(&file))?,
                file,
            });
        }
        let manifest = Manifest {
            job_id: self.job_id,
            created_at: Utc::now(),
            entries: self.entries,
            fields,
        };
        let path = self.dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
        info!(
            "💾 Saved {} events to {}",
            self.entries,
            self.dir.display()
        );
        self.manifest = Some(manifest);
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries
    }
}

/// In-memory sink for development/testing
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Vec<OutputRecord>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    pub fn ids(&self) -> Vec<EventId> {
        self.records.iter().map(|r| r.id()).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RecordSink for InMemorySink {
    fn append(&mut self, record: &OutputRecord) -> Result<()> {
        if self.finished {
            return Err(closed());
        }
        self.records.push(record.clone());
        debug!("Stored record {}", record.id());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
