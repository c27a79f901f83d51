use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::spec::{HistogramDir, HistogramSpec};
use crate::constants::{HIST_N_EVENTS, N_EVENTS_LABELS};
use crate::error::Result;

/// One deferred histogram update produced while processing an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramFill {
    pub name: &'static str,
    pub value: f64,
    pub weight: f64,
}

impl HistogramFill {
    pub fn new(name: &'static str, value: f64, weight: f64) -> Self {
        Self {
            name,
            value,
            weight,
        }
    }
}

/// Anything that can absorb weighted histogram fills
pub trait HistogramSink {
    /// Fill `name` at `value`; names that were never booked are ignored.
    fn fill(&mut self, name: &str, value: f64, weight: f64);

    fn apply(&mut self, fills: &[HistogramFill]) {
        for f in fills {
            self.fill(f.name, f.value, f.weight);
        }
    }
}

/// A fixed-width 1D histogram with under/overflow and sum of squared weights
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram1D {
    pub name: String,
    pub title: String,
    pub option: String,
    pub n_bins: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Bin contents (length = n_bins, excluding under/overflow)
    pub bin_content: Vec<f64>,
    pub sumw2: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    pub entries: u64,
    /// Labels for the leading bins; empty when the axis is unlabelled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bin_labels: Vec<String>,
}

impl Histogram1D {
    pub fn from_spec(spec: &HistogramSpec) -> Self {
        Self {
            name: spec.name.clone(),
            title: spec.title.clone(),
            option: spec.option.clone(),
            n_bins: spec.n_bins,
            x_min: spec.x_min,
            x_max: spec.x_max,
            bin_content: vec![0.0; spec.n_bins],
            sumw2: vec![0.0; spec.n_bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            bin_labels: Vec::new(),
        }
    }

    /// Label bins from the first one onwards; extra labels are dropped.
    pub fn set_bin_labels(&mut self, labels: &[&str]) {
        self.bin_labels = labels
            .iter()
            .take(self.n_bins)
            .map(|l| l.to_string())
            .collect();
    }

    /// Bin index for `x`, `None` when it falls outside `[x_min, x_max)`
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.x_min && x < self.x_max) {
            return None;
        }
        let width = (self.x_max - self.x_min) / self.n_bins as f64;
        let bin = ((x - self.x_min) / width) as usize;
        Some(bin.min(self.n_bins - 1))
    }

    pub fn fill(&mut self, x: f64, weight: f64) {
        if x.is_nan() {
            return;
        }
        self.entries += 1;
        match self.find_bin(x) {
            Some(b) => {
                self.bin_content[b] += weight;
                self.sumw2[b] += weight * weight;
            }
            None if x < self.x_min => self.underflow += weight,
            None => self.overflow += weight,
        }
    }
}

/// All histograms booked for the job, grouped by output directory
#[derive(Debug, Clone, Default)]
pub struct HistogramBook {
    histograms: Vec<(HistogramDir, Histogram1D)>,
    index: HashMap<String, usize>,
}

impl HistogramBook {
    /// Book one histogram per spec; the cut-flow histogram gets its bin labels.
    pub fn from_specs(specs: &[HistogramSpec]) -> Self {
        let mut book = Self::default();
        for spec in specs {
            let mut hist = Histogram1D::from_spec(spec);
            if spec.name == HIST_N_EVENTS {
                hist.set_bin_labels(&N_EVENTS_LABELS);
            }
            book.index.insert(spec.name.clone(), book.histograms.len());
            book.histograms.push((spec.dir, hist));
        }
        debug!(booked = book.len(), "Histograms booked");
        book
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Histogram1D> {
        self.index.get(name).map(|&i| &self.histograms[i].1)
    }

    /// Booked histograms per directory, in booking order
    pub fn by_directory(&self) -> BTreeMap<&'static str, Vec<&Histogram1D>> {
        let mut dirs: BTreeMap<&'static str, Vec<&Histogram1D>> = BTreeMap::new();
        for (dir, hist) in &self.histograms {
            dirs.entry(dir.name()).or_default().push(hist);
        }
        dirs
    }

    /// Write every histogram as pretty JSON grouped by directory
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.by_directory())?;
        fs::write(path, json)?;
        info!("💾 Histograms saved to: {}", path.display());
        Ok(())
    }
}

impl HistogramSink for HistogramBook {
    fn fill(&mut self, name: &str, value: f64, weight: f64) {
        if let Some(&i) = self.index.get(name) {
            self.histograms[i].1.fill(value, weight);
        }
    }
}
