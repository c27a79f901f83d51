use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{AnalyzerError, Result};

/// Output directory a histogram is booked in, resolved from its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HistogramDir {
    All,
    Gen,
    Jets,
}

impl HistogramDir {
    /// Route a histogram name by prefix: `a_` to All, `g_` to Gen, `j_` to Jets
    pub fn route(name: &str) -> Option<Self> {
        match name.get(..2)? {
            "a_" => Some(HistogramDir::All),
            "g_" => Some(HistogramDir::Gen),
            "j_" => Some(HistogramDir::Jets),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HistogramDir::All => "All",
            HistogramDir::Gen => "Gen",
            HistogramDir::Jets => "Jets",
        }
    }
}

/// One line of the histogram specification file
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSpec {
    pub name: String,
    pub title: String,
    pub n_bins: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub option: String,
    pub dir: HistogramDir,
}

/// Parse `name title nbins min max option` lines. Lines whose name contains
/// `#` are comments and `~` in a title stands for a space.
pub fn parse_hist_spec(content: &str) -> Result<Vec<HistogramSpec>> {
    let mut specs = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        let Some(name) = fields.first() else {
            continue;
        };
        if name.contains('#') {
            continue;
        }

        let err = |reason: String| AnalyzerError::HistSpec { line, reason };

        if fields.len() != 6 {
            return Err(err(format!(
                "expected 6 fields (name title nbins min max option), found {}",
                fields.len()
            )));
        }

        let dir = HistogramDir::route(name)
            .ok_or_else(|| err(format!("'{}' has no a_/g_/j_ directory prefix", name)))?;
        let n_bins: usize = fields[2]
            .parse()
            .map_err(|_| err(format!("invalid bin count '{}'", fields[2])))?;
        let x_min: f64 = fields[3]
            .parse()
            .map_err(|_| err(format!("invalid lower edge '{}'", fields[3])))?;
        let x_max: f64 = fields[4]
            .parse()
            .map_err(|_| err(format!("invalid upper edge '{}'", fields[4])))?;

        if n_bins == 0 {
            return Err(err("bin count must be positive".to_string()));
        }
        if !(x_min < x_max) {
            return Err(err(format!("empty range [{}, {}]", x_min, x_max)));
        }
        if !seen.insert(name.to_string()) {
            return Err(err(format!("histogram '{}' booked twice", name)));
        }

        specs.push(HistogramSpec {
            name: name.to_string(),
            title: fields[1].replace('~', " "),
            n_bins,
            x_min,
            x_max,
            option: fields[5].to_string(),
            dir,
        });
    }

    Ok(specs)
}

/// Read and parse the histogram specification file; a missing file is fatal.
pub fn load_hist_spec(path: &Path) -> Result<Vec<HistogramSpec>> {
    let content = fs::read_to_string(path).map_err(|e| {
        AnalyzerError::Config(format!(
            "Histogram spec '{}' not readable: {}",
            path.display(),
            e
        ))
    })?;
    parse_hist_spec(&content)
}
