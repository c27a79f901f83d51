use std::collections::BTreeSet;

use crate::config::PileupConfig;
use crate::error::Result;
use crate::event::{Event, Token};
use crate::physics::{PileupSummary, Vertex};

/// Nominal pileup weight and its systematic variations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PileupWeights {
    pub nominal: f64,
    pub up: f64,
    pub down: f64,
}

impl PileupWeights {
    pub const NEUTRAL: PileupWeights = PileupWeights {
        nominal: 1.0,
        up: 1.0,
        down: 1.0,
    };
}

impl Default for PileupWeights {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Pileup reweighting and primary-vertex counting
#[derive(Debug, Clone)]
pub struct PileupProvider {
    vertices: Token<Vec<Vertex>>,
    summary: Token<PileupSummary>,
    data: Vec<f64>,
    data_up: Vec<f64>,
    data_down: Vec<f64>,
    mc: Vec<f64>,
}

impl PileupProvider {
    pub fn new(config: &PileupConfig, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        let data = normalized(&config.data_profile);
        // Missing systematic profiles fall back to the nominal one
        let data_up = if config.data_profile_up.is_empty() {
            data.clone()
        } else {
            normalized(&config.data_profile_up)
        };
        let data_down = if config.data_profile_down.is_empty() {
            data.clone()
        } else {
            normalized(&config.data_profile_down)
        };

        Ok(Self {
            vertices: Token::resolve(&config.vertices, catalog)?,
            summary: Token::resolve(&config.summary, catalog)?,
            data,
            data_up,
            data_down,
            mc: normalized(&config.mc_profile),
        })
    }

    /// Whether reweighting profiles were configured at all
    pub fn is_reweighting(&self) -> bool {
        !self.mc.is_empty()
    }

    /// Pileup weights for the event. Real data and jobs without profiles get
    /// neutral weights; the pileup summary is only read when it is needed.
    pub fn weights(&self, event: &Event) -> Result<PileupWeights> {
        if !event.is_simulated || !self.is_reweighting() {
            return Ok(PileupWeights::NEUTRAL);
        }

        let summary = event.get(&self.summary)?;
        let n = summary.n_true_interactions;
        if !n.is_finite() || n < 0.0 {
            return Ok(PileupWeights::NEUTRAL);
        }
        let bin = n.floor() as usize;

        Ok(PileupWeights {
            nominal: ratio(&self.data, &self.mc, bin),
            up: ratio(&self.data_up, &self.mc, bin),
            down: ratio(&self.data_down, &self.mc, bin),
        })
    }

    /// Number of good reconstructed primary vertices
    pub fn n_pv(&self, event: &Event) -> Result<usize> {
        let vertices = event.get(&self.vertices)?;
        Ok(vertices.iter().filter(|v| is_good_vertex(v)).count())
    }
}

fn is_good_vertex(v: &Vertex) -> bool {
    !v.is_fake && v.ndof > 4.0 && v.z.abs() < 24.0 && v.rho < 2.0
}

fn normalized(profile: &[f64]) -> Vec<f64> {
    let sum: f64 = profile.iter().sum();
    if sum > 0.0 {
        profile.iter().map(|v| v / sum).collect()
    } else {
        profile.to_vec()
    }
}

fn ratio(data: &[f64], mc: &[f64], bin: usize) -> f64 {
    match (data.get(bin), mc.get(bin)) {
        (Some(d), Some(m)) if *m > 0.0 => d / m,
        _ => 1.0,
    }
}
