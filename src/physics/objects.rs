use serde::{Deserialize, Serialize};

use super::kinematics::{Candidate, LorentzVector};

/// Variables computed relative to the event's missing transverse energy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetVariables {
    /// Azimuthal separation from the MET direction
    pub d_phi_met: f64,
    /// Transverse mass of the object paired with MET
    pub mt_met: f64,
}

/// Reconstructed electron
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Electron {
    pub p4: LorentzVector,
    #[serde(default)]
    pub charge: i32,
    /// Relative isolation (sum of isolation deposits over pt)
    #[serde(default)]
    pub rel_iso: f64,
    #[serde(default)]
    pub is_veto: bool,
    #[serde(default)]
    pub is_loose: bool,
    #[serde(default)]
    pub is_medium: bool,
    #[serde(default)]
    pub is_tight: bool,
    /// Filled by the variable augmenter, never by the input
    #[serde(skip)]
    pub met_vars: Option<MetVariables>,
}

/// Reconstructed muon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Muon {
    pub p4: LorentzVector,
    #[serde(default)]
    pub charge: i32,
    #[serde(default)]
    pub rel_iso: f64,
    #[serde(default)]
    pub is_loose: bool,
    #[serde(default)]
    pub is_medium: bool,
    #[serde(default)]
    pub is_tight: bool,
    #[serde(skip)]
    pub met_vars: Option<MetVariables>,
}

/// Reconstructed jet with b-tag discriminants
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Jet {
    pub p4: LorentzVector,
    /// Combined secondary vertex b-tag score
    #[serde(default)]
    pub csv: f64,
    /// Combined MVA b-tag score
    #[serde(default)]
    pub cmva: f64,
    #[serde(default)]
    pub is_loose: bool,
    #[serde(default)]
    pub is_tight: bool,
    /// Hadron flavour from simulation truth, 0 for real data
    #[serde(default)]
    pub hadron_flavour: i32,
    #[serde(default)]
    pub parton_flavour: i32,
    #[serde(skip)]
    pub met_vars: Option<MetVariables>,
}

/// Missing transverse energy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Met {
    pub pt: f64,
    pub phi: f64,
    #[serde(default)]
    pub sum_et: f64,
}

impl Met {
    pub fn px(&self) -> f64 {
        self.pt * self.phi.cos()
    }

    pub fn py(&self) -> f64 {
        self.pt * self.phi.sin()
    }
}

/// Reconstructed primary vertex
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub ndof: f64,
    /// Longitudinal position in cm
    pub z: f64,
    /// Transverse distance from the beam line in cm
    pub rho: f64,
    #[serde(default)]
    pub is_fake: bool,
}

/// Simulated pileup summary for the in-time bunch crossing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PileupSummary {
    /// Mean number of interactions the event was generated with
    pub n_true_interactions: f64,
}

/// One trigger path decision as stored in the event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBit {
    pub name: String,
    pub accept: bool,
}

/// One generator weight variation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LheWeight {
    pub id: i32,
    pub value: f64,
}

/// Generator event-level information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenEventInfo {
    #[serde(default)]
    pub weights: Vec<LheWeight>,
}

/// Particle at the hard-process (LHE) level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LheParticle {
    pub pdg_id: i32,
    /// LHE status code: -1 incoming, 1 outgoing, 2 intermediate
    pub status: i32,
    pub p4: LorentzVector,
}

/// Hard-process record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LheEvent {
    #[serde(default)]
    pub particles: Vec<LheParticle>,
}

/// Generator-level particle; mother and daughter links index the event's
/// generator-particle collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenParticle {
    pub pdg_id: i32,
    pub status: i32,
    pub p4: LorentzVector,
    #[serde(default)]
    pub mothers: Vec<usize>,
    #[serde(default)]
    pub daughters: Vec<usize>,
}

impl Candidate for Electron {
    fn p4(&self) -> &LorentzVector {
        &self.p4
    }
}

impl Candidate for Muon {
    fn p4(&self) -> &LorentzVector {
        &self.p4
    }
}

impl Candidate for Jet {
    fn p4(&self) -> &LorentzVector {
        &self.p4
    }
}

impl Candidate for GenParticle {
    fn p4(&self) -> &LorentzVector {
        &self.p4
    }
}

/// Objects that can carry MET-relative variables
pub trait MetAugmentable: Candidate {
    fn set_met_vars(&mut self, vars: MetVariables);
}

impl MetAugmentable for Electron {
    fn set_met_vars(&mut self, vars: MetVariables) {
        self.met_vars = Some(vars);
    }
}

impl MetAugmentable for Muon {
    fn set_met_vars(&mut self, vars: MetVariables) {
        self.met_vars = Some(vars);
    }
}

impl MetAugmentable for Jet {
    fn set_met_vars(&mut self, vars: MetVariables) {
        self.met_vars = Some(vars);
    }
}
