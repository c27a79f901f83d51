use serde::Serialize;
use sha2::{Digest, Sha256};

use super::convert::{ElectronRecord, GenParticleRecord, JetRecord, MetRecord, MuonRecord};
use super::sorting::JetSortPermutations;
use super::weights::WeightTable;
use crate::event::EventId;

/// Pass/fail of one configured trigger path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEntry {
    pub name: String,
    pub passed: bool,
}

/// Event identity plus the per-event filter and weight tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventInfo {
    #[serde(flatten)]
    pub id: EventId,
    pub is_mc: bool,
    pub filters: Vec<FilterEntry>,
    pub weights: WeightTable,
}

/// Immutable per-event result handed to the record sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub event_info: EventInfo,
    pub electrons: Vec<ElectronRecord>,
    pub muons: Vec<MuonRecord>,
    pub jets: Vec<JetRecord>,
    pub met: MetRecord,
    pub gen_b_from_hs: Vec<GenParticleRecord>,
    pub gen_hs: Vec<GenParticleRecord>,
    pub tl_gen_b_from_hs: Vec<GenParticleRecord>,
    pub tl_gen_hs: Vec<GenParticleRecord>,
    pub sort: JetSortPermutations,
}

/// Named output fields, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    EventInfo,
    Electrons,
    Muons,
    Jets,
    Met,
    GenBFromHs,
    GenHs,
    TlGenBFromHs,
    TlGenHs,
    JetSortPt,
    JetSortCsv,
    JetSortCmva,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::EventInfo,
        Branch::Electrons,
        Branch::Muons,
        Branch::Jets,
        Branch::Met,
        Branch::GenBFromHs,
        Branch::GenHs,
        Branch::TlGenBFromHs,
        Branch::TlGenHs,
        Branch::JetSortPt,
        Branch::JetSortCsv,
        Branch::JetSortCmva,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Branch::EventInfo => "EventInfo",
            Branch::Electrons => "Electrons",
            Branch::Muons => "Muons",
            Branch::Jets => "Jets",
            Branch::Met => "MET",
            Branch::GenBFromHs => "GenBFromHs",
            Branch::GenHs => "GenHs",
            Branch::TlGenBFromHs => "TL_GenBFromHs",
            Branch::TlGenHs => "TL_GenHs",
            Branch::JetSortPt => "j_sort_pt",
            Branch::JetSortCsv => "j_sort_csv",
            Branch::JetSortCmva => "j_sort_cmva",
        }
    }
}

impl OutputRecord {
    pub fn id(&self) -> EventId {
        self.event_info.id
    }

    /// JSON value of one output field
    pub fn branch_value(&self, branch: Branch) -> serde_json::Result<serde_json::Value> {
        match branch {
            Branch::EventInfo => serde_json::to_value(&self.event_info),
            Branch::Electrons => serde_json::to_value(&self.electrons),
            Branch::Muons => serde_json::to_value(&self.muons),
            Branch::Jets => serde_json::to_value(&self.jets),
            Branch::Met => serde_json::to_value(self.met),
            Branch::GenBFromHs => serde_json::to_value(&self.gen_b_from_hs),
            Branch::GenHs => serde_json::to_value(&self.gen_hs),
            Branch::TlGenBFromHs => serde_json::to_value(&self.tl_gen_b_from_hs),
            Branch::TlGenHs => serde_json::to_value(&self.tl_gen_hs),
            Branch::JetSortPt => serde_json::to_value(&self.sort.by_pt),
            Branch::JetSortCsv => serde_json::to_value(&self.sort.by_csv),
            Branch::JetSortCmva => serde_json::to_value(&self.sort.by_cmva),
        }
    }

    /// SHA-256 over every field in storage order
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let mut hasher = Sha256::new();
        for branch in Branch::ALL {
            hasher.update(branch.name().as_bytes());
            hasher.update(serde_json::to_vec(&self.branch_value(branch)?)?);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}
