//! Shared names and numbers used across providers, the pipeline and the output
//! layout, kept in one place so the weight table and histogram book agree.

// Default product labels
pub const DEFAULT_ELECTRONS: &str = "slimmedElectrons";
pub const DEFAULT_MUONS: &str = "slimmedMuons";
pub const DEFAULT_JETS: &str = "slimmedJets";
pub const DEFAULT_MET: &str = "slimmedMETs";
pub const DEFAULT_VERTICES: &str = "offlineSlimmedPrimaryVertices";
pub const DEFAULT_PILEUP: &str = "slimmedAddPileupInfo";
pub const DEFAULT_TRIGGER_RESULTS: &str = "TriggerResults";
pub const DEFAULT_GEN_INFO: &str = "generator";
pub const DEFAULT_LHE: &str = "externalLHEProducer";
pub const DEFAULT_GEN_PARTICLES: &str = "prunedGenParticles";

// Fixed weight-table names, in output order
pub const EVENT_WEIGHT: &str = "EventWeight";
pub const PU_WEIGHT: &str = "PUWeight";
pub const PU_WEIGHT_UP: &str = "PUWeightUp";
pub const PU_WEIGHT_DOWN: &str = "PUWeightDown";
pub const TRIGGER_WEIGHT: &str = "TriggerWeight";
pub const LEPTON_WEIGHT: &str = "LeptonWeight";
pub const LEPTON_WEIGHT_UP: &str = "LeptonWeightUp";
pub const LEPTON_WEIGHT_DOWN: &str = "LeptonWeightDown";
pub const LHE_WEIGHT_PREFIX: &str = "lhe_weight_";

/// Generator weight id holding the nominal weight
pub const NOMINAL_GEN_WEIGHT_ID: i32 = -1;

// PDG ids
pub const PDG_BOTTOM: i32 = 5;
pub const PDG_GLUON: i32 = 21;
pub const PDG_HIGGS: i32 = 25;

/// Angular distance below which a jet overlapping a lepton is removed
pub const DEFAULT_CLEANING_DELTA_R: f64 = 0.4;
/// Medium working point of the CSV discriminant
pub const DEFAULT_BTAG_MEDIUM_WP: f64 = 0.8;

// Histogram names filled by the pipeline when booked
pub const HIST_N_EVENTS: &str = "a_nEvents";
pub const HIST_NPV_NO_WEIGHT: &str = "a_nPVNoWeight";
pub const HIST_NPV_REWEIGHT: &str = "a_nPVReWeight";
pub const HIST_N_ELECTRONS: &str = "a_nElectrons";
pub const HIST_N_MUONS: &str = "a_nMuons";
pub const HIST_N_JETS: &str = "j_nJets";
pub const HIST_N_BTAG_JETS: &str = "j_nBTagJets";
pub const HIST_LHE_HT: &str = "g_lheHT";
pub const HIST_LHE_NJETS: &str = "g_lheNj";

/// Cut-flow bin labels of the event-count histogram
pub const N_EVENTS_LABELS: [&str; 10] = [
    "All (jets in Acc)",
    "Trigger",
    "# jets >4",
    "# med b-tag >0",
    "# med b-tag >1",
    "# med b-tag >2",
    "# med b-tag >4",
    "",
    "",
    "",
];

/// True for quarks (d..b) and gluons
pub fn is_parton(pdg_id: i32) -> bool {
    let apdg = pdg_id.abs();
    (1..=5).contains(&apdg) || apdg == PDG_GLUON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_parton() {
        assert!(is_parton(5));
        assert!(is_parton(-5));
        assert!(is_parton(21));
        assert!(!is_parton(6));
        assert!(!is_parton(25));
        assert!(!is_parton(11));
    }
}
