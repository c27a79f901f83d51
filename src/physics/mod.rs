//! Physics objects and kinematic helpers shared by every pipeline stage.

pub mod kinematics;
pub mod objects;

pub use kinematics::{delta_phi, delta_r, transverse_mass, Candidate, LorentzVector};
pub use objects::{
    Electron, GenEventInfo, GenParticle, Jet, LheEvent, LheParticle, LheWeight, Met,
    MetAugmentable, MetVariables, Muon, PileupSummary, TriggerBit, Vertex,
};
