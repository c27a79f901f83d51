//! Object providers, one per object family.
//!
//! Each provider resolves its product tokens once at job start and then acts
//! as a pure function of the event: it reads the labelled products, applies
//! its own basic acceptance, and returns the family's collection together with
//! any family-specific derived quantities.

pub mod electron;
pub mod gen;
pub mod jet;
pub mod muon;
pub mod pileup;
pub mod trigger;

pub use electron::ElectronProvider;
pub use gen::GenProvider;
pub use jet::JetProvider;
pub use muon::MuonProvider;
pub use pileup::{PileupProvider, PileupWeights};
pub use trigger::TriggerProvider;

use std::collections::BTreeSet;

use crate::config::Config;
use crate::error::Result;
use crate::physics::Candidate;

/// Basic kinematic acceptance shared by the reconstructed-object providers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceptance {
    pub pt_min: f64,
    pub abs_eta_max: f64,
}

impl Acceptance {
    pub fn new(pt_min: f64, abs_eta_max: f64) -> Self {
        Self {
            pt_min,
            abs_eta_max,
        }
    }

    pub fn accepts<C: Candidate>(&self, candidate: &C) -> bool {
        candidate.pt() >= self.pt_min && candidate.eta().abs() <= self.abs_eta_max
    }
}

/// All providers for one job, acquired together at startup
#[derive(Debug, Clone)]
pub struct Providers {
    pub pileup: PileupProvider,
    pub trigger: TriggerProvider,
    pub electron: ElectronProvider,
    pub muon: MuonProvider,
    pub jet: JetProvider,
    pub gen: GenProvider,
}

impl Providers {
    /// Build every provider, resolving all product tokens against the source catalog.
    pub fn from_config(config: &Config, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        Ok(Self {
            pileup: PileupProvider::new(&config.pileup, catalog)?,
            trigger: TriggerProvider::new(&config.trigger, catalog)?,
            electron: ElectronProvider::new(&config.electron, catalog)?,
            muon: MuonProvider::new(&config.muon, catalog)?,
            jet: JetProvider::new(&config.jet, catalog)?,
            gen: GenProvider::new(&config.gen, catalog)?,
        })
    }
}
