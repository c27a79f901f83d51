use std::collections::BTreeSet;

use super::Acceptance;
use crate::config::{JetConfig, JetId};
use crate::error::Result;
use crate::event::{Event, Token};
use crate::physics::{Jet, Met};

/// Jets and missing transverse energy
#[derive(Debug, Clone)]
pub struct JetProvider {
    jets: Token<Vec<Jet>>,
    met: Token<Met>,
    acceptance: Acceptance,
    id: JetId,
    btag_medium_wp: f64,
}

impl JetProvider {
    pub fn new(config: &JetConfig, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        Ok(Self {
            jets: Token::resolve(&config.collection, catalog)?,
            met: Token::resolve(&config.met, catalog)?,
            acceptance: Acceptance::new(config.pt_min, config.abs_eta_max),
            id: config.id,
            btag_medium_wp: config.btag_medium_wp,
        })
    }

    pub fn jets(&self, event: &Event) -> Result<Vec<Jet>> {
        let jets = event.get(&self.jets)?;
        Ok(jets
            .iter()
            .filter(|j| self.acceptance.accepts(*j) && passes_id(j, self.id))
            .cloned()
            .collect())
    }

    pub fn met(&self, event: &Event) -> Result<Met> {
        event.get(&self.met).copied()
    }

    /// Number of jets above the medium CSV working point
    pub fn n_btag_jets(&self, jets: &[Jet]) -> usize {
        jets.iter().filter(|j| j.csv > self.btag_medium_wp).count()
    }
}

fn passes_id(jet: &Jet, id: JetId) -> bool {
    match id {
        JetId::None => true,
        JetId::Loose => jet.is_loose,
        JetId::Tight => jet.is_tight,
    }
}
