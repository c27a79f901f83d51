use std::collections::BTreeSet;

use super::Acceptance;
use crate::config::{MuonConfig, MuonId};
use crate::error::Result;
use crate::event::{Event, Token};
use crate::physics::Muon;

#[derive(Debug, Clone)]
pub struct MuonProvider {
    muons: Token<Vec<Muon>>,
    acceptance: Acceptance,
    id: MuonId,
}

impl MuonProvider {
    pub fn new(config: &MuonConfig, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        Ok(Self {
            muons: Token::resolve(&config.collection, catalog)?,
            acceptance: Acceptance::new(config.pt_min, config.abs_eta_max),
            id: config.id,
        })
    }

    pub fn muons(&self, event: &Event) -> Result<Vec<Muon>> {
        let muons = event.get(&self.muons)?;
        Ok(muons
            .iter()
            .filter(|m| self.acceptance.accepts(*m) && passes_id(m, self.id))
            .cloned()
            .collect())
    }

    pub fn loose_count(muons: &[Muon]) -> usize {
        muons.iter().filter(|m| m.is_loose).count()
    }
}

fn passes_id(muon: &Muon, id: MuonId) -> bool {
    match id {
        MuonId::None => true,
        MuonId::Loose => muon.is_loose,
        MuonId::Medium => muon.is_medium,
        MuonId::Tight => muon.is_tight,
    }
}
