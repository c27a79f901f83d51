use std::collections::BTreeSet;

use super::Acceptance;
use crate::config::{ElectronConfig, ElectronId};
use crate::error::Result;
use crate::event::{Event, Token};
use crate::physics::Electron;

#[derive(Debug, Clone)]
pub struct ElectronProvider {
    electrons: Token<Vec<Electron>>,
    acceptance: Acceptance,
    id: ElectronId,
}

impl ElectronProvider {
    pub fn new(config: &ElectronConfig, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        Ok(Self {
            electrons: Token::resolve(&config.collection, catalog)?,
            acceptance: Acceptance::new(config.pt_min, config.abs_eta_max),
            id: config.id,
        })
    }

    /// Electrons passing acceptance and the configured id, in retrieval order
    pub fn electrons(&self, event: &Event) -> Result<Vec<Electron>> {
        let electrons = event.get(&self.electrons)?;
        Ok(electrons
            .iter()
            .filter(|e| self.acceptance.accepts(*e) && passes_id(e, self.id))
            .cloned()
            .collect())
    }

    pub fn veto_count(electrons: &[Electron]) -> usize {
        electrons.iter().filter(|e| e.is_veto).count()
    }
}

fn passes_id(electron: &Electron, id: ElectronId) -> bool {
    match id {
        ElectronId::None => true,
        ElectronId::Veto => electron.is_veto,
        ElectronId::Loose => electron.is_loose,
        ElectronId::Medium => electron.is_medium,
        ElectronId::Tight => electron.is_tight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventId, Product};
    use crate::physics::LorentzVector;

    fn electron(pt: f64, eta: f64, veto: bool, tight: bool) -> Electron {
        Electron {
            p4: LorentzVector::new(pt, eta, 0.0, 0.0),
            is_veto: veto,
            is_tight: tight,
            ..Default::default()
        }
    }

    #[test]
    fn test_filters_by_acceptance_and_id() {
        let config = ElectronConfig::default();
        let provider = ElectronProvider::new(&config, None).unwrap();
        let event = Event::new(EventId::new(1, 1, 1), true).with_product(
            "slimmedElectrons",
            Product::Electrons(vec![
                electron(30.0, 0.5, true, true),
                electron(5.0, 0.5, true, true),
                electron(30.0, 2.7, true, true),
                electron(30.0, -1.0, false, false),
                electron(15.0, 1.0, true, false),
            ]),
        );

        let accepted = provider.electrons(&event).unwrap();
        let pts: Vec<f64> = accepted.iter().map(|e| e.p4.pt).collect();
        assert_eq!(pts, vec![30.0, 15.0]);
    }

    #[test]
    fn test_tight_id() {
        let config = ElectronConfig {
            id: ElectronId::Tight,
            ..Default::default()
        };
        let provider = ElectronProvider::new(&config, None).unwrap();
        let event = Event::new(EventId::new(1, 1, 1), true).with_product(
            "slimmedElectrons",
            Product::Electrons(vec![
                electron(30.0, 0.5, true, true),
                electron(30.0, 0.5, true, false),
            ]),
        );
        assert_eq!(provider.electrons(&event).unwrap().len(), 1);
    }

    #[test]
    fn test_veto_count() {
        let electrons = vec![
            electron(30.0, 0.0, true, false),
            electron(30.0, 0.0, false, false),
            electron(30.0, 0.0, true, true),
        ];
        assert_eq!(ElectronProvider::veto_count(&electrons), 2);
    }
}
