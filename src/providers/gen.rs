use std::collections::{BTreeMap, BTreeSet};

use crate::config::GenConfig;
use crate::constants::{is_parton, PDG_BOTTOM};
use crate::error::Result;
use crate::event::{Event, Token};
use crate::physics::{GenEventInfo, GenParticle, LheEvent};

/// Generator weights, hard-process quantities and generator particles.
///
/// Real data carries no generator information: every accessor returns an
/// empty result for it instead of failing.
#[derive(Debug, Clone)]
pub struct GenProvider {
    gen_info: Token<GenEventInfo>,
    lhe: Token<LheEvent>,
    particles: Token<Vec<GenParticle>>,
}

impl GenProvider {
    pub fn new(config: &GenConfig, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        Ok(Self {
            gen_info: Token::resolve(&config.gen_info, catalog)?,
            lhe: Token::resolve(&config.lhe, catalog)?,
            particles: Token::resolve(&config.particles, catalog)?,
        })
    }

    /// Weight id to weight value; id -1 is the nominal weight
    pub fn lhe_weights(&self, event: &Event) -> Result<BTreeMap<i32, f64>> {
        if !event.is_simulated {
            return Ok(BTreeMap::new());
        }
        let info = event.get(&self.gen_info)?;
        Ok(info.weights.iter().map(|w| (w.id, w.value)).collect())
    }

    /// Named hard-process scalars computed from outgoing LHE partons. Samples
    /// produced without an LHE step simply have none.
    pub fn lhe_map(&self, event: &Event) -> Result<BTreeMap<String, f64>> {
        let mut map = BTreeMap::new();
        if !event.is_simulated {
            return Ok(map);
        }
        let Some(lhe) = event.try_get(&self.lhe)? else {
            return Ok(map);
        };

        let outgoing: Vec<_> = lhe
            .particles
            .iter()
            .filter(|p| p.status == 1 && is_parton(p.pdg_id))
            .collect();
        let ht: f64 = outgoing.iter().map(|p| p.p4.pt).sum();
        let n_b = outgoing
            .iter()
            .filter(|p| p.pdg_id.abs() == PDG_BOTTOM)
            .count();

        map.insert("lhe_HT".to_string(), ht);
        map.insert("lhe_Njets".to_string(), outgoing.len() as f64);
        map.insert("lhe_Nb".to_string(), n_b as f64);
        Ok(map)
    }

    pub fn gen_particles(&self, event: &Event) -> Result<Vec<GenParticle>> {
        if !event.is_simulated {
            return Ok(Vec::new());
        }
        Ok(event.get(&self.particles)?.clone())
    }
}

/// True when no daughter is a copy of the particle itself
fn is_last_copy(particles: &[GenParticle], index: usize) -> bool {
    let pdg = particles[index].pdg_id;
    !particles[index]
        .daughters
        .iter()
        .filter_map(|&d| particles.get(d))
        .any(|d| d.pdg_id == pdg)
}

/// Follow same-species daughter links down to the last copy
fn last_copy(particles: &[GenParticle], mut index: usize) -> usize {
    // Bounded by the collection size so malformed cyclic links cannot hang
    for _ in 0..particles.len() {
        let pdg = particles[index].pdg_id;
        let next = particles[index]
            .daughters
            .iter()
            .copied()
            .find(|&d| particles.get(d).is_some_and(|p| p.pdg_id == pdg));
        match next {
            Some(d) => index = d,
            None => break,
        }
    }
    index
}

/// Last-copy particles whose PDG id is in `mother_ids`, and the partons they
/// decay to (each followed to its last copy). Returns `(mothers, partons)`.
pub fn partons_from_decays(
    particles: &[GenParticle],
    mother_ids: &[i32],
) -> (Vec<GenParticle>, Vec<GenParticle>) {
    let mut mothers = Vec::new();
    let mut partons = Vec::new();

    for (i, p) in particles.iter().enumerate() {
        if !mother_ids.contains(&p.pdg_id) || !is_last_copy(particles, i) {
            continue;
        }
        mothers.push(p.clone());
        for &d in &p.daughters {
            let Some(daughter) = particles.get(d) else {
                continue;
            };
            if is_parton(daughter.pdg_id) {
                partons.push(particles[last_copy(particles, d)].clone());
            }
        }
    }

    (mothers, partons)
}

/// First `n` particles (in collection order) with a PDG id in `pdg_ids` whose
/// mother is a different species, i.e. the first copy of each particle in its
/// chain. With `mother_pdg` set, the mother must also have that PDG id.
pub fn first_n_with_distinct_mother(
    particles: &[GenParticle],
    pdg_ids: &[i32],
    n: usize,
    mother_pdg: Option<i32>,
) -> Vec<GenParticle> {
    particles
        .iter()
        .filter(|p| pdg_ids.contains(&p.pdg_id))
        .filter(|p| {
            let mother = p.mothers.first().and_then(|&m| particles.get(m));
            match (mother, mother_pdg) {
                (Some(m), Some(required)) => m.pdg_id != p.pdg_id && m.pdg_id == required,
                (Some(m), None) => m.pdg_id != p.pdg_id,
                (None, Some(_)) => false,
                (None, None) => true,
            }
        })
        .take(n)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventId, Product};
    use crate::physics::{LheParticle, LheWeight, LorentzVector};

    fn gp(pdg_id: i32, pt: f64, mothers: Vec<usize>, daughters: Vec<usize>) -> GenParticle {
        GenParticle {
            pdg_id,
            status: 22,
            p4: LorentzVector::new(pt, 0.0, 0.0, 0.0),
            mothers,
            daughters,
        }
    }

    /// g g -> H1 H2, each H copied once, then H -> b b~ with one b copied
    fn hh_to_4b() -> Vec<GenParticle> {
        vec![
            gp(21, 0.0, vec![], vec![2, 3]),      // 0 gluon
            gp(21, 0.0, vec![], vec![2, 3]),      // 1 gluon
            gp(25, 100.0, vec![0, 1], vec![4]),   // 2 H1 first copy
            gp(25, 90.0, vec![0, 1], vec![5]),    // 3 H2 first copy
            gp(25, 101.0, vec![2], vec![6, 7]),   // 4 H1 last copy
            gp(25, 91.0, vec![3], vec![8, 9]),    // 5 H2 last copy
            gp(5, 60.0, vec![4], vec![10]),       // 6 b from H1
            gp(-5, 40.0, vec![4], vec![]),        // 7 b~ from H1
            gp(5, 50.0, vec![5], vec![]),         // 8 b from H2
            gp(-5, 30.0, vec![5], vec![]),        // 9 b~ from H2
            gp(5, 58.0, vec![6], vec![]),         // 10 copy of 6
        ]
    }

    fn pts(v: &[GenParticle]) -> Vec<f64> {
        v.iter().map(|p| p.p4.pt).collect()
    }

    #[test]
    fn test_partons_from_higgs_decays() {
        let particles = hh_to_4b();
        let (higgs, partons) = partons_from_decays(&particles, &[25]);
        assert_eq!(pts(&higgs), vec![101.0, 91.0]);
        // b from H1 followed to its last copy
        assert_eq!(pts(&partons), vec![58.0, 40.0, 50.0, 30.0]);
    }

    #[test]
    fn test_first_higgs_copies() {
        let particles = hh_to_4b();
        let tl_higgs = first_n_with_distinct_mother(&particles, &[25], 2, None);
        assert_eq!(pts(&tl_higgs), vec![100.0, 90.0]);
    }

    #[test]
    fn test_first_b_quarks_from_higgs() {
        let particles = hh_to_4b();
        let tl_b = first_n_with_distinct_mother(&particles, &[5, -5], 4, Some(25));
        // the b copy (index 10) has a b mother and is skipped
        assert_eq!(pts(&tl_b), vec![60.0, 40.0, 50.0, 30.0]);

        let only_two = first_n_with_distinct_mother(&particles, &[5, -5], 2, Some(25));
        assert_eq!(only_two.len(), 2);
    }

    #[test]
    fn test_queries_tolerate_empty_input() {
        let (m, p) = partons_from_decays(&[], &[25]);
        assert!(m.is_empty() && p.is_empty());
        assert!(first_n_with_distinct_mother(&[], &[25], 2, None).is_empty());
    }

    #[test]
    fn test_cyclic_links_terminate() {
        let particles = vec![gp(5, 1.0, vec![1], vec![1]), gp(5, 2.0, vec![0], vec![0])];
        let idx = last_copy(&particles, 0);
        assert!(idx < particles.len());
    }

    #[test]
    fn test_lhe_weights_and_scalars() {
        let provider = GenProvider::new(&GenConfig::default(), None).unwrap();
        let lhe = LheEvent {
            particles: vec![
                LheParticle { pdg_id: 21, status: -1, p4: LorentzVector::default() },
                LheParticle { pdg_id: 5, status: 1, p4: LorentzVector::new(40.0, 0.0, 0.0, 0.0) },
                LheParticle { pdg_id: 21, status: 1, p4: LorentzVector::new(20.0, 0.0, 0.0, 0.0) },
                LheParticle { pdg_id: 25, status: 2, p4: LorentzVector::new(80.0, 0.0, 0.0, 0.0) },
            ],
        };
        let event = Event::new(EventId::new(1, 1, 1), true)
            .with_product(
                "generator",
                Product::GenInfo(GenEventInfo {
                    weights: vec![LheWeight { id: 0, value: 1.0 }, LheWeight { id: -1, value: 1.05 }],
                }),
            )
            .with_product("externalLHEProducer", Product::Lhe(lhe));

        let weights = provider.lhe_weights(&event).unwrap();
        assert_eq!(weights.keys().copied().collect::<Vec<_>>(), vec![-1, 0]);

        let lhe_map = provider.lhe_map(&event).unwrap();
        assert_eq!(lhe_map["lhe_HT"], 60.0);
        assert_eq!(lhe_map["lhe_Njets"], 2.0);
        assert_eq!(lhe_map["lhe_Nb"], 1.0);
    }

    #[test]
    fn test_real_data_has_no_generator_content() {
        let provider = GenProvider::new(&GenConfig::default(), None).unwrap();
        let event = Event::new(EventId::new(1, 1, 1), false);
        assert!(provider.lhe_weights(&event).unwrap().is_empty());
        assert!(provider.lhe_map(&event).unwrap().is_empty());
        assert!(provider.gen_particles(&event).unwrap().is_empty());
    }

    #[test]
    fn test_simulation_without_lhe_step() {
        let provider = GenProvider::new(&GenConfig::default(), None).unwrap();
        let event = Event::new(EventId::new(1, 1, 1), true);
        assert!(provider.lhe_map(&event).unwrap().is_empty());
        assert!(provider.gen_particles(&event).unwrap_err().is_event_fatal());
    }
}
