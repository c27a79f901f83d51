use crate::physics::{Candidate, Jet};

/// Remove every jet lying closer than `delta_r` to any of the given leptons.
///
/// Retained jets keep their relative order, so applying the veto against
/// several lepton families in sequence gives the same result in any order.
pub fn clean_jets<L: Candidate>(jets: Vec<Jet>, leptons: &[L], delta_r: f64) -> Vec<Jet> {
    if leptons.is_empty() {
        return jets;
    }
    jets.into_iter()
        .filter(|jet| {
            leptons
                .iter()
                .all(|lepton| jet.p4.delta_r(lepton.p4()) >= delta_r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Electron, LorentzVector, Muon};

    fn jet(pt: f64, eta: f64, phi: f64) -> Jet {
        Jet {
            p4: LorentzVector::new(pt, eta, phi, 0.0),
            ..Default::default()
        }
    }

    fn muon(eta: f64, phi: f64) -> Muon {
        Muon {
            p4: LorentzVector::new(20.0, eta, phi, 0.0),
            ..Default::default()
        }
    }

    fn electron(eta: f64, phi: f64) -> Electron {
        Electron {
            p4: LorentzVector::new(20.0, eta, phi, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_removes_overlapping_jets() {
        let jets = vec![jet(50.0, 0.0, 0.0), jet(40.0, 1.0, 1.0), jet(30.0, -1.0, 2.0)];
        let muons = vec![muon(0.1, 0.1)];

        let cleaned = clean_jets(jets, &muons, 0.4);
        let pts: Vec<f64> = cleaned.iter().map(|j| j.p4.pt).collect();
        assert_eq!(pts, vec![40.0, 30.0]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly at the threshold the jet survives
        let jets = vec![jet(50.0, 0.0, 0.0)];
        let muons = vec![muon(0.4, 0.0)];
        assert_eq!(clean_jets(jets, &muons, 0.4).len(), 1);
    }

    #[test]
    fn test_phi_wraparound_counts_as_overlap() {
        let jets = vec![jet(50.0, 0.0, 3.1)];
        let muons = vec![muon(0.0, -3.1)];
        assert!(clean_jets(jets, &muons, 0.4).is_empty());
    }

    #[test]
    fn test_order_of_passes_does_not_matter() {
        let jets = vec![
            jet(50.0, 0.0, 0.0),
            jet(45.0, 1.0, 1.0),
            jet(40.0, -1.5, -2.0),
            jet(35.0, 2.0, 3.0),
        ];
        let muons = vec![muon(0.05, 0.0)];
        let electrons = vec![electron(-1.5, -2.1), electron(2.0, -3.0)];

        let a = clean_jets(clean_jets(jets.clone(), &muons, 0.4), &electrons, 0.4);
        let b = clean_jets(clean_jets(jets, &electrons, 0.4), &muons, 0.4);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].p4.pt, 45.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(clean_jets(Vec::new(), &[muon(0.0, 0.0)], 0.4).is_empty());
        let jets = vec![jet(50.0, 0.0, 0.0)];
        assert_eq!(clean_jets(jets, &Vec::<Muon>::new(), 0.4).len(), 1);
    }
}
