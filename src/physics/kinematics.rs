use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Four-momentum in collider coordinates (pt, eta, phi, mass)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LorentzVector {
    /// Transverse momentum in GeV
    pub pt: f64,
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuthal angle in radians
    pub phi: f64,
    /// Invariant mass in GeV
    #[serde(default)]
    pub mass: f64,
}

impl LorentzVector {
    pub fn new(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self { pt, eta, phi, mass }
    }

    pub fn delta_r(&self, other: &LorentzVector) -> f64 {
        delta_r(self.eta, self.phi, other.eta, other.phi)
    }
}

/// Azimuthal difference wrapped into [-pi, pi). Non-finite input gives NaN.
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    (phi1 - phi2 + PI).rem_euclid(2.0 * PI) - PI
}

/// Angular distance in the eta-phi plane
pub fn delta_r(eta1: f64, phi1: f64, eta2: f64, phi2: f64) -> f64 {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    (deta * deta + dphi * dphi).sqrt()
}

/// Transverse mass of an object paired with missing transverse energy
pub fn transverse_mass(pt: f64, met: f64, dphi: f64) -> f64 {
    (2.0 * pt * met * (1.0 - dphi.cos())).max(0.0).sqrt()
}

/// Anything that carries a four-momentum.
pub trait Candidate {
    fn p4(&self) -> &LorentzVector;

    fn pt(&self) -> f64 {
        self.p4().pt
    }

    fn eta(&self) -> f64 {
        self.p4().eta
    }

    fn phi(&self) -> f64 {
        self.p4().phi
    }
}

impl Candidate for LorentzVector {
    fn p4(&self) -> &LorentzVector {
        self
    }
}
