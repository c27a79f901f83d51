//! Output representations of the physics objects, one total, side-effect-free
//! mapping function per family. MET-relative variables read as 0 on objects
//! that were never augmented.

use serde::Serialize;

use crate::physics::{Electron, GenParticle, Jet, LorentzVector, Met, MetVariables, Muon};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElectronRecord {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub charge: i32,
    pub rel_iso: f64,
    pub is_veto: bool,
    pub is_loose: bool,
    pub is_medium: bool,
    pub is_tight: bool,
    pub d_phi_met: f64,
    pub mt_met: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MuonRecord {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub charge: i32,
    pub rel_iso: f64,
    pub is_loose: bool,
    pub is_medium: bool,
    pub is_tight: bool,
    pub d_phi_met: f64,
    pub mt_met: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JetRecord {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub csv: f64,
    pub cmva: f64,
    pub is_loose: bool,
    pub is_tight: bool,
    pub hadron_flavour: i32,
    pub parton_flavour: i32,
    pub d_phi_met: f64,
    pub mt_met: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetRecord {
    pub pt: f64,
    pub phi: f64,
    pub px: f64,
    pub py: f64,
    pub sum_et: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenParticleRecord {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub pdg_id: i32,
    pub status: i32,
}

fn kinematics(p4: &LorentzVector) -> (f64, f64, f64, f64) {
    (p4.pt, p4.eta, p4.phi, p4.mass)
}

pub fn electron_record(electron: &Electron) -> ElectronRecord {
    let (pt, eta, phi, mass) = kinematics(&electron.p4);
    let met_vars = electron.met_vars.unwrap_or_default();
    ElectronRecord {
        pt,
        eta,
        phi,
        mass,
        charge: electron.charge,
        rel_iso: electron.rel_iso,
        is_veto: electron.is_veto,
        is_loose: electron.is_loose,
        is_medium: electron.is_medium,
        is_tight: electron.is_tight,
        d_phi_met: met_vars.d_phi_met,
        mt_met: met_vars.mt_met,
    }
}

pub fn muon_record(muon: &Muon) -> MuonRecord {
    let (pt, eta, phi, mass) = kinematics(&muon.p4);
    let met_vars = muon.met_vars.unwrap_or_default();
    MuonRecord {
        pt,
        eta,
        phi,
        mass,
        charge: muon.charge,
        rel_iso: muon.rel_iso,
        is_loose: muon.is_loose,
        is_medium: muon.is_medium,
        is_tight: muon.is_tight,
        d_phi_met: met_vars.d_phi_met,
        mt_met: met_vars.mt_met,
    }
}

pub fn jet_record(jet: &Jet) -> JetRecord {
    let (pt, eta, phi, mass) = kinematics(&jet.p4);
    let MetVariables { d_phi_met, mt_met } = jet.met_vars.unwrap_or_default();
    JetRecord {
        pt,
        eta,
        phi,
        mass,
        csv: jet.csv,
        cmva: jet.cmva,
        is_loose: jet.is_loose,
        is_tight: jet.is_tight,
        hadron_flavour: jet.hadron_flavour,
        parton_flavour: jet.parton_flavour,
        d_phi_met,
        mt_met,
    }
}

pub fn met_record(met: &Met) -> MetRecord {
    MetRecord {
        pt: met.pt,
        phi: met.phi,
        px: met.px(),
        py: met.py(),
        sum_et: met.sum_et,
    }
}

pub fn gen_particle_record(particle: &GenParticle) -> GenParticleRecord {
    let (pt, eta, phi, mass) = kinematics(&particle.p4);
    GenParticleRecord {
        pt,
        eta,
        phi,
        mass,
        pdg_id: particle.pdg_id,
        status: particle.status,
    }
}
