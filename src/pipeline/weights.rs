use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::constants::{
    EVENT_WEIGHT, LEPTON_WEIGHT, LEPTON_WEIGHT_DOWN, LEPTON_WEIGHT_UP, LHE_WEIGHT_PREFIX,
    NOMINAL_GEN_WEIGHT_ID, PU_WEIGHT, PU_WEIGHT_DOWN, PU_WEIGHT_UP, TRIGGER_WEIGHT,
};
use crate::error::{AnalyzerError, Result};
use crate::providers::PileupWeights;

/// One named weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightEntry {
    pub name: String,
    pub value: f64,
}

/// Named weights in insertion order; names are unique
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) -> Result<()> {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(AnalyzerError::DuplicateWeight(name));
        }
        self.entries.push(WeightEntry { name, value });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name of the table entry for one generator weight id
pub fn lhe_weight_name(id: i32) -> String {
    format!("{}{}", LHE_WEIGHT_PREFIX, id)
}

/// Per-event weight factors and the running event weight.
///
/// Starts neutral; factors are folded into `event_weight` in the order
/// pileup, trigger, generator. Lepton factors are carried but never folded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventWeights {
    pub event_weight: f64,
    pub pileup: PileupWeights,
    pub trigger: f64,
    pub generator: f64,
    pub lepton: f64,
    pub lepton_up: f64,
    pub lepton_down: f64,
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            event_weight: 1.0,
            pileup: PileupWeights::NEUTRAL,
            trigger: 1.0,
            generator: 1.0,
            lepton: 1.0,
            lepton_up: 1.0,
            lepton_down: 1.0,
        }
    }
}

impl EventWeights {
    pub fn fold_pileup(&mut self, pileup: PileupWeights) {
        self.pileup = pileup;
        self.event_weight *= pileup.nominal;
    }

    pub fn fold_trigger(&mut self, trigger: f64) {
        self.trigger = trigger;
        self.event_weight *= trigger;
    }

    /// Fold the nominal generator weight (id -1). An absent nominal weight
    /// leaves the event weight unchanged.
    pub fn fold_generator(&mut self, lhe_weights: &BTreeMap<i32, f64>) {
        let nominal = lhe_weights
            .get(&NOMINAL_GEN_WEIGHT_ID)
            .copied()
            .unwrap_or(1.0);
        self.generator = nominal;
        self.event_weight *= nominal;
    }

    /// Build the output weight table: the fixed components in their declared
    /// order, then one entry per generator weight id in ascending id order.
    pub fn weight_table(&self, lhe_weights: &BTreeMap<i32, f64>) -> Result<WeightTable> {
        let mut table = WeightTable::new();
        table.push(EVENT_WEIGHT, self.event_weight)?;
        table.push(PU_WEIGHT, self.pileup.nominal)?;
        table.push(PU_WEIGHT_UP, self.pileup.up)?;
        table.push(PU_WEIGHT_DOWN, self.pileup.down)?;
        table.push(TRIGGER_WEIGHT, self.trigger)?;
        table.push(LEPTON_WEIGHT, self.lepton)?;
        table.push(LEPTON_WEIGHT_UP, self.lepton_up)?;
        table.push(LEPTON_WEIGHT_DOWN, self.lepton_down)?;
        for (id, value) in lhe_weights {
            table.push(lhe_weight_name(*id), *value)?;
        }
        Ok(table)
    }
}
