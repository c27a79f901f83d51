use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

use super::augment::add_met_variables;
use super::cleaning::clean_jets;
use super::convert::{
    electron_record, gen_particle_record, jet_record, met_record, muon_record, GenParticleRecord,
};
use super::record::{EventInfo, FilterEntry, OutputRecord};
use super::sorting::JetSortPermutations;
use super::weights::EventWeights;
use crate::constants::{
    HIST_LHE_HT, HIST_LHE_NJETS, HIST_NPV_NO_WEIGHT, HIST_NPV_REWEIGHT, HIST_N_BTAG_JETS,
    HIST_N_ELECTRONS, HIST_N_EVENTS, HIST_N_JETS, HIST_N_MUONS, PDG_BOTTOM, PDG_HIGGS,
};
use crate::error::Result;
use crate::event::Event;
use crate::histograms::HistogramFill;
use crate::physics::GenParticle;
use crate::providers::gen::{first_n_with_distinct_mother, partons_from_decays};
use crate::providers::{ElectronProvider, MuonProvider, Providers};

/// Processing stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reset,
    Pileup,
    Trigger,
    Objects,
    Cleaning,
    Generator,
    GenSubsets,
    Augment,
    Convert,
    Tables,
    Sorting,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Reset => "reset",
            Stage::Pileup => "pileup",
            Stage::Trigger => "trigger",
            Stage::Objects => "objects",
            Stage::Cleaning => "cleaning",
            Stage::Generator => "generator",
            Stage::GenSubsets => "gen_subsets",
            Stage::Augment => "augment",
            Stage::Convert => "convert",
            Stage::Tables => "tables",
            Stage::Sorting => "sorting",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Terminal state of one event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Persisted,
    Aborted { reason: String },
}

/// Everything one event produced. Nothing here has touched shared state yet:
/// the driver applies `fills` and `veto_electrons` only when it persists `record`.
#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    pub record: OutputRecord,
    pub fills: Vec<HistogramFill>,
    pub veto_electrons: usize,
}

/// Per-event scratch state, rebuilt from scratch for every event
#[derive(Debug, Default)]
struct EventState {
    weights: EventWeights,
    n_pv: Option<usize>,
    n_electrons: Option<usize>,
    n_muons: Option<usize>,
    n_jets: Option<usize>,
    n_btag_jets: Option<usize>,
    fills: Vec<HistogramFill>,
}

impl EventState {
    fn fill(&mut self, name: &'static str, value: f64) {
        let weight = self.weights.event_weight;
        self.fills.push(HistogramFill::new(name, value, weight));
    }
}

/// Turns one event into one output record.
///
/// Holds only the providers resolved at job start; `process` reads nothing
/// else and mutates nothing outside its own scratch state, so the same event
/// always yields the same record.
#[derive(Debug, Clone)]
pub struct EventPipeline {
    providers: Providers,
    cleaning_delta_r: f64,
}

impl EventPipeline {
    pub fn new(providers: Providers, cleaning_delta_r: f64) -> Self {
        Self {
            providers,
            cleaning_delta_r,
        }
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub fn process(&self, event: &Event) -> Result<ProcessedEvent> {
        let p = &self.providers;

        // 1. reset
        let mut state = EventState::default();
        state.fill(HIST_N_EVENTS, 1.0);
        trace_stage(Stage::Reset);

        // 2. pileup
        let pileup = stage(Stage::Pileup, p.pileup.weights(event))?;
        let n_pv = stage(Stage::Pileup, p.pileup.n_pv(event))?;
        state.n_pv = Some(n_pv);
        state.fill(HIST_NPV_NO_WEIGHT, n_pv as f64);
        state.weights.fold_pileup(pileup);
        state.fill(HIST_NPV_REWEIGHT, n_pv as f64);

        // 3. trigger
        let trigger_map = stage(Stage::Trigger, p.trigger.trigger_map(event))?;
        state.weights.fold_trigger(p.trigger.trigger_weight(&trigger_map));

        // 4. reconstructed objects
        let mut electrons = stage(Stage::Objects, p.electron.electrons(event))?;
        let veto_electrons = ElectronProvider::veto_count(&electrons);
        state.n_electrons = Some(electrons.len());
        state.fill(HIST_N_ELECTRONS, electrons.len() as f64);

        let mut muons = stage(Stage::Objects, p.muon.muons(event))?;
        state.n_muons = Some(muons.len());
        state.fill(HIST_N_MUONS, muons.len() as f64);

        let jets = stage(Stage::Objects, p.jet.jets(event))?;
        let met = stage(Stage::Objects, p.jet.met(event))?;

        // 5. cleaning, then jet counts
        let jets = clean_jets(jets, &muons, self.cleaning_delta_r);
        let mut jets = clean_jets(jets, &electrons, self.cleaning_delta_r);
        let n_btag = p.jet.n_btag_jets(&jets);
        state.n_jets = Some(jets.len());
        state.n_btag_jets = Some(n_btag);
        state.fill(HIST_N_JETS, jets.len() as f64);
        state.fill(HIST_N_BTAG_JETS, n_btag as f64);
        debug!(
            stage = %Stage::Cleaning,
            n_jets = jets.len(),
            n_btag,
            n_loose_muons = MuonProvider::loose_count(&muons),
            "Jets cleaned"
        );

        // 6. generator weights and hard-process scalars
        let lhe_weights = stage(Stage::Generator, p.gen.lhe_weights(event))?;
        state.weights.fold_generator(&lhe_weights);
        let lhe_map = stage(Stage::Generator, p.gen.lhe_map(event))?;
        let gen_particles = stage(Stage::Generator, p.gen.gen_particles(event))?;

        // 7. generator subsets
        let (gen_hs, gen_b_from_hs) = partons_from_decays(&gen_particles, &[PDG_HIGGS]);
        let tl_gen_hs = first_n_with_distinct_mother(&gen_particles, &[PDG_HIGGS], 2, None);
        let tl_gen_b_from_hs = first_n_with_distinct_mother(
            &gen_particles,
            &[PDG_BOTTOM, -PDG_BOTTOM],
            4,
            Some(PDG_HIGGS),
        );
        trace_stage(Stage::GenSubsets);

        state.fill(HIST_N_EVENTS, 2.0);
        if let Some(&ht) = lhe_map.get("lhe_HT") {
            state.fill(HIST_LHE_HT, ht);
        }
        if let Some(&n) = lhe_map.get("lhe_Njets") {
            state.fill(HIST_LHE_NJETS, n);
        }

        // 8. MET-relative variables
        add_met_variables(&mut jets, &met);
        add_met_variables(&mut electrons, &met);
        add_met_variables(&mut muons, &met);
        trace_stage(Stage::Augment);

        // 9. output representations
        let jet_records: Vec<_> = jets.iter().map(jet_record).collect();
        let electron_records = electrons.iter().map(electron_record).collect();
        let muon_records = muons.iter().map(muon_record).collect();
        let gen = |v: &[GenParticle]| -> Vec<GenParticleRecord> {
            v.iter().map(gen_particle_record).collect()
        };
        trace_stage(Stage::Convert);

        // 10. weight and filter tables
        let weights = stage(Stage::Tables, state.weights.weight_table(&lhe_weights))?;
        let filters = filter_table(&trigger_map);

        // 11. jet rank orders
        let sort = JetSortPermutations::build(&jet_records);
        trace_stage(Stage::Sorting);

        // 12. assemble
        let record = OutputRecord {
            event_info: EventInfo {
                id: event.id,
                is_mc: event.is_simulated,
                filters,
                weights,
            },
            electrons: electron_records,
            muons: muon_records,
            jets: jet_records,
            met: met_record(&met),
            gen_b_from_hs: gen(&gen_b_from_hs),
            gen_hs: gen(&gen_hs),
            tl_gen_b_from_hs: gen(&tl_gen_b_from_hs),
            tl_gen_hs: gen(&tl_gen_hs),
            sort,
        };
        debug!(
            stage = %Stage::Assemble,
            event_weight = state.weights.event_weight,
            n_pv = ?state.n_pv,
            n_electrons = ?state.n_electrons,
            n_muons = ?state.n_muons,
            n_jets = ?state.n_jets,
            n_btag_jets = ?state.n_btag_jets,
            "Event assembled"
        );

        Ok(ProcessedEvent {
            record,
            fills: state.fills,
            veto_electrons,
        })
    }
}

/// Filter table in path-name order
fn filter_table(trigger_map: &BTreeMap<String, bool>) -> Vec<FilterEntry> {
    trigger_map
        .iter()
        .map(|(name, &passed)| FilterEntry {
            name: name.clone(),
            passed,
        })
        .collect()
}

fn stage<T>(stage: Stage, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        debug!(stage = %stage, error = %e, "Stage failed");
    }
    result
}

fn trace_stage(stage: Stage) {
    debug!(stage = %stage, "Stage complete");
}
