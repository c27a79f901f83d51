use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use hh_ntuplizer::event::{Event, EventId, Product};
use hh_ntuplizer::physics::{
    GenEventInfo, GenParticle, Jet, LheWeight, LorentzVector, Met, Muon, PileupSummary,
    TriggerBit, Vertex,
};
use hh_ntuplizer::{run_job, Config, RunOptions};

const HISTS: &str = "\
# name title nbins min max option
a_nEvents Events 10 0 10 HIST
a_nPVNoWeight #PV 50 0 50 HIST
a_nPVReWeight #PV~(reweighted) 50 0 50 HIST
j_nJets #jets 15 0 15 HIST
j_nBTagJets #b-jets 10 0 10 HIST
g_lheHT LHE~HT 100 0 2000 HIST
";

fn config_toml() -> String {
    // equal totals: the ratio at 20 true interactions is 0.9
    let mut data = vec![1.0; 40];
    let mc = vec![1.0; 40];
    data[20] = 0.9;
    data[21] = 1.1;
    format!(
        r#"
hist_file = "hists.txt"

[pileup]
data_profile = {:?}
mc_profile = {:?}

[trigger]
paths = ["HLT_QuadJet45_TripleBTagCSV_p087"]
"#,
        data, mc
    )
}

fn jet(pt: f64, eta: f64, phi: f64, csv: f64) -> Jet {
    Jet {
        p4: LorentzVector::new(pt, eta, phi, 10.0),
        csv,
        cmva: csv - 0.1,
        is_loose: true,
        hadron_flavour: 5,
        ..Default::default()
    }
}

fn gp(pdg_id: i32, pt: f64, mothers: Vec<usize>, daughters: Vec<usize>) -> GenParticle {
    GenParticle {
        pdg_id,
        status: 22,
        p4: LorentzVector::new(pt, 0.5, 0.5, 4.7),
        mothers,
        daughters,
    }
}

fn simulated(n: u64, jets: Vec<Jet>) -> Event {
    Event::new(EventId::new(1, 7, n), true)
        .with_product(
            "offlineSlimmedPrimaryVertices",
            Product::Vertices(vec![
                Vertex { ndof: 12.0, z: 0.5, rho: 0.1, is_fake: false },
                Vertex { ndof: 2.0, z: 0.5, rho: 0.1, is_fake: false },
            ]),
        )
        .with_product("slimmedAddPileupInfo", Product::Pileup(PileupSummary { n_true_interactions: 20.4 }))
        .with_product(
            "TriggerResults",
            Product::Triggers(vec![TriggerBit {
                name: "HLT_QuadJet45_TripleBTagCSV_p087_v2".to_string(),
                accept: true,
            }]),
        )
        .with_product("slimmedElectrons", Product::Electrons(vec![]))
        .with_product(
            "slimmedMuons",
            Product::Muons(vec![Muon {
                p4: LorentzVector::new(25.0, 2.0, -1.0, 0.105),
                is_loose: true,
                ..Default::default()
            }]),
        )
        .with_product("slimmedJets", Product::Jets(jets))
        .with_product("slimmedMETs", Product::Met(Met { pt: 35.0, phi: 1.0, sum_et: 800.0 }))
        .with_product(
            "generator",
            Product::GenInfo(GenEventInfo {
                weights: vec![
                    LheWeight { id: 0, value: 1.0 },
                    LheWeight { id: -1, value: 1.05 },
                ],
            }),
        )
        .with_product(
            "prunedGenParticles",
            Product::GenParticles(vec![
                gp(25, 100.0, vec![], vec![1]),
                gp(25, 101.0, vec![0], vec![2, 3]),
                gp(5, 60.0, vec![1], vec![]),
                gp(-5, 40.0, vec![1], vec![]),
            ]),
        )
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(events: &[Event]) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("hists.txt"), HISTS)?;
        fs::write(dir.path().join("config.toml"), config_toml())?;
        let lines: Vec<String> = events
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<_, _>>()?;
        fs::write(dir.path().join("events.jsonl"), lines.join("\n") + "\n")?;
        Ok(Self { dir })
    }

    fn run(&self, output: &str) -> Result<hh_ntuplizer::JobSummary> {
        let config = Config::load(&self.dir.path().join("config.toml"))?;
        let options = RunOptions {
            input: self.dir.path().join("events.jsonl"),
            output: self.dir.path().join(output),
            hist_output: None,
            max_events: None,
        };
        Ok(run_job(&config, &options)?)
    }

    fn rows(&self, output: &str, field: &str) -> Result<Vec<Value>> {
        read_rows(&self.dir.path().join(output).join(format!("{}.jsonl", field)))
    }
}

fn read_rows(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in content.lines() {
        rows.push(serde_json::from_str(line)?);
    }
    Ok(rows)
}

fn weight(info: &Value, name: &str) -> Option<f64> {
    info["weights"]
        .as_array()?
        .iter()
        .find(|w| w["name"] == name)
        .and_then(|w| w["value"].as_f64())
}

#[test]
fn test_full_job_writes_weights_sorting_and_gen_subsets() -> Result<()> {
    let fixture = Fixture::new(&[simulated(
        1,
        vec![jet(50.0, 0.0, 0.0, 0.9), jet(80.0, -1.0, 2.5, 0.9)],
    )])?;
    let summary = fixture.run("out")?;
    assert_eq!(summary.events_read, 1);
    assert_eq!(summary.events_persisted, 1);

    let info = &fixture.rows("out", "EventInfo")?[0];
    assert_eq!(info["event"], 1);
    assert!((weight(info, "PUWeight").unwrap_or_default() - 0.9).abs() < 1e-9);
    assert!((weight(info, "EventWeight").unwrap_or_default() - 0.945).abs() < 1e-9);
    assert_eq!(weight(info, "lhe_weight_-1"), Some(1.05));
    assert_eq!(weight(info, "lhe_weight_0"), Some(1.0));
    assert_eq!(info["filters"][0]["name"], "HLT_QuadJet45_TripleBTagCSV_p087");
    assert_eq!(info["filters"][0]["passed"], true);

    assert_eq!(fixture.rows("out", "j_sort_pt")?[0], serde_json::json!([1, 0]));
    assert_eq!(fixture.rows("out", "j_sort_csv")?[0], serde_json::json!([0, 1]));

    let hs = &fixture.rows("out", "GenHs")?[0];
    assert_eq!(hs.as_array().map(|a| a.len()), Some(1));
    assert_eq!(hs[0]["pt"], 101.0);
    let tl_hs = &fixture.rows("out", "TL_GenHs")?[0];
    assert_eq!(tl_hs[0]["pt"], 100.0);
    let bs = &fixture.rows("out", "GenBFromHs")?[0];
    assert_eq!(bs.as_array().map(|a| a.len()), Some(2));
    Ok(())
}

#[test]
fn test_aborted_event_is_not_persisted_or_histogrammed() -> Result<()> {
    let mut broken = simulated(2, vec![jet(40.0, 0.0, 0.0, 0.5)]);
    broken.products.remove("slimmedMETs");
    let fixture = Fixture::new(&[
        simulated(1, vec![jet(40.0, 0.0, 0.0, 0.5)]),
        broken,
        simulated(3, vec![]),
    ])?;
    let summary = fixture.run("out")?;
    assert_eq!(summary.events_read, 3);
    assert_eq!(summary.events_persisted, 2);
    assert_eq!(summary.events_aborted, 1);
    assert!(summary.errors[0].contains("slimmedMETs"));

    let events: Vec<Value> = fixture
        .rows("out", "EventInfo")?
        .iter()
        .map(|r| r["event"].clone())
        .collect();
    assert_eq!(events, vec![Value::from(1), Value::from(3)]);
    assert_eq!(fixture.rows("out", "Jets")?[1], serde_json::json!([]));

    let hists: Value =
        serde_json::from_str(&fs::read_to_string(fixture.dir.path().join("out/histograms.json"))?)?;
    let n_events = &hists["All"][0];
    assert_eq!(n_events["name"], "a_nEvents");
    assert_eq!(n_events["entries"], 4);
    assert_eq!(n_events["bin_labels"][0], "All (jets in Acc)");
    assert_eq!(hists["Jets"][0]["name"], "j_nJets");
    Ok(())
}

#[test]
fn test_rerun_produces_identical_field_files() -> Result<()> {
    let fixture = Fixture::new(&[
        simulated(1, vec![jet(50.0, 0.0, 0.0, 0.3), jet(70.0, 1.0, 2.0, 0.95)]),
        simulated(2, vec![]),
    ])?;
    fixture.run("first")?;
    fixture.run("second")?;

    let manifest = |name: &str| -> Result<Value> {
        let path = fixture.dir.path().join(name).join("manifest.json");
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    };
    let (first, second) = (manifest("first")?, manifest("second")?);
    assert_eq!(first["entries"], 2);
    assert_eq!(first["fields"], second["fields"]);
    assert_ne!(first["job_id"], second["job_id"]);
    Ok(())
}

#[test]
fn test_missing_hist_spec_stops_before_processing() -> Result<()> {
    let fixture = Fixture::new(&[simulated(1, vec![])])?;
    fs::remove_file(fixture.dir.path().join("hists.txt"))?;
    assert!(fixture.run("out").is_err());
    assert!(!fixture.dir.path().join("out").exists());
    Ok(())
}
