use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{AnalyzerError, Result};

/// Job configuration, loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Whitespace-delimited histogram specification file
    pub hist_file: PathBuf,
    /// Jets closer than this to an accepted lepton are removed
    #[serde(default = "default_cleaning_delta_r")]
    pub cleaning_delta_r: f64,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub pileup: PileupConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub electron: ElectronConfig,
    #[serde(default)]
    pub muon: MuonConfig,
    #[serde(default)]
    pub jet: JetConfig,
    #[serde(default)]
    pub gen: GenConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PileupConfig {
    pub vertices: String,
    pub summary: String,
    /// Data pileup profile, one bin per integer number of true interactions
    pub data_profile: Vec<f64>,
    pub data_profile_up: Vec<f64>,
    pub data_profile_down: Vec<f64>,
    /// Simulated pileup profile the data profiles are divided by
    pub mc_profile: Vec<f64>,
}

impl Default for PileupConfig {
    fn default() -> Self {
        Self {
            vertices: constants::DEFAULT_VERTICES.to_string(),
            summary: constants::DEFAULT_PILEUP.to_string(),
            data_profile: Vec::new(),
            data_profile_up: Vec::new(),
            data_profile_down: Vec::new(),
            mc_profile: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerConfig {
    pub results: String,
    /// Path names to report; a trailing `_v<N>` version on the event side is ignored
    pub paths: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            results: constants::DEFAULT_TRIGGER_RESULTS.to_string(),
            paths: Vec::new(),
        }
    }
}

/// Minimum electron identification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectronId {
    #[default]
    None,
    Veto,
    Loose,
    Medium,
    Tight,
}

/// Minimum muon identification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuonId {
    #[default]
    None,
    Loose,
    Medium,
    Tight,
}

/// Minimum jet identification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JetId {
    None,
    #[default]
    Loose,
    Tight,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElectronConfig {
    pub collection: String,
    pub pt_min: f64,
    pub abs_eta_max: f64,
    pub id: ElectronId,
}

impl Default for ElectronConfig {
    fn default() -> Self {
        Self {
            collection: constants::DEFAULT_ELECTRONS.to_string(),
            pt_min: 10.0,
            abs_eta_max: 2.5,
            id: ElectronId::Veto,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MuonConfig {
    pub collection: String,
    pub pt_min: f64,
    pub abs_eta_max: f64,
    pub id: MuonId,
}

impl Default for MuonConfig {
    fn default() -> Self {
        Self {
            collection: constants::DEFAULT_MUONS.to_string(),
            pt_min: 10.0,
            abs_eta_max: 2.4,
            id: MuonId::None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JetConfig {
    pub collection: String,
    pub met: String,
    pub pt_min: f64,
    pub abs_eta_max: f64,
    pub id: JetId,
    /// CSV threshold counted as a medium b-tag
    pub btag_medium_wp: f64,
}

impl Default for JetConfig {
    fn default() -> Self {
        Self {
            collection: constants::DEFAULT_JETS.to_string(),
            met: constants::DEFAULT_MET.to_string(),
            pt_min: 20.0,
            abs_eta_max: 2.5,
            id: JetId::Loose,
            btag_medium_wp: constants::DEFAULT_BTAG_MEDIUM_WP,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    pub gen_info: String,
    pub lhe: String,
    pub particles: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            gen_info: constants::DEFAULT_GEN_INFO.to_string(),
            lhe: constants::DEFAULT_LHE.to_string(),
            particles: constants::DEFAULT_GEN_PARTICLES.to_string(),
        }
    }
}

fn default_cleaning_delta_r() -> f64 {
    constants::DEFAULT_CLEANING_DELTA_R
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnalyzerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        // Relative histogram spec paths are taken relative to the config file
        if config.hist_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.hist_file = dir.join(&config.hist_file);
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cleaning_delta_r.is_nan() || self.cleaning_delta_r <= 0.0 {
            return Err(AnalyzerError::Config(format!(
                "cleaning_delta_r must be positive, got {}",
                self.cleaning_delta_r
            )));
        }

        let windows = [
            ("electron", self.electron.pt_min, self.electron.abs_eta_max),
            ("muon", self.muon.pt_min, self.muon.abs_eta_max),
            ("jet", self.jet.pt_min, self.jet.abs_eta_max),
        ];
        for (family, pt_min, abs_eta_max) in windows {
            if pt_min < 0.0 || abs_eta_max < 0.0 {
                return Err(AnalyzerError::Config(format!(
                    "{} acceptance must be non-negative (pt_min={}, abs_eta_max={})",
                    family, pt_min, abs_eta_max
                )));
            }
        }

        self.pileup.validate()
    }
}

impl PileupConfig {
    fn validate(&self) -> Result<()> {
        let bins = self.mc_profile.len();
        if bins == 0 {
            let any_data = !self.data_profile.is_empty()
                || !self.data_profile_up.is_empty()
                || !self.data_profile_down.is_empty();
            if any_data {
                return Err(AnalyzerError::Config(
                    "pileup data profiles given without mc_profile".to_string(),
                ));
            }
            return Ok(());
        }

        if self.data_profile.len() != bins {
            return Err(AnalyzerError::Config(format!(
                "pileup data_profile has {} bins, mc_profile has {}",
                self.data_profile.len(),
                bins
            )));
        }
        for (name, profile) in [
            ("data_profile_up", &self.data_profile_up),
            ("data_profile_down", &self.data_profile_down),
        ] {
            if !profile.is_empty() && profile.len() != bins {
                return Err(AnalyzerError::Config(format!(
                    "pileup {} has {} bins, mc_profile has {}",
                    name,
                    profile.len(),
                    bins
                )));
            }
        }
        let all = [
            &self.mc_profile,
            &self.data_profile,
            &self.data_profile_up,
            &self.data_profile_down,
        ];
        if all.iter().flat_map(|p| p.iter()).any(|v| *v < 0.0) {
            return Err(AnalyzerError::Config(
                "pileup profiles must not contain negative entries".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml_str(r#"hist_file = "hists.txt""#).unwrap();
        assert_eq!(config.cleaning_delta_r, 0.4);
        assert_eq!(config.jet.collection, "slimmedJets");
        assert_eq!(config.electron.id, ElectronId::Veto);
        assert_eq!(config.jet.id, JetId::Loose);
        assert!(config.trigger.paths.is_empty());
        assert!(!config.verbose);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            hist_file = "hists.txt"
            [trigger]
            paths = ["HLT_QuadJet45_TripleBTagCSV_p087", "HLT_DoubleJet90_Double30_TripleBTagCSV_p087"]
            [muon]
            pt_min = 5.0
            id = "tight"
            "#,
        )
        .unwrap();
        assert_eq!(config.trigger.paths.len(), 2);
        assert_eq!(config.muon.pt_min, 5.0);
        assert_eq!(config.muon.id, MuonId::Tight);
    }

    #[test]
    fn test_rejects_non_positive_delta_r() {
        let err = Config::from_toml_str(
            r#"
            hist_file = "hists.txt"
            cleaning_delta_r = 0.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }

    #[test]
    fn test_rejects_mismatched_pileup_profiles() {
        let err = Config::from_toml_str(
            r#"
            hist_file = "hists.txt"
            [pileup]
            mc_profile = [0.5, 0.5]
            data_profile = [1.0]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(Config::from_toml_str(
            r#"
            hist_file = "hists.txt"
            cleaning_dr = 0.4
            "#
        )
        .is_err());
    }

    #[test]
    fn test_load_resolves_hist_file_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        fs::write(&path, "hist_file = \"hists.txt\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.hist_file, dir.path().join("hists.txt"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Config::load(Path::new("/nonexistent/analysis.toml")).unwrap_err();
        assert!(matches!(err, AnalyzerError::Config(_)));
    }
}
