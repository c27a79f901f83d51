use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::TriggerConfig;
use crate::error::Result;
use crate::event::{Event, Token};
use crate::physics::TriggerBit;

static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<base>.+)_v\d+$").expect("static regex is valid"));

/// Strip a trailing `_v<N>` menu version from a trigger path name
pub fn unversioned(path: &str) -> &str {
    VERSION_SUFFIX
        .captures(path)
        .and_then(|c| c.name("base"))
        .map_or(path, |m| m.as_str())
}

/// Reports pass/fail for the configured trigger paths
#[derive(Debug, Clone)]
pub struct TriggerProvider {
    results: Token<Vec<TriggerBit>>,
    paths: Vec<String>,
}

impl TriggerProvider {
    pub fn new(config: &TriggerConfig, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        Ok(Self {
            results: Token::resolve(&config.results, catalog)?,
            paths: config.paths.clone(),
        })
    }

    /// Name to decision for every configured path found in the event.
    /// Configured paths the event does not know about are left out.
    pub fn trigger_map(&self, event: &Event) -> Result<BTreeMap<String, bool>> {
        let bits = event.get(&self.results)?;
        let mut map = BTreeMap::new();

        for path in &self.paths {
            for bit in bits {
                if bit.name == *path || unversioned(&bit.name) == path.as_str() {
                    *map.entry(path.clone()).or_insert(false) |= bit.accept;
                }
            }
        }
        Ok(map)
    }

    /// Trigger efficiency weight. No correction is applied, so it stays neutral.
    pub fn trigger_weight(&self, _decisions: &BTreeMap<String, bool>) -> f64 {
        1.0
    }
}
