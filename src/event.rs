//! Events, typed product tokens and event sources.
//!
//! An [`Event`] carries labelled products. Each object provider resolves a
//! [`Token`] once at startup and uses it to retrieve its collection from every
//! event, so a mistyped label surfaces before the first event is processed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::Path;

use crate::error::{AnalyzerError, Result};
use crate::physics::{
    Electron, GenEventInfo, GenParticle, Jet, LheEvent, Met, Muon, PileupSummary, TriggerBit,
    Vertex,
};

/// Unique identity of a collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

impl EventId {
    pub fn new(run: u32, lumi: u32, event: u64) -> Self {
        Self { run, lumi, event }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// A labelled per-event product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Product {
    Electrons(Vec<Electron>),
    Muons(Vec<Muon>),
    Jets(Vec<Jet>),
    Met(Met),
    Vertices(Vec<Vertex>),
    Pileup(PileupSummary),
    Triggers(Vec<TriggerBit>),
    GenInfo(GenEventInfo),
    Lhe(LheEvent),
    GenParticles(Vec<GenParticle>),
}

/// Types that can be pulled out of a [`Product`]
pub trait ProductKind {
    /// Human-readable family name used in error messages
    const FAMILY: &'static str;

    fn extract(product: &Product) -> Option<&Self>;
}

macro_rules! product_kind {
    ($ty:ty, $variant:ident, $family:literal) => {
        impl ProductKind for $ty {
            const FAMILY: &'static str = $family;

            fn extract(product: &Product) -> Option<&Self> {
                match product {
                    Product::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

product_kind!(Vec<Electron>, Electrons, "electron");
product_kind!(Vec<Muon>, Muons, "muon");
product_kind!(Vec<Jet>, Jets, "jet");
product_kind!(Met, Met, "missing-energy");
product_kind!(Vec<Vertex>, Vertices, "vertex");
product_kind!(PileupSummary, Pileup, "pileup");
product_kind!(Vec<TriggerBit>, Triggers, "trigger");
product_kind!(GenEventInfo, GenInfo, "generator-info");
product_kind!(LheEvent, Lhe, "lhe");
product_kind!(Vec<GenParticle>, GenParticles, "generator-particle");

/// Typed handle on a labelled product, resolved once at job start
pub struct Token<T> {
    label: String,
    _kind: PhantomData<fn() -> T>,
}

impl<T: ProductKind> Token<T> {
    /// Resolve a label into a token, checking it against the source's product
    /// catalog when the source declares one.
    pub fn resolve(label: &str, catalog: Option<&BTreeSet<String>>) -> Result<Self> {
        let unresolved = |reason: &str| AnalyzerError::UnresolvedToken {
            family: T::FAMILY,
            label: label.to_string(),
            reason: reason.to_string(),
        };

        if label.trim().is_empty() {
            return Err(unresolved("label is empty"));
        }
        if label.chars().any(char::is_whitespace) {
            return Err(unresolved("label contains whitespace"));
        }
        if let Some(catalog) = catalog {
            if !catalog.contains(label) {
                return Err(unresolved("not declared by the event source"));
            }
        }

        Ok(Self {
            label: label.to_string(),
            _kind: PhantomData,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token").field("label", &self.label).finish()
    }
}

/// One unit of collision data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub is_simulated: bool,
    #[serde(default)]
    pub products: BTreeMap<String, Product>,
}

impl Event {
    pub fn new(id: EventId, is_simulated: bool) -> Self {
        Self {
            id,
            is_simulated,
            products: BTreeMap::new(),
        }
    }

    /// Builder-style insertion of a labelled product
    pub fn with_product(mut self, label: &str, product: Product) -> Self {
        self.products.insert(label.to_string(), product);
        self
    }

    /// Retrieve a required product; absence is fatal for this event.
    pub fn get<T: ProductKind>(&self, token: &Token<T>) -> Result<&T> {
        self.try_get(token)?
            .ok_or_else(|| AnalyzerError::MissingCollection {
                family: T::FAMILY,
                label: token.label().to_string(),
            })
    }

    /// Retrieve an optional product. A product stored under the label with the
    /// wrong kind is still an error.
    pub fn try_get<T: ProductKind>(&self, token: &Token<T>) -> Result<Option<&T>> {
        match self.products.get(token.label()) {
            None => Ok(None),
            Some(product) => T::extract(product).map(Some).ok_or_else(|| {
                AnalyzerError::ProductKindMismatch {
                    label: token.label().to_string(),
                    expected: T::FAMILY,
                }
            }),
        }
    }
}

/// Ordered stream of events
pub trait EventSource {
    /// Labels the source guarantees to know about, if it declares any
    fn catalog(&self) -> Option<&BTreeSet<String>> {
        None
    }

    /// Next event, `Ok(None)` at end of input
    fn next_event(&mut self) -> Result<Option<Event>>;
}

/// Reads one JSON-encoded event per line
pub struct JsonLinesSource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl JsonLinesSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            AnalyzerError::Config(format!(
                "Failed to open event input '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl EventSource for JsonLinesSource {
    fn next_event(&mut self) -> Result<Option<Event>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: Event = serde_json::from_str(&line).map_err(|e| {
                tracing::error!("Malformed event at input line {}: {}", self.line_no, e);
                e
            })?;
            return Ok(Some(event));
        }
        Ok(None)
    }
}

/// In-memory event source for tests and embedding
#[derive(Debug, Default)]
pub struct InMemorySource {
    events: VecDeque<Event>,
    catalog: Option<BTreeSet<String>>,
}

impl InMemorySource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
            catalog: None,
        }
    }

    pub fn with_catalog<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}

impl EventSource for InMemorySource {
    fn catalog(&self) -> Option<&BTreeSet<String>> {
        self.catalog.as_ref()
    }

    fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(self.events.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::LorentzVector;
    use std::io::Write;

    fn jet(pt: f64) -> Jet {
        Jet {
            p4: LorentzVector::new(pt, 0.0, 0.0, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_get_returns_typed_product() {
        let event = Event::new(EventId::new(1, 1, 1), true)
            .with_product("slimmedJets", Product::Jets(vec![jet(40.0)]));
        let token: Token<Vec<Jet>> = Token::resolve("slimmedJets", None).unwrap();

        let jets = event.get(&token).unwrap();
        assert_eq!(jets.len(), 1);
    }

    #[test]
    fn test_missing_product_is_event_fatal() {
        let event = Event::new(EventId::new(1, 1, 1), true);
        let token: Token<Vec<Jet>> = Token::resolve("slimmedJets", None).unwrap();

        let err = event.get(&token).unwrap_err();
        assert!(err.is_event_fatal());
        assert!(matches!(err, AnalyzerError::MissingCollection { family: "jet", .. }));
        assert!(event.try_get(&token).unwrap().is_none());
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let event = Event::new(EventId::new(1, 1, 1), true)
            .with_product("slimmedJets", Product::Met(Met::default()));
        let token: Token<Vec<Jet>> = Token::resolve("slimmedJets", None).unwrap();

        assert!(matches!(
            event.get(&token),
            Err(AnalyzerError::ProductKindMismatch { .. })
        ));
    }

    #[test]
    fn test_token_resolution_checks_label_and_catalog() {
        assert!(Token::<Met>::resolve("", None).is_err());
        assert!(Token::<Met>::resolve("slimmed METs", None).is_err());

        let catalog: BTreeSet<String> = ["slimmedMETs".to_string()].into_iter().collect();
        assert!(Token::<Met>::resolve("slimmedMETs", Some(&catalog)).is_ok());
        let err = Token::<Met>::resolve("patMETs", Some(&catalog)).unwrap_err();
        assert!(!err.is_event_fatal());
    }

    #[test]
    fn test_json_lines_source_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let event = Event::new(EventId::new(1, 2, 3), false)
            .with_product("slimmedMETs", Product::Met(Met { pt: 12.0, phi: 0.5, sum_et: 0.0 }));
        writeln!(file, "{}", serde_json::to_string(&event).unwrap()).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", serde_json::to_string(&event).unwrap()).unwrap();

        let mut source = JsonLinesSource::open(file.path()).unwrap();
        assert_eq!(source.next_event().unwrap(), Some(event.clone()));
        assert_eq!(source.next_event().unwrap(), Some(event));
        assert_eq!(source.next_event().unwrap(), None);
    }

    #[test]
    fn test_product_json_layout() {
        let json = r#"{"kind":"met","data":{"pt":20.0,"phi":1.0}}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(
            product,
            Product::Met(Met {
                pt: 20.0,
                phi: 1.0,
                sum_et: 0.0
            })
        );
    }
}
