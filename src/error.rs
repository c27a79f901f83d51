use thiserror::Error;

use crate::event::EventId;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Histogram spec error at line {line}: {reason}")]
    HistSpec { line: usize, reason: String },

    #[error("Cannot resolve {family} token '{label}': {reason}")]
    UnresolvedToken {
        family: &'static str,
        label: String,
        reason: String,
    },

    #[error("Missing {family} collection '{label}'")]
    MissingCollection { family: &'static str, label: String },

    #[error("Product '{label}' is not a {expected} collection")]
    ProductKindMismatch {
        label: String,
        expected: &'static str,
    },

    #[error("Duplicate event {0}")]
    DuplicateEvent(EventId),

    #[error("Duplicate weight name '{0}'")]
    DuplicateWeight(String),
}

impl AnalyzerError {
    /// Errors that only invalidate the current event; the job moves on to the next one.
    pub fn is_event_fatal(&self) -> bool {
        matches!(
            self,
            AnalyzerError::MissingCollection { .. }
                | AnalyzerError::ProductKindMismatch { .. }
                | AnalyzerError::DuplicateEvent(_)
                | AnalyzerError::DuplicateWeight(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_fatal_classification() {
        let missing = AnalyzerError::MissingCollection {
            family: "jet",
            label: "slimmedJets".to_string(),
        };
        assert!(missing.is_event_fatal());
        assert!(AnalyzerError::DuplicateWeight("PUWeight".into()).is_event_fatal());

        let config = AnalyzerError::Config("bad".into());
        assert!(!config.is_event_fatal());
        let spec = AnalyzerError::HistSpec {
            line: 3,
            reason: "bad bins".into(),
        };
        assert!(!spec.is_event_fatal());
    }

    #[test]
    fn test_error_messages_name_the_product() {
        let e = AnalyzerError::MissingCollection {
            family: "muon",
            label: "slimmedMuons".to_string(),
        };
        assert_eq!(e.to_string(), "Missing muon collection 'slimmedMuons'");
    }
}
