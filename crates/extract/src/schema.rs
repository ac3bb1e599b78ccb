use serde::{Deserialize, Serialize};

/// A (subject, predicate, object) relation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// One relation returned by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationCandidate {
    pub subject: String,
    #[serde(rename = "predictedPredicate")]
    pub predicate: String,
    #[serde(rename = "obj")]
    pub object: String,
    #[serde(default)]
    pub sentence: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub probability: f64,
}

impl RelationCandidate {
    pub fn triple(&self) -> Triple {
        Triple::new(&self.subject, &self.predicate, &self.object)
    }
}
