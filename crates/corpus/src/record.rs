use extract::{RelationCandidate, Triple};
use serde::{Deserialize, Serialize};

/// A trusted relation loaded from the corpus. Same wire shape as the
/// extraction service output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
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

impl CorpusRecord {
    pub fn triple(&self) -> Triple {
        Triple::new(&self.subject, &self.predicate, &self.object)
    }
}

impl From<RelationCandidate> for CorpusRecord {
    fn from(c: RelationCandidate) -> Self {
        Self {
            subject: c.subject,
            predicate: c.predicate,
            object: c.object,
            sentence: c.sentence,
            source: c.source,
            probability: c.probability,
        }
    }
}
