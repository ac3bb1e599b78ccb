use corpus::{CorpusCache, CorpusError, CorpusIndex, CorpusRecord};
use extract::Triple;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationOutcome {
    Unknown,
    Verified,
    Conflicting,
}

impl VerificationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Verified => "verified",
            Self::Conflicting => "conflicting",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Verification {
    pub outcome: VerificationOutcome,
    pub evidence: Vec<CorpusRecord>,
}

/// Classify one triple against the corpus.
///
/// Only records sharing subject and predicate are considered. The first of
/// them with the same object verifies the claim on its own; if none match,
/// all of them are returned as conflicting evidence.
pub fn classify(index: &CorpusIndex, triple: &Triple) -> Verification {
    let matches = index.matching(&triple.subject, &triple.predicate);

    if matches.is_empty() {
        return Verification {
            outcome: VerificationOutcome::Unknown,
            evidence: Vec::new(),
        };
    }

    if let Some(found) = matches.iter().find(|r| r.object == triple.object) {
        return Verification {
            outcome: VerificationOutcome::Verified,
            evidence: vec![(*found).clone()],
        };
    }

    Verification {
        outcome: VerificationOutcome::Conflicting,
        evidence: matches.into_iter().cloned().collect(),
    }
}

/// Verifies triples against the shared corpus cache.
#[derive(Clone)]
pub struct Verifier {
    corpus: Arc<CorpusCache>,
}

impl Verifier {
    pub fn new(corpus: Arc<CorpusCache>) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &CorpusCache {
        &self.corpus
    }

    pub async fn verify(&self, triple: &Triple) -> Result<Verification, CorpusError> {
        let index = self.corpus.get_or_load().await?;
        Ok(classify(index, triple))
    }
}
