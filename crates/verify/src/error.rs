use thiserror::Error;

/// Failures that abort a check. Per-chunk extraction failures and label
/// lookups never show up here.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Could not fetch page {url}: {reason}")]
    UpstreamFetch { url: String, reason: String },

    #[error("Relation extraction could not start: {0}")]
    ExtractionStage(String),

    #[error("Corpus unavailable: {0}")]
    CorpusLoad(#[from] corpus::CorpusError),
}

impl CheckError {
    /// Message safe to show to callers: names the stage, hides internals.
    pub fn public_message(&self) -> String {
        match self {
            Self::UpstreamFetch { url, .. } => format!("Could not get the requested url: {}", url),
            Self::ExtractionStage(_) => "Relation extraction is unavailable".to_string(),
            Self::CorpusLoad(_) => "Verification corpus is unavailable, try again later".to_string(),
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::UpstreamFetch { .. } => "fetch",
            Self::ExtractionStage(_) => "extract",
            Self::CorpusLoad(_) => "corpus",
        }
    }
}
