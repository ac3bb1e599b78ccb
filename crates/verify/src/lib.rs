pub mod assemble;
pub mod checker;
pub mod engine;
pub mod error;
pub mod labels;

pub use assemble::{EntityRef, EvidenceView, RelationReport, article_id, assemble};
pub use checker::{CheckReport, FactChecker, StageTimings};
pub use engine::{Verification, VerificationOutcome, Verifier, classify};
pub use error::CheckError;
pub use labels::{FALLBACK_LABEL, LabelResolver, LabelSource, WikidataClient};
