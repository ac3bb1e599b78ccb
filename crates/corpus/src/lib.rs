pub mod cache;
pub mod error;
pub mod loader;
pub mod record;

pub use cache::{CorpusCache, CorpusIndex, CorpusStats};
pub use error::CorpusError;
pub use loader::CorpusLoader;
pub use record::CorpusRecord;
