use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading corpus files.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus path {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed corpus record at {path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
