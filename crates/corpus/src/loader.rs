use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::CorpusError;
use crate::record::CorpusRecord;

/// Reads newline-delimited JSON corpus files from one directory.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    dir: PathBuf,
    prefix: String,
}

impl CorpusLoader {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files whose name starts with the prefix, sorted by name.
    pub async fn discover(&self) -> Result<Vec<PathBuf>, CorpusError> {
        let io_err = |source| CorpusError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.dir).await.map_err(io_err)?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&self.prefix));

            if matches && path.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Load every record from every matching file.
    pub async fn load(&self) -> Result<Vec<CorpusRecord>, CorpusError> {
        let files = self.discover().await?;
        let mut records = Vec::new();

        for path in &files {
            let content = fs::read_to_string(path)
                .await
                .map_err(|source| CorpusError::Io {
                    path: path.clone(),
                    source,
                })?;
            let parsed = parse_lines(path, &content)?;
            tracing::debug!(file = %path.display(), records = parsed.len(), "Corpus file read");
            records.extend(parsed);
        }

        tracing::info!(
            dir = %self.dir.display(),
            files = files.len(),
            records = records.len(),
            "Corpus loaded"
        );

        Ok(records)
    }
}

/// One record per non-blank line.
pub fn parse_lines(path: &Path, content: &str) -> Result<Vec<CorpusRecord>, CorpusError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| CorpusError::Malformed {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })
        })
        .collect()
}
