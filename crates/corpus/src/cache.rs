use std::collections::HashMap;
use tokio::sync::OnceCell;

use crate::error::CorpusError;
use crate::loader::CorpusLoader;
use crate::record::CorpusRecord;

/// Immutable in-memory corpus with a (subject, predicate) lookup.
#[derive(Debug, Default)]
pub struct CorpusIndex {
    records: Vec<CorpusRecord>,
    by_subject_predicate: HashMap<(String, String), Vec<usize>>,
}

impl CorpusIndex {
    pub fn new(records: Vec<CorpusRecord>) -> Self {
        let mut by_subject_predicate: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            by_subject_predicate
                .entry((record.subject.clone(), record.predicate.clone()))
                .or_default()
                .push(i);
        }

        Self {
            records,
            by_subject_predicate,
        }
    }

    /// Records with this subject and predicate, in load order.
    pub fn matching(&self, subject: &str, predicate: &str) -> Vec<&CorpusRecord> {
        self.by_subject_predicate
            .get(&(subject.to_string(), predicate.to_string()))
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Process-wide corpus, loaded at most once.
///
/// Concurrent first callers share a single load. A failed load leaves the
/// cache empty so the next caller tries again.
pub struct CorpusCache {
    loader: CorpusLoader,
    index: OnceCell<CorpusIndex>,
}

impl CorpusCache {
    pub fn new(loader: CorpusLoader) -> Self {
        Self {
            loader,
            index: OnceCell::new(),
        }
    }

    /// A cache that is already populated and never touches disk.
    pub fn preloaded(records: Vec<CorpusRecord>) -> Self {
        Self {
            loader: CorpusLoader::new("", ""),
            index: OnceCell::new_with(Some(CorpusIndex::new(records))),
        }
    }

    pub async fn get_or_load(&self) -> Result<&CorpusIndex, CorpusError> {
        self.index
            .get_or_try_init(|| async {
                let records = self.loader.load().await?;
                Ok::<_, CorpusError>(CorpusIndex::new(records))
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.index.initialized()
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            loaded: self.is_loaded(),
            records: self.index.get().map_or(0, CorpusIndex::len),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CorpusStats {
    pub loaded: bool,
    pub records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(s: &str, p: &str, o: &str) -> CorpusRecord {
        CorpusRecord {
            subject: s.to_string(),
            predicate: p.to_string(),
            object: o.to_string(),
            sentence: String::new(),
            source: String::new(),
            probability: 1.0,
        }
    }

    fn write_corpus(dir: &std::path::Path, lines: &[&str]) {
        std::fs::write(dir.join("part-00000"), lines.join("\n")).unwrap();
    }

    const LINE: &str = r#"{"subject":"Q76","predictedPredicate":"P26","obj":"Q13133"}"#;

    #[test]
    fn test_matching_preserves_order() {
        let index = CorpusIndex::new(vec![
            record("Q76", "P26", "Q1"),
            record("Q76", "P27", "Q30"),
            record("Q76", "P26", "Q2"),
        ]);

        let objects: Vec<_> = index
            .matching("Q76", "P26")
            .iter()
            .map(|r| r.object.as_str())
            .collect();
        assert_eq!(objects, vec!["Q1", "Q2"]);
        assert!(index.matching("Q1", "P26").is_empty());
    }

    #[tokio::test]
    async fn test_lazy_load_once() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[LINE]);

        let cache = CorpusCache::new(CorpusLoader::new(dir.path(), "part-"));
        assert!(!cache.is_loaded());

        assert_eq!(cache.get_or_load().await.unwrap().len(), 1);

        // Later file changes are not picked up
        write_corpus(dir.path(), &[LINE, LINE]);
        assert_eq!(cache.get_or_load().await.unwrap().len(), 1);
        assert!(cache.stats().loaded);
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_agree() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &[LINE, LINE, LINE]);

        let cache = Arc::new(CorpusCache::new(CorpusLoader::new(dir.path(), "part-")));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.get_or_load().await.map(|idx| idx.len()).unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 3);
        }
        assert_eq!(cache.stats().records, 3);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path(), &["{broken"]);

        let cache = CorpusCache::new(CorpusLoader::new(dir.path(), "part-"));
        assert!(cache.get_or_load().await.is_err());
        assert!(!cache.is_loaded());

        write_corpus(dir.path(), &[LINE]);
        assert_eq!(cache.get_or_load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preloaded() {
        let cache = CorpusCache::preloaded(vec![record("Q1", "P1", "Q2")]);
        assert!(cache.is_loaded());
        assert_eq!(cache.get_or_load().await.unwrap().len(), 1);
    }
}
