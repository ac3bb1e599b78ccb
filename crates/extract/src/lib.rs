pub mod client;
pub mod grouping;
pub mod schema;

pub use client::{ExtractionClient, RelationSource};
pub use grouping::{RelationGroup, group_relations};
pub use schema::{RelationCandidate, Triple};

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Maximum extraction calls in flight at once
    pub max_in_flight: usize,
    /// Timeout for a single extraction call, measured once it holds a permit
    pub call_timeout: Duration,
    /// Deadline for the whole fan-out
    pub overall_timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 10,
            call_timeout: Duration::from_secs(60),
            overall_timeout: Duration::from_secs(120),
        }
    }
}

/// What came back from one fan-out.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExtractionReport {
    pub candidates: Vec<RelationCandidate>,
    /// Chunks whose call completed with a 200 and a parseable body
    pub succeeded: usize,
    /// Chunks whose call failed, timed out, or was abandoned at the deadline
    pub dropped: usize,
    /// Subset of `dropped` still outstanding when the deadline hit
    pub abandoned: usize,
}

enum ChunkOutcome {
    Extracted(Vec<RelationCandidate>),
    Failed(String),
    TimedOut,
}

/// Fans chunks out to a [`RelationSource`] with bounded concurrency.
pub struct Extractor {
    source: Arc<dyn RelationSource>,
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(source: Arc<dyn RelationSource>, config: ExtractorConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract relations from every chunk.
    ///
    /// Individual chunk failures are counted in the report and never returned
    /// as errors. An error means the fan-out could not be started at all.
    pub async fn extract_chunks(&self, chunks: &[ingest::Chunk]) -> Result<ExtractionReport> {
        if chunks.is_empty() {
            debug!("No chunks to extract");
            return Ok(ExtractionReport::default());
        }

        let semaphore = self.worker_pool()?;
        let deadline = Instant::now() + self.config.overall_timeout;
        let mut tasks = JoinSet::new();

        for chunk in chunks {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let call_timeout = self.config.call_timeout;
            let chunk_id = chunk.chunk_id.clone();
            let text = chunk.text.clone();

            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        match tokio::time::timeout(call_timeout, source.extract(&text)).await {
                            Ok(Ok(candidates)) => ChunkOutcome::Extracted(candidates),
                            Ok(Err(e)) => ChunkOutcome::Failed(format!("{:#}", e)),
                            Err(_) => ChunkOutcome::TimedOut,
                        }
                    }
                    Err(e) => ChunkOutcome::Failed(e.to_string()),
                };
                (chunk_id, outcome)
            });
        }

        let mut report = ExtractionReport::default();

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((chunk_id, outcome)))) => match outcome {
                    ChunkOutcome::Extracted(candidates) => {
                        debug!(chunk = %chunk_id, relations = candidates.len(), "Chunk extracted");
                        report.succeeded += 1;
                        report.candidates.extend(candidates);
                    }
                    ChunkOutcome::Failed(error) => {
                        warn!(chunk = %chunk_id, error = %error, "Dropping chunk: extraction failed");
                        report.dropped += 1;
                    }
                    ChunkOutcome::TimedOut => {
                        warn!(
                            chunk = %chunk_id,
                            timeout_secs = self.config.call_timeout.as_secs_f64(),
                            "Dropping chunk: extraction call timed out"
                        );
                        report.dropped += 1;
                    }
                },
                Ok(Some(Err(join_error))) => {
                    warn!(error = %join_error, "Dropping chunk: extraction task failed");
                    report.dropped += 1;
                }
                Ok(None) => break,
                Err(_) => {
                    let outstanding = tasks.len();
                    tasks.abort_all();
                    warn!(
                        outstanding,
                        deadline_secs = self.config.overall_timeout.as_secs_f64(),
                        "Extraction deadline elapsed, abandoning outstanding chunks"
                    );
                    report.dropped += outstanding;
                    report.abandoned = outstanding;
                    break;
                }
            }
        }

        info!(
            chunks = chunks.len(),
            succeeded = report.succeeded,
            dropped = report.dropped,
            relations = report.candidates.len(),
            "Extraction fan-out complete"
        );

        Ok(report)
    }

    fn worker_pool(&self) -> Result<Arc<Semaphore>> {
        tokio::runtime::Handle::try_current().context("No async runtime for extraction workers")?;

        let permits = self.config.max_in_flight;
        if permits == 0 || permits > Semaphore::MAX_PERMITS {
            anyhow::bail!("Invalid extraction worker bound: {}", permits);
        }

        Ok(Arc::new(Semaphore::new(permits)))
    }
}
