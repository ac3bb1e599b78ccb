use extract::{Extractor, group_relations};
use ingest::{Chunker, PageFetcher};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::assemble::{RelationReport, assemble};
use crate::engine::Verifier;
use crate::error::CheckError;
use crate::labels::LabelResolver;

#[derive(Debug, Default, Clone, Serialize)]
pub struct StageTimings {
    pub fetch_ms: u64,
    pub extract_ms: u64,
    pub verify_ms: u64,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct CheckReport {
    pub relations: Vec<RelationReport>,
    pub chunks: usize,
    pub chunks_succeeded: usize,
    pub chunks_dropped: usize,
    pub chunks_abandoned: usize,
    pub candidates: usize,
    pub timings: StageTimings,
}

/// End-to-end fact check of one page.
pub struct FactChecker {
    fetcher: PageFetcher,
    chunker: Chunker,
    extractor: Extractor,
    verifier: Verifier,
    labels: Arc<LabelResolver>,
}

impl FactChecker {
    pub fn new(
        fetcher: PageFetcher,
        chunker: Chunker,
        extractor: Extractor,
        verifier: Verifier,
        labels: Arc<LabelResolver>,
    ) -> Self {
        Self {
            fetcher,
            chunker,
            extractor,
            verifier,
            labels,
        }
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn labels(&self) -> &LabelResolver {
        &self.labels
    }

    pub async fn check(&self, url: &str) -> Result<CheckReport, CheckError> {
        let started = Instant::now();
        info!(url, "Fetching page");

        let html = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| CheckError::UpstreamFetch {
                url: url.to_string(),
                reason: format!("{:#}", e),
            })?;

        let fetch_ms = started.elapsed().as_millis() as u64;

        let mut report = self.check_html(url, &html).await?;
        report.timings.fetch_ms = fetch_ms;
        Ok(report)
    }

    /// Run extraction and verification over already fetched HTML.
    pub async fn check_html(&self, url: &str, html: &str) -> Result<CheckReport, CheckError> {
        let chunks = ingest::chunk_page(url, html, &self.chunker);
        if chunks.is_empty() {
            info!(url, "No text in page");
        }

        let extract_started = Instant::now();
        let extraction = self
            .extractor
            .extract_chunks(&chunks)
            .await
            .map_err(|e| CheckError::ExtractionStage(format!("{:#}", e)))?;
        let extract_ms = extract_started.elapsed().as_millis() as u64;

        let candidates = extraction.candidates.len();
        let groups = group_relations(extraction.candidates);
        info!(url, candidates, relations = groups.len(), "Relations extracted");

        let verify_started = Instant::now();
        let mut relations = Vec::with_capacity(groups.len());
        for group in &groups {
            // Only check once per distinct relation
            let verification = self.verifier.verify(group.triple()).await?;
            relations.push(assemble(group, &verification, &self.labels).await);
        }
        let verify_ms = verify_started.elapsed().as_millis() as u64;

        Ok(CheckReport {
            relations,
            chunks: chunks.len(),
            chunks_succeeded: extraction.succeeded,
            chunks_dropped: extraction.dropped,
            chunks_abandoned: extraction.abandoned,
            candidates,
            timings: StageTimings {
                fetch_ms: 0,
                extract_ms,
                verify_ms,
            },
        })
    }
}
