use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::schema::RelationCandidate;

/// Anything that turns a piece of text into relation candidates.
#[async_trait]
pub trait RelationSource: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<RelationCandidate>>;
}

/// HTTP client for the relation extraction service.
#[derive(Clone)]
pub struct ExtractionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl ExtractionClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for ExtractionClient {
    fn default() -> Self {
        Self::new("http://localhost:8080/api/en/extract".to_string())
    }
}

#[async_trait]
impl RelationSource for ExtractionClient {
    async fn extract(&self, text: &str) -> Result<Vec<RelationCandidate>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body(text.to_owned())
            .send()
            .await
            .context("Failed to send request to extraction service")?;

        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("Extraction request failed: {}", response.status());
        }

        response
            .json::<Vec<RelationCandidate>>()
            .await
            .context("Failed to parse extraction response")
    }
}
