use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Label returned whenever an identifier cannot be resolved.
pub const FALLBACK_LABEL: &str = "unknown";

/// Looks up the English display name of a knowledge-base identifier.
#[async_trait]
pub trait LabelSource: Send + Sync {
    async fn label(&self, id: &str) -> Result<String>;
}

/// Client for the Wikidata `wbgetentities` API.
#[derive(Clone)]
pub struct WikidataClient {
    api_url: String,
    client: reqwest::Client,
}

impl WikidataClient {
    /// `timeout` bounds each lookup; a lookup that runs out resolves to
    /// [`FALLBACK_LABEL`] through [`LabelResolver`].
    pub fn new(api_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_url, client })
    }
}

#[async_trait]
impl LabelSource for WikidataClient {
    async fn label(&self, id: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "wbgetentities"),
                ("props", "labels"),
                ("ids", id),
                ("languages", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Failed to send label request")?;

        if !response.status().is_success() {
            anyhow::bail!("Label request failed: {}", response.status());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse label response")?;

        english_label(&body, id).context(format!("No English label for {}", id))
    }
}

/// Pull `entities.<id>.labels.en.value` out of a `wbgetentities` response.
pub fn english_label(body: &serde_json::Value, id: &str) -> Option<String> {
    body.get("entities")?
        .get(id)?
        .pointer("/labels/en/value")?
        .as_str()
        .map(str::to_string)
}

/// Resolves identifiers to labels, remembering every answer for the life of
/// the process. Failures are remembered as [`FALLBACK_LABEL`].
pub struct LabelResolver {
    source: Arc<dyn LabelSource>,
    labels: DashMap<String, String>,
}

impl LabelResolver {
    pub fn new(source: Arc<dyn LabelSource>) -> Self {
        Self {
            source,
            labels: DashMap::new(),
        }
    }

    pub async fn resolve(&self, id: &str) -> String {
        let key = id.trim().to_uppercase();
        if key.is_empty() {
            return FALLBACK_LABEL.to_string();
        }

        if let Some(label) = self.labels.get(&key) {
            return label.value().clone();
        }

        tracing::debug!(id = %key, "Resolving label");
        let label = match self.source.label(&key).await {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!(id = %key, error = %format!("{:#}", e), "Label lookup failed");
                FALLBACK_LABEL.to_string()
            }
        };

        self.labels
            .entry(key)
            .or_insert(label)
            .value()
            .clone()
    }

    pub fn cached(&self) -> usize {
        self.labels.len()
    }
}

pub fn entity_link(id: &str) -> String {
    format!("https://www.wikidata.org/wiki/{}", id)
}

pub fn wiki_link(name: &str) -> String {
    format!("https://en.wikipedia.org/wiki/{}", name.replace(' ', "_"))
}
