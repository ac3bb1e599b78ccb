use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub services: ServiceConfig,
    pub concurrency: ConcurrencyConfig,
    pub chunking: ChunkingConfig,
    pub corpus: CorpusConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub extraction_url: String,
    pub label_api_url: String,
    /// Per-lookup bound; a slow lookup falls back to "unknown"
    pub label_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub max_concurrent_extractions: usize,
    pub request_timeout_secs: u64,
    pub extraction_deadline_secs: u64,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_paragraphs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub dir: String,
    pub file_prefix: String,
    /// Load the corpus at startup instead of on the first check
    pub eager: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Used when RUST_LOG is not set
    pub default_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:8081".to_string(),
            },
            services: ServiceConfig {
                extraction_url: "http://localhost:8080/api/en/extract".to_string(),
                label_api_url: "https://www.wikidata.org/w/api.php".to_string(),
                label_timeout_secs: 10,
            },
            concurrency: ConcurrencyConfig {
                max_concurrent_extractions: 10,
                request_timeout_secs: 60,
                extraction_deadline_secs: 120,
                fetch_timeout_secs: 10,
            },
            chunking: ChunkingConfig { max_paragraphs: 10 },
            corpus: CorpusConfig {
                dir: "extractions".to_string(),
                file_prefix: "part-".to_string(),
                eager: false,
            },
            logging: LoggingConfig {
                format: LogFormat::Pretty,
                default_filter: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Defaults, overridden by `FACTCHECK_*` variables (a `.env` file is
    /// loaded first when present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("FACTCHECK_BIND_ADDR") {
            config.server.bind_addr = v;
        }
        if let Some(v) = lookup("FACTCHECK_EXTRACTION_URL") {
            config.services.extraction_url = v;
        }
        if let Some(v) = lookup("FACTCHECK_LABEL_API_URL") {
            config.services.label_api_url = v;
        }
        if let Some(v) = lookup("FACTCHECK_CORPUS_DIR") {
            config.corpus.dir = v;
        }
        if let Some(v) = lookup("FACTCHECK_CORPUS_PREFIX") {
            config.corpus.file_prefix = v;
        }

        let c = &mut config.concurrency;
        parse_into(&lookup, "FACTCHECK_MAX_CONCURRENT_EXTRACTIONS", &mut c.max_concurrent_extractions)?;
        parse_into(&lookup, "FACTCHECK_REQUEST_TIMEOUT_SECS", &mut c.request_timeout_secs)?;
        parse_into(&lookup, "FACTCHECK_EXTRACTION_DEADLINE_SECS", &mut c.extraction_deadline_secs)?;
        parse_into(&lookup, "FACTCHECK_FETCH_TIMEOUT_SECS", &mut c.fetch_timeout_secs)?;
        parse_into(&lookup, "FACTCHECK_LABEL_TIMEOUT_SECS", &mut config.services.label_timeout_secs)?;
        parse_into(&lookup, "FACTCHECK_MAX_PARAGRAPHS", &mut config.chunking.max_paragraphs)?;
        parse_into(&lookup, "FACTCHECK_CORPUS_EAGER", &mut config.corpus.eager)?;

        if let Some(v) = lookup("FACTCHECK_LOG_FORMAT") {
            config.logging.format = match v.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => anyhow::bail!("Unknown log format: {}", other),
            };
        }

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let c = &self.concurrency;
        if c.max_concurrent_extractions == 0 {
            anyhow::bail!("max_concurrent_extractions must be greater than 0");
        }
        if c.request_timeout_secs == 0 || c.extraction_deadline_secs == 0 || c.fetch_timeout_secs == 0 {
            anyhow::bail!("timeouts must be greater than 0");
        }
        if c.request_timeout_secs > c.extraction_deadline_secs {
            anyhow::bail!("request_timeout_secs cannot exceed extraction_deadline_secs");
        }
        if self.services.label_timeout_secs == 0 {
            anyhow::bail!("label_timeout_secs must be greater than 0");
        }
        if self.chunking.max_paragraphs == 0 {
            anyhow::bail!("max_paragraphs must be greater than 0");
        }
        Ok(())
    }

    pub fn extractor(&self) -> extract::ExtractorConfig {
        extract::ExtractorConfig {
            max_in_flight: self.concurrency.max_concurrent_extractions,
            call_timeout: Duration::from_secs(self.concurrency.request_timeout_secs),
            overall_timeout: Duration::from_secs(self.concurrency.extraction_deadline_secs),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.concurrency.fetch_timeout_secs)
    }

    pub fn label_timeout(&self) -> Duration {
        Duration::from_secs(self.services.label_timeout_secs)
    }
}

fn parse_into<F, T>(lookup: &F, key: &str, target: &mut T) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, raw, e))?;
    }
    Ok(())
}
