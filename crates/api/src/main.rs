mod config;
mod metrics;

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use config::{AppConfig, LogFormat, LoggingConfig};
use metrics::{Metrics, MetricsSnapshot, TimedOperation};
use verify::{CheckError, FactChecker, LabelResolver, Verifier, WikidataClient};

struct AppState {
    checker: FactChecker,
    metrics: Arc<Metrics>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckParams {
    url: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    corpus_loaded: bool,
}

#[derive(Serialize)]
struct StatsResponse {
    metrics: MetricsSnapshot,
    corpus: corpus::CorpusStats,
    labels_cached: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Initialize tracing
    init_tracing(&config.logging);

    let state = Arc::new(build_state(&config)?);

    if config.corpus.eager {
        match state.checker.verifier().corpus().get_or_load().await {
            Ok(index) => tracing::info!(records = index.len(), "Corpus preloaded"),
            Err(e) => tracing::warn!(error = %e, "Corpus preload failed, will retry on first check"),
        }
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .context(format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!("Server listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.default_filter));

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let fetcher = ingest::PageFetcher::new(config.fetch_timeout())?;

    let chunker = ingest::Chunker::new(ingest::ChunkerConfig {
        max_paragraphs: config.chunking.max_paragraphs,
        ..ingest::ChunkerConfig::default()
    });

    let extraction_client = extract::ExtractionClient::new(config.services.extraction_url.clone());
    let extractor = extract::Extractor::new(Arc::new(extraction_client), config.extractor());

    let corpus = corpus::CorpusCache::new(corpus::CorpusLoader::new(
        &config.corpus.dir,
        config.corpus.file_prefix.clone(),
    ));
    let verifier = Verifier::new(Arc::new(corpus));

    let labels = LabelResolver::new(Arc::new(WikidataClient::new(
        config.services.label_api_url.clone(),
        config.label_timeout(),
    )?));

    Ok(AppState {
        checker: FactChecker::new(fetcher, chunker, extractor, verifier, Arc::new(labels)),
        metrics: Metrics::new(),
    })
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/check", get(check_get).post(check_post))
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> &'static str {
    "POST with URL to /check to do fact checking"
}

async fn check_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckParams>,
) -> Response {
    run_check(state, params.url).await
}

async fn check_post(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckParams>,
    form: Option<Form<CheckParams>>,
) -> Response {
    let url = form.and_then(|Form(f)| f.url).or(params.url);
    run_check(state, url).await
}

async fn run_check(state: Arc<AppState>, url: Option<String>) -> Response {
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        state.metrics.record_bad_request();
        return (StatusCode::BAD_REQUEST, "No URL to check supplied").into_response();
    };

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("check", %request_id, url = %url);

    async move {
        let timer = TimedOperation::start();

        match state.checker.check(&url).await {
            Ok(report) => {
                state.metrics.record_check(timer.elapsed(), &report);
                tracing::info!(
                    relations = report.relations.len(),
                    dropped = report.chunks_dropped,
                    elapsed_ms = timer.elapsed().as_millis() as u64,
                    "Check complete"
                );
                Json(report.relations).into_response()
            }
            Err(e) => {
                state.metrics.record_failure(timer.elapsed(), &e);
                tracing::error!(stage = e.stage(), error = %e, "Check failed");
                (error_status(&e), e.public_message()).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

fn error_status(error: &CheckError) -> StatusCode {
    match error {
        CheckError::UpstreamFetch { .. }
        | CheckError::ExtractionStage(_)
        | CheckError::CorpusLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        corpus_loaded: state.checker.verifier().corpus().is_loaded(),
    })
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        metrics: state.metrics.snapshot(),
        corpus: state.checker.verifier().corpus().stats(),
        labels_cached: state.checker.labels().cached(),
    })
}
