//! HTTP request handlers for the analysis API.
//!
//! JSON in, JSON out. Domain records are converted into response DTOs here:
//! ids become hyphenated UUID strings and timestamps RFC 3339.

use crate::registry::{BatchRecord, BatchRegistry};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use gleaner_domain::{Analysis, AnalysisId, AnalysisQuery};
use gleaner_extractor::LlmExtractor;
use gleaner_llm::LlmClient;
use gleaner_pipeline::{
    AnalysisError, AnalysisService, BatchItem, BatchOrchestrator, BatchOutcome, BatchRun,
    PipelineConfig,
};
use gleaner_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Extraction client used by the server
pub type Extractor = LlmExtractor<LlmClient>;

/// Analysis service used by the server
pub type Service = AnalysisService<Extractor, SqliteStore>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Batch fan-out; also owns the shared analysis service
    pub orchestrator: BatchOrchestrator<Extractor, SqliteStore>,
    /// Background batches
    pub batches: BatchRegistry,
    /// Model name reported by the health check
    pub model: String,
}

impl AppState {
    /// Wrap a service and batch limits into handler state
    pub fn new(service: Service, pipeline: PipelineConfig, model: impl Into<String>) -> Self {
        Self {
            orchestrator: BatchOrchestrator::new(Arc::new(service), pipeline),
            batches: BatchRegistry::new(),
            model: model.into(),
        }
    }

    /// The shared analysis service
    pub fn service(&self) -> &Service {
        self.orchestrator.service()
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Text to analyze
    pub text: String,
}

/// Body of `POST /batch` and `POST /batch/analyze`
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Texts to analyze, in order
    pub texts: Vec<String>,
}

/// Query string of `GET /search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Topic substring
    pub topic: Option<String>,
    /// Keyword substring
    pub keyword: Option<String>,
    /// Page size
    pub limit: Option<usize>,
    /// Results to skip
    pub offset: Option<usize>,
}

impl SearchParams {
    fn to_query(&self) -> AnalysisQuery {
        AnalysisQuery {
            topic: self.topic.clone(),
            keyword: self.keyword.clone(),
            limit: self.limit,
            offset: self.offset.unwrap_or(0),
        }
    }
}

/// A stored analysis as returned over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Hyphenated UUID
    pub id: String,
    /// Submitted text
    pub original_text: String,
    /// Summary; empty for failed analyses
    pub summary: String,
    /// Title, when one was produced
    pub title: Option<String>,
    /// Topics
    pub topics: Vec<String>,
    /// `positive`, `negative`, `neutral` or `unknown`
    pub sentiment: String,
    /// Keywords
    pub keywords: Vec<String>,
    /// Quality score in [0, 1]
    pub confidence_score: f64,
    /// `completed` or `failed`
    pub status: String,
    /// Why extraction failed
    pub failure_reason: Option<String>,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl From<&Analysis> for AnalysisResponse {
    fn from(analysis: &Analysis) -> Self {
        Self {
            id: analysis.id.to_string(),
            original_text: analysis.original_text.clone(),
            summary: analysis.summary.clone(),
            title: analysis.title.clone(),
            topics: analysis.topics.clone(),
            sentiment: analysis.sentiment.as_str().to_string(),
            keywords: analysis.keywords.clone(),
            confidence_score: analysis.confidence_score,
            status: analysis.status.as_str().to_string(),
            failure_reason: analysis.failure_reason.clone(),
            created_at: rfc3339_millis(analysis.created_at),
        }
    }
}

fn rfc3339_millis(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Response of `GET /search`
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Page of matches, newest first
    pub analyses: Vec<AnalysisResponse>,
    /// Matches ignoring pagination
    pub total: usize,
    /// Page size applied
    pub limit: usize,
    /// Results skipped
    pub offset: usize,
}

/// One item of a batch response
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItemResponse {
    /// Position in the submitted list
    pub index: usize,
    /// True when a completed analysis was produced
    pub success: bool,
    /// Stored analysis, completed or failed
    pub analysis: Option<AnalysisResponse>,
    /// Why the item did not succeed
    pub error: Option<String>,
}

impl BatchItemResponse {
    fn new(index: usize, item: &BatchItem) -> Self {
        match &item.outcome {
            BatchOutcome::Analyzed(analysis) => Self {
                index,
                success: analysis.is_completed(),
                analysis: Some(AnalysisResponse::from(analysis)),
                error: analysis.failure_reason.clone(),
            },
            BatchOutcome::Rejected { reason } => Self {
                index,
                success: false,
                analysis: None,
                error: Some(reason.clone()),
            },
        }
    }
}

/// Outcomes of a whole batch
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRunResponse {
    /// Per-text outcomes in input order
    pub results: Vec<BatchItemResponse>,
    /// Texts submitted
    pub total: usize,
    /// Completed analyses
    pub succeeded: usize,
    /// Everything else
    pub failed: usize,
}

impl From<&BatchRun> for BatchRunResponse {
    fn from(run: &BatchRun) -> Self {
        Self {
            results: run
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| BatchItemResponse::new(index, item))
                .collect(),
            total: run.total(),
            succeeded: run.succeeded(),
            failed: run.failed(),
        }
    }
}

/// Response of `POST /batch/analyze`
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchAcceptedResponse {
    /// Id to poll with `GET /batch/{batch_id}`
    pub batch_id: String,
    /// Human-readable acknowledgement
    pub message: String,
    /// Texts accepted
    pub total_texts: usize,
}

/// Response of `GET /batch/{batch_id}`
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchStatusResponse {
    /// Batch id
    pub batch_id: String,
    /// `processing` or `completed`
    pub status: String,
    /// Texts submitted
    pub total_texts: usize,
    /// Texts resolved so far
    pub processed: usize,
    /// RFC 3339 submission time
    pub submitted_at: String,
    /// Outcomes, once completed
    pub result: Option<BatchRunResponse>,
}

impl From<&BatchRecord> for BatchStatusResponse {
    fn from(record: &BatchRecord) -> Self {
        Self {
            batch_id: record.batch_id.clone(),
            status: record.status.as_str().to_string(),
            total_texts: record.total,
            processed: record.processed,
            submitted_at: record.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            result: record.run.as_ref().map(BatchRunResponse::from),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// `healthy`, or `degraded` when the store cannot be read
    pub status: String,
    /// Model used for extraction
    pub model: String,
    /// Number of stored analyses, when the store is readable
    pub stored_analyses: Option<usize>,
    /// Server version
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Error from the analysis pipeline
    Analysis(AnalysisError),
    /// Path id is not a UUID
    InvalidId(String),
    /// No background batch with this id
    BatchNotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Analysis(e @ AnalysisError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Analysis(e @ AnalysisError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::Analysis(e @ AnalysisError::Store(_)) => {
                error!("Store failure while serving request: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::InvalidId(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BatchNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Batch not found: {}", id))
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        AppError::Analysis(e)
    }
}

/// POST /analyze - Analyze one text
async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let analysis = state.service().analyze(&request.text).await?;
    Ok(Json(AnalysisResponse::from(&analysis)))
}

/// POST /batch - Analyze a batch and wait for every item
async fn analyze_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchRunResponse>, AppError> {
    state.orchestrator.check_batch(&request.texts)?;
    let run = state.orchestrator.analyze_batch(request.texts).await;
    Ok(Json(BatchRunResponse::from(&run)))
}

/// POST /batch/analyze - Start a batch in the background
async fn submit_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<(StatusCode, Json<BatchAcceptedResponse>), AppError> {
    state.orchestrator.check_batch(&request.texts)?;

    let total_texts = request.texts.len();
    let batch_id = state.batches.register(total_texts);
    info!(batch_id = %batch_id, total_texts, "Background batch accepted");

    let orchestrator = state.orchestrator.clone();
    let batches = state.batches.clone();
    let id = batch_id.clone();
    tokio::spawn(async move {
        let run = orchestrator
            .analyze_batch_observed(request.texts, |_, _| batches.record_progress(&id))
            .await;
        batches.complete(&id, run);
        info!(batch_id = %id, "Background batch finished");
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(BatchAcceptedResponse {
            batch_id,
            message: format!("Batch processing started for {} texts", total_texts),
            total_texts,
        }),
    ))
}

/// GET /batch/:batch_id - Poll a background batch
async fn batch_status(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchStatusResponse>, AppError> {
    let record = state
        .batches
        .get(&batch_id)
        .ok_or(AppError::BatchNotFound(batch_id))?;
    Ok(Json(BatchStatusResponse::from(&record)))
}

/// GET /search - Filter stored analyses by topic and keyword
async fn search_analyses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.to_query();
    let page = state.service().search(&query)?;

    Ok(Json(SearchResponse {
        analyses: page.analyses.iter().map(AnalysisResponse::from).collect(),
        total: page.total,
        limit: query.effective_limit(),
        offset: query.offset,
    }))
}

/// GET /analysis/:id - Fetch one stored analysis
async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let id = AnalysisId::from_string(&id).map_err(AppError::InvalidId)?;
    let analysis = state.service().get(id)?;
    Ok(Json(AnalysisResponse::from(&analysis)))
}

/// GET /health - Liveness plus a store read
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let probe = AnalysisQuery::new().with_limit(1);
    let (status, stored_analyses) = match state.service().search(&probe) {
        Ok(page) => ("healthy", Some(page.total)),
        Err(e) => {
            error!("Health check could not read the store: {}", e);
            ("degraded", None)
        }
    };

    Json(HealthCheckResponse {
        status: status.to_string(),
        model: state.model.clone(),
        stored_analyses,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_text))
        .route("/batch", post(analyze_batch))
        .route("/batch/analyze", post(submit_batch))
        .route("/batch/:batch_id", get(batch_status))
        .route("/search", get(search_analyses))
        .route("/analysis/:id", get(get_analysis))
        .route("/health", get(health_check))
        .with_state(state)
}
