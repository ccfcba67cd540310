//! HTTP facade over the indexing and search engine.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/healthz` | Health check: status, embedding mode, version |
//! | `POST` | `/embed`   | Embed one code string |
//! | `POST` | `/index`   | Replace the index generation for the submitted file paths |
//! | `POST` | `/search`  | Similarity search with threshold and path filters |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Codes: `bad_request` (400), `embeddings_disabled` (400),
//! `embedding_failed` (502), `index_failed` (500), `search_failed` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients and cross-origin tool calls.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::embedding::{self, Embedder};
use crate::error::{EmbeddingError, IndexError, SearchError};
use crate::index::{IndexWriter, UpsertReceipt};
use crate::models::{CodeDocument, SearchHit};
use crate::search::SearchEngine;
use crate::store::memory::InMemoryVectorStore;
use crate::store::VectorStore;

/// Shared application state passed to all route handlers.
///
/// The embedder and store handles are the only process-wide state; both are
/// safe for concurrent use and every request runs independently against
/// them.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    embedder: Arc<dyn Embedder>,
    writer: Arc<IndexWriter>,
    engine: Arc<SearchEngine>,
}

impl AppState {
    /// Assemble the state from explicit dependencies.
    ///
    /// Tests inject doubles here; [`AppState::from_config`] wires the real
    /// providers.
    pub fn new(config: Arc<Config>, embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        let writer = Arc::new(IndexWriter::new(store.clone(), &config.index));
        let engine = Arc::new(SearchEngine::new(store));
        Self {
            config,
            embedder,
            writer,
            engine,
        }
    }

    /// Build the configured embedder and an in-memory store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let config = Arc::new(config.clone());
        let embedder = embedding::create_embedder(&config.embedding)?;
        let store = Arc::new(InMemoryVectorStore::new(embedder.clone()));
        Ok(Self::new(config, embedder, store))
    }
}

/// Starts the HTTP server.
///
/// Binds to the address configured in `[server].bind` and serves until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    info!(bind = %bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all routes and the CORS layer.
///
/// Public so tests can drive the API in-process.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(handle_health))
        .route("/embed", post(handle_embed))
        .route("/index", post(handle_index))
        .route("/search", post(handle_search))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Disabled => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "embeddings_disabled".to_string(),
                message: err.to_string(),
            },
            _ => AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "embedding_failed".to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "index_failed".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "search_failed".to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /healthz ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The configured embedding provider.
    mode: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        mode: state.config.embedding.provider.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /embed ============

#[derive(Deserialize)]
struct EmbedRequest {
    code: String,
}

#[derive(Serialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

async fn handle_embed(
    State(state): State<AppState>,
    Json(req): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, AppError> {
    if req.code.trim().is_empty() {
        return Err(bad_request("code must not be empty"));
    }

    let embedding = embedding::embed_one(state.embedder.as_ref(), &req.code).await?;
    Ok(Json(EmbedResponse { embedding }))
}

// ============ POST /index ============

#[derive(Deserialize)]
struct IndexRequest {
    documents: Vec<CodeDocument>,
}

async fn handle_index(
    State(state): State<AppState>,
    Json(req): Json<IndexRequest>,
) -> Result<Json<UpsertReceipt>, AppError> {
    if req
        .documents
        .iter()
        .any(|d| d.metadata.file_path.trim().is_empty())
    {
        return Err(bad_request("every document needs a non-empty file_path"));
    }

    let receipt = state.writer.upsert(req.documents).await?;
    Ok(Json(receipt))
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    max_results: Option<usize>,
    threshold: Option<f32>,
    include: Option<String>,
    exclude: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    let max_results = req.max_results.unwrap_or(state.config.search.default_limit);
    if max_results == 0 {
        return Err(bad_request("max_results must be >= 1"));
    }

    let threshold = req.threshold.unwrap_or(state.config.search.default_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(bad_request("threshold must be in [0.0, 1.0]"));
    }

    let results = state
        .engine
        .search(
            &req.query,
            max_results,
            threshold,
            req.exclude.as_deref(),
            req.include.as_deref(),
        )
        .await?;

    Ok(Json(SearchResponse { results }))
}
