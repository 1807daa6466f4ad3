use axum::{extract::{DefaultBodyLimit, Query, State}, http::{HeaderMap, HeaderValue, StatusCode}, routing::{get, post}, Json, Router};
use lexindex::persist::{read_state_blob, IndexPaths};
use lexindex::{IndexState, IndexStats, InputDocument, RetrievalIndex, SearchHit, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Upper bound on `k` for a single search request.
pub const MAX_K: usize = 100;
/// Largest accepted request body. A rebuild carries the whole corpus, so the
/// axum default of 2 MiB is far too small for a real project.
pub const MAX_BODY_BYTES: usize = 256 * 1024 * 1024;
pub const ADMIN_TOKEN_HEADER: &str = "X-ADMIN-TOKEN";

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_LIMIT }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    pub documents: Vec<InputDocument>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<RetrievalIndex>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(index: Arc<RetrievalIndex>, admin_token: Option<String>) -> Self {
        Self { index, admin_token }
    }
}

/// Build the app with a fresh index, restoring the cached idf + snippets from
/// `index_dir` when present. The admin token comes from `ADMIN_TOKEN`.
pub fn build_app(index_dir: Option<String>) -> Router {
    let index = Arc::new(RetrievalIndex::new());
    if let Some(dir) = index_dir {
        restore_cached_state(&index, Path::new(&dir));
    }
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    router(AppState::new(index, admin_token))
}

/// A missing or corrupt cache is not fatal: the server starts with an empty index.
pub fn restore_cached_state(index: &RetrievalIndex, dir: &Path) {
    let paths = IndexPaths::new(dir);
    match read_state_blob(&paths) {
        Ok(blob) => {
            if index.import_state_json(&blob).is_ok() {
                tracing::info!(dir = %dir.display(), "restored cached index state; rebuild to enable search");
            }
        }
        Err(e) => tracing::info!(error = %e, "no cached index state"),
    }
}

/// Origins from a comma-separated list; any origin when the list is unset or unparsable.
pub fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allow_origin
        .into_iter()
        .flat_map(|val| val.split(','))
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref());
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/index", post(index_handler))
        .route("/state", get(export_handler).post(import_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn internal_error(e: tokio::task::JoinError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("background task failed: {e}"))
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let k = params.k.min(MAX_K);
    // Scoring walks every document vector; keep it off the async workers.
    let index = state.index.clone();
    let query = params.q.clone();
    let mut results = tokio::task::spawn_blocking(move || index.search(&query, usize::MAX))
        .await
        .map_err(internal_error)?;
    let total_hits = results.len();
    results.truncate(k);
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

async fn index_handler(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<IndexRequest>) -> Result<Json<IndexStats>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let index = state.index.clone();
    // CPU-bound rebuild; searches keep using the previous snapshot meanwhile.
    let stats = tokio::task::spawn_blocking(move || index.create_index(&req.documents))
        .await
        .map_err(internal_error)?;
    Ok(Json(stats))
}

async fn export_handler(State(state): State<AppState>) -> Json<IndexState> {
    Json(state.index.export_state())
}

async fn import_handler(State(state): State<AppState>, headers: HeaderMap, body: String) -> Result<Json<IndexStats>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    state
        .index
        .import_state_json(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("{e:#}")))?;
    Ok(Json(state.index.stats()))
}

/// Admin endpoints are closed unless a token is configured and presented.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err((StatusCode::UNAUTHORIZED, "admin endpoints disabled: ADMIN_TOKEN not set".into()));
    };
    match headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        Some(given) if given == expected => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "missing or invalid admin token".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_checks_configured_token() {
        let state = AppState::new(Arc::new(RetrievalIndex::new()), Some("s3cret".into()));
        let mut headers = HeaderMap::new();
        assert!(authorize(&state, &headers).is_err());
        headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_static("nope"));
        assert!(authorize(&state, &headers).is_err());
        headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_static("s3cret"));
        assert!(authorize(&state, &headers).is_ok());

        let closed = AppState::new(Arc::new(RetrievalIndex::new()), None);
        assert_eq!(authorize(&closed, &headers).unwrap_err().0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn cors_layer_accepts_lists_and_garbage() {
        // Construction must not panic for any of these inputs.
        let _ = cors_layer(None);
        let _ = cors_layer(Some(""));
        let _ = cors_layer(Some("http://localhost:5173, https://app.example.com"));
        let _ = cors_layer(Some("\n not a header \u{7f}"));
    }
}
