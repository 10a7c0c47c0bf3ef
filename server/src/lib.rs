use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::get, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tfidf_core::stats::TermStat;
use tfidf_core::{Corpus, DocId, Document, SearchHit, DEFAULT_K};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_K }

#[derive(Deserialize)]
pub struct VocabParams {
    #[serde(default = "default_top")]
    pub top: usize,
}
fn default_top() -> usize { 20 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize, Deserialize)]
pub struct AddResponse {
    pub doc_id: DocId,
}

/// Shared corpus: searches take the read lock, document changes the write lock.
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<RwLock<Corpus>>,
    pub admin_token: Option<String>,
}

pub fn build_app(corpus: Corpus, admin_token: Option<String>) -> Router {
    let app_state = AppState { corpus: Arc::new(RwLock::new(corpus)), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/vocab", get(vocab_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/docs", axum::routing::post(add_doc))
        .route("/docs/:doc_id", axum::routing::delete(remove_doc))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.min(MAX_K);
    let mut results = state.corpus.read().search(&params.q, usize::MAX);
    let total_hits = results.len();
    results.truncate(k);
    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(query = %params.q, total_hits, took_s, "search");
    Json(SearchResponse { query: params.q, took_s, total_hits, results })
}

pub async fn vocab_handler(
    State(state): State<AppState>,
    Query(params): Query<VocabParams>,
) -> Json<Vec<TermStat>> {
    let mut vocab = state.corpus.read().vocabulary();
    vocab.truncate(params.top);
    Json(vocab)
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let corpus = state.corpus.read();
    let doc = corpus.get(doc_id).ok_or((StatusCode::NOT_FOUND, "not found".to_string()))?;
    Ok(Json(serde_json::json!({
        "doc_id": doc_id,
        "title": doc.title,
        "author": doc.author_line(),
        "date": doc.date,
        "url": doc.url,
        "type": doc.kind.label(),
        "text": doc.text,
    })))
}

async fn add_doc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(doc): Json<Document>,
) -> Result<(StatusCode, Json<AddResponse>), (StatusCode, String)> {
    authorize(&state, &headers)?;
    let doc_id = state
        .corpus
        .write()
        .add(doc)
        .map_err(|e| (StatusCode::INSUFFICIENT_STORAGE, e.to_string()))?;
    tracing::info!(doc_id, "document added");
    Ok((StatusCode::CREATED, Json(AddResponse { doc_id })))
}

async fn remove_doc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocId>,
) -> Result<StatusCode, (StatusCode, String)> {
    authorize(&state, &headers)?;
    match state.corpus.write().remove(doc_id) {
        Some(_) => {
            tracing::info!(doc_id, "document removed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err((StatusCode::NOT_FOUND, "not found".into())),
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
