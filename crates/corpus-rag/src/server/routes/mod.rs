//! API routes for the retrieve-and-query server

pub mod query;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_body_size: usize) -> Router<AppState> {
    Router::new()
        // Retrieve and query; any other method is answered with 405
        .route(
            "/retrieveandquery",
            post(query::retrieve_and_query)
                .fallback(query::method_not_allowed)
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let config = state.config();
    axum::Json(serde_json::json!({
        "name": "corpus-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Retrieval-augmented answers over caller-supplied, pre-embedded corpora",
        "model": state.llm_provider().model(),
        "embedding_model": config.embeddings.model,
        "retrieval": {
            "default_top_k": config.retrieval.default_top_k,
            "max_top_k": config.retrieval.max_top_k,
            "metric": config.retrieval.metric,
        },
        "endpoints": {
            "POST /api/retrieveandquery": "Retrieve top-K fragments and answer (or extract characters)",
            "GET /api/info": "Service information",
            "GET /health": "Liveness check",
            "GET /ready": "Readiness check (model provider reachable)"
        }
    }))
}
