//! Retrieve-and-query endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    Json,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryResponse, RetrieveAndQueryRequest};

/// POST /api/retrieveandquery - answer a query over the supplied corpus
pub async fn retrieve_and_query(
    State(state): State<AppState>,
    body: std::result::Result<Json<RetrieveAndQueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("retrieveandquery", %request_id);

    let Json(request) = body.map_err(|rejection| {
        span.in_scope(|| tracing::warn!("Rejected request body: {}", rejection.body_text()));
        Error::from(rejection)
    })?;

    let payload = state.pipeline().run(request).instrument(span.clone()).await;

    match payload {
        Ok(payload) => Ok(Json(payload.into())),
        Err(e) => {
            span.in_scope(|| tracing::warn!("Request failed: {}", e));
            Err(e)
        }
    }
}

/// Any non-POST method on the retrieve-and-query route
pub async fn method_not_allowed(method: Method) -> Error {
    tracing::debug!("Rejecting {} on /api/retrieveandquery", method);
    Error::MethodNotAllowed
}
