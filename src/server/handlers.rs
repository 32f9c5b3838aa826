//! HTTP request handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::AppState;
use crate::download::{DirectDownloadResponse, DownloadRequest};
use crate::error::RelayError;

/// Raw query pairs in request order.
///
/// Extracted as pairs rather than a struct so repeated keys and malformed
/// numbers reach the handler instead of being rejected by the extractor.
pub type QueryPairs = Vec<(String, String)>;

/// First value given for `key`, if any.
fn first_value<'a>(pairs: &'a QueryPairs, key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Relay the download listing for a MovieBox title page.
pub async fn direct_download(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<DirectDownloadResponse>, RelayError> {
    let request = DownloadRequest::parse(
        first_value(&pairs, "url"),
        first_value(&pairs, "se"),
        first_value(&pairs, "ep"),
    )?;

    let response = state.downloads.fetch(request).await?;
    Ok(Json(response))
}
