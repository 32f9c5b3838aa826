//! Fetches a download listing through a dedicated browser session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::DownloadRequest;
use crate::browser::{Session, SessionManager};
use crate::error::RelayError;

/// In-page fetch of the listing, called with `(downloadApiUrl, movieUrl)`.
///
/// Runs inside the catalog page so the request carries the site's cookies.
/// Failures are returned as `{ error }` rather than thrown.
pub const FETCH_LISTING_SCRIPT: &str = r#"
async (url, referer) => {
    try {
        const response = await fetch(url, {
            method: 'GET',
            headers: {
                'Referer': referer,
                'Accept': 'application/json'
            },
            referrer: referer,
            credentials: 'include'
        });
        return await response.json();
    } catch (err) {
        return { error: 'Failed to fetch download data inside browser.' };
    }
}
"#;

/// Successful relay of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectDownloadResponse {
    pub subject_id: String,
    pub movie_url: String,
    pub download_api_url: String,
    pub data: Value,
}

/// Runs each request in its own browser session.
#[derive(Clone)]
pub struct DownloadService {
    sessions: Arc<dyn SessionManager>,
    /// Caps concurrent sessions when set. Unbounded otherwise.
    session_limit: Option<Arc<Semaphore>>,
}

impl DownloadService {
    /// `max_sessions` of `None` or `Some(0)` leaves sessions unbounded.
    pub fn new(sessions: Arc<dyn SessionManager>, max_sessions: Option<usize>) -> Self {
        Self {
            sessions,
            session_limit: max_sessions
                .filter(|&n| n > 0)
                .map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Fetch the listing for `request`.
    ///
    /// The work runs on its own task, so a caller that goes away mid-request
    /// does not cut the session short before it is released.
    pub async fn fetch(
        &self,
        request: DownloadRequest,
    ) -> Result<DirectDownloadResponse, RelayError> {
        let service = self.clone();
        tokio::spawn(async move { service.fetch_listing(&request).await })
            .await
            .map_err(|e| RelayError::Unexpected(format!("Download task failed: {}", e)))?
    }

    async fn fetch_listing(
        &self,
        request: &DownloadRequest,
    ) -> Result<DirectDownloadResponse, RelayError> {
        let _permit = match self.session_limit {
            Some(ref limit) => Some(
                limit
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| RelayError::Unexpected(e.to_string()))?,
            ),
            None => None,
        };

        let download_api_url = request.download_api_url();

        let mut session = self.sessions.acquire().await?;
        let result = run_listing_fetch(session.as_mut(), request, &download_api_url).await;
        session.release().await;

        let data = result?;
        if let Some(message) = backend_error(&data) {
            return Err(RelayError::Backend(message));
        }

        Ok(DirectDownloadResponse {
            subject_id: request.subject_id.clone(),
            movie_url: request.movie_url.clone(),
            download_api_url,
            data,
        })
    }
}

/// Navigate to the catalog page, then fetch the listing from inside it.
async fn run_listing_fetch(
    session: &mut dyn Session,
    request: &DownloadRequest,
    download_api_url: &str,
) -> Result<Value, RelayError> {
    session.navigate(&request.movie_url).await?;

    info!(
        "📡 Fetching download data for subjectId: {}",
        request.subject_id
    );
    let args = [
        Value::String(download_api_url.to_string()),
        Value::String(request.movie_url.clone()),
    ];
    let data = session.run_in_page(FETCH_LISTING_SCRIPT, &args).await?;
    debug!("Listing response: {}", data);

    Ok(data)
}

/// Message of a truthy `error` field, if the value carries one.
fn backend_error(data: &Value) -> Option<String> {
    match data.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
