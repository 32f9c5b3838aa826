//! Request pipeline errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::browser::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("❌ Provide a valid MovieBox URL using 'url' query param.")]
    InvalidUrl,
    #[error("❌ Cannot extract subjectId from the given URL.")]
    MissingSubjectId,
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The in-page fetch reported an `error` value instead of a listing.
    #[error("{0}")]
    Backend(String),
    #[error("{0}")]
    Unexpected(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidUrl | RelayError::MissingSubjectId => StatusCode::BAD_REQUEST,
            RelayError::Session(_) | RelayError::Backend(_) | RelayError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON body of every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ Error: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
