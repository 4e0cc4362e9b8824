use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::answer::Answer;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can end a lookup early.
///
/// Every variant is terminal for the request and ends up as the `error`
/// field of a 200 response, never as an HTTP status.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Not input params")]
    NoInputParams,

    #[error("{0}")]
    Decode(#[source] BoxError),

    #[error("{0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Fetch(#[from] reqwest::Error),

    #[error("The response does not contain information about the token or the response format has been changed or timeOut.")]
    SchemaMismatch { found: usize },

    #[error("Requested ({requested}) and received ({received}) token do not match.")]
    TokenMismatch { requested: String, received: String },

    #[error("lookup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LookupError {
    pub fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }

    /// Errors raised before a token is known carry no `(<token>)` prefix.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NoInputParams | Self::Decode(_))
    }
}

/// Rejection used by the request extractor: the caller still gets a
/// well-formed answer with status 200.
impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        tracing::warn!(error = ?self, "Request Error");

        Json(Answer::failed(self.to_string())).into_response()
    }
}
