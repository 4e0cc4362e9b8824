use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::errors::LookupError;
use crate::extract::TokenInfo;

/// The only payload this service ever returns.
///
/// Either `error` is set and both token fields are empty, or the other way
/// round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub error: String,
    pub token: String,
    #[serde(rename = "tokenType")]
    pub token_type: String,
}

impl Answer {
    pub fn found(info: TokenInfo) -> Self {
        Self {
            error: String::new(),
            token: info.token,
            token_type: info.token_type,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

impl IntoResponse for Answer {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Turns the outcome of a lookup for `requested` into the final answer.
///
/// Errors get the requested token prepended so a caller batching many
/// lookups can tell which one failed. A page describing a different token
/// than the one asked for is reported as an error, never as data.
pub fn compose(requested: &str, outcome: Result<TokenInfo, LookupError>) -> Answer {
    match outcome {
        Ok(info) if info.token == requested => Answer::found(info),
        Ok(info) => Answer::failed(
            LookupError::TokenMismatch {
                requested: requested.to_string(),
                received: info.token,
            }
            .to_string(),
        ),
        Err(err) if err.is_input_error() => Answer::failed(err.to_string()),
        Err(err) => Answer::failed(format!("({requested}) {err}")),
    }
}
