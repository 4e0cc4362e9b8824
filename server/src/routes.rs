use axum::extract::State;
use tracing::{info, info_span, warn, Instrument as _};

use crate::{
    answer::{compose, Answer},
    errors::LookupError,
    extract::TokenInfo,
    input::RequestPayload,
    state::AppState,
};

/// Build the application router.
///
/// Every path and method lands on the lookup handler; methods other than
/// GET and POST are answered with the missing-input error.
pub fn routes(app_state: AppState) -> axum::Router {
    axum::Router::new()
        .fallback(lookup)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

#[axum_macros::debug_handler(state = AppState)]
async fn lookup(State(state): State<AppState>, payload: RequestPayload) -> Answer {
    let kind = payload.kind();
    let token = match payload.into_token().await {
        Ok(token) => token,
        Err(err) => {
            warn!(payload = kind, error = %err, "No usable token in request");
            return Answer::failed(err.to_string());
        }
    };

    // Runs on its own task so a caller hanging up does not abort the fetch.
    let span = info_span!("lookup_token", token = %token, payload = kind);
    let outcome = tokio::spawn(lookup_token(state, token.clone()).instrument(span))
        .await
        .unwrap_or_else(|err| Err(LookupError::from(err)));

    let answer = compose(&token, outcome);
    if answer.is_error() {
        warn!(token = %token, error = %answer.error, "Lookup failed");
    } else {
        info!(token = %token, token_type = %answer.token_type, "Lookup succeeded");
    }

    answer
}

/// Fetches the explorer page for `token` and extracts its fields.
pub async fn lookup_token(state: AppState, token: String) -> Result<TokenInfo, LookupError> {
    let body = state.explorer.fetch_token_page(&token).await?;

    state.selectors.extract(&body)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use tower::ServiceExt as _;

    use super::*;
    use crate::config::Config;

    fn app() -> axum::Router {
        // Nothing in these tests reaches the explorer.
        let config = Config {
            explorer_base_url: "http://127.0.0.1:9/token/".to_string(),
            fetch_timeout: Duration::from_secs(1),
            ..Default::default()
        };

        routes(AppState::from_config(&config).unwrap())
    }

    async fn answer_for(request: Request<Body>) -> Answer {
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_method_answers_with_200() {
        let request = Request::builder()
            .method("PUT")
            .uri("/?token=0xabc")
            .body(Body::empty())
            .unwrap();

        assert_eq!(answer_for(request).await, Answer::failed("Not input params"));
    }

    #[tokio::test]
    async fn test_missing_token_on_any_path() {
        let request = Request::builder()
            .method("GET")
            .uri("/some/nested/path")
            .body(Body::empty())
            .unwrap();

        assert_eq!(answer_for(request).await.error, "Not input params");
    }

    #[tokio::test]
    async fn test_decode_error_is_not_prefixed() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("[1, 2"))
            .unwrap();

        let answer = answer_for(request).await;

        assert!(answer.is_error());
        assert!(!answer.error.starts_with('('));
        assert!(answer.token.is_empty());
    }
}
