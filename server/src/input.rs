use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, Method},
};
use mime::Mime;
use tracing::debug;

use crate::errors::LookupError;

/// Form fields of a request, keeping only the first value of each key.
pub type InputParams = HashMap<String, String>;

/// Where the token of a request is expected to be, decided once from the
/// method and `Content-Type` before anything is decoded.
pub enum RequestPayload {
    /// GET with a non-empty `token` query parameter.
    Query(String),
    /// GET without one; the body should be a JSON string literal.
    JsonString(Bytes),
    /// POST `application/json`; the body should be an object of strings.
    JsonObject(Bytes),
    /// POST `multipart/form-data`.
    Multipart(Multipart),
    /// POST `application/x-www-form-urlencoded`.
    UrlEncoded(Bytes),
    /// Anything else. Never yields a token.
    Unsupported,
}

#[async_trait]
impl<S> FromRequest<S> for RequestPayload
where
    S: Send + Sync,
{
    type Rejection = LookupError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();

        if method == Method::GET {
            if let Some(token) = query_token(req.uri().query()) {
                return Ok(Self::Query(token));
            }

            let body = Bytes::from_request(req, state)
                .await
                .map_err(LookupError::decode)?;
            Ok(Self::JsonString(body))
        } else if method == Method::POST {
            let Some(content_type) = req
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
            else {
                return Ok(Self::Unsupported);
            };

            if content_type
                .to_ascii_lowercase()
                .contains(mime::APPLICATION_JSON.essence_str())
            {
                let body = Bytes::from_request(req, state)
                    .await
                    .map_err(LookupError::decode)?;
                return Ok(Self::JsonObject(body));
            }

            match content_type.parse::<Mime>() {
                Ok(parsed)
                    if parsed.type_() == mime::MULTIPART
                        && parsed.subtype() == mime::FORM_DATA =>
                {
                    // A form that cannot be read carries no params.
                    match Multipart::from_request(req, state).await {
                        Ok(multipart) => Ok(Self::Multipart(multipart)),
                        Err(err) => {
                            debug!(error = %err, "Unreadable multipart form");
                            Ok(Self::Unsupported)
                        }
                    }
                }
                Ok(parsed)
                    if parsed.essence_str()
                        == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() =>
                {
                    match Bytes::from_request(req, state).await {
                        Ok(body) => Ok(Self::UrlEncoded(body)),
                        Err(err) => {
                            debug!(error = %err, "Unreadable urlencoded form");
                            Ok(Self::Unsupported)
                        }
                    }
                }
                _ => Ok(Self::Unsupported),
            }
        } else {
            Ok(Self::Unsupported)
        }
    }
}

impl RequestPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Query(_) => "query",
            Self::JsonString(_) => "json-string",
            Self::JsonObject(_) => "json-object",
            Self::Multipart(_) => "multipart",
            Self::UrlEncoded(_) => "urlencoded",
            Self::Unsupported => "unsupported",
        }
    }

    /// Decodes the payload and returns its non-empty token.
    pub async fn into_token(self) -> Result<String, LookupError> {
        let token = match self {
            Self::Query(token) => Some(token),
            Self::JsonString(body) => json_string_token(&body)?,
            Self::JsonObject(body) => {
                let params: Option<InputParams> =
                    serde_json::from_slice(&body).map_err(LookupError::decode)?;
                params.and_then(|mut params| params.remove("token"))
            }
            Self::Multipart(multipart) => multipart_params(multipart).await.remove("token"),
            Self::UrlEncoded(body) => urlencoded_params(&body).remove("token"),
            Self::Unsupported => None,
        };

        token
            .filter(|token| !token.is_empty())
            .ok_or(LookupError::NoInputParams)
    }
}

fn query_token(query: Option<&str>) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query?).ok()?;

    pairs
        .into_iter()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Reads the first JSON value of the body; anything after it is ignored.
///
/// An empty body means the caller sent nothing at all, which is a missing
/// token rather than malformed JSON.
fn json_string_token(body: &[u8]) -> Result<Option<String>, LookupError> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<String>()
        .next()
        .transpose()
        .map_err(LookupError::decode)
}

/// Form errors are never reported: a body that fails to parse part way
/// through yields no params at all.
async fn multipart_params(mut multipart: Multipart) -> InputParams {
    let mut pairs = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                debug!(error = %err, "Malformed multipart form");
                return InputParams::new();
            }
        };

        // File parts are not form values.
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match field.text().await {
            Ok(value) => pairs.push((name, value)),
            Err(err) => {
                debug!(error = %err, "Malformed multipart field");
                return InputParams::new();
            }
        }
    }

    first_values(pairs)
}

fn urlencoded_params(body: &[u8]) -> InputParams {
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(body) {
        Ok(pairs) => first_values(pairs),
        Err(err) => {
            debug!(error = %err, "Malformed urlencoded form");
            InputParams::new()
        }
    }
}

fn first_values(pairs: impl IntoIterator<Item = (String, String)>) -> InputParams {
    let mut params = InputParams::new();
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}
