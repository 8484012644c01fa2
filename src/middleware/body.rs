use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body normalized to JSON, stored in request extensions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedBody(pub Value);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else if content_type.starts_with("application/json") || content_type.contains("+json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

/// Body parser middleware: reads the body once and attaches a `ParsedBody`
pub async fn body_parser_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let limit = state.config.api.max_request_size_bytes;
    let (parts, body) = request.into_parts();

    let bytes = match read_body(body, limit).await {
        Ok(bytes) => bytes,
        Err(error) => return error.into_response(),
    };

    let parsed = match parse_body(&parts.headers, &bytes) {
        Ok(value) => value,
        Err(error) => return error.into_response(),
    };

    let mut request = Request::from_parts(parts, Body::empty());
    request.extensions_mut().insert(ParsedBody(parsed));

    next.run(request).await
}

/// Only an exceeded limit is a 413; a body that breaks off mid-stream is a bad request
async fn read_body(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!("Failed to read request body: {}", e);
        if exceeded_limit(&e) {
            ApiError::payload_too_large("Request body is too large")
        } else {
            ApiError::InvalidRequest
        }
    })
}

fn exceeded_limit(error: &axum::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return true;
        }
        source = cause.source();
    }
    false
}

fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    match body_kind(headers) {
        BodyKind::Form => Ok(parse_form(bytes)),
        // Bodies without a usable content type are tried as JSON, as browsers' fetch() often omits it
        BodyKind::Json | BodyKind::Other => {
            serde_json::from_slice(bytes).map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
        }
    }
}

/// Form fields become string values; repeated keys collect into an array
fn parse_form(bytes: &[u8]) -> Value {
    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        let value = Value::String(value.into_owned());
        match fields.get_mut(key.as_ref()) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[tokio::test]
    async fn body_over_the_limit_is_too_large() {
        let err = read_body(Body::from("x".repeat(32)), 8).await.unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge(_)));

        let bytes = read_body(Body::from("x".repeat(8)), 8).await.unwrap();
        assert_eq!(bytes.len(), 8);
    }

    #[tokio::test]
    async fn broken_body_stream_is_an_invalid_request() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"name\":")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let body = Body::from_stream(futures::stream::iter(chunks));

        let err = read_body(body, 1024).await.unwrap_err();
        assert_eq!(err, ApiError::InvalidRequest);
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body(&HeaderMap::new(), b"").unwrap(), Value::Null);
        assert_eq!(parse_body(&headers("application/json"), b"  \n").unwrap(), Value::Null);
    }

    #[test]
    fn json_body_is_parsed() {
        let value = parse_body(&headers("application/json; charset=utf-8"), br#"{"id":"abc"}"#).unwrap();
        assert_eq!(value, json!({ "id": "abc" }));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_body(&headers("application/json"), b"{nope").unwrap_err();
        assert!(matches!(err, ApiError::InvalidJson(_)));
    }

    #[test]
    fn form_body_becomes_string_fields() {
        let value = parse_body(
            &headers("application/x-www-form-urlencoded"),
            b"title=My+Shot&featured=true&tag=a&tag=b",
        )
        .unwrap();
        assert_eq!(value, json!({ "title": "My Shot", "featured": "true", "tag": ["a", "b"] }));
    }
}
