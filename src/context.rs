use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde_json::Value;
use uuid::Uuid;

use crate::middleware::{ParsedBody, Session};

/// Per-request data assembled by the middleware chain
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    /// Parsed body, `Null` when the request had none
    pub body: Value,
    pub session: Option<Session>,
}

impl RequestContext {
    pub fn new(body: Value, session: Option<Session>) -> Self {
        Self {
            request_id: Uuid::new_v4().simple().to_string(),
            body,
            session,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let body = parts
            .extensions
            .get::<ParsedBody>()
            .map(|ParsedBody(value)| value.clone())
            .unwrap_or(Value::Null);
        let session = parts.extensions.get::<Option<Session>>().cloned().flatten();

        Ok(RequestContext::new(body, session))
    }
}

/// Named path parameters. Absent and empty values both read as missing.
#[derive(Clone, Debug, Default)]
pub struct RouteParams(pub HashMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RouteParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();
        Ok(RouteParams(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::GlobalUserRole;
    use axum::http::Request;

    #[tokio::test]
    async fn context_reads_middleware_extensions() {
        let session = Session {
            id: "u1".into(),
            user_name: "alice".into(),
            role: GlobalUserRole::User,
        };
        let mut request = Request::builder().uri("/").body(()).unwrap();
        request.extensions_mut().insert(ParsedBody(serde_json::json!({ "a": 1 })));
        request.extensions_mut().insert(Some(session.clone()));
        let (mut parts, _) = request.into_parts();

        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.body["a"], 1);
        assert_eq!(ctx.session(), Some(&session));
    }

    #[tokio::test]
    async fn context_defaults_without_middleware() {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.body, Value::Null);
        assert!(ctx.session().is_none());
    }

    #[test]
    fn empty_params_read_as_missing() {
        let params = RouteParams(HashMap::from([
            ("slug".to_string(), "example".to_string()),
            ("imageId".to_string(), String::new()),
        ]));
        assert_eq!(params.get("slug"), Some("example"));
        assert_eq!(params.get("imageId"), None);
        assert_eq!(params.get("missing"), None);
    }
}
