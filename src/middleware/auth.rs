use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::auth::{validate_jwt, Claims, GlobalUserRole};
use crate::state::AppState;

/// Authenticated caller resolved from the session token
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_name: String,
    pub role: GlobalUserRole,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            role: GlobalUserRole::from_name(&claims.role),
            id: claims.sub,
            user_name: claims.user_name,
        }
    }
}

/// Looks up the caller's session. Absence is a normal outcome, never an error.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Resolves sessions from a signed JWT carried in the session cookie or a bearer header
#[derive(Clone, Debug)]
pub struct JwtSessionResolver {
    secret: String,
    cookie_name: String,
}

impl JwtSessionResolver {
    pub fn new(secret: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Option<Session> {
        let token = extract_token(headers, &self.cookie_name)?;

        match validate_jwt(&token, &self.secret) {
            Ok(claims) => Some(Session::from(claims)),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                None
            }
        }
    }
}

/// Authentication middleware: attaches `Option<Session>` to the request, never rejects
pub async fn authentication_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = state.sessions.resolve(request.headers()).await;
    if let Some(session) = &session {
        tracing::debug!(user_id = %session.id, role = session.role.as_str(), "Session resolved");
    }
    request.extensions_mut().insert(session);

    next.run(request).await
}

/// Session cookie first, then `Authorization: Bearer`
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string());

    if let Some(token) = from_cookie.filter(|t| !t.is_empty()) {
        return Some(token);
    }

    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    fn token(role: GlobalUserRole) -> String {
        generate_jwt(&Claims::new("user-1", "alice", role, 1), SECRET).unwrap()
    }

    #[tokio::test]
    async fn resolves_session_from_cookie() {
        let resolver = JwtSessionResolver::new(SECRET, "auth-session");
        let mut headers = HeaderMap::new();
        let cookie = format!("theme=dark; auth-session={}", token(GlobalUserRole::Admin));
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        let session = resolver.resolve(&headers).await.unwrap();
        assert_eq!(session.id, "user-1");
        assert_eq!(session.role, GlobalUserRole::Admin);
    }

    #[tokio::test]
    async fn resolves_session_from_bearer_header() {
        let resolver = JwtSessionResolver::new(SECRET, "auth-session");
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token(GlobalUserRole::User));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

        assert_eq!(resolver.resolve(&headers).await.unwrap().user_name, "alice");
    }

    #[tokio::test]
    async fn garbage_or_missing_tokens_resolve_to_none() {
        let resolver = JwtSessionResolver::new(SECRET, "auth-session");
        assert!(resolver.resolve(&HeaderMap::new()).await.is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"));
        assert!(resolver.resolve(&headers).await.is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(resolver.resolve(&headers).await.is_none());
    }
}
