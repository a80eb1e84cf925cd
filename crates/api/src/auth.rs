//! Bearer-token authentication against the external verifier collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use engine::Identity;

use crate::error::ApiError;

/// Trait for the external token-verification collaborator.
///
/// Implementations resolve a bearer token to a verified subject email.
/// The verification mechanism itself (Firebase, JWT, whatever) lives
/// outside this system.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Returns the verified identity for a token, or `None` when the
    /// token is invalid.
    async fn verify(&self, token: &str) -> Option<Identity>;
}

/// Static token table for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token for an email.
    pub fn with_token(mut self, token: impl Into<String>, email: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), email.into());
        self
    }

    /// Parses a `token:email,token:email` specification, as carried by the
    /// `AUTH_TOKENS` environment variable.
    pub fn from_spec(spec: &str) -> Self {
        let tokens = spec
            .split(',')
            .filter_map(|pair| {
                let (token, email) = pair.split_once(':')?;
                Some((token.trim().to_string(), email.trim().to_string()))
            })
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).map(Identity::new)
    }
}

/// Resolves the request's bearer token to a verified identity.
///
/// Missing or malformed `Authorization` header is 401; a present but
/// invalid token is 403, matching the reference service.
pub async fn authenticate(
    verifier: &dyn TokenVerifier,
    headers: &HeaderMap,
) -> Result<Identity, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

    verifier
        .verify(token)
        .await
        .ok_or_else(|| ApiError::Forbidden("invalid token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let verifier = StaticTokenVerifier::new();
        let result = authenticate(&verifier, &HeaderMap::new()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn invalid_token_is_forbidden() {
        let verifier = StaticTokenVerifier::new();
        let result = authenticate(&verifier, &headers_with("Bearer nope")).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn valid_token_resolves_identity() {
        let verifier = StaticTokenVerifier::new().with_token("t1", "alice@example.com");
        let identity = authenticate(&verifier, &headers_with("Bearer t1"))
            .await
            .unwrap();
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn spec_parsing() {
        let verifier = StaticTokenVerifier::from_spec("t1:a@x.com, t2:b@x.com");
        assert_eq!(verifier.tokens.len(), 2);
        assert_eq!(verifier.tokens["t2"], "b@x.com");
    }
}
