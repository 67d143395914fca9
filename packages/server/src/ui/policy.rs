//! Access policy applied to every request before it reaches a handler.
//!
//! The server only asks "may this caller use this endpoint"; who the caller
//! is comes from the bearer token in the `Authorization` header.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::{error::ApiError, state::AppState};

/// Decides whether a request may proceed
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// `endpoint` is `"<METHOD> <path>"`, `token` the bearer token if any
    async fn check(&self, endpoint: &str, token: Option<&str>) -> bool;
}

/// Lets every request through
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllPolicy;

#[async_trait]
impl AccessPolicy for AllowAllPolicy {
    async fn check(&self, _endpoint: &str, _token: Option<&str>) -> bool {
        true
    }
}

/// Accepts requests carrying one of a fixed set of tokens.
///
/// The health endpoint is always reachable.
#[derive(Debug, Clone)]
pub struct StaticTokenPolicy {
    tokens: HashSet<String>,
}

impl StaticTokenPolicy {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

#[async_trait]
impl AccessPolicy for StaticTokenPolicy {
    async fn check(&self, endpoint: &str, token: Option<&str>) -> bool {
        if endpoint == "GET /api/health" {
            return true;
        }
        token.is_some_and(|t| self.tokens.contains(t))
    }
}

/// Build the policy for the configured tokens
pub fn policy_from_tokens(tokens: &[String]) -> Arc<dyn AccessPolicy> {
    if tokens.is_empty() {
        Arc::new(AllowAllPolicy)
    } else {
        Arc::new(StaticTokenPolicy::new(tokens.iter().cloned()))
    }
}

/// Middleware consulting `AppState::access_policy`
pub async fn enforce_access_policy(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let endpoint = format!("{} {}", request.method(), request.uri().path());
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if !state.access_policy.check(&endpoint, token).await {
        tracing::warn!(endpoint = %endpoint, "request denied by access policy");
        return Err(ApiError::Forbidden(format!("access to '{}' denied", endpoint)));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_policy() {
        // テスト項目: 設定されたトークンを持つリクエストのみ許可される
        // given (前提条件):
        let policy = StaticTokenPolicy::new(vec!["secret".to_string(), " ".to_string()]);

        // when (操作):
        let with_token = policy.check("POST /api/rooms", Some("secret")).await;
        let wrong_token = policy.check("POST /api/rooms", Some("guess")).await;
        let without_token = policy.check("POST /api/rooms", None).await;
        let blank_token = policy.check("POST /api/rooms", Some("")).await;
        let health = policy.check("GET /api/health", None).await;

        // then (期待する結果):
        assert!(with_token);
        assert!(!wrong_token);
        assert!(!without_token);
        assert!(!blank_token);
        assert!(health);
    }

    #[tokio::test]
    async fn test_policy_from_tokens() {
        // テスト項目: トークン未設定なら全て許可、設定されていればトークン必須になる
        // given (前提条件):
        let open = policy_from_tokens(&[]);
        let closed = policy_from_tokens(&["secret".to_string()]);

        // when (操作):
        let open_result = open.check("DELETE /api/rooms/x", None).await;
        let closed_result = closed.check("DELETE /api/rooms/x", None).await;

        // then (期待する結果):
        assert!(open_result);
        assert!(!closed_result);
    }
}
