use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Edit-capability settings used by middleware: bearer tokens that stand in
/// for the host CMS's `edit_posts`-style permission check.
#[derive(Clone)]
pub struct AuthState {
    tokens: Arc<Vec<String>>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("tokens", &format!("[{} redacted]", self.tokens.len()))
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthState {
    /// Builds auth config from `MAPCARD_EDITOR_TOKENS` (comma-separated
    /// bearer tokens).
    ///
    /// In development, empty/missing tokens disable auth for local
    /// iteration. In non-development envs, empty/missing tokens fail
    /// startup.
    ///
    /// # Errors
    ///
    /// Returns an error outside development when no tokens are configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("MAPCARD_EDITOR_TOKENS").unwrap_or_default();
        let tokens: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if tokens.is_empty() {
            if is_development {
                tracing::warn!(
                    "MAPCARD_EDITOR_TOKENS not set; bearer auth disabled in development environment"
                );
                return Ok(Self::with_tokens(Vec::new()));
            }

            anyhow::bail!(
                "MAPCARD_EDITOR_TOKENS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self::with_tokens(tokens))
    }

    /// Builds auth config from an explicit token list. An empty list
    /// disables auth.
    #[must_use]
    pub fn with_tokens(tokens: Vec<String>) -> Self {
        let enabled = !tokens.is_empty();
        Self {
            tokens: Arc::new(tokens),
            enabled,
        }
    }

    /// Constant-time membership check so response timing does not narrow
    /// down a partially guessed token.
    fn allows(&self, presented: &str) -> bool {
        self.tokens
            .iter()
            .fold(false, |found, token| {
                found | bool::from(token.as_bytes().ct_eq(presented.as_bytes()))
            })
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the edit capability (bearer token) when enabled.
pub async fn require_edit_capability(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "missing or invalid bearer token",
                },
            }),
        )
            .into_response(),
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
