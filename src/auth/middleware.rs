//! Bearer-token middleware for protected routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::session::UserContext;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Resolve `Authorization: Bearer <token>` into a [`UserContext`] extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(&req) {
        Some(t) => t.to_string(),
        None => return ApiError::Unauthorized("Missing bearer token".into()).into_response(),
    };

    match state.auth.session(&token).await {
        Ok(session) => {
            req.extensions_mut().insert(UserContext::from(&session));
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session");
            ApiError::from(e).into_response()
        }
    }
}

/// Extract the bearer token from a request, if any.
pub fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    bearer_from_headers(req.headers())
}

pub fn bearer_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
