//! Sign-up, sign-in and sign-out.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::auth::middleware::bearer_from_headers;
use crate::auth::Session;
use crate::http::error::{ApiError, ApiResult};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let session = state.auth.sign_up(&body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.auth.sign_in(&body.email, &body.password).await?))
}

pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let token = bearer_from_headers(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".into()))?;
    state.auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
