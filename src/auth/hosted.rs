//! Hosted auth API client (`/auth/v1/*`).

use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::session::Session;
use crate::auth::{AuthError, AuthResult};

#[derive(Debug, Deserialize)]
struct HostedUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<HostedUser>,
    // Sign-up without a session answers with the bare user object.
    id: Option<Uuid>,
    email: Option<String>,
}

/// Auth client for the hosted backend. Validated tokens are cached until
/// they expire or are signed out.
#[derive(Clone)]
pub struct HostedAuth {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    cache: Arc<DashMap<String, Session>>,
}

impl HostedAuth {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            cache: Arc::new(DashMap::new()),
        })
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Session> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self.client.post(url).header("apikey", &self.anon_key).json(&body).send().await?;
        let token = Self::read_token(resp).await?;

        match token.access_token {
            Some(_) => self.into_session(token),
            None if token.id.is_some() => Err(AuthError::ConfirmationRequired(
                token.email.unwrap_or_else(|| email.to_string()),
            )),
            None => Err(AuthError::Backend("sign-up response carried no user".into())),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self.client.post(url).header("apikey", &self.anon_key).json(&body).send().await?;

        if matches!(resp.status(), StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            return Err(AuthError::InvalidCredentials);
        }
        let token = Self::read_token(resp).await?;
        self.into_session(token)
    }

    pub async fn sign_out(&self, token: &str) -> AuthResult<Session> {
        let session = self.session(token).await?;
        let url = format!("{}/auth/v1/logout", self.base_url);
        let resp = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;
        self.cache.remove(token);

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "Hosted logout did not succeed, token dropped locally");
        }
        Ok(session)
    }

    pub async fn session(&self, token: &str) -> AuthResult<Session> {
        if let Some(cached) = self.cache.get(token) {
            if cached.expires_at.map(|t| t > Utc::now()).unwrap_or(true) {
                return Ok(cached.value().clone());
            }
        }
        self.cache.remove(token);

        let url = format!("{}/auth/v1/user", self.base_url);
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let user: HostedUser = resp.json().await?;
        let session = Session {
            access_token: token.to_string(),
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            expires_at: None,
        };
        self.cache.insert(token.to_string(), session.clone());
        Ok(session)
    }

    async fn read_token(resp: reqwest::Response) -> AuthResult<TokenResponse> {
        if resp.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(body));
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    fn into_session(&self, token: TokenResponse) -> AuthResult<Session> {
        let access_token = token
            .access_token
            .ok_or_else(|| AuthError::Backend("response carried no access token".into()))?;
        let user = token
            .user
            .ok_or_else(|| AuthError::Backend("response carried no user".into()))?;
        let session = Session {
            access_token,
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            expires_at: token.expires_in.map(|s| Utc::now() + ChronoDuration::seconds(s)),
        };
        self.cache.insert(session.access_token.clone(), session.clone());
        Ok(session)
    }
}

async fn status_error(resp: reqwest::Response) -> AuthError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    AuthError::Status { status, body }
}

impl std::fmt::Debug for HostedAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedAuth")
            .field("base_url", &self.base_url)
            .field("cached_sessions", &self.cache.len())
            .finish()
    }
}
