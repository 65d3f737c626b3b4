//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /auth/signup | /auth/signin | /auth/signout
//!     → Auth (local accounts or hosted auth API)
//!     → Session (bearer token) + SessionEvent broadcast
//!
//! Protected request:
//!     → middleware.rs (bearer token → Auth::session)
//!     → UserContext request extension
//! ```

pub mod hosted;
pub mod local;
pub mod middleware;
pub mod session;

use thiserror::Error;

pub use hosted::HostedAuth;
pub use local::LocalAuth;
pub use session::{Session, SessionEvent, SessionEvents, UserContext};

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("{0} is already registered")]
    AlreadyRegistered(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired session")]
    InvalidToken,

    #[error("confirmation email sent to {0}; sign in after confirming")]
    ConfirmationRequired(String),

    #[error("auth request rejected: {0}")]
    Rejected(String),

    #[error("auth backend error: {0}")]
    Backend(String),

    #[error("auth backend returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Backend(e.to_string())
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth facade over the configured backend. Every successful state change
/// is published as a [`SessionEvent`].
#[derive(Clone)]
pub struct Auth {
    backend: AuthBackend,
    events: SessionEvents,
}

#[derive(Clone)]
enum AuthBackend {
    Local(LocalAuth),
    Hosted(HostedAuth),
}

impl Auth {
    pub fn local(auth: LocalAuth) -> Self {
        Self {
            backend: AuthBackend::Local(auth),
            events: SessionEvents::new(),
        }
    }

    pub fn hosted(auth: HostedAuth) -> Self {
        Self {
            backend: AuthBackend::Hosted(auth),
            events: SessionEvents::new(),
        }
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Session> {
        let session = match &self.backend {
            AuthBackend::Local(a) => a.sign_up(email, password)?,
            AuthBackend::Hosted(a) => a.sign_up(email, password).await?,
        };
        tracing::info!(user_id = %session.user_id, "User signed up");
        self.events.publish(SessionEvent::SignedUp {
            user_id: session.user_id,
            email: session.email.clone(),
        });
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let session = match &self.backend {
            AuthBackend::Local(a) => a.sign_in(email, password)?,
            AuthBackend::Hosted(a) => a.sign_in(email, password).await?,
        };
        tracing::info!(user_id = %session.user_id, "User signed in");
        self.events.publish(SessionEvent::SignedIn {
            user_id: session.user_id,
            email: session.email.clone(),
        });
        Ok(session)
    }

    pub async fn sign_out(&self, token: &str) -> AuthResult<()> {
        let session = match &self.backend {
            AuthBackend::Local(a) => a.sign_out(token)?,
            AuthBackend::Hosted(a) => a.sign_out(token).await?,
        };
        tracing::info!(user_id = %session.user_id, "User signed out");
        self.events.publish(SessionEvent::SignedOut {
            user_id: session.user_id,
        });
        Ok(())
    }

    pub async fn session(&self, token: &str) -> AuthResult<Session> {
        match &self.backend {
            AuthBackend::Local(a) => a.session(token),
            AuthBackend::Hosted(a) => a.session(token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_facade_publishes_events() {
        let auth = Auth::local(LocalAuth::new());
        let mut rx = auth.events().subscribe();

        let session = auth.sign_up("seller@example.com", "hunter22").await.unwrap();
        auth.sign_out(&session.access_token).await.unwrap();

        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::SignedUp { .. }));
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::SignedOut { user_id: session.user_id }
        );
        assert!(auth.session(&session.access_token).await.is_err());
    }
}
