//! Sessions, request user context, and session event fan-out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// An authenticated session returned by sign-up and sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Context attached to authenticated requests.
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub user_id: Uuid,
    pub email: String,
    /// Bearer token the request came with; forwarded to the hosted backend.
    pub access_token: String,
}

impl From<&Session> for UserContext {
    fn from(s: &Session) -> Self {
        Self {
            user_id: s.user_id,
            email: s.email.clone(),
            access_token: s.access_token.clone(),
        }
    }
}

/// Auth state changes pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedUp { user_id: Uuid, email: String },
    SignedIn { user_id: Uuid, email: String },
    SignedOut { user_id: Uuid },
}

/// Broadcast channel for session events.
///
/// Publishing never fails; events sent with no subscribers are dropped.
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SessionEvent) {
        tracing::debug!(event = ?event, "Session event");
        let _ = self.tx.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();
        let user_id = Uuid::new_v4();

        events.publish(SessionEvent::SignedOut { user_id });

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut { user_id });
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(SessionEvent::SignedIn {
            user_id: Uuid::nil(),
            email: "a@b.c".into(),
        })
        .unwrap();
        assert_eq!(json["event"], "signed_in");
        assert_eq!(json["email"], "a@b.c");
    }
}
