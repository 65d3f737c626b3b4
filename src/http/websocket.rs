//! Session event stream.
//!
//! `GET /auth/events?token=<access token>` upgrades to a WebSocket and
//! streams the caller's own session events as JSON text frames. Browsers
//! cannot set headers on a WebSocket handshake, so the token may come in the
//! query string; an `Authorization` header works too.
//!
//! ```text
//! Auth facade ── broadcast ──→ per-socket task ── Text(JSON) ──→ client
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::auth::middleware::bearer_from_headers;
use crate::auth::SessionEvent;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    token: Option<String>,
}

pub async fn session_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .or_else(|| bearer_from_headers(&headers).map(String::from))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".into()))?;

    let session = state.auth.session(&token).await?;
    let events = state.auth.events().subscribe();
    tracing::debug!(user_id = %session.user_id, "Session event stream opened");

    Ok(ws.on_upgrade(move |socket| forward_events(socket, session.user_id, events)))
}

fn event_user(event: &SessionEvent) -> Uuid {
    match event {
        SessionEvent::SignedUp { user_id, .. }
        | SessionEvent::SignedIn { user_id, .. }
        | SessionEvent::SignedOut { user_id } => *user_id,
    }
}

async fn forward_events(
    socket: WebSocket,
    user_id: Uuid,
    mut events: tokio::sync::broadcast::Receiver<SessionEvent>,
) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event_user(&event) == user_id => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to encode session event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    let _ = sender.close().await;
    tracing::debug!(user_id = %user_id, "Session event stream closed");
}
