//! Inbound webhook: the gateway POSTs events here and they are queued as
//! [`ClientEvent`]s for whoever holds the receiver.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::types::{ClientEvent, InboundMessage, WebhookEvent};

#[derive(Clone)]
struct WebhookState {
    events: mpsc::Sender<ClientEvent>,
    session: String,
}

pub fn router(events: mpsc::Sender<ClientEvent>, session: &str) -> Router {
    Router::new()
        .route("/webhook", post(receive))
        .route("/health", get(health))
        .with_state(WebhookState {
            events,
            session: session.to_string(),
        })
}

async fn receive(State(state): State<WebhookState>, Json(event): Json<WebhookEvent>) -> StatusCode {
    if event
        .session
        .as_deref()
        .is_some_and(|s| s != state.session)
    {
        return StatusCode::OK;
    }

    if let Some(client_event) = parse_event(&event) {
        if state.events.send(client_event).await.is_err() {
            tracing::warn!("Event queue closed, dropping webhook event");
            return StatusCode::SERVICE_UNAVAILABLE;
        }
    }
    StatusCode::OK
}

async fn health() -> &'static str {
    "ok"
}

/// Only inbound chat messages are forwarded; our own messages and other
/// event kinds are dropped.
pub fn parse_event(event: &WebhookEvent) -> Option<ClientEvent> {
    if event.event != "message" {
        return None;
    }
    let payload = &event.payload;
    if payload.get("fromMe").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }

    let from = payload.get("from").and_then(Value::as_str)?;
    let id = payload
        .get("id")
        .and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map
                .get("_serialized")
                .and_then(Value::as_str)
                .map(String::from),
            _ => None,
        })
        .unwrap_or_default();
    let body = payload
        .get("body")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(ClientEvent::Message(InboundMessage {
        id,
        from: from.to_string(),
        body: body.to_string(),
    }))
}
