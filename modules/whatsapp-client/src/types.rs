use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// A WhatsApp chat address, e.g. `9779812222222@c.us`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatId(String);

impl ChatId {
    pub const USER_SUFFIX: &'static str = "@c.us";

    /// Wrap an address. Plain numbers get the user suffix; full ids pass through.
    pub fn new(address: &str) -> Self {
        if address.ends_with(Self::USER_SUFFIX) {
            Self(address.to_string())
        } else {
            Self(format!("{}{}", address, Self::USER_SUFFIX))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gateway session lifecycle as reported by `GET /api/sessions/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Starting,
    ScanQrCode,
    Working,
    Failed,
    Stopped,
    Other(String),
}

impl SessionStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "STARTING" => SessionStatus::Starting,
            "SCAN_QR_CODE" => SessionStatus::ScanQrCode,
            "WORKING" => SessionStatus::Working,
            "FAILED" => SessionStatus::Failed,
            "STOPPED" => SessionStatus::Stopped,
            other => SessionStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Starting => "STARTING",
            SessionStatus::ScanQrCode => "SCAN_QR_CODE",
            SessionStatus::Working => "WORKING",
            SessionStatus::Failed => "FAILED",
            SessionStatus::Stopped => "STOPPED",
            SessionStatus::Other(other) => other,
        };
        f.write_str(s)
    }
}

/// A message someone sent to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: String,
    pub from: String,
    pub body: String,
}

/// Everything the dispatcher reacts to, from any source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A pairing code to show the operator.
    Qr(String),
    Loading { status: String },
    Ready,
    AuthFailure(String),
    Disconnected(String),
    Message(InboundMessage),
}

/// An image (or other file) sent inline, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaAttachment {
    pub mimetype: String,
    pub filename: String,
    pub data: String,
}

impl MediaAttachment {
    pub fn from_bytes(filename: &str, bytes: &[u8]) -> Self {
        Self {
            mimetype: mimetype_for(filename).to_string(),
            filename: filename.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| GatewayError::Media(format!("{}: {e}", path.display())))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment");
        Ok(Self::from_bytes(filename, &bytes))
    }
}

fn mimetype_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

// --- Wire types ---

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StartSessionRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionInfo {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QrResponse {
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendTextRequest<'a> {
    pub session: &'a str,
    #[serde(rename = "chatId")]
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendImageRequest<'a> {
    pub session: &'a str,
    #[serde(rename = "chatId")]
    pub chat_id: &'a str,
    pub file: &'a MediaAttachment,
    pub caption: &'a str,
}

/// Event envelope POSTed by the gateway to our webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub session: Option<String>,
    #[serde(default)]
    pub payload: Value,
}
