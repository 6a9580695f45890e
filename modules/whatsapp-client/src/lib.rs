//! Client for a self-hosted WhatsApp Web HTTP gateway (WAHA-compatible API).
//!
//! The gateway owns the browser session and its stored credentials. This
//! crate starts the session, reads its status and pairing code, sends
//! messages, and turns the gateway's webhook calls into [`ClientEvent`]s.

pub mod error;
pub mod qr;
pub mod types;
pub mod webhook;

pub use error::{GatewayError, Result};
pub use types::{ChatId, ClientEvent, InboundMessage, MediaAttachment, SessionStatus, WebhookEvent};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use types::{QrResponse, SendImageRequest, SendTextRequest, SessionInfo, StartSessionRequest};

/// Outbound side of a messaging session.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()>;

    /// Send a file with a caption.
    async fn send_media(&self, chat_id: &ChatId, media: &MediaAttachment, caption: &str) -> Result<()>;

    /// Reply in the chat the message came from, quoting it.
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()>;
}

#[async_trait]
impl<T: MessagingClient + ?Sized> MessagingClient for std::sync::Arc<T> {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()> {
        (**self).send_text(chat_id, text).await
    }

    async fn send_media(&self, chat_id: &ChatId, media: &MediaAttachment, caption: &str) -> Result<()> {
        (**self).send_media(chat_id, media, caption).await
    }

    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()> {
        (**self).reply(to, text).await
    }
}

pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    session: String,
}

impl GatewayClient {
    pub fn new(base_url: &str, api_key: Option<&str>, session: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
            session: session.to_string(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match self.api_key {
            Some(ref key) => builder.header("X-Api-Key", key),
            None => builder,
        }
    }

    /// Ask the gateway to start (or resume) the session. A session that is
    /// already running is not an error.
    pub async fn start_session(&self) -> Result<()> {
        let resp = self
            .request(Method::POST, "/api/sessions/start")
            .json(&StartSessionRequest {
                name: &self.session,
            })
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::CONFLICT {
            tracing::debug!(session = %self.session, "Session already started");
            return Ok(());
        }
        error_for_status(resp).await?;
        Ok(())
    }

    pub async fn session_status(&self) -> Result<SessionStatus> {
        let resp = self
            .request(Method::GET, &format!("/api/sessions/{}", self.session))
            .send()
            .await?;
        let resp = error_for_status(resp).await?;

        let info: SessionInfo = resp.json().await?;
        Ok(SessionStatus::parse(&info.status))
    }

    /// Raw pairing code value, to be rendered as a QR code.
    pub async fn qr_code(&self) -> Result<String> {
        let resp = self
            .request(Method::GET, &format!("/api/{}/auth/qr?format=raw", self.session))
            .send()
            .await?;
        let resp = error_for_status(resp).await?;

        let qr: QrResponse = resp.json().await?;
        Ok(qr.value)
    }

    async fn send_text_request(&self, body: &SendTextRequest<'_>) -> Result<()> {
        let resp = self
            .request(Method::POST, "/api/sendText")
            .json(body)
            .send()
            .await?;
        error_for_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl MessagingClient for GatewayClient {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()> {
        self.send_text_request(&SendTextRequest {
            session: &self.session,
            chat_id: chat_id.as_str(),
            text,
            reply_to: None,
        })
        .await
    }

    async fn send_media(&self, chat_id: &ChatId, media: &MediaAttachment, caption: &str) -> Result<()> {
        let resp = self
            .request(Method::POST, "/api/sendImage")
            .json(&SendImageRequest {
                session: &self.session,
                chat_id: chat_id.as_str(),
                file: media,
                caption,
            })
            .send()
            .await?;
        error_for_status(resp).await?;
        Ok(())
    }

    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()> {
        self.send_text_request(&SendTextRequest {
            session: &self.session,
            chat_id: to.from.as_str(),
            text,
            reply_to: Some(to.id.as_str()).filter(|id| !id.is_empty()),
        })
        .await
    }
}

async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}
