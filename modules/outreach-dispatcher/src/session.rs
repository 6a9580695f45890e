//! Session watcher: drives the gateway session to `WORKING` and reports what
//! it sees as [`ClientEvent`]s on the dispatcher's queue.

use std::convert::Infallible;

use async_trait::async_trait;
use outreach_common::poll::{Check, Poller};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use whatsapp_client::{ClientEvent, GatewayClient, SessionStatus};

/// Session-control side of the gateway.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn start_session(&self) -> whatsapp_client::Result<()>;
    async fn session_status(&self) -> whatsapp_client::Result<SessionStatus>;
    async fn qr_code(&self) -> whatsapp_client::Result<String>;
}

#[async_trait]
impl SessionGateway for GatewayClient {
    async fn start_session(&self) -> whatsapp_client::Result<()> {
        GatewayClient::start_session(self).await
    }

    async fn session_status(&self) -> whatsapp_client::Result<SessionStatus> {
        GatewayClient::session_status(self).await
    }

    async fn qr_code(&self) -> whatsapp_client::Result<String> {
        GatewayClient::qr_code(self).await
    }
}

enum Settled {
    Working,
    Failed(String),
    Stopped(String),
}

/// Start the session, report progress until it is working, then keep
/// watching until it drops. Status-call errors are logged and retried.
pub async fn watch_session<G>(gateway: &G, poller: Poller, events: mpsc::Sender<ClientEvent>)
where
    G: SessionGateway + ?Sized,
{
    if let Err(e) = gateway.start_session().await {
        let _ = events
            .send(ClientEvent::AuthFailure(format!("could not start session: {e}")))
            .await;
        return;
    }

    let tx = &events;
    let settled = poller
        .until(|_| async move {
            let status = match gateway.session_status().await {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "Session status check failed");
                    return Ok::<_, Infallible>(Check::Pending);
                }
            };
            debug!(%status, "Session status");

            match &status {
                SessionStatus::Working => return Ok(Check::Done(Settled::Working)),
                SessionStatus::Failed => {
                    return Ok(Check::Done(Settled::Failed(status.to_string())))
                }
                SessionStatus::Stopped => {
                    return Ok(Check::Done(Settled::Stopped(status.to_string())))
                }
                SessionStatus::ScanQrCode => match gateway.qr_code().await {
                    Ok(code) => {
                        let _ = tx.send(ClientEvent::Qr(code)).await;
                    }
                    Err(e) => warn!(error = %e, "Could not fetch pairing code"),
                },
                other => {
                    let _ = tx
                        .send(ClientEvent::Loading {
                            status: other.to_string(),
                        })
                        .await;
                }
            }
            Ok(Check::Pending)
        })
        .await;

    match settled {
        Ok(Some(Settled::Working)) => {}
        Ok(Some(Settled::Failed(status))) => {
            let _ = events
                .send(ClientEvent::AuthFailure(format!("session {status}")))
                .await;
            return;
        }
        Ok(Some(Settled::Stopped(status))) => {
            let _ = events
                .send(ClientEvent::Disconnected(format!("session {status}")))
                .await;
            return;
        }
        Ok(None) => return,
        Err(never) => match never {},
    }

    if events.send(ClientEvent::Ready).await.is_err() {
        return;
    }

    let dropped = poller
        .until(|_| async move {
            match gateway.session_status().await {
                Ok(SessionStatus::Working) => Ok::<_, Infallible>(Check::Pending),
                Ok(status) => Ok(Check::Done(status)),
                Err(e) => {
                    warn!(error = %e, "Session status check failed");
                    Ok(Check::Pending)
                }
            }
        })
        .await;

    if let Ok(Some(status)) = dropped {
        let _ = events
            .send(ClientEvent::Disconnected(format!("session {status}")))
            .await;
    }
}
