//! The dispatcher event loop.
//!
//! Session events, inbound messages and the next due send are all handled on
//! one task. A send is awaited to completion before the next event is looked
//! at, so reply handling never interleaves with an in-flight send.

use std::future::pending;

use outreach_common::file_config::{DispatcherConfig, RepliesConfig};
use outreach_common::{OutreachError, Result};
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{error, info, warn};
use whatsapp_client::{qr, ChatId, ClientEvent, InboundMessage, MediaAttachment, MessagingClient};

use crate::inputs::{chat_id_for, SendInputs};
use crate::pacing::Pacing;
use crate::replies::CannedReplies;
use crate::state::DispatcherState;
use crate::stats::{DispatchStats, SAFETY_TIPS};
use crate::template;

/// One outgoing message, built right before it is sent.
#[derive(Debug)]
pub struct MessageJob<'a> {
    pub chat_id: ChatId,
    pub name: &'a str,
    pub body: String,
    pub media: Option<&'a MediaAttachment>,
}

struct SendQueue {
    inputs: SendInputs,
    next: usize,
    next_at: Option<Instant>,
}

impl SendQueue {
    fn remaining(&self) -> usize {
        self.inputs.contacts.len() - self.next
    }
}

pub struct Dispatcher<C: MessagingClient> {
    client: C,
    config: DispatcherConfig,
    replies: CannedReplies,
    pacing: Pacing,
    state: DispatcherState,
    stats: DispatchStats,
    last_qr: Option<String>,
}

impl<C: MessagingClient> Dispatcher<C> {
    pub fn new(client: C, config: DispatcherConfig, replies: &RepliesConfig) -> Self {
        let pacing = Pacing::new(config.base_delay(), config.random_delay_range());
        Self {
            client,
            config,
            replies: CannedReplies::new(replies),
            pacing,
            state: DispatcherState::Idle,
            stats: DispatchStats::default(),
            last_qr: None,
        }
    }

    pub fn state(&self) -> &DispatcherState {
        &self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Process events until every contact has been tried, then wait out the
    /// grace period and return the tally.
    ///
    /// Fails if the inputs cannot be loaded, or if the event queue closes
    /// while the session is not usable.
    pub async fn run(&mut self, mut events: mpsc::Receiver<ClientEvent>) -> Result<DispatchStats> {
        self.state = self.state.start();
        info!("Waiting for messaging session");

        let mut queue: Option<SendQueue> = None;
        let mut events_open = true;

        loop {
            let next_at = queue.as_ref().and_then(|q| q.next_at);
            let send_due = async move {
                match next_at {
                    Some(at) => sleep_until(at).await,
                    None => pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event, &mut queue).await?,
                    None => {
                        events_open = false;
                        if let Some(err) = self.closed_error() {
                            return Err(err);
                        }
                        warn!("Event queue closed; inbound replies are no longer handled");
                    }
                },
                _ = send_due => {
                    if let Some(q) = queue.as_mut() {
                        self.send_next(q).await;
                    }
                }
            }

            if self.state == DispatcherState::Done {
                break;
            }
        }

        self.finish().await;
        Ok(self.stats)
    }

    async fn handle_event(&mut self, event: ClientEvent, queue: &mut Option<SendQueue>) -> Result<()> {
        match &event {
            ClientEvent::Qr(code) => self.show_qr(code),
            ClientEvent::Loading { status } => info!(%status, "Session loading"),
            ClientEvent::Message(message) => {
                self.handle_inbound(message).await;
                return Ok(());
            }
            ClientEvent::Ready | ClientEvent::AuthFailure(_) | ClientEvent::Disconnected(_) => {}
        }

        let previous = self.state.clone();
        self.state = self.state.on_event(&event);
        if self.state == previous {
            return Ok(());
        }

        match self.state.clone() {
            DispatcherState::Ready => {
                info!("Messaging session is ready");
                *queue = Some(self.prepare()?);
                self.state = self.state.begin_sending();
            }
            DispatcherState::AuthFailed(reason) => {
                error!(%reason, "Authentication failed; try deleting the session data and restarting");
            }
            DispatcherState::Disconnected(reason) => {
                warn!(%reason, "Messaging client disconnected; you may need to scan the QR code again");
            }
            _ => {}
        }

        if self.state.is_halted() {
            if let Some(q) = queue.as_mut() {
                q.next_at = None;
            }
        }
        Ok(())
    }

    fn show_qr(&mut self, code: &str) {
        if self.last_qr.as_deref() == Some(code) {
            return;
        }
        self.last_qr = Some(code.to_string());

        info!("Scan this QR code with WhatsApp (Linked devices) to log in");
        match qr::render(code) {
            Some(rendered) => println!("{rendered}"),
            None => warn!(code, "Could not render QR code; pairing value logged instead"),
        }
    }

    fn prepare(&self) -> Result<SendQueue> {
        let inputs = SendInputs::load(&self.config)?;

        let count = inputs.contacts.len();
        info!(count, "Starting outreach run");
        if count > self.config.max_messages_per_session {
            warn!(
                count,
                max = self.config.max_messages_per_session,
                "Contact list exceeds the per-session limit; consider splitting into smaller batches"
            );
        }

        Ok(SendQueue {
            inputs,
            next: 0,
            next_at: Some(Instant::now()),
        })
    }

    async fn send_next(&mut self, queue: &mut SendQueue) {
        let total = queue.inputs.contacts.len();
        let contact = &queue.inputs.contacts[queue.next];
        let job = MessageJob {
            chat_id: chat_id_for(&contact.phone, &self.config.country_code),
            name: &contact.name,
            body: template::render(&queue.inputs.template, contact),
            media: queue.inputs.media.as_ref(),
        };

        info!(
            n = queue.next + 1,
            total,
            to = %job.chat_id,
            business = job.name,
            "Sending message"
        );
        let result = match job.media {
            Some(media) => self.client.send_media(&job.chat_id, media, &job.body).await,
            None => self.client.send_text(&job.chat_id, &job.body).await,
        };
        match result {
            Ok(()) => {
                self.stats.successful += 1;
                info!(to = %job.chat_id, "Message sent");
            }
            Err(e) => {
                self.stats.failed += 1;
                let failure = OutreachError::SendFailure {
                    target: job.chat_id.to_string(),
                    reason: e.to_string(),
                };
                error!(error = %failure, "Message not sent");
            }
        }

        queue.next += 1;
        if queue.remaining() == 0 {
            queue.next_at = None;
            self.state = self.state.finish();
            return;
        }

        let delay = self.pacing.next_delay(&mut rand::rng());
        info!(delay_ms = delay.as_millis() as u64, "Waiting before next message");
        queue.next_at = Some(Instant::now() + delay);
    }

    async fn handle_inbound(&self, message: &InboundMessage) {
        if !self.state.accepts_inbound() {
            return;
        }
        let Some(reply) = self.replies.reply_for(&message.body) else {
            return;
        };

        match self.client.reply(message, reply).await {
            Ok(()) => info!(from = %message.from, "Sent canned reply"),
            Err(e) => warn!(from = %message.from, error = %e, "Canned reply failed"),
        }
    }

    /// Error to surface when the event queue closes before sending started
    /// or after the session was lost.
    fn closed_error(&self) -> Option<OutreachError> {
        match &self.state {
            DispatcherState::AuthFailed(reason) => Some(OutreachError::AuthFailure(reason.clone())),
            DispatcherState::Disconnected(reason) => {
                Some(OutreachError::Disconnected(reason.clone()))
            }
            DispatcherState::Idle | DispatcherState::Authenticating => Some(
                OutreachError::Disconnected("event stream closed before the session was ready".into()),
            ),
            DispatcherState::Ready | DispatcherState::Sending | DispatcherState::Done => None,
        }
    }

    async fn finish(&self) {
        info!("{}", self.stats);
        if self.stats.successful > 0 {
            info!("Safety tips:");
            for tip in SAFETY_TIPS {
                info!("  - {tip}");
            }
        }

        let grace = self.config.grace_period();
        info!(grace_ms = grace.as_millis() as u64, "Letting in-flight requests settle");
        sleep(grace).await;
        info!("Outreach session completed");
    }
}
