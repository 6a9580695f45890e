//! Dispatcher event loop against an in-memory messaging client.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use outreach_common::file_config::{DispatcherConfig, RepliesConfig};
use outreach_common::OutreachError;
use outreach_dispatcher::{DispatchStats, Dispatcher};
use tokio::sync::mpsc;
use tokio::time::Instant;
use whatsapp_client::{
    ChatId, ClientEvent, GatewayError, InboundMessage, MediaAttachment, MessagingClient,
};

#[derive(Debug, Clone)]
struct Sent {
    chat_id: String,
    text: String,
    media: Option<String>,
    reply_to: Option<String>,
    at: Instant,
}

#[derive(Default)]
struct MockClient {
    sent: Mutex<Vec<Sent>>,
    failing: Vec<String>,
    send_latency: Duration,
}

impl MockClient {
    fn failing(chat_ids: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            failing: chat_ids.iter().map(|id| id.to_string()).collect(),
            send_latency: Duration::ZERO,
        }
    }

    /// Outreach sends take `latency` to complete; `at` is the completion time.
    fn slow(latency: Duration) -> Self {
        Self {
            send_latency: latency,
            ..Self::default()
        }
    }

    fn record(&self, sent: Sent) -> whatsapp_client::Result<()> {
        let fail = self.failing.contains(&sent.chat_id);
        self.sent.lock().unwrap().push(sent);
        if fail {
            return Err(GatewayError::Api {
                status: 500,
                message: "number not on WhatsApp".into(),
            });
        }
        Ok(())
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingClient for MockClient {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> whatsapp_client::Result<()> {
        if !self.send_latency.is_zero() {
            tokio::time::sleep(self.send_latency).await;
        }
        self.record(Sent {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            media: None,
            reply_to: None,
            at: Instant::now(),
        })
    }

    async fn send_media(
        &self,
        chat_id: &ChatId,
        media: &MediaAttachment,
        caption: &str,
    ) -> whatsapp_client::Result<()> {
        self.record(Sent {
            chat_id: chat_id.to_string(),
            text: caption.to_string(),
            media: Some(media.filename.clone()),
            reply_to: None,
            at: Instant::now(),
        })
    }

    async fn reply(&self, to: &InboundMessage, text: &str) -> whatsapp_client::Result<()> {
        self.record(Sent {
            chat_id: to.from.clone(),
            text: text.to_string(),
            media: None,
            reply_to: Some(to.id.clone()),
            at: Instant::now(),
        })
    }
}

const CONTACTS: &str = "\
9811111111,Cafe A,Tokha,Cafe,4.5,No website
+977982222222,Cafe B,Tokha-5,Bakery,N/A,No website
9813333333,Cafe C,Unknown Address,Business,N/A,No website
";

fn write_inputs(dir: &Path, template: Option<&str>) -> DispatcherConfig {
    let config = DispatcherConfig {
        contacts_file: dir.join("phone_numbers.txt"),
        template_file: dir.join("message.txt"),
        media_file: dir.join("advertisement.png"),
        ..DispatcherConfig::default()
    };
    std::fs::write(&config.contacts_file, CONTACTS).unwrap();
    if let Some(template) = template {
        std::fs::write(&config.template_file, template).unwrap();
    }
    config
}

fn inbound(id: &str, body: &str) -> ClientEvent {
    ClientEvent::Message(InboundMessage {
        id: id.into(),
        from: "9779800000000@c.us".into(),
        body: body.into(),
    })
}

#[tokio::test(start_paused = true)]
async fn sends_every_contact_in_order_and_keeps_going_after_failures() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), Some("Hi {business_name} from {business_address}\n"));
    let grace = config.grace_period();

    let client = Arc::new(MockClient::failing(&["977982222222@c.us"]));
    let mut dispatcher = Dispatcher::new(client.clone(), config, &RepliesConfig::default());

    let (tx, rx) = mpsc::channel(8);
    tx.send(ClientEvent::Qr("2@pairing".into())).await.unwrap();
    tx.send(ClientEvent::Ready).await.unwrap();

    let stats = dispatcher.run(rx).await.unwrap();
    let finished = Instant::now();

    assert_eq!(
        stats,
        DispatchStats {
            successful: 2,
            failed: 1
        }
    );
    assert_eq!(stats.total(), 3);

    let sent = client.sent();
    let targets: Vec<&str> = sent.iter().map(|s| s.chat_id.as_str()).collect();
    assert_eq!(
        targets,
        ["9779811111111@c.us", "977982222222@c.us", "9779813333333@c.us"]
    );
    assert_eq!(sent[0].text, "Hi Cafe A from Tokha");
    assert_eq!(sent[2].text, "Hi Cafe C from Unknown Address");
    assert!(sent.iter().all(|s| s.media.is_none()));

    for pair in sent.windows(2) {
        let gap = pair[1].at - pair[0].at;
        assert!(gap >= Duration::from_secs(2), "gap too short: {gap:?}");
        assert!(gap < Duration::from_secs(4), "gap too long: {gap:?}");
    }
    // Only the grace period follows the last send.
    assert_eq!(finished - sent[2].at, grace);
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn media_goes_out_with_the_rendered_caption() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), Some("Hello {business_name}"));
    std::fs::write(&config.media_file, b"png").unwrap();

    let client = Arc::new(MockClient::default());
    let mut dispatcher = Dispatcher::new(client.clone(), config, &RepliesConfig::default());

    let (tx, rx) = mpsc::channel(8);
    tx.send(ClientEvent::Ready).await.unwrap();
    dispatcher.run(rx).await.unwrap();

    let sent = client.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].text, "Hello Cafe B");
    assert!(sent
        .iter()
        .all(|s| s.media.as_deref() == Some("advertisement.png")));
}

#[tokio::test(start_paused = true)]
async fn keyword_replies_are_answered_only_once_ready() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), Some("Hi {business_name}"));
    let replies = RepliesConfig::default();

    let client = Arc::new(MockClient::default());
    let mut dispatcher = Dispatcher::new(client.clone(), config, &replies);

    let (tx, rx) = mpsc::channel(8);
    tx.send(inbound("early", "Visit Website")).await.unwrap();
    tx.send(ClientEvent::Ready).await.unwrap();
    tx.send(inbound("m1", "  Yes I am interested ")).await.unwrap();
    tx.send(inbound("m2", "hello?")).await.unwrap();

    dispatcher.run(rx).await.unwrap();

    let replies_sent: Vec<Sent> = client
        .sent()
        .into_iter()
        .filter(|s| s.reply_to.is_some())
        .collect();
    assert_eq!(replies_sent.len(), 1);
    assert_eq!(replies_sent[0].reply_to.as_deref(), Some("m1"));
    assert_eq!(replies_sent[0].chat_id, "9779800000000@c.us");
    assert_eq!(replies_sent[0].text, replies.interest_reply);

    // Replies do not count toward the outreach tally.
    assert_eq!(dispatcher.stats().total(), 3);
}

#[tokio::test(start_paused = true)]
async fn replies_wait_for_the_in_flight_send() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), Some("Hi {business_name}"));

    let client = Arc::new(MockClient::slow(Duration::from_secs(1)));
    let mut dispatcher = Dispatcher::new(client.clone(), config, &RepliesConfig::default());

    let (tx, rx) = mpsc::channel(8);
    tx.send(ClientEvent::Ready).await.unwrap();
    // Lands halfway through the first send.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(inbound("m1", "Visit Website")).await.unwrap();
    });

    dispatcher.run(rx).await.unwrap();

    let sent = client.sent();
    let outreach: Vec<&Sent> = sent.iter().filter(|s| s.reply_to.is_none()).collect();
    let reply = sent
        .iter()
        .find(|s| s.reply_to.as_deref() == Some("m1"))
        .expect("keyword reply sent");

    assert_eq!(outreach.len(), 3);
    assert!(reply.at >= outreach[0].at, "reply ran during the first send");
    assert!(reply.at < outreach[1].at);
    // Recorded in completion order: first send, then the reply.
    assert_eq!(sent[0].chat_id, "9779811111111@c.us");
    assert_eq!(sent[1].reply_to.as_deref(), Some("m1"));
}

#[tokio::test(start_paused = true)]
async fn disconnect_halts_sending() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), Some("Hi {business_name}"));

    let client = Arc::new(MockClient::default());
    let mut dispatcher = Dispatcher::new(client.clone(), config, &RepliesConfig::default());

    let (tx, rx) = mpsc::channel(8);
    tx.send(ClientEvent::Ready).await.unwrap();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(ClientEvent::Disconnected("LOGOUT".into()))
            .await
            .unwrap();
    });

    let err = dispatcher.run(rx).await.unwrap_err();

    assert!(matches!(err, OutreachError::Disconnected(ref reason) if reason == "LOGOUT"));
    assert_eq!(client.sent().len(), 1);
    assert_eq!(
        dispatcher.stats(),
        DispatchStats {
            successful: 1,
            failed: 0
        }
    );
}

#[tokio::test(start_paused = true)]
async fn auth_failure_before_ready_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), Some("Hi {business_name}"));

    let client = Arc::new(MockClient::default());
    let mut dispatcher = Dispatcher::new(client.clone(), config, &RepliesConfig::default());

    let (tx, rx) = mpsc::channel(8);
    tx.send(ClientEvent::AuthFailure("session FAILED".into()))
        .await
        .unwrap();
    drop(tx);

    let err = dispatcher.run(rx).await.unwrap_err();
    assert!(matches!(err, OutreachError::AuthFailure(_)));
    assert!(client.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_template_stops_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), None);

    let client = Arc::new(MockClient::default());
    let mut dispatcher = Dispatcher::new(client.clone(), config, &RepliesConfig::default());

    let (tx, rx) = mpsc::channel(8);
    tx.send(ClientEvent::Ready).await.unwrap();

    let err = dispatcher.run(rx).await.unwrap_err();
    match err {
        OutreachError::MissingInputFile { path, .. } => assert!(path.ends_with("message.txt")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(client.sent().is_empty());
}
