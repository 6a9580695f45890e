use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use outreach_common::poll::Poller;
use outreach_common::{file_config, AppConfig};
use outreach_dispatcher::session::watch_session;
use outreach_dispatcher::Dispatcher;
use whatsapp_client::{webhook, GatewayClient};

const EVENT_QUEUE_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("outreach=info".parse()?)
                .add_directive("whatsapp_client=info".parse()?),
        )
        .init();

    info!("Outreach dispatcher starting...");

    let config = AppConfig::from_env()?;
    let settings = file_config::load_config(&config.config_path)?;

    let gateway = Arc::new(GatewayClient::new(
        &config.gateway_url,
        config.gateway_api_key.as_deref(),
        &config.session_name,
    ));
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_SIZE);

    let listener = tokio::net::TcpListener::bind(config.webhook_addr)
        .await
        .with_context(|| format!("Failed to bind webhook listener on {}", config.webhook_addr))?;
    info!(addr = %config.webhook_addr, "Webhook listening for inbound messages");
    let app = webhook::router(tx.clone(), &config.session_name);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Webhook server stopped");
        }
    });

    let watcher_gateway = Arc::clone(&gateway);
    let poller = Poller::every(settings.dispatcher.session_poll_interval());
    tokio::spawn(async move {
        watch_session(watcher_gateway.as_ref(), poller, tx).await;
    });

    let mut dispatcher = Dispatcher::new(gateway, settings.dispatcher, &settings.replies);

    tokio::select! {
        result = dispatcher.run(rx) => match result {
            Ok(_) => {}
            Err(e) => error!(error = %e, "Dispatcher stopped"),
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
        }
    }

    Ok(())
}
