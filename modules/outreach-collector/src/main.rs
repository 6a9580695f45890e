use anyhow::Result;
use apify_client::ApifyClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use outreach_collector::{ApifyScrapeService, Collector};
use outreach_common::{file_config, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("outreach=info".parse()?)
                .add_directive("apify_client=info".parse()?),
        )
        .init();

    info!("Business collector starting...");

    let config = AppConfig::from_env()?;
    let settings = file_config::load_config(&config.config_path)?;
    let token = config.require_apify_token()?.to_string();

    let collector = Collector::new(
        ApifyScrapeService::new(ApifyClient::new(token)),
        settings.collector,
        settings.profile,
    );

    match collector.run().await {
        Ok(stats) => {
            info!("{stats}");
            if stats.messages_generated == 0 {
                return Ok(());
            }
            let cfg = collector.config();
            info!("Next steps:");
            info!("  1. Review business data: {}", cfg.business_data_file.display());
            info!("  2. Review custom messages: {}", cfg.messages_file.display());
            info!("  3. Run the dispatcher: cargo run --bin outreach-dispatcher");
            info!(
                "  4. {} now holds lines of phone,name,address,category,rating,website",
                cfg.contacts_file.display()
            );
        }
        Err(e) => error!(error = %e, "Collector run aborted"),
    }

    Ok(())
}
