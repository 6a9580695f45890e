use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::error::OutreachError;

/// Secrets and environment-specific values. Everything else lives in the
/// TOML [`FileConfig`](crate::FileConfig).
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Scraping
    pub apify_api_token: Option<String>,

    // Messaging gateway
    pub gateway_url: String,
    pub gateway_api_key: Option<String>,
    pub session_name: String,
    pub webhook_addr: SocketAddr,

    // Settings file
    pub config_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key lookup. `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let webhook_addr = non_empty("WEBHOOK_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8787".to_string());
        let webhook_addr = webhook_addr
            .parse()
            .with_context(|| format!("WEBHOOK_ADDR must be host:port, got {webhook_addr}"))?;

        Ok(Self {
            apify_api_token: non_empty("APIFY_API_TOKEN"),
            gateway_url: non_empty("WHATSAPP_GATEWAY_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            gateway_api_key: non_empty("WHATSAPP_API_KEY"),
            session_name: non_empty("WHATSAPP_SESSION").unwrap_or_else(|| "default".to_string()),
            webhook_addr,
            config_path: non_empty("OUTREACH_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("outreach.toml")),
        })
    }

    /// The collector cannot run without an Apify token.
    pub fn require_apify_token(&self) -> std::result::Result<&str, OutreachError> {
        self.apify_api_token
            .as_deref()
            .ok_or_else(|| OutreachError::Config("APIFY_API_TOKEN environment variable is required".into()))
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  APIFY_API_TOKEN: {}", preview_opt(&self.apify_api_token));
        tracing::info!("  WHATSAPP_GATEWAY_URL: {}", self.gateway_url);
        tracing::info!("  WHATSAPP_API_KEY: {}", preview_opt(&self.gateway_api_key));
        tracing::info!("  WHATSAPP_SESSION: {}", self.session_name);
        tracing::info!("  WEBHOOK_ADDR: {}", self.webhook_addr);
        tracing::info!("  OUTREACH_CONFIG: {}", self.config_path.display());
    }
}

/// First five characters and the length. Counts chars, not bytes.
fn preview(val: &str) -> String {
    let head: String = val.chars().take(5).collect();
    format!("{}...({} chars)", head, val.chars().count())
}

fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => preview(v),
        _ => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.gateway_url, "http://localhost:3000");
        assert_eq!(config.session_name, "default");
        assert_eq!(config.webhook_addr.port(), 8787);
        assert_eq!(config.config_path, PathBuf::from("outreach.toml"));
        assert!(config.require_apify_token().is_err());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APIFY_API_TOKEN", "  "),
            ("WHATSAPP_SESSION", "sales"),
        ]))
        .unwrap();
        assert!(config.apify_api_token.is_none());
        assert_eq!(config.session_name, "sales");
    }

    #[test]
    fn preview_handles_multibyte_secrets() {
        assert_eq!(preview("ééééééé"), "ééééé...(7 chars)");
        assert_eq!(preview("ab"), "ab...(2 chars)");
        assert_eq!(preview("apify_api_XYZ"), "apify...(13 chars)");
        assert_eq!(preview_opt(&None), "<not set>");
    }

    #[test]
    fn logging_non_ascii_keys_does_not_panic() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = AppConfig::from_lookup(lookup(&[
            ("APIFY_API_TOKEN", "ключ-12345"),
            ("WHATSAPP_API_KEY", "ééééé"),
        ]))
        .unwrap();
        config.log_keys();
    }

    #[test]
    fn bad_webhook_addr_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[("WEBHOOK_ADDR", "not-an-addr")]));
        assert!(result.is_err());
    }
}
