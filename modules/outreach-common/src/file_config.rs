use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// TOML-backed settings. Every section is optional; a missing file means
/// built-in defaults. Secrets stay as env vars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub collector: CollectorConfig,
    pub dispatcher: DispatcherConfig,
    pub profile: ProfileConfig,
    pub replies: RepliesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub actor_id: String,
    pub location: String,
    pub search_queries: Vec<String>,
    pub max_places_per_search: u32,
    pub language: String,
    pub poll_interval_ms: u64,
    pub contacts_file: PathBuf,
    pub business_data_file: PathBuf,
    pub messages_file: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            actor_id: "nwua9Gu5YrADL7ZDj".to_string(),
            location: "tokha, kathmandu".to_string(),
            search_queries: ["restaurant", "hotel", "shop", "business", "cafe", "store"]
                .iter()
                .map(|q| q.to_string())
                .collect(),
            max_places_per_search: 30,
            language: "en".to_string(),
            poll_interval_ms: 10_000,
            contacts_file: PathBuf::from("phone_numbers.txt"),
            business_data_file: PathBuf::from("business_data.json"),
            messages_file: PathBuf::from("custom_messages.txt"),
        }
    }
}

impl CollectorConfig {
    /// `"{query} {location}"` for every configured query.
    pub fn search_terms(&self) -> Vec<String> {
        self.search_queries
            .iter()
            .map(|q| format!("{} {}", q, self.location))
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub contacts_file: PathBuf,
    pub template_file: PathBuf,
    pub media_file: PathBuf,
    pub delay_between_messages_ms: u64,
    pub random_delay_range_ms: u64,
    pub country_code: String,
    pub max_messages_per_session: usize,
    pub grace_period_ms: u64,
    pub session_poll_interval_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            contacts_file: PathBuf::from("phone_numbers.txt"),
            template_file: PathBuf::from("message.txt"),
            media_file: PathBuf::from("advertisement.png"),
            delay_between_messages_ms: 2_000,
            random_delay_range_ms: 2_000,
            country_code: "977".to_string(),
            max_messages_per_session: 1_000,
            grace_period_ms: 5_000,
            session_poll_interval_ms: 3_000,
        }
    }
}

impl DispatcherConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_messages_ms)
    }

    pub fn random_delay_range(&self) -> Duration {
        Duration::from_millis(self.random_delay_range_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn session_poll_interval(&self) -> Duration {
        Duration::from_millis(self.session_poll_interval_ms)
    }
}

/// Who the outreach is from. Feeds the randomized composer and canned replies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub company_name: String,
    pub features: Vec<String>,
    pub pricing: String,
    pub starting_price: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub signature: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            company_name: "WebGhar".to_string(),
            features: [
                "Clean & Professional Design",
                "Mobile-Friendly",
                "Fast Loading",
                "SEO Optimized",
                "Easy to Manage",
                "Affordable Pricing",
            ]
            .iter()
            .map(|f| f.to_string())
            .collect(),
            pricing: "affordable".to_string(),
            starting_price: "Rs. 15,000".to_string(),
            phone: "+9779765971233".to_string(),
            email: "info@webghar.com".to_string(),
            website: "www.webghar.com".to_string(),
            signature: "Team WebGhar 🌐".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepliesConfig {
    pub interest_trigger: String,
    pub interest_reply: String,
    pub website_trigger: String,
    pub website_reply: String,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            interest_trigger: "Yes I am interested".to_string(),
            interest_reply: "Thank you for your interest! 🙏\n\n\
I'm excited to help you create a beautiful website for your business.\n\n\
Let me know:\n\
• What type of business you have\n\
• Any specific features you'd like\n\
• Your budget range\n\n\
I'll get back to you with a customized proposal within 24 hours.\n\n\
Best regards,\n\
Team WebGhar 🌐"
                .to_string(),
            website_trigger: "Visit Website".to_string(),
            website_reply: "🌐 Visit our website: https://webgharofficial.github.io/WebGhar/\n\n\
Here you can:\n\
• See our portfolio of work\n\
• Learn about our services\n\
• View pricing packages\n\
• Contact us directly\n\n\
Feel free to explore and let me know if you have any questions! 😊"
                .to_string(),
        }
    }
}

/// Load the TOML settings file, or defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No settings file, using built-in defaults");
        return Ok(FileConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
