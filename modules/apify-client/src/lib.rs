pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{GoogleMapsPlace, GoogleMapsScraperInput, RunData};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base_url(token: String, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        let resp = error_for_status(resp).await?;

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        if api_resp.data.id.trim().is_empty() {
            return Err(ApifyError::MissingRunId);
        }
        Ok(api_resp.data)
    }

    /// Fetch current run metadata. Returns right away; callers decide how often to poll.
    pub async fn get_run(&self, run_id: &str) -> Result<RunData> {
        let url = format!("{}/actor-runs/{}", self.base_url, run_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = error_for_status(resp).await?;

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        tracing::debug!(run_id, status = %api_resp.data.status, "Fetched run status");
        Ok(api_resp.data)
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = error_for_status(resp).await?;

        let body = resp.text().await?;
        let items: Vec<T> = serde_json::from_str(&body)?;
        Ok(items)
    }
}

async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApifyError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}
