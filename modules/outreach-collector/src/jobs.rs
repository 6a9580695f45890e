//! Remote scrape jobs: submit, poll until terminal, fetch results.

use std::collections::HashSet;
use std::time::Duration;

use apify_client::{ApifyClient, GoogleMapsPlace, GoogleMapsScraperInput, RunData};
use async_trait::async_trait;
use outreach_common::file_config::CollectorConfig;
use outreach_common::poll::{Check, Poller};
use outreach_common::{OutreachError, Result};
use tracing::info;

/// Lifecycle of one scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    /// Map the remote status vocabulary. Anything unrecognized is a failure.
    pub fn from_remote(status: &str) -> Self {
        match status {
            "READY" | "STARTING" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "SUCCEEDED" => JobState::Succeeded,
            _ => JobState::Failed,
        }
    }

    /// States that keep the poll loop going by default.
    pub fn non_terminal() -> HashSet<JobState> {
        HashSet::from([JobState::Pending, JobState::Running])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub state: JobState,
    pub raw: String,
    pub dataset_id: Option<String>,
    pub runtime: Option<Duration>,
}

impl TryFrom<RunData> for JobStatus {
    type Error = OutreachError;

    /// A run without a status is a malformed response, not a failed job.
    fn try_from(run: RunData) -> Result<Self> {
        if run.status.trim().is_empty() {
            return Err(OutreachError::RemoteService(format!(
                "run {} returned no status",
                run.id
            )));
        }
        Ok(Self {
            state: JobState::from_remote(&run.status),
            dataset_id: Some(run.default_dataset_id.clone()).filter(|id| !id.is_empty()),
            runtime: run.runtime(),
            raw: run.status,
        })
    }
}

/// Where polling ended. `dataset_id` is only set for a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalResult {
    pub state: JobState,
    pub status: String,
    pub dataset_id: Option<String>,
    pub polls: u32,
}

impl TerminalResult {
    pub fn succeeded(&self) -> bool {
        self.state == JobState::Succeeded
    }
}

/// Fixed scrape options sent with every submission.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub actor_id: String,
    pub max_places_per_search: u32,
    pub language: String,
}

impl From<&CollectorConfig> for ScrapeOptions {
    fn from(config: &CollectorConfig) -> Self {
        Self {
            actor_id: config.actor_id.clone(),
            max_places_per_search: config.max_places_per_search,
            language: config.language.clone(),
        }
    }
}

#[async_trait]
pub trait ScrapeService: Send + Sync {
    /// Start a run for the given search strings.
    async fn submit(&self, search_terms: &[String], options: &ScrapeOptions) -> Result<JobHandle>;

    /// Current status of a run. One network round-trip, no waiting.
    async fn status(&self, job: &JobHandle) -> Result<JobStatus>;

    /// Items of a finished run's dataset.
    async fn fetch_results(&self, dataset_id: &str) -> Result<Vec<GoogleMapsPlace>>;
}

/// Poll `job` every `poller` interval until its state leaves `non_terminal`.
///
/// Blocks for the whole run; there is no timeout. A failed status call
/// aborts with a `RemoteService` error.
pub async fn await_completion<S: ScrapeService + ?Sized>(
    service: &S,
    job: &JobHandle,
    poller: &Poller,
    non_terminal: &HashSet<JobState>,
) -> Result<TerminalResult> {
    let outcome = poller
        .until(|attempt| async move {
            let status = service.status(job).await?;
            info!(poll = attempt, status = %status.raw, "Polled scrape job");
            let check = if non_terminal.contains(&status.state) {
                Check::Pending
            } else {
                Check::Done((attempt, status))
            };
            Ok::<_, OutreachError>(check)
        })
        .await?;

    let (polls, status) = outcome
        .ok_or_else(|| OutreachError::RemoteService(format!("gave up polling job {}", job.id)))?;
    if let Some(runtime) = status.runtime {
        info!(run_id = %job.id, status = %status.raw, runtime_secs = runtime.as_secs(), "Scrape job finished");
    }

    let dataset_id = match status.state {
        JobState::Succeeded => status.dataset_id,
        _ => None,
    };

    Ok(TerminalResult {
        state: status.state,
        status: status.raw,
        dataset_id,
        polls,
    })
}

/// [`ScrapeService`] backed by the Apify Google Maps scraper.
pub struct ApifyScrapeService {
    client: ApifyClient,
}

impl ApifyScrapeService {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

fn remote(err: apify_client::ApifyError) -> OutreachError {
    OutreachError::RemoteService(err.to_string())
}

#[async_trait]
impl ScrapeService for ApifyScrapeService {
    async fn submit(&self, search_terms: &[String], options: &ScrapeOptions) -> Result<JobHandle> {
        let input = GoogleMapsScraperInput::contact_scrape(
            search_terms.to_vec(),
            options.max_places_per_search,
            &options.language,
        );
        let run = self
            .client
            .start_run(&options.actor_id, &input)
            .await
            .map_err(remote)?;
        Ok(JobHandle { id: run.id })
    }

    async fn status(&self, job: &JobHandle) -> Result<JobStatus> {
        let run = self.client.get_run(&job.id).await.map_err(remote)?;
        run.try_into()
    }

    async fn fetch_results(&self, dataset_id: &str) -> Result<Vec<GoogleMapsPlace>> {
        self.client.get_dataset_items(dataset_id).await.map_err(remote)
    }
}
