use outreach_common::contacts;
use outreach_common::file_config::{CollectorConfig, ProfileConfig};
use outreach_common::poll::Poller;
use outreach_common::{BusinessRecord, OutreachError, Result};
use tracing::{error, info, warn};

use crate::composer;
use crate::jobs::{await_completion, JobState, ScrapeOptions, ScrapeService};
use crate::normalize::{dedupe_by_phone, normalize};
use crate::output;

/// Stats from a collector run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectorStats {
    pub items_downloaded: usize,
    pub businesses_found: usize,
    pub new_entries: usize,
    pub total_entries: usize,
    pub messages_generated: usize,
    pub sample_numbers: Vec<String>,
    pub sample_lines: Vec<String>,
}

impl std::fmt::Display for CollectorStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Collector Run Complete ===")?;
        writeln!(f, "Items downloaded:     {}", self.items_downloaded)?;
        writeln!(f, "Businesses found:     {}", self.businesses_found)?;
        writeln!(f, "New contact entries:  {}", self.new_entries)?;
        writeln!(f, "Total file entries:   {}", self.total_entries)?;
        writeln!(f, "Messages generated:   {}", self.messages_generated)?;
        if !self.sample_numbers.is_empty() {
            writeln!(f, "\nSample phone numbers:")?;
            for (i, number) in self.sample_numbers.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, number)?;
            }
        }
        if !self.sample_lines.is_empty() {
            writeln!(f, "\nSample contact lines:")?;
            for (i, line) in self.sample_lines.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, line)?;
            }
        }
        Ok(())
    }
}

/// Submit → poll → fetch → normalize/dedupe → persist.
pub struct Collector<S> {
    service: S,
    config: CollectorConfig,
    profile: ProfileConfig,
    poller: Poller,
}

impl<S: ScrapeService> Collector<S> {
    pub fn new(service: S, config: CollectorConfig, profile: ProfileConfig) -> Self {
        let poller = Poller::every(config.poll_interval());
        Self {
            service,
            config,
            profile,
            poller,
        }
    }

    pub async fn run(&self) -> Result<CollectorStats> {
        let terms = self.config.search_terms();
        info!(searches = ?terms, "Submitting Google Maps scrape");

        let job = self
            .service
            .submit(&terms, &ScrapeOptions::from(&self.config))
            .await?;
        info!(run_id = %job.id, "Scrape started, polling for completion");

        let result =
            await_completion(&self.service, &job, &self.poller, &JobState::non_terminal()).await?;
        if !result.succeeded() {
            error!(run_id = %job.id, status = %result.status, "Scrape run did not succeed");
            return Err(OutreachError::TerminalJobFailure {
                status: result.status,
            });
        }
        let dataset_id = result.dataset_id.ok_or_else(|| {
            OutreachError::RemoteService(format!("run {} succeeded without a dataset", job.id))
        })?;

        let places = self.service.fetch_results(&dataset_id).await?;
        info!(count = places.len(), dataset_id = %dataset_id, "Downloaded scrape results");

        let records = dedupe_by_phone(places.iter().filter_map(normalize).collect());
        let mut stats = CollectorStats {
            items_downloaded: places.len(),
            businesses_found: records.len(),
            ..Default::default()
        };
        if records.is_empty() {
            warn!("No phone numbers found in scrape results");
            return Ok(stats);
        }

        self.persist(&records, &mut stats)?;
        Ok(stats)
    }

    fn persist(&self, records: &[BusinessRecord], stats: &mut CollectorStats) -> Result<()> {
        output::write_snapshot(&self.config.business_data_file, records)?;
        info!(path = %self.config.business_data_file.display(), "Saved business data");

        let messages: Vec<(&BusinessRecord, String)> = records
            .iter()
            .map(|r| (r, composer::compose(r, &self.profile)))
            .collect();
        output::write_messages(&self.config.messages_file, &messages)?;
        info!(
            count = messages.len(),
            path = %self.config.messages_file.display(),
            "Saved custom messages"
        );

        let merged = contacts::append_records(&self.config.contacts_file, records)?;
        info!(
            appended = merged.appended,
            total = merged.lines.len(),
            path = %self.config.contacts_file.display(),
            "Updated contact file"
        );

        stats.new_entries = merged.appended;
        stats.total_entries = merged.lines.len();
        stats.messages_generated = messages.len();
        stats.sample_numbers = records.iter().take(10).map(|r| r.phone.clone()).collect();
        stats.sample_lines = records.iter().take(3).map(BusinessRecord::contact_line).collect();
        Ok(())
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }
}
