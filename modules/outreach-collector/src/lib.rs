pub mod composer;
pub mod jobs;
pub mod normalize;
pub mod output;
pub mod pipeline;

pub use jobs::{
    await_completion, ApifyScrapeService, JobHandle, JobState, JobStatus, ScrapeOptions,
    ScrapeService, TerminalResult,
};
pub use normalize::{dedupe_by_phone, normalize};
pub use pipeline::{Collector, CollectorStats};
