use crate::schema::{Record, Schema};
use std::path::PathBuf;
use std::time::Duration;

/// Lifecycle states of a job.
///
/// `Pending -> Running -> {Succeeded, PartiallyFailed, Failed}`; a recurring
/// job re-enters `Pending` after its wait interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    PartiallyFailed,
    Failed,
}

/// When a job runs: once, or repeatedly with a wait interval between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Once,
    Every(Duration),
}

/// A unit of scraping work: URLs, a schema, a schedule and an optional
/// export target
#[derive(Debug, Clone)]
pub struct Job {
    pub urls: Vec<String>,
    pub schema: Schema,
    pub schedule: Schedule,
    pub output: Option<PathBuf>,
}

impl Job {
    /// A one-shot job
    pub fn once(urls: Vec<String>, schema: Schema) -> Self {
        Self {
            urls,
            schema,
            schedule: Schedule::Once,
            output: None,
        }
    }

    /// A recurring job re-run every `interval`
    pub fn recurring(urls: Vec<String>, schema: Schema, interval: Duration) -> Self {
        Self {
            urls,
            schema,
            schedule: Schedule::Every(interval),
            output: None,
        }
    }

    /// Sets an export target written after every cycle
    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }
}

/// What happened to one URL within a job cycle
#[derive(Debug, Clone, PartialEq)]
pub enum UrlOutcome {
    /// Fetch and extraction succeeded
    Extracted(Record),

    /// robots.txt disallowed the URL; a non-error empty result
    Denied,

    /// The job was cancelled before this URL was enqueued
    Cancelled,

    /// The fetch failed after exhausting its retry budget
    Failed(String),
}

/// One URL's result, carrying the URL so callers can match records back to
/// their source regardless of completion order
#[derive(Debug, Clone, PartialEq)]
pub struct UrlResult {
    pub url: String,
    pub outcome: UrlOutcome,
}

/// The result of one job cycle
#[derive(Debug, Clone)]
pub struct JobReport {
    pub status: JobStatus,
    pub results: Vec<UrlResult>,

    /// Set when the cycle's export failed; the records themselves survive
    pub export_error: Option<String>,
}

impl JobReport {
    pub(crate) fn from_results(results: Vec<UrlResult>) -> Self {
        let status = status_of(&results);
        Self {
            status,
            results,
            export_error: None,
        }
    }

    /// The extracted records, in URL order
    pub fn records(&self) -> Vec<Record> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                UrlOutcome::Extracted(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Derives the terminal status from per-URL outcomes.
///
/// Failures decide: none -> Succeeded, some alongside records ->
/// PartiallyFailed, only failures -> Failed. Denied and cancelled URLs are
/// non-errors and count toward neither side.
fn status_of(results: &[UrlResult]) -> JobStatus {
    let failed = results
        .iter()
        .filter(|r| matches!(r.outcome, UrlOutcome::Failed(_)))
        .count();
    let extracted = results
        .iter()
        .filter(|r| matches!(r.outcome, UrlOutcome::Extracted(_)))
        .count();

    if failed == 0 {
        JobStatus::Succeeded
    } else if extracted > 0 {
        JobStatus::PartiallyFailed
    } else {
        JobStatus::Failed
    }
}
