//! Job runner and scheduler
//!
//! Drives a job's URLs through the politeness gate, fetch-retry unit and
//! extraction engine with bounded concurrency, per-origin serialization, and
//! optional recurring execution.

mod job;

pub use job::{Job, JobReport, JobStatus, Schedule, UrlOutcome, UrlResult};

use crate::config::ScraperConfig;
use crate::export::export_records;
use crate::extract::extract_from_html;
use crate::fetch::Fetcher;
use crate::robots::{origin_of, PolitenessGate};
use crate::schema::{Schema, Value};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Default)]
struct OriginState {
    last_request: Option<Instant>,
}

/// Runs jobs with bounded concurrency and per-origin politeness.
///
/// URLs fan out up to `max_concurrent_fetches` at a time; each origin has its
/// own async mutex held across delay and fetch, so at most one fetch per
/// origin is in flight and the configured delay is a genuine minimum spacing
/// between request starts, even when several URLs of one origin run
/// concurrently.
pub struct JobRunner {
    config: Arc<ScraperConfig>,
    fetcher: Arc<Fetcher>,
    gate: Arc<PolitenessGate>,
    origins: Mutex<HashMap<String, Arc<tokio::sync::Mutex<OriginState>>>>,
    cancel: CancellationToken,
}

impl JobRunner {
    pub fn new(
        config: Arc<ScraperConfig>,
        fetcher: Arc<Fetcher>,
        gate: Arc<PolitenessGate>,
    ) -> Self {
        Self {
            config,
            fetcher,
            gate,
            origins: Mutex::new(HashMap::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// A handle for cancelling this runner's jobs.
    ///
    /// Cancellation stops enqueuing new URL fetches immediately; fetches
    /// already in flight complete or time out naturally. There is no forced
    /// abort of an in-flight network call.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs a job to completion, honoring its schedule.
    ///
    /// A once job yields one report. A recurring job re-enters pending after
    /// its interval and yields one report per cycle until cancelled.
    pub async fn run(&self, job: &Job) -> Vec<JobReport> {
        let mut reports = Vec::new();

        loop {
            let report = self.run_cycle(job).await;
            let status = report.status;
            reports.push(report);

            match job.schedule {
                Schedule::Once => break,
                Schedule::Every(interval) => {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    tracing::info!(
                        "Job cycle finished ({:?}), next run in {:?}",
                        status,
                        interval
                    );
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
            }
        }

        reports
    }

    /// Runs one cycle of a job over all its URLs
    pub async fn run_cycle(&self, job: &Job) -> JobReport {
        tracing::info!("Job running: {} URLs", job.urls.len());

        let schema = &job.schema;
        let concurrency = self.config.max_concurrent_fetches.max(1);

        let mut indexed: Vec<(usize, UrlResult)> =
            stream::iter(job.urls.iter().cloned().enumerate())
                .map(|(index, url)| async move {
                    // Checked at poll time: a cancelled job stops enqueuing
                    // fetches, it does not abort ones already running
                    let outcome = if self.cancel.is_cancelled() {
                        UrlOutcome::Cancelled
                    } else {
                        self.process_url(&url, schema).await
                    };
                    (index, UrlResult { url, outcome })
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;
        indexed.sort_by_key(|(index, _)| *index);

        let results: Vec<UrlResult> = indexed.into_iter().map(|(_, r)| r).collect();
        let mut report = JobReport::from_results(results);

        if let Some(path) = &job.output {
            let records = report.records();
            if let Err(e) = export_records(&records, path) {
                tracing::error!("Export to {} failed: {}", path.display(), e);
                report.export_error = Some(e.to_string());
            }
        }

        tracing::info!(
            "Job finished with status {:?} ({} records)",
            report.status,
            report.records().len()
        );
        report
    }

    /// Processes one URL: politeness gate, per-origin spacing, fetch with
    /// retries, extraction
    async fn process_url(&self, url: &str, schema: &Schema) -> UrlOutcome {
        if !self.gate.should_fetch(url).await {
            tracing::warn!("robots.txt disallows {}, skipping", url);
            return UrlOutcome::Denied;
        }

        // Spacing is computed before the origin lock is taken; looking up the
        // robots crawl delay may itself hit the network
        let spacing = self.origin_spacing(url).await;
        let origin_gate = self.origin_gate(url);

        let fetched = {
            let mut state = origin_gate.lock().await;

            self.gate.apply_delay().await;
            if let Some(last) = state.last_request {
                let elapsed = last.elapsed();
                if elapsed < spacing {
                    tokio::time::sleep(spacing - elapsed).await;
                }
            }
            state.last_request = Some(Instant::now());

            self.fetcher.fetch_with_retry(url).await
        };

        match fetched {
            Ok(body) => {
                let mut record = extract_from_html(&body, schema);
                record
                    .entry("url".to_string())
                    .or_insert_with(|| Value::Text(url.to_string()));
                UrlOutcome::Extracted(record)
            }
            Err(e) => {
                tracing::error!("Fetch failed for {}: {}", url, e);
                UrlOutcome::Failed(e.to_string())
            }
        }
    }

    /// The minimum spacing between request starts for this URL's origin:
    /// the configured delay, the per-minute ceiling, and the origin's
    /// robots.txt crawl delay, whichever is largest
    async fn origin_spacing(&self, url: &str) -> Duration {
        let mut spacing = self.config.request_delay;

        if self.config.max_requests_per_minute > 0 {
            spacing = spacing.max(60.0 / self.config.max_requests_per_minute as f64);
        }

        if self.config.respect_robots_txt {
            if let Some(crawl_delay) = self.gate.crawl_delay(url).await {
                spacing = spacing.max(crawl_delay);
            }
        }

        Duration::from_secs_f64(spacing.max(0.0))
    }

    /// The serialization mutex for this URL's origin
    fn origin_gate(&self, url: &str) -> Arc<tokio::sync::Mutex<OriginState>> {
        let origin = Url::parse(url)
            .ok()
            .and_then(|u| origin_of(&u))
            .unwrap_or_else(|| url.to_string());

        let mut origins = self.origins.lock().unwrap();
        origins
            .entry(origin)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(OriginState::default())))
            .clone()
    }
}
