//! High-level scraper session
//!
//! Owns the HTTP client, rotation pools and robots cache for one scraping
//! session. The caches are constructed here rather than living in global
//! state, so separate sessions (and tests) are fully isolated.

use crate::config::{validate, ScraperConfig};
use crate::export::{export_records, ExportResult};
use crate::extract::extract_from_html;
use crate::fetch::Fetcher;
use crate::robots::PolitenessGate;
use crate::rotation::RotationPool;
use crate::runner::JobRunner;
use crate::schema::{Record, Schema};
use crate::{ConfigError, ScrapeError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The closed set of fetch engines.
///
/// Browser-driven engines are out of scope; the HTTP engine is the only
/// variant. Unknown names are a typed error at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Http,
}

impl Engine {
    /// Resolves an engine by name
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "http" => Ok(Engine::Http),
            other => Err(ConfigError::UnknownEngine(other.to_string())),
        }
    }
}

/// A scraping session.
///
/// Construction validates the configuration, resolves the engine, loads the
/// rotation pools and builds the shared HTTP client and politeness gate.
pub struct Scraper {
    config: Arc<ScraperConfig>,
    engine: Engine,
    fetcher: Arc<Fetcher>,
    gate: Arc<PolitenessGate>,
    user_agents: Arc<RotationPool>,
    proxies: Arc<RotationPool>,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        validate(&config)?;
        let engine = Engine::from_name(&config.engine)?;
        tracing::info!("Initializing scraper with {:?} engine", engine);

        let user_agents = if config.user_agent_rotation {
            Arc::new(RotationPool::load_user_agents(Path::new(
                &config.user_agent_list_path,
            )))
        } else {
            Arc::new(RotationPool::from_entries(vec![]))
        };

        let proxies = if config.use_proxies {
            Arc::new(RotationPool::load_proxies(Path::new(&config.proxy_list_path)))
        } else {
            Arc::new(RotationPool::from_entries(vec![]))
        };

        let config = Arc::new(config);
        let fetcher = Arc::new(Fetcher::new(
            config.clone(),
            user_agents.clone(),
            proxies.clone(),
        )?);

        if config.respect_robots_txt {
            tracing::info!("robots.txt checking enabled");
        }
        let gate = Arc::new(PolitenessGate::new(
            fetcher.client(),
            config.user_agent.clone(),
            config.respect_robots_txt,
            Duration::from_secs_f64(config.request_delay.max(0.0)),
        ));

        Ok(Self {
            config,
            engine,
            fetcher,
            gate,
            user_agents,
            proxies,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn user_agents(&self) -> &Arc<RotationPool> {
        &self.user_agents
    }

    pub fn proxies(&self) -> &Arc<RotationPool> {
        &self.proxies
    }

    pub fn politeness(&self) -> &Arc<PolitenessGate> {
        &self.gate
    }

    /// Scrapes a single URL with the given schema.
    ///
    /// Returns `Ok(None)` when robots.txt disallows the URL — a non-error
    /// empty result. Fetch failures (after retries) are errors; extraction
    /// problems degrade to nulled or omitted fields, never errors.
    pub async fn scrape(&self, url: &str, schema: &Schema) -> Result<Option<Record>, ScrapeError> {
        tracing::info!("Scraping URL: {}", url);

        if !self.gate.should_fetch(url).await {
            tracing::warn!("robots.txt disallows scraping {}", url);
            return Ok(None);
        }

        self.gate.apply_delay().await;

        let body = self.fetcher.fetch_with_retry(url).await?;
        Ok(Some(extract_from_html(&body, schema)))
    }

    /// Builds a job runner sharing this session's client, pools and caches
    pub fn runner(&self) -> JobRunner {
        JobRunner::new(self.config.clone(), self.fetcher.clone(), self.gate.clone())
    }

    /// Exports records to a path, format chosen by extension
    pub fn export(&self, records: &[Record], path: &Path) -> ExportResult<()> {
        export_records(records, path)
    }
}
