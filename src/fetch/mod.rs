//! HTTP fetching with bounded retries
//!
//! Wraps a single fetch in a fixed retry budget with a constant inter-attempt
//! wait. Identity and proxy are re-resolved from the rotation pools right
//! before every network call, so rotation state advances even on attempts
//! that fail.

mod client;

pub use client::build_http_client;

use crate::config::ScraperConfig;
use crate::rotation::{RotationPolicy, RotationPool};
use crate::FetchError;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Constant wait between attempts. Deliberately not exponential.
pub const RETRY_WAIT: Duration = Duration::from_secs(2);

/// The fetch-retry unit.
///
/// Holds the shared (proxyless) client; when a proxy is selected for an
/// attempt, a per-attempt client is built around it, since the proxy is a
/// client-level setting in reqwest.
pub struct Fetcher {
    config: Arc<ScraperConfig>,
    user_agents: Arc<RotationPool>,
    proxies: Arc<RotationPool>,
    client: Client,
    retry_wait: Duration,
}

impl Fetcher {
    pub fn new(
        config: Arc<ScraperConfig>,
        user_agents: Arc<RotationPool>,
        proxies: Arc<RotationPool>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config, None)?;
        Ok(Self {
            config,
            user_agents,
            proxies,
            client,
            retry_wait: RETRY_WAIT,
        })
    }

    /// Overrides the inter-attempt wait (tests)
    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    /// A clone of the shared HTTP client (used by the politeness gate)
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Fetches a URL, retrying on any transport failure or non-2xx/3xx
    /// status.
    ///
    /// Makes exactly `max_retries` attempts (at least one) and returns the
    /// response body on the first success. Exhaustion yields a terminal error
    /// carrying the last failure's cause.
    pub async fn fetch_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let attempts = self.config.max_retries.max(1);
        let mut last_cause = String::new();

        for attempt in 1..=attempts {
            let user_agent = self.resolve_user_agent();
            let proxy = self.resolve_proxy();

            tracing::debug!(
                "Fetching {} (attempt {}/{}, proxy: {})",
                url,
                attempt,
                attempts,
                proxy.as_deref().unwrap_or("none")
            );

            match self.attempt(url, &user_agent, proxy.as_deref()).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::warn!("Attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                    last_cause = e.to_string();
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.retry_wait).await;
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts,
            cause: last_cause,
        })
    }

    /// One fetch attempt with a resolved identity and proxy
    async fn attempt(
        &self,
        url: &str,
        user_agent: &str,
        proxy: Option<&str>,
    ) -> Result<String, FetchError> {
        let client = match proxy {
            Some(p) => build_http_client(&self.config, Some(p)).map_err(|e| {
                FetchError::Transport {
                    url: url.to_string(),
                    source: e,
                }
            })?,
            None => self.client.clone(),
        };

        let response = client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })
    }

    fn resolve_user_agent(&self) -> String {
        if self.config.user_agent_rotation {
            if let Some(agent) = self.user_agents.select(RotationPolicy::Random) {
                return agent;
            }
        }
        self.config.user_agent.clone()
    }

    fn resolve_proxy(&self) -> Option<String> {
        if !self.config.use_proxies {
            return None;
        }
        let policy = RotationPolicy::parse(&self.config.proxy_rotation_policy);
        self.proxies.select(policy)
    }
}
