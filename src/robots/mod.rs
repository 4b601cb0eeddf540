//! Robots.txt handling and the politeness gate
//!
//! Fetches, parses, and caches robots.txt rules per origin, and enforces the
//! configured request delay. The gate fails open: when robots.txt cannot be
//! retrieved or parsed, fetching is allowed and the failure is logged. This is
//! a deliberate, documented risk inherited from the system being modeled, not
//! an oversight.

mod cache;
mod parser;

pub use cache::{RobotsCache, ROBOTS_CACHE_MAX_ENTRIES, ROBOTS_CACHE_TTL};
pub use parser::{ParsedRobots, RequestRate};

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Returns the scheme+host[:port] origin a URL belongs to.
///
/// The origin is the unit of politeness: robots caching and request spacing
/// are both keyed on it.
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Fetches and parses robots.txt for an origin, failing open
pub async fn fetch_robots(client: &Client, origin: &str) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin);

    match client.get(&robots_url).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body),
            Err(e) => {
                tracing::warn!("Failed to read robots.txt body for {}: {}", origin, e);
                ParsedRobots::allow_all()
            }
        },
        Ok(response) => {
            tracing::warn!(
                "robots.txt for {} returned HTTP {}, allowing all",
                origin,
                response.status()
            );
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch robots.txt for {}: {}, allowing all", origin, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Gates each fetch on robots.txt rules and the configured request delay.
///
/// Rules are cached per origin in an injectable, session-owned [`RobotsCache`].
/// Fail-open results are cached with the same TTL so an unreachable origin is
/// not re-probed for every URL.
pub struct PolitenessGate {
    cache: RobotsCache,
    client: Client,
    user_agent: String,
    respect_robots: bool,
    request_delay: Duration,
}

impl PolitenessGate {
    pub fn new(
        client: Client,
        user_agent: String,
        respect_robots: bool,
        request_delay: Duration,
    ) -> Self {
        Self {
            cache: RobotsCache::new(),
            client,
            user_agent,
            respect_robots,
            request_delay,
        }
    }

    /// Replaces the default cache (isolated stores for tests)
    pub fn with_cache(mut self, cache: RobotsCache) -> Self {
        self.cache = cache;
        self
    }

    /// The configured minimum delay between requests to one origin
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// Checks whether a URL may be fetched.
    ///
    /// Unparsable URLs and unreachable robots.txt both fail open.
    pub async fn should_fetch(&self, url: &str) -> bool {
        if !self.respect_robots {
            return true;
        }

        let Some(origin) = parse_origin(url) else {
            return true;
        };

        let robots = self.robots_for(&origin).await;
        robots.is_allowed(url, &self.user_agent)
    }

    /// Sleeps for the configured request delay
    pub async fn apply_delay(&self) {
        if !self.request_delay.is_zero() {
            tracing::debug!("Applying request delay of {:?}", self.request_delay);
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// The crawl delay the origin of `url` declares for our user agent
    pub async fn crawl_delay(&self, url: &str) -> Option<f64> {
        let origin = parse_origin(url)?;
        self.robots_for(&origin).await.crawl_delay(&self.user_agent)
    }

    /// The request rate the origin of `url` declares for our user agent
    pub async fn request_rate(&self, url: &str) -> Option<RequestRate> {
        let origin = parse_origin(url)?;
        self.robots_for(&origin).await.request_rate(&self.user_agent)
    }

    /// Sitemap URLs the origin of `url` declares
    pub async fn sitemaps(&self, url: &str) -> Vec<String> {
        match parse_origin(url) {
            Some(origin) => self.robots_for(&origin).await.sitemaps().to_vec(),
            None => Vec::new(),
        }
    }

    /// Returns the cached rules for an origin, fetching lazily on first use.
    ///
    /// The cache lock is released before the network call; a concurrent miss
    /// may fetch the same robots.txt twice, which is harmless.
    async fn robots_for(&self, origin: &str) -> ParsedRobots {
        if let Some(robots) = self.cache.get(origin) {
            tracing::debug!("Using cached robots.txt for {}", origin);
            return robots;
        }

        tracing::debug!("Fetching robots.txt for {}", origin);
        let robots = fetch_robots(&self.client, origin).await;
        self.cache.insert(origin.to_string(), robots.clone());
        robots
    }
}

fn parse_origin(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => origin_of(&parsed),
        Err(e) => {
            tracing::warn!("Cannot determine origin of '{}': {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of_strips_path_and_query() {
        let url = Url::parse("https://example.com/a/b?q=1").unwrap();
        assert_eq!(origin_of(&url).as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_origin_of_keeps_explicit_port() {
        let url = Url::parse("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(origin_of(&url).as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_origin_of_default_port_omitted() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(origin_of(&url).as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn test_should_fetch_when_robots_disabled() {
        let gate = PolitenessGate::new(
            Client::new(),
            "TestBot".to_string(),
            false,
            Duration::ZERO,
        );
        assert!(gate.should_fetch("https://example.com/anything").await);
    }

    #[tokio::test]
    async fn test_should_fetch_fails_open_on_bad_url() {
        let gate = PolitenessGate::new(Client::new(), "TestBot".to_string(), true, Duration::ZERO);
        assert!(gate.should_fetch("not a url").await);
    }

    #[tokio::test]
    async fn test_apply_delay_zero_returns_immediately() {
        let gate = PolitenessGate::new(
            Client::new(),
            "TestBot".to_string(),
            true,
            Duration::ZERO,
        );
        let start = std::time::Instant::now();
        gate.apply_delay().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
