use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for the scraper.
///
/// Holds every recognized option: engine selection, identity rotation,
/// politeness, retry budget, request settings and general paths. Constructed
/// once and treated as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// The scraping engine to use
    pub engine: String,

    /// Browser name for browser-based engines (recognized, unused)
    pub browser: String,

    /// Whether a browser engine would run headless (recognized, unused)
    pub headless: bool,

    /// The user agent sent when rotation is disabled
    pub user_agent: String,

    /// Whether to rotate user agents per attempt
    pub user_agent_rotation: bool,

    /// Path to a newline-separated user agent list
    pub user_agent_list_path: String,

    /// Whether to route requests through proxies
    pub use_proxies: bool,

    /// Proxy rotation policy: "round-robin" or "random"
    pub proxy_rotation_policy: String,

    /// Path to a newline-separated proxy list
    pub proxy_list_path: String,

    /// Whether to consult robots.txt before fetching
    pub respect_robots_txt: bool,

    /// Delay between requests to the same origin, in seconds
    pub request_delay: f64,

    /// Upper bound on requests per minute per origin
    pub max_requests_per_minute: u32,

    /// Number of fetch attempts per URL
    pub max_retries: u32,

    /// Hard timeout per fetch attempt, in seconds
    pub timeout: u64,

    /// Whether to verify TLS certificates
    pub verify_ssl: bool,

    /// Whether to solve captchas (recognized, unused)
    pub solve_captchas: bool,

    /// Captcha solving service name (recognized, unused)
    pub captcha_service: String,

    /// API key for the captcha service (recognized, unused)
    pub captcha_api_key: String,

    /// Default log level
    pub log_level: String,

    /// Directory for stored data
    pub data_dir: String,

    /// Global cap on concurrent fetches within a job
    pub max_concurrent_fetches: usize,

    // Maps last so the TOML form stays valid (values before tables)
    /// Cookies sent with every request
    pub cookies: BTreeMap<String, String>,

    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            engine: "http".to_string(),
            browser: "chrome".to_string(),
            headless: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            user_agent_rotation: false,
            user_agent_list_path: "./config/user_agents.txt".to_string(),
            use_proxies: false,
            proxy_rotation_policy: "round-robin".to_string(),
            proxy_list_path: "./config/proxies.txt".to_string(),
            respect_robots_txt: true,
            request_delay: 2.0,
            max_requests_per_minute: 30,
            max_retries: 3,
            timeout: 30,
            verify_ssl: true,
            solve_captchas: false,
            captcha_service: "2captcha".to_string(),
            captcha_api_key: String::new(),
            log_level: "INFO".to_string(),
            data_dir: "./data".to_string(),
            max_concurrent_fetches: 1,
            cookies: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }
}

impl ScraperConfig {
    /// Returns the headers to send with requests.
    ///
    /// When no headers are configured a browser-like default set is used.
    /// `User-Agent` is intentionally absent: it is resolved per attempt by the
    /// fetch unit (rotation may pick a different agent each time).
    pub fn effective_headers(&self) -> BTreeMap<String, String> {
        if !self.headers.is_empty() {
            return self.headers.clone();
        }

        let mut headers = BTreeMap::new();
        headers.insert(
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
        );
        headers.insert("Accept-Language".to_string(), "en-US,en;q=0.5".to_string());
        headers.insert("Connection".to_string(), "keep-alive".to_string());
        headers.insert("Upgrade-Insecure-Requests".to_string(), "1".to_string());
        headers.insert("Cache-Control".to_string(), "max-age=0".to_string());
        headers
    }

    /// Renders the configured cookies as a single `Cookie` header value.
    ///
    /// Returns None when no cookies are configured.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let rendered = self
            .cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_recognized_options() {
        let config = ScraperConfig::default();
        assert_eq!(config.engine, "http");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.request_delay, 2.0);
        assert_eq!(config.max_requests_per_minute, 30);
        assert!(config.respect_robots_txt);
        assert!(config.verify_ssl);
        assert_eq!(config.max_concurrent_fetches, 1);
    }

    #[test]
    fn test_effective_headers_defaults_when_empty() {
        let config = ScraperConfig::default();
        let headers = config.effective_headers();
        assert!(headers.contains_key("Accept"));
        assert!(!headers.contains_key("User-Agent"));
    }

    #[test]
    fn test_effective_headers_passthrough() {
        let mut config = ScraperConfig::default();
        config
            .headers
            .insert("X-Custom".to_string(), "1".to_string());
        let headers = config.effective_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Custom").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_cookie_header() {
        let mut config = ScraperConfig::default();
        assert!(config.cookie_header().is_none());

        config
            .cookies
            .insert("session".to_string(), "abc".to_string());
        config.cookies.insert("theme".to_string(), "dark".to_string());
        assert_eq!(
            config.cookie_header().as_deref(),
            Some("session=abc; theme=dark")
        );
    }
}
