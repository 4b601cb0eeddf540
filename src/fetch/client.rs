use crate::config::ScraperConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::Client;
use std::sync::Once;
use std::time::Duration;

static INSECURE_TLS_WARNING: Once = Once::new();

/// Builds an HTTP client from the configuration.
///
/// Default headers and cookies come from the config; `User-Agent` is not set
/// here because the fetch unit resolves it per attempt. When `verify_ssl` is
/// off, certificate checks are skipped and a warning is logged once per
/// process.
pub fn build_http_client(
    config: &ScraperConfig,
    proxy: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.effective_headers() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header '{}'", name),
        }
    }

    if let Some(cookie) = config.cookie_header() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(e) => tracing::warn!("Skipping invalid cookie header: {}", e),
        }
    }

    let mut builder = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if !config.verify_ssl {
        INSECURE_TLS_WARNING.call_once(|| {
            tracing::warn!("TLS certificate verification is disabled for this process");
        });
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(proxy) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }

    builder.build()
}
