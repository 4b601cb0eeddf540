use crate::rotation::RotationPool;
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Liveness probe target used when the caller does not supply one
pub const DEFAULT_PROBE_URL: &str = "https://httpbin.org/ip";

/// Per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on concurrent probes
pub const DEFAULT_PROBE_WORKERS: usize = 10;

/// Tests whether a single proxy responds to the probe within the timeout
pub async fn test_proxy(proxy: &str, probe_url: &str, timeout: Duration) -> bool {
    let proxy_spec = match reqwest::Proxy::all(proxy) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Invalid proxy {}: {}", proxy, e);
            return false;
        }
    };

    let client = match reqwest::Client::builder()
        .proxy(proxy_spec)
        .timeout(timeout)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to build probe client for {}: {}", proxy, e);
            return false;
        }
    };

    match client.get(probe_url).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            tracing::warn!("Proxy {} returned status {}", proxy, response.status());
            false
        }
        Err(e) => {
            tracing::warn!("Proxy {} test failed: {}", proxy, e);
            false
        }
    }
}

/// Probes every entry concurrently and returns the live subset, preserving
/// the original order.
///
/// Probes run `max_workers` at a time; each is bounded by `timeout`.
pub async fn filter_live(
    entries: &[String],
    probe_url: &str,
    timeout: Duration,
    max_workers: usize,
) -> Vec<String> {
    tracing::info!("Testing {} pool entries", entries.len());

    let results: Vec<(usize, bool)> = stream::iter(entries.iter().cloned().enumerate())
        .map(|(index, entry)| {
            let probe_url = probe_url.to_string();
            async move { (index, test_proxy(&entry, &probe_url, timeout).await) }
        })
        .buffer_unordered(max_workers.max(1))
        .collect()
        .await;

    let mut live_indices: Vec<usize> = results
        .into_iter()
        .filter(|(_, ok)| *ok)
        .map(|(index, _)| index)
        .collect();
    live_indices.sort_unstable();

    let live: Vec<String> = live_indices
        .into_iter()
        .map(|index| entries[index].clone())
        .collect();

    tracing::info!("{} of {} entries responded", live.len(), entries.len());
    live
}

/// Re-tests every pool entry and replaces the cached pool with the live
/// subset. This is the only operation that shrinks a pool automatically.
pub async fn refresh(pool: &RotationPool, probe_url: &str, timeout: Duration, max_workers: usize) {
    let entries = pool.snapshot();
    if entries.is_empty() {
        return;
    }

    let live = filter_live(&entries, probe_url, timeout, max_workers).await;
    pool.replace(live);
    tracing::info!("Pool refreshed with {} live entries", pool.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unparsable_proxy_fails_probe() {
        assert!(!test_proxy("", DEFAULT_PROBE_URL, Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn test_unreachable_proxy_fails_probe() {
        // Nothing listens on port 9 locally
        let ok = test_proxy(
            "http://127.0.0.1:9",
            "http://127.0.0.1:9/ip",
            Duration::from_millis(200),
        )
        .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_refresh_empty_pool_is_noop() {
        let pool = RotationPool::from_entries(vec![]);
        refresh(&pool, DEFAULT_PROBE_URL, Duration::from_millis(100), 2).await;
        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_drops_dead_entries() {
        let pool = RotationPool::from_entries(vec!["http://127.0.0.1:9".to_string()]);
        refresh(
            &pool,
            "http://127.0.0.1:9/ip",
            Duration::from_millis(200),
            2,
        )
        .await;
        assert!(pool.is_empty());
    }
}
