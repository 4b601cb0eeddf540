use crate::robots::ParsedRobots;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default cap on cached origins
pub const ROBOTS_CACHE_MAX_ENTRIES: usize = 100;

/// Default time-to-live for a cached entry, measured from last use
pub const ROBOTS_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct CacheEntry {
    robots: ParsedRobots,
    last_used: Instant,
}

/// Bounded per-origin cache of parsed robots.txt rules.
///
/// Entries are built lazily on first access to an origin and reused until
/// evicted. Eviction runs only when the size cap is exceeded: entries idle
/// past the TTL go first, then the oldest-used until the cap is met again.
///
/// The cache is an explicitly constructed store with its own lock, owned by
/// the scraper session, so tests can instantiate isolated instances. The lock
/// is never held across a network call.
#[derive(Debug)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
    ttl: Duration,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::with_limits(ROBOTS_CACHE_MAX_ENTRIES, ROBOTS_CACHE_TTL)
    }

    pub fn with_limits(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
            ttl,
        }
    }

    /// Looks up the cached rules for an origin, refreshing its last-used time
    pub fn get(&self, origin: &str) -> Option<ParsedRobots> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(origin)?;
        entry.last_used = Instant::now();
        Some(entry.robots.clone())
    }

    /// Caches the rules for an origin, evicting if the cap is exceeded
    pub fn insert(&self, origin: String, robots: ParsedRobots) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            origin,
            CacheEntry {
                robots,
                last_used: Instant::now(),
            },
        );
        Self::evict(&mut entries, self.max_entries, self.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict(entries: &mut HashMap<String, CacheEntry>, max_entries: usize, ttl: Duration) {
        if entries.len() <= max_entries {
            return;
        }

        // TTL-expired entries go first
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.last_used) <= ttl);

        // Still over cap: drop oldest-used
        while entries.len() > max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(origin, _)| origin.clone());
            match oldest {
                Some(origin) => {
                    entries.remove(&origin);
                }
                None => break,
            }
        }
    }
}

impl Default for RobotsCache {
    fn default() -> Self {
        Self::new()
    }
}
