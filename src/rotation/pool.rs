use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Selection policy for a rotation pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    RoundRobin,
    Random,
}

impl RotationPolicy {
    /// Parses a policy name, falling back to random with a warning
    pub fn parse(name: &str) -> Self {
        match name {
            "round-robin" => RotationPolicy::RoundRobin,
            "random" => RotationPolicy::Random,
            other => {
                tracing::warn!("Unknown rotation policy '{}', falling back to random", other);
                RotationPolicy::Random
            }
        }
    }
}

/// Built-in user agents used when no list file is available
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    // Chrome
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.101 Safari/537.36",
    // Firefox
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (X11; Linux i686; rv:89.0) Gecko/20100101 Firefox/89.0",
    // Safari
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    // Edge
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36 Edg/91.0.864.59",
];

#[derive(Debug)]
struct PoolState {
    entries: Vec<String>,
    cursor: usize,
}

/// A cached list of interchangeable identities or proxies with a selection
/// policy.
///
/// The entries and the round-robin cursor live behind one mutex so selection
/// and mutation stay atomic with respect to each other. The lock is never held
/// across network calls; health probing works on a snapshot.
#[derive(Debug)]
pub struct RotationPool {
    path: Option<PathBuf>,
    state: Mutex<PoolState>,
}

impl RotationPool {
    /// Creates a pool from in-memory entries (no backing file)
    pub fn from_entries(entries: Vec<String>) -> Self {
        Self {
            path: None,
            state: Mutex::new(PoolState { entries, cursor: 0 }),
        }
    }

    /// Loads a pool from a newline-separated list file.
    ///
    /// A missing or empty file falls back to `defaults` (the built-in user
    /// agent list, or nothing for proxies).
    pub fn load(path: &Path, defaults: &[&str]) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => {
                let loaded: Vec<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect();
                if loaded.is_empty() {
                    tracing::warn!("No entries found in {}", path.display());
                    defaults.iter().map(|s| s.to_string()).collect()
                } else {
                    tracing::info!("Loaded {} entries from {}", loaded.len(), path.display());
                    loaded
                }
            }
            Err(_) => {
                tracing::warn!("List file not found: {}", path.display());
                defaults.iter().map(|s| s.to_string()).collect()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            state: Mutex::new(PoolState { entries, cursor: 0 }),
        }
    }

    /// Loads a user agent pool, with the built-in defaults as fallback
    pub fn load_user_agents(path: &Path) -> Self {
        Self::load(path, DEFAULT_USER_AGENTS)
    }

    /// Loads a proxy pool; a missing file means "no proxies"
    pub fn load_proxies(path: &Path) -> Self {
        Self::load(path, &[])
    }

    /// Selects an entry according to the policy.
    ///
    /// Round-robin advances a shared cursor modulo the pool size; random picks
    /// uniformly without touching the cursor. Returns None for an empty pool.
    pub fn select(&self, policy: RotationPolicy) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        if state.entries.is_empty() {
            return None;
        }

        let index = match policy {
            RotationPolicy::RoundRobin => {
                let i = state.cursor % state.entries.len();
                state.cursor = (i + 1) % state.entries.len();
                i
            }
            RotationPolicy::Random => fastrand::usize(..state.entries.len()),
        };

        Some(state.entries[index].clone())
    }

    /// Adds an entry to the pool and its backing file
    pub fn add(&self, entry: &str) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.entries.iter().any(|e| e == entry) {
            tracing::debug!("Entry already present: {}", entry);
            return Ok(());
        }

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}", entry)?;
        }

        state.entries.push(entry.to_string());
        tracing::info!("Added pool entry: {}", entry);
        Ok(())
    }

    /// Removes an entry from the pool and its backing file
    pub fn remove(&self, entry: &str) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        state.entries.retain(|e| e != entry);
        if state.entries.len() == before {
            tracing::debug!("Entry not found: {}", entry);
            return Ok(());
        }

        if let Some(path) = &self.path {
            let rendered = state
                .entries
                .iter()
                .map(|e| format!("{}\n", e))
                .collect::<String>();
            std::fs::write(path, rendered)?;
        }

        tracing::info!("Removed pool entry: {}", entry);
        Ok(())
    }

    /// Replaces the cached entries wholesale (used by health refresh)
    pub fn replace(&self, entries: Vec<String>) {
        let mut state = self.state.lock().unwrap();
        state.entries = entries;
        state.cursor = 0;
    }

    /// Returns a copy of the current entries
    pub fn snapshot(&self) -> Vec<String> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write as _;

    fn pool_of(entries: &[&str]) -> RotationPool {
        RotationPool::from_entries(entries.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_round_robin_visits_each_entry_once_per_cycle() {
        let pool = pool_of(&["a", "b", "c"]);

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(pool.select(RotationPolicy::RoundRobin).unwrap());
        }
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), 3);

        // The cycle repeats in the same order
        assert_eq!(pool.select(RotationPolicy::RoundRobin).unwrap(), seen[0]);
    }

    #[test]
    fn test_random_returns_pool_member() {
        let pool = pool_of(&["a", "b"]);
        for _ in 0..10 {
            let picked = pool.select(RotationPolicy::Random).unwrap();
            assert!(picked == "a" || picked == "b");
        }
    }

    #[test]
    fn test_empty_pool_selects_none() {
        let pool = pool_of(&[]);
        assert!(pool.select(RotationPolicy::RoundRobin).is_none());
        assert!(pool.select(RotationPolicy::Random).is_none());
    }

    #[test]
    fn test_unknown_policy_falls_back_to_random() {
        assert_eq!(RotationPolicy::parse("fancy"), RotationPolicy::Random);
        assert_eq!(RotationPolicy::parse("round-robin"), RotationPolicy::RoundRobin);
        assert_eq!(RotationPolicy::parse("random"), RotationPolicy::Random);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let pool = RotationPool::load_user_agents(Path::new("/nonexistent/agents.txt"));
        assert_eq!(pool.len(), DEFAULT_USER_AGENTS.len());

        let proxies = RotationPool::load_proxies(Path::new("/nonexistent/proxies.txt"));
        assert!(proxies.is_empty());
    }

    #[test]
    fn test_load_reads_nonempty_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http://p1:8080\n\n  http://p2:8080  \n").unwrap();
        file.flush().unwrap();

        let pool = RotationPool::load_proxies(file.path());
        assert_eq!(pool.snapshot(), vec!["http://p1:8080", "http://p2:8080"]);
    }

    #[test]
    fn test_add_and_remove_update_file_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxies.txt");
        std::fs::write(&path, "http://p1:8080\n").unwrap();

        let pool = RotationPool::load_proxies(&path);
        pool.add("http://p2:8080").unwrap();
        assert_eq!(pool.len(), 2);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("http://p2:8080"));

        // Duplicate add is a no-op
        pool.add("http://p2:8080").unwrap();
        assert_eq!(pool.len(), 2);

        pool.remove("http://p1:8080").unwrap();
        assert_eq!(pool.snapshot(), vec!["http://p2:8080"]);
        assert!(!std::fs::read_to_string(&path)
            .unwrap()
            .contains("http://p1:8080"));
    }

    #[test]
    fn test_replace_resets_cursor() {
        let pool = pool_of(&["a", "b", "c"]);
        pool.select(RotationPolicy::RoundRobin);
        pool.select(RotationPolicy::RoundRobin);

        pool.replace(vec!["x".to_string()]);
        assert_eq!(pool.select(RotationPolicy::RoundRobin).as_deref(), Some("x"));
        assert_eq!(pool.select(RotationPolicy::RoundRobin).as_deref(), Some("x"));
    }
}
