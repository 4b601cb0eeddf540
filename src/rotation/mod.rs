//! Identity and proxy rotation pools
//!
//! Two pool instances share one contract: a cached entry list with a
//! round-robin or random selection policy, file-backed add/remove, and a
//! concurrent health filter that can shrink the proxy pool to its live subset.

mod health;
mod pool;

pub use health::{
    filter_live, refresh, test_proxy, DEFAULT_PROBE_TIMEOUT, DEFAULT_PROBE_URL,
    DEFAULT_PROBE_WORKERS,
};
pub use pool::{RotationPolicy, RotationPool, DEFAULT_USER_AGENTS};
