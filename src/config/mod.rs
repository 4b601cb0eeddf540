//! Configuration module
//!
//! Handles loading, saving and validating scraper configuration files (JSON or
//! TOML, chosen by extension), with environment-variable overrides.

mod parser;
mod types;
mod validation;

pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, save_config,
};
pub use types::ScraperConfig;
pub use validation::validate;
