use crate::config::types::ScraperConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads a configuration file, applies environment overrides and validates it
///
/// The format is chosen by file extension: `.json` or `.toml`. Any other
/// extension is a configuration error.
pub fn load_config(path: &Path) -> Result<ScraperConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: ScraperConfig = match extension_of(path).as_str() {
        "json" => serde_json::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => return Err(ConfigError::UnsupportedExtension(other.to_string())),
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

/// Saves a configuration to a file, format chosen by extension
pub fn save_config(config: &ScraperConfig, path: &Path) -> Result<(), ConfigError> {
    let rendered = match extension_of(path).as_str() {
        "json" => serde_json::to_string_pretty(config)?,
        "toml" => toml::to_string_pretty(config)?,
        other => return Err(ConfigError::UnsupportedExtension(other.to_string())),
    };

    std::fs::write(path, rendered)?;
    tracing::info!("Configuration saved to {}", path.display());
    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Used to detect whether the configuration changed between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its content hash
pub fn load_config_with_hash(path: &Path) -> Result<(ScraperConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies environment-variable overrides to a configuration
///
/// Variable names match the option names uppercased. Malformed values are
/// configuration errors, not silent fallbacks.
pub fn apply_env_overrides(config: &mut ScraperConfig) -> Result<(), ConfigError> {
    if let Ok(v) = std::env::var("ENGINE") {
        config.engine = v;
    }
    if let Ok(v) = std::env::var("BROWSER") {
        config.browser = v;
    }
    if let Ok(v) = std::env::var("HEADLESS") {
        config.headless = parse_bool("HEADLESS", &v)?;
    }
    if let Ok(v) = std::env::var("USER_AGENT") {
        config.user_agent = v;
    }
    if let Ok(v) = std::env::var("USER_AGENT_ROTATION") {
        config.user_agent_rotation = parse_bool("USER_AGENT_ROTATION", &v)?;
    }
    if let Ok(v) = std::env::var("USER_AGENT_LIST_PATH") {
        config.user_agent_list_path = v;
    }
    if let Ok(v) = std::env::var("USE_PROXIES") {
        config.use_proxies = parse_bool("USE_PROXIES", &v)?;
    }
    if let Ok(v) = std::env::var("PROXY_ROTATION_POLICY") {
        config.proxy_rotation_policy = v;
    }
    if let Ok(v) = std::env::var("PROXY_LIST_PATH") {
        config.proxy_list_path = v;
    }
    if let Ok(v) = std::env::var("RESPECT_ROBOTS_TXT") {
        config.respect_robots_txt = parse_bool("RESPECT_ROBOTS_TXT", &v)?;
    }
    if let Ok(v) = std::env::var("REQUEST_DELAY") {
        config.request_delay = parse_number("REQUEST_DELAY", &v)?;
    }
    if let Ok(v) = std::env::var("MAX_REQUESTS_PER_MINUTE") {
        config.max_requests_per_minute = parse_number("MAX_REQUESTS_PER_MINUTE", &v)?;
    }
    if let Ok(v) = std::env::var("MAX_RETRIES") {
        config.max_retries = parse_number("MAX_RETRIES", &v)?;
    }
    if let Ok(v) = std::env::var("TIMEOUT") {
        config.timeout = parse_number("TIMEOUT", &v)?;
    }
    if let Ok(v) = std::env::var("VERIFY_SSL") {
        config.verify_ssl = parse_bool("VERIFY_SSL", &v)?;
    }
    if let Ok(v) = std::env::var("MAX_CONCURRENT_FETCHES") {
        config.max_concurrent_fetches = parse_number("MAX_CONCURRENT_FETCHES", &v)?;
    }
    if let Ok(v) = std::env::var("LOG_LEVEL") {
        config.log_level = v;
    }
    if let Ok(v) = std::env::var("DATA_DIR") {
        config.data_dir = v;
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::Validation(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| {
        ConfigError::Validation(format!("{} must be numeric, got '{}'", name, value))
    })
}
