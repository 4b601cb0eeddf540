use crate::config::types::ScraperConfig;
use crate::ConfigError;

/// Validates a configuration
pub fn validate(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.engine.is_empty() {
        return Err(ConfigError::Validation("engine cannot be empty".to_string()));
    }

    if !config.request_delay.is_finite() || config.request_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "request_delay must be a non-negative number of seconds, got {}",
            config.request_delay
        )));
    }

    if config.max_requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests_per_minute must be >= 1, got {}",
            config.max_requests_per_minute
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1 second, got {}",
            config.timeout
        )));
    }

    if config.max_concurrent_fetches < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be >= 1, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.user_agent.is_empty() && !config.user_agent_rotation {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty when rotation is disabled".to_string(),
        ));
    }

    if config.proxy_rotation_policy.is_empty() {
        return Err(ConfigError::Validation(
            "proxy_rotation_policy cannot be empty".to_string(),
        ));
    }

    Ok(())
}
