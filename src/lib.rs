//! Webharvest: a schema-driven web scraping toolkit
//!
//! This crate fetches web pages, extracts structured fields via a declarative
//! schema, and exports the results to common file formats. Fetching is polite
//! (robots.txt, per-origin delays), retried with a fixed backoff, and can
//! rotate user agents and proxies across concurrent workers.

pub mod config;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod robots;
pub mod rotation;
pub mod runner;
pub mod schema;
pub mod scraper;

use thiserror::Error;

/// Main error type for webharvest operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("URL has no origin: {0}")]
    MissingOrigin(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeToml(#[from] toml::ser::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Unsupported config file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors from the fetch-retry unit
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Retries exhausted for {url} after {attempts} attempts: {cause}")]
    Exhausted {
        url: String,
        attempts: u32,
        cause: String,
    },
}

/// Result type alias for webharvest operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::ScraperConfig;
pub use export::ExportFormat;
pub use runner::{Job, JobReport, JobRunner, JobStatus, Schedule};
pub use schema::{FieldSpec, Processor, Record, Schema, Value};
pub use scraper::{Engine, Scraper};
