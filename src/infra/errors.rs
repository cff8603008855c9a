// src/infra/errors.rs — Error types for wayfare

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WayfareError {
    // Upstream LLM errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    #[error("No provider for '{provider}'. Set {env_var} or pick another --model.")]
    NoProvider { provider: String, env_var: String },

    // Geocoding
    #[error("Geocoding '{query}' failed: {message}")]
    Geocoding { query: String, message: String },

    // Prompt templates
    #[error("Prompt template '{template}' failed: {message}")]
    Prompt { template: String, message: String },

    // Retrieval corpus
    #[error("No reference guide for '{destination}' (looked for {})", .path.display())]
    MissingCorpus { destination: String, path: PathBuf },

    // User input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WayfareError {
    /// Only upstream rate limiting is worth waiting out.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, WayfareError::RateLimited { .. })
    }
}
