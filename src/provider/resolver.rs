// src/provider/resolver.rs — Map a `provider/model` reference to a live provider

use std::sync::Arc;

use super::openai_compat::OpenAICompatProvider;
use super::retry::{RetryConfig, RetryProvider};
use super::{ModelProvider, ModelRef};
use crate::infra::config::RetrySettings;
use crate::infra::errors::WayfareError;

/// A known OpenAI-compatible endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSpec {
    pub id: &'static str,
    /// Env var holding the API key. `None` for local servers.
    pub key_env: Option<&'static str>,
    pub base_url: &'static str,
    /// Env var that overrides `base_url`.
    pub base_url_env: Option<&'static str>,
}

pub const KNOWN_PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        id: "groq",
        key_env: Some("GROQ_API_KEY"),
        base_url: "https://api.groq.com/openai/v1",
        base_url_env: None,
    },
    ProviderSpec {
        id: "openai",
        key_env: Some("OPENAI_API_KEY"),
        base_url: "https://api.openai.com/v1",
        base_url_env: Some("OPENAI_BASE_URL"),
    },
    ProviderSpec {
        id: "openrouter",
        key_env: Some("OPENROUTER_API_KEY"),
        base_url: "https://openrouter.ai/api/v1",
        base_url_env: None,
    },
    ProviderSpec {
        id: "together",
        key_env: Some("TOGETHER_API_KEY"),
        base_url: "https://api.together.xyz/v1",
        base_url_env: None,
    },
    ProviderSpec {
        id: "deepseek",
        key_env: Some("DEEPSEEK_API_KEY"),
        base_url: "https://api.deepseek.com/v1",
        base_url_env: None,
    },
    ProviderSpec {
        id: "ollama",
        key_env: None,
        base_url: "http://localhost:11434/v1",
        base_url_env: Some("OLLAMA_HOST"),
    },
];

pub fn find_spec(provider: &str) -> Option<&'static ProviderSpec> {
    KNOWN_PROVIDERS.iter().find(|p| p.id == provider)
}

/// Resolve a model reference using the process environment.
pub fn resolve(
    model: &ModelRef,
    retry: &RetrySettings,
) -> Result<Arc<dyn ModelProvider>, WayfareError> {
    resolve_with(model, retry, |var| {
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    })
}

/// Resolve with an explicit env lookup. The returned provider is already
/// wrapped in the rate-limit retry layer.
pub fn resolve_with<F>(
    model: &ModelRef,
    retry: &RetrySettings,
    lookup: F,
) -> Result<Arc<dyn ModelProvider>, WayfareError>
where
    F: Fn(&str) -> Option<String>,
{
    let spec = find_spec(&model.provider).ok_or_else(|| {
        WayfareError::Config(format!(
            "unknown provider '{}' (known: {})",
            model.provider,
            KNOWN_PROVIDERS
                .iter()
                .map(|p| p.id)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    let api_key = match spec.key_env {
        Some(var) => Some(lookup(var).ok_or_else(|| WayfareError::NoProvider {
            provider: spec.id.to_string(),
            env_var: var.to_string(),
        })?),
        None => None,
    };

    let base_url = spec
        .base_url_env
        .and_then(&lookup)
        .map(|url| normalize_base_url(spec, &url))
        .unwrap_or_else(|| spec.base_url.to_string());

    tracing::debug!(provider = spec.id, model = %model.model, %base_url, "resolved provider");

    let inner: Arc<dyn ModelProvider> =
        Arc::new(OpenAICompatProvider::new(spec.id, api_key, base_url));
    Ok(Arc::new(RetryProvider::with_config(
        inner,
        RetryConfig::from(retry),
    )))
}

/// OLLAMA_HOST is usually given without the `/v1` suffix.
fn normalize_base_url(spec: &ProviderSpec, url: &str) -> String {
    let url = url.trim_end_matches('/');
    if spec.id == "ollama" && !url.ends_with("/v1") {
        format!("{url}/v1")
    } else {
        url.to_string()
    }
}
