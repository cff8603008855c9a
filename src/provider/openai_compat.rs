// src/provider/openai_compat.rs — Generic OpenAI-compatible chat provider
//
// Used by: Groq, OpenAI, OpenRouter, Together, DeepSeek and local Ollama.
// HTTP 429 maps to a typed RateLimited error; everything else non-2xx is a
// plain Provider error and is never retried.

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatRequest, ChatResponse, ModelProvider, Role, TokenUsage};
use crate::infra::errors::WayfareError;

/// Per-request timeout for completion calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider for any OpenAI-compatible API endpoint.
pub struct OpenAICompatProvider {
    id_str: String,
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(
        id: impl Into<String>,
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            id_str: id.into(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn provider_error(&self, message: impl Into<String>) -> WayfareError {
        WayfareError::Provider {
            provider: self.id_str.clone(),
            message: message.into(),
        }
    }
}

/// Build the JSON body for `POST /chat/completions`.
pub(crate) fn request_body(request: &ChatRequest) -> serde_json::Value {
    let mut msgs = Vec::new();
    if let Some(system) = &request.system {
        msgs.push(serde_json::json!({
            "role": Role::System.as_str(),
            "content": system,
        }));
    }
    for m in &request.messages {
        msgs.push(serde_json::json!({
            "role": m.role.as_str(),
            "content": m.content,
        }));
    }

    let mut body = serde_json::json!({
        "model": request.model,
        "messages": msgs,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    if let Some(temp) = request.temperature {
        body["temperature"] = serde_json::json!(temp);
    }
    body
}

/// Pull content and usage out of a completion response.
pub(crate) fn parse_response(resp: &serde_json::Value) -> ChatResponse {
    let content = resp["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string();

    let usage = TokenUsage {
        input_tokens: resp["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: resp["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    };

    ChatResponse { content, usage }
}

/// Parse a `retry-after` header value (whole seconds) into milliseconds.
pub(crate) fn retry_after_ms(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| *secs > 0.0)
        .map(|secs| (secs * 1000.0) as u64)
        .unwrap_or(0)
}

/// Map a non-2xx completion response to an error. Only 429 is a rate limit.
pub(crate) fn classify_failure(
    provider: &str,
    status: reqwest::StatusCode,
    retry_after: Option<&str>,
    body: &str,
) -> WayfareError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return WayfareError::RateLimited {
            provider: provider.to_string(),
            retry_after_ms: retry_after_ms(retry_after),
        };
    }
    WayfareError::Provider {
        provider: provider.to_string(),
        message: format!("HTTP {status}: {body}"),
    }
}

#[async_trait]
impl ModelProvider for OpenAICompatProvider {
    fn id(&self) -> &str {
        &self.id_str
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, WayfareError> {
        let body = request_body(&request);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "User-Agent",
                format!("wayfare/{}", env!("CARGO_PKG_VERSION")),
            )
            .timeout(REQUEST_TIMEOUT)
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.provider_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_failure(
                &self.id_str,
                status,
                retry_after.as_deref(),
                &error_body,
            ));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.provider_error(e.to_string()))?;

        let parsed = parse_response(&resp);
        tracing::debug!(
            provider = %self.id_str,
            model = %request.model,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "chat completion"
        );
        Ok(parsed)
    }
}
