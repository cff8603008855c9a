// src/evaluation/extractor.rs — Ask the model for the place names an itinerary mentions

use std::sync::Arc;
use std::time::Duration;

use crate::core::types::PlaceName;
use crate::prompts::PromptBuilder;
use crate::provider::{ChatRequest, ModelProvider};

/// Upper bound requested from the model. Parsing does not enforce it.
pub const MAX_EXTRACTED_PLACES: usize = 15;

pub struct PlaceExtractor {
    provider: Arc<dyn ModelProvider>,
    model: String,
    prompts: Arc<PromptBuilder>,
    /// Pause before each extraction call, eases upstream rate limits.
    delay: Duration,
}

impl PlaceExtractor {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: impl Into<String>,
        prompts: Arc<PromptBuilder>,
        delay: Duration,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            prompts,
            delay,
        }
    }

    /// Ordered place names found in `itinerary`. Every failure degrades to an empty list.
    pub async fn extract(&self, itinerary: &str, destination: &str) -> Vec<PlaceName> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let prompt = match self
            .prompts
            .extract_places(itinerary, destination, MAX_EXTRACTED_PLACES)
        {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Place extraction prompt failed: {e}");
                return Vec::new();
            }
        };

        let request = ChatRequest::user(&self.model, prompt).with_temperature(0.0);
        let response = match self.provider.chat(request).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(destination, "Place extraction failed: {e}");
                return Vec::new();
            }
        };

        let names = parse_place_list(&response.content);
        tracing::info!(count = names.len(), ?names, "extracted place names");

        names
            .into_iter()
            .map(|name| PlaceName {
                name,
                destination: destination.to_string(),
            })
            .collect()
    }
}

/// Best-effort decode of a JSON string array embedded in free text.
///
/// Takes the span from the first `[` to the last `]`, so prose around the
/// array is ignored. Nested arrays contribute their first string. Anything
/// that does not decode yields an empty list.
pub fn parse_place_list(response: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    let values: Vec<serde_json::Value> = match serde_json::from_str(&response[start..=end]) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("place list is not valid JSON: {e}");
            return Vec::new();
        }
    };

    values
        .iter()
        .filter_map(first_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_string(value: &serde_json::Value) -> Option<&str> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => items.first().and_then(first_string),
        _ => None,
    }
}
