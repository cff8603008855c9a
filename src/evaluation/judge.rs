// src/evaluation/judge.rs — LLM quality judge for a generated itinerary

use std::sync::Arc;

use crate::core::types::{ItineraryRequest, JudgeScore};
use crate::infra::errors::WayfareError;
use crate::prompts::PromptBuilder;
use crate::provider::{ChatRequest, ModelProvider};
use crate::util::truncate_chars;

/// Only the head of an itinerary is shown to the judge.
pub const JUDGE_INPUT_CHARS: usize = 2500;
pub const DEFAULT_SCORE: f32 = 5.0;
pub const MAX_SCORE: f32 = 10.0;
pub const NO_JUSTIFICATION: &str = "No justification provided.";

pub struct Judge {
    provider: Arc<dyn ModelProvider>,
    model: String,
    prompts: Arc<PromptBuilder>,
}

impl Judge {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: impl Into<String>,
        prompts: Arc<PromptBuilder>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            prompts,
        }
    }

    /// Score an itinerary against the trip constraints. Never fails: a broken
    /// call scores 0 with the error as justification.
    pub async fn score(&self, itinerary: &str, req: &ItineraryRequest) -> JudgeScore {
        match self.try_score(itinerary, req).await {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("Judge call failed: {e}");
                JudgeScore {
                    score: 0.0,
                    justification: format!("Evaluation failed: {e}"),
                }
            }
        }
    }

    async fn try_score(
        &self,
        itinerary: &str,
        req: &ItineraryRequest,
    ) -> Result<JudgeScore, WayfareError> {
        let prompt = self
            .prompts
            .judge(truncate_chars(itinerary, JUDGE_INPUT_CHARS), req)?;
        let request = ChatRequest::user(&self.model, prompt).with_temperature(0.0);
        let response = self.provider.chat(request).await?;

        let parsed = parse_judge_response(&response.content);
        tracing::info!(
            score = parsed.score,
            justification = %parsed.justification,
            "judge verdict"
        );
        Ok(parsed)
    }
}

/// Parse the fixed reply format:
///
/// ```text
/// Note: 7.5/10
/// Justification: Good fit for a family.
/// ```
///
/// A missing or unparsable score becomes 5.0, scores above 10 are clamped.
/// A missing or empty justification becomes a fixed placeholder.
pub fn parse_judge_response(response: &str) -> JudgeScore {
    let score = parse_score(response)
        .map(|s| s.clamp(0.0, MAX_SCORE))
        .unwrap_or(DEFAULT_SCORE);
    let justification =
        parse_justification(response).unwrap_or_else(|| NO_JUSTIFICATION.to_string());
    JudgeScore {
        score,
        justification,
    }
}

/// First `Note:` followed by optional whitespace and a run of digits and dots.
fn parse_score(response: &str) -> Option<f32> {
    response.match_indices("Note:").find_map(|(idx, tag)| {
        let rest = response[idx + tag.len()..].trim_start();
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        Some(rest[..end].parse::<f32>().ok())
    })?
}

/// Text after the first `Justification:` up to the end of its line.
fn parse_justification(response: &str) -> Option<String> {
    let idx = response.find("Justification:")?;
    let rest = response[idx + "Justification:".len()..].trim_start();
    let line = rest.lines().next().unwrap_or("").trim_end();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
