// src/generation/mod.rs — Itinerary generators: single call and four-step agent chain

use std::sync::Arc;

use tokio::time::Instant;

use crate::core::events::{EventSink, RunEvent};
use crate::core::types::{GeneratedItinerary, ItineraryRequest, Strategy};
use crate::infra::config::GenerationConfig;
use crate::infra::errors::WayfareError;
use crate::prompts::{AgentRole, PromptBuilder};
use crate::provider::{ChatRequest, ModelProvider, TokenUsage};
use crate::util::round2;

pub struct Generator {
    provider: Arc<dyn ModelProvider>,
    model: String,
    prompts: Arc<PromptBuilder>,
    config: GenerationConfig,
}

impl Generator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: impl Into<String>,
        prompts: Arc<PromptBuilder>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            prompts,
            config,
        }
    }

    /// Produce one itinerary with the given strategy. `reference` is empty
    /// for strategies without RAG.
    pub async fn generate(
        &self,
        strategy: Strategy,
        req: &ItineraryRequest,
        reference: &str,
        events: &EventSink,
    ) -> Result<GeneratedItinerary, WayfareError> {
        let start = Instant::now();

        let (text, usage) = if strategy.uses_agents() {
            self.agent_chain(strategy, req, reference, events).await?
        } else {
            self.single(req, reference).await?
        };

        let elapsed_secs = round2(start.elapsed().as_secs_f64());
        tracing::info!(
            strategy = strategy.id(),
            elapsed_secs,
            tokens = usage.total(),
            "itinerary generated"
        );

        Ok(GeneratedItinerary {
            strategy,
            text,
            elapsed_secs,
            usage,
        })
    }

    async fn single(
        &self,
        req: &ItineraryRequest,
        reference: &str,
    ) -> Result<(String, TokenUsage), WayfareError> {
        let prompt = self.prompts.single_plan(req, reference)?;
        let request =
            ChatRequest::user(&self.model, prompt).with_temperature(self.config.temperature);
        let response = self.provider.chat(request).await?;
        Ok((response.content, response.usage))
    }

    /// Sequential prompt chain. Each agent sees its persona as the system
    /// message and the prior step's output inside its task.
    async fn agent_chain(
        &self,
        strategy: Strategy,
        req: &ItineraryRequest,
        reference: &str,
        events: &EventSink,
    ) -> Result<(String, TokenUsage), WayfareError> {
        let mut usage = TokenUsage::default();
        let mut outputs: Vec<String> = Vec::with_capacity(AgentRole::CHAIN.len());

        for (step, role) in AgentRole::CHAIN.into_iter().enumerate() {
            let previous = chain_context(role, &outputs);
            let persona = self.prompts.agent_persona(role, req)?;
            let task = self.prompts.agent_task(role, req, reference, &previous)?;

            let max_tokens = role
                .output_capped()
                .then_some(self.config.synthesis_max_tokens);
            let request = ChatRequest::user(&self.model, task)
                .with_system(persona)
                .with_temperature(self.config.temperature)
                .with_max_tokens(max_tokens);

            let response = self.provider.chat(request).await?;
            usage.add(&response.usage);
            tracing::debug!(
                strategy = strategy.id(),
                agent = role.title(),
                chars = response.content.len(),
                "agent step done"
            );
            outputs.push(response.content);

            events.emit(RunEvent::AgentStepCompleted {
                strategy,
                role,
                step: step + 1,
            });
        }

        Ok((outputs.pop().unwrap_or_default(), usage))
    }
}

/// What a chain step gets as context. The writer needs both the schedule and
/// the budget table, everyone else only the step right before.
fn chain_context(role: AgentRole, outputs: &[String]) -> String {
    match role {
        AgentRole::Specialist => String::new(),
        AgentRole::Writer => outputs.get(1..).unwrap_or_default().join("\n\n"),
        _ => outputs.last().cloned().unwrap_or_default(),
    }
}
