// src/prompts/mod.rs — Prompt template builder
//
// All prompts are minijinja templates compiled once into one environment.
// Rendering is pure: same request in, same text out.

pub mod templates;

use minijinja::{context, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::core::types::ItineraryRequest;
use crate::infra::errors::WayfareError;

/// The four role-prompted agents of the chained strategy, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgentRole {
    Specialist,
    Designer,
    Auditor,
    Writer,
}

impl AgentRole {
    pub const CHAIN: [AgentRole; 4] = [
        AgentRole::Specialist,
        AgentRole::Designer,
        AgentRole::Auditor,
        AgentRole::Writer,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AgentRole::Specialist => "Destination Specialist",
            AgentRole::Designer => "Itinerary Designer",
            AgentRole::Auditor => "Budget Auditor",
            AgentRole::Writer => "Travel Guide Writer",
        }
    }

    /// Whether this step runs under the synthesis output cap.
    /// The designer is left uncapped so long multi-day plans are not cut off.
    pub fn output_capped(&self) -> bool {
        !matches!(self, AgentRole::Designer)
    }

    fn persona_template(&self) -> &'static str {
        match self {
            AgentRole::Specialist => "specialist_persona",
            AgentRole::Designer => "designer_persona",
            AgentRole::Auditor => "auditor_persona",
            AgentRole::Writer => "writer_persona",
        }
    }

    fn task_template(&self) -> &'static str {
        match self {
            AgentRole::Specialist => "specialist_task",
            AgentRole::Designer => "designer_task",
            AgentRole::Auditor => "auditor_task",
            AgentRole::Writer => "writer_task",
        }
    }
}

/// Trip fields as templates see them.
#[derive(Debug, Serialize)]
struct TripVars<'a> {
    destination: &'a str,
    profile: &'a str,
    days: u8,
    budget: &'static str,
    style: &'static str,
    pace: &'a str,
    interests: String,
    group: String,
    adults: u32,
    children: u32,
    party: u32,
}

impl<'a> From<&'a ItineraryRequest> for TripVars<'a> {
    fn from(req: &'a ItineraryRequest) -> Self {
        Self {
            destination: &req.destination,
            profile: &req.profile,
            days: req.days,
            budget: req.budget.as_str(),
            style: req.budget.style(),
            pace: &req.pace,
            interests: req.interests_label(),
            group: req.group_label(),
            adults: req.adults,
            children: req.children,
            party: req.party_size(),
        }
    }
}

pub struct PromptBuilder {
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new() -> Result<Self, WayfareError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);

        let sources = [
            ("single_plan", templates::SINGLE_PLAN),
            ("specialist_persona", templates::SPECIALIST_PERSONA),
            ("designer_persona", templates::DESIGNER_PERSONA),
            ("auditor_persona", templates::AUDITOR_PERSONA),
            ("writer_persona", templates::WRITER_PERSONA),
            ("specialist_task", templates::SPECIALIST_TASK),
            ("designer_task", templates::DESIGNER_TASK),
            ("auditor_task", templates::AUDITOR_TASK),
            ("writer_task", templates::WRITER_TASK),
            ("extract_places", templates::EXTRACT_PLACES),
            ("judge", templates::JUDGE),
        ];
        for (name, source) in sources {
            env.add_template(name, source)
                .map_err(|e| prompt_error(name, e))?;
        }
        Ok(Self { env })
    }

    /// One-shot prompt for the single-LLM strategies.
    pub fn single_plan(
        &self,
        req: &ItineraryRequest,
        reference: &str,
    ) -> Result<String, WayfareError> {
        self.render(
            "single_plan",
            context! { trip => TripVars::from(req), reference => reference },
        )
    }

    /// System message for one agent of the chain.
    pub fn agent_persona(
        &self,
        role: AgentRole,
        req: &ItineraryRequest,
    ) -> Result<String, WayfareError> {
        self.render(role.persona_template(), context! { trip => TripVars::from(req) })
    }

    /// User message for one agent of the chain. `previous` is the prior step's output.
    pub fn agent_task(
        &self,
        role: AgentRole,
        req: &ItineraryRequest,
        reference: &str,
        previous: &str,
    ) -> Result<String, WayfareError> {
        self.render(
            role.task_template(),
            context! {
                trip => TripVars::from(req),
                reference => reference,
                previous => previous,
            },
        )
    }

    pub fn extract_places(
        &self,
        itinerary: &str,
        destination: &str,
        max_places: usize,
    ) -> Result<String, WayfareError> {
        self.render(
            "extract_places",
            context! {
                itinerary => itinerary,
                destination => destination,
                max_places => max_places,
            },
        )
    }

    /// `itinerary` should already be truncated by the caller.
    pub fn judge(&self, itinerary: &str, req: &ItineraryRequest) -> Result<String, WayfareError> {
        self.render(
            "judge",
            context! { trip => TripVars::from(req), itinerary => itinerary },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, WayfareError> {
        self.env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .map_err(|e| prompt_error(name, e))
    }
}

fn prompt_error(template: &str, e: minijinja::Error) -> WayfareError {
    WayfareError::Prompt {
        template: template.to_string(),
        message: e.to_string(),
    }
}
