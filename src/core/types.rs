// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::infra::errors::WayfareError;
use crate::provider::TokenUsage;

pub const MAX_TRIP_DAYS: u8 = 14;

/// Upper bound for each of the adult and child counts.
pub const MAX_TRAVELERS: u32 = 50;

/// Budget tier chosen by the traveler. Each tier maps to a fixed travel style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Medium => "medium",
            BudgetTier::High => "high",
        }
    }

    /// Descriptive style injected into every generation prompt.
    pub fn style(&self) -> &'static str {
        match self {
            BudgetTier::Low => {
                "very affordable, backpacking style, with cheap meals and free activities"
            }
            BudgetTier::Medium => {
                "comfortable but reasonable, mixing paid activities and downtime"
            }
            BudgetTier::High => {
                "luxurious, with starred restaurants, private guides and 5-star hotels; \
                 prices must reflect the high end"
            }
        }
    }
}

impl FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "economy" | "budget" => Ok(BudgetTier::Low),
            "medium" | "moderate" | "mid" => Ok(BudgetTier::Medium),
            "high" | "luxury" => Ok(BudgetTier::High),
            other => Err(format!("unknown budget tier '{other}' (low, medium, high)")),
        }
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four generation configurations being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "mode_1")]
    MultiAgentRag,
    #[serde(rename = "mode_2")]
    SingleLlmRag,
    #[serde(rename = "mode_3")]
    MultiAgentOnly,
    #[serde(rename = "mode_4")]
    SingleLlmOnly,
}

impl Strategy {
    /// Every strategy, in run order.
    pub const ALL: [Strategy; 4] = [
        Strategy::MultiAgentRag,
        Strategy::SingleLlmRag,
        Strategy::MultiAgentOnly,
        Strategy::SingleLlmOnly,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Strategy::MultiAgentRag => "mode_1",
            Strategy::SingleLlmRag => "mode_2",
            Strategy::MultiAgentOnly => "mode_3",
            Strategy::SingleLlmOnly => "mode_4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::MultiAgentRag => "Multi-agent + RAG",
            Strategy::SingleLlmRag => "Single LLM + RAG",
            Strategy::MultiAgentOnly => "Multi-agent only",
            Strategy::SingleLlmOnly => "Single LLM only",
        }
    }

    pub fn uses_rag(&self) -> bool {
        matches!(self, Strategy::MultiAgentRag | Strategy::SingleLlmRag)
    }

    pub fn uses_agents(&self) -> bool {
        matches!(self, Strategy::MultiAgentRag | Strategy::MultiAgentOnly)
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mode_1" | "1" | "multi-agent-rag" => Ok(Strategy::MultiAgentRag),
            "mode_2" | "2" | "single-llm-rag" => Ok(Strategy::SingleLlmRag),
            "mode_3" | "3" | "multi-agent" => Ok(Strategy::MultiAgentOnly),
            "mode_4" | "4" | "single-llm" => Ok(Strategy::SingleLlmOnly),
            other => Err(format!("unknown strategy '{other}' (mode_1..mode_4)")),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// What the traveler asked for. Built once per comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub destination: String,
    pub profile: String,
    pub days: u8,
    pub budget: BudgetTier,
    pub pace: String,
    pub interests: Vec<String>,
    pub adults: u32,
    pub children: u32,
}

impl ItineraryRequest {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            profile: "Family".into(),
            days: 3,
            budget: BudgetTier::Medium,
            pace: "balanced (3 places a day)".into(),
            interests: vec!["food".into()],
            adults: 2,
            children: 0,
        }
    }

    /// Check the request, returning it unchanged when it is usable.
    pub fn validated(self) -> Result<Self, WayfareError> {
        if self.destination.trim().is_empty() {
            return Err(WayfareError::InvalidRequest(
                "destination must not be empty".into(),
            ));
        }
        if self.days == 0 || self.days > MAX_TRIP_DAYS {
            return Err(WayfareError::InvalidRequest(format!(
                "trip length must be between 1 and {MAX_TRIP_DAYS} days, got {}",
                self.days
            )));
        }
        if self.adults == 0 {
            return Err(WayfareError::InvalidRequest(
                "at least one adult is required".into(),
            ));
        }
        if self.adults > MAX_TRAVELERS || self.children > MAX_TRAVELERS {
            return Err(WayfareError::InvalidRequest(format!(
                "at most {MAX_TRAVELERS} adults and {MAX_TRAVELERS} children, got {} and {}",
                self.adults, self.children
            )));
        }
        Ok(self)
    }

    pub fn party_size(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    pub fn group_label(&self) -> String {
        format!("{} adult(s) and {} child(ren)", self.adults, self.children)
    }

    pub fn interests_label(&self) -> String {
        self.interests.join(", ")
    }
}

/// Raw itinerary text produced by one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedItinerary {
    pub strategy: Strategy,
    pub text: String,
    /// Wall-clock generation time, seconds, two decimals.
    pub elapsed_secs: f64,
    #[serde(default)]
    pub usage: TokenUsage,
}

/// A place name pulled out of itinerary text, scoped to its destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceName {
    pub name: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub total_km: f64,
    pub point_count: usize,
    /// Kilometers per identified place. Lower means tighter clustering.
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeScore {
    pub score: f32,
    pub justification: String,
}

/// Everything the runner keeps for one successful strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub itinerary: GeneratedItinerary,
    pub points: Vec<GeoPoint>,
    /// Retrieved reference text. Empty for strategies without RAG.
    #[serde(default)]
    pub reference: String,
}

impl GenerationResult {
    pub fn strategy(&self) -> Strategy {
        self.itinerary.strategy
    }
}

/// One row of the comparison report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub strategy: Strategy,
    pub label: String,
    pub generation_secs: f64,
    pub places_identified: usize,
    /// `None` when the strategy had no reference text.
    pub rag_fidelity: Option<f64>,
    pub total_km: f64,
    pub efficiency: f64,
    pub score: f32,
    pub justification: String,
    pub gps_points: usize,
}
