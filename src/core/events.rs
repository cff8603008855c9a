// src/core/events.rs — Progress events emitted during a comparison run

use super::types::Strategy;
use crate::prompts::AgentRole;

/// Progress events for real-time feedback. Observers never change the run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    StrategyStarted {
        strategy: Strategy,
        index: usize,
        total: usize,
    },
    AgentStepCompleted {
        strategy: Strategy,
        role: AgentRole,
        step: usize,
    },
    PlacesExtracted {
        strategy: Strategy,
        count: usize,
    },
    PlaceGeocoded {
        name: String,
        found: bool,
    },
    StrategyFinished {
        strategy: Strategy,
        elapsed_secs: f64,
        points: usize,
    },
    StrategyFailed {
        strategy: Strategy,
        error: String,
    },
    Cooldown {
        secs: u64,
        after_failure: bool,
    },
    JudgeScored {
        strategy: Strategy,
        score: f32,
    },
}

/// Optional observer. Emitting with no callback installed is a no-op.
#[derive(Default)]
pub struct EventSink {
    on_progress: Option<Box<dyn Fn(RunEvent) + Send + Sync>>,
}

impl EventSink {
    pub fn new(cb: impl Fn(RunEvent) + Send + Sync + 'static) -> Self {
        Self {
            on_progress: Some(Box::new(cb)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("installed", &self.on_progress.is_some())
            .finish()
    }
}
