// src/core/run.rs — Comparison run context and the sequential strategy runner

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{EventSink, RunEvent};
use super::types::{ComparisonRecord, GenerationResult, ItineraryRequest, Strategy};
use crate::evaluation::{aggregate, Geocoder, Judge, PlaceExtractor};
use crate::generation::Generator;
use crate::infra::config::{ComparisonConfig, RetrievalConfig};
use crate::infra::errors::WayfareError;
use crate::retrieval::{reference_text, GuideCorpus, ReferenceSource};

/// A strategy that did not produce a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyFailure {
    pub strategy: Strategy,
    pub error: String,
}

/// Everything one comparison produced. Creating a new run discards nothing
/// but itself; the previous run simply goes out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRun {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub request: ItineraryRequest,
    /// Successful strategies, in run order.
    pub results: Vec<GenerationResult>,
    /// Filled by evaluation. `None` until then.
    #[serde(default)]
    pub records: Option<Vec<ComparisonRecord>>,
    #[serde(default)]
    pub failures: Vec<StrategyFailure>,
}

impl ComparisonRun {
    pub fn new(request: ItineraryRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            request,
            results: Vec::new(),
            records: None,
            failures: Vec::new(),
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.records.is_some()
    }

    pub fn save(&self, path: &Path) -> Result<(), WayfareError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, WayfareError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Runs strategies one after another, then scores them.
pub struct ComparisonRunner {
    generator: Generator,
    extractor: PlaceExtractor,
    geocoder: Geocoder,
    judge: Judge,
    comparison: ComparisonConfig,
    retrieval: RetrievalConfig,
    /// Overrides loading the guide corpus from disk.
    reference: Option<Arc<dyn ReferenceSource>>,
    events: EventSink,
}

impl ComparisonRunner {
    pub fn new(
        generator: Generator,
        extractor: PlaceExtractor,
        geocoder: Geocoder,
        judge: Judge,
        comparison: ComparisonConfig,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            generator,
            extractor,
            geocoder,
            judge,
            comparison,
            retrieval,
            reference: None,
            events: EventSink::none(),
        }
    }

    pub fn with_reference_source(mut self, source: Arc<dyn ReferenceSource>) -> Self {
        self.reference = Some(source);
        self
    }

    /// Set a callback for real-time progress events.
    pub fn with_progress(mut self, cb: impl Fn(RunEvent) + Send + Sync + 'static) -> Self {
        self.events = EventSink::new(cb);
        self
    }

    /// Generate, then evaluate.
    pub async fn compare(
        &self,
        request: ItineraryRequest,
        strategies: &[Strategy],
    ) -> Result<ComparisonRun, WayfareError> {
        let mut run = self.generate(request, strategies).await?;
        self.evaluate(&mut run).await;
        Ok(run)
    }

    /// Run every strategy in order. A failing strategy is recorded and the
    /// run moves on. Only a missing reference corpus aborts the whole run.
    pub async fn generate(
        &self,
        request: ItineraryRequest,
        strategies: &[Strategy],
    ) -> Result<ComparisonRun, WayfareError> {
        let mut run = ComparisonRun::new(request.validated()?);
        let destination = run.request.destination.clone();

        let reference = if strategies.iter().any(Strategy::uses_rag) {
            let source = self.reference_source(&destination)?;
            reference_text(source.as_ref(), &destination, self.retrieval.top_k)
        } else {
            String::new()
        };

        tracing::info!(
            run_id = %run.id,
            %destination,
            strategies = strategies.len(),
            "comparison started"
        );

        for (index, &strategy) in strategies.iter().enumerate() {
            let is_last = index + 1 == strategies.len();
            self.events.emit(RunEvent::StrategyStarted {
                strategy,
                index,
                total: strategies.len(),
            });

            let strategy_reference = if strategy.uses_rag() { reference.as_str() } else { "" };
            match self
                .run_strategy(strategy, &run.request, strategy_reference)
                .await
            {
                Ok(result) => {
                    self.events.emit(RunEvent::StrategyFinished {
                        strategy,
                        elapsed_secs: result.itinerary.elapsed_secs,
                        points: result.points.len(),
                    });
                    run.results.push(result);
                    if !is_last {
                        self.cooldown(self.comparison.cooldown_secs, false).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.id(), "strategy failed: {e}");
                    self.events.emit(RunEvent::StrategyFailed {
                        strategy,
                        error: e.to_string(),
                    });
                    run.failures.push(StrategyFailure {
                        strategy,
                        error: e.to_string(),
                    });
                    if !is_last {
                        self.cooldown(self.comparison.failure_cooldown_secs, true)
                            .await;
                    }
                }
            }
        }

        Ok(run)
    }

    /// Score every result of the run and store the records on it.
    pub async fn evaluate(&self, run: &mut ComparisonRun) {
        let records = aggregate(&run.results, &run.request, &self.judge, &self.events).await;
        run.records = Some(records);
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        request: &ItineraryRequest,
        reference: &str,
    ) -> Result<GenerationResult, WayfareError> {
        let itinerary = self
            .generator
            .generate(strategy, request, reference, &self.events)
            .await?;

        let places = self
            .extractor
            .extract(&itinerary.text, &request.destination)
            .await;
        self.events.emit(RunEvent::PlacesExtracted {
            strategy,
            count: places.len(),
        });

        let points = self
            .geocoder
            .geocode(&places, &request.destination, &self.events)
            .await;

        Ok(GenerationResult {
            itinerary,
            points,
            reference: reference.to_string(),
        })
    }

    fn reference_source(
        &self,
        destination: &str,
    ) -> Result<Arc<dyn ReferenceSource>, WayfareError> {
        match &self.reference {
            Some(source) => Ok(source.clone()),
            None => Ok(Arc::new(GuideCorpus::load(&self.retrieval, destination)?)),
        }
    }

    async fn cooldown(&self, secs: u64, after_failure: bool) {
        if secs == 0 {
            return;
        }
        self.events.emit(RunEvent::Cooldown {
            secs,
            after_failure,
        });
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GeneratedItinerary, GeoPoint};
    use crate::provider::TokenUsage;

    fn sample_run() -> ComparisonRun {
        let mut run = ComparisonRun::new(ItineraryRequest::new("New_York"));
        run.results.push(GenerationResult {
            itinerary: GeneratedItinerary {
                strategy: Strategy::SingleLlmRag,
                text: "* Central Park".into(),
                elapsed_secs: 1.25,
                usage: TokenUsage {
                    input_tokens: 3,
                    output_tokens: 4,
                },
            },
            points: vec![GeoPoint::new("Central Park, New_York", 40.785, -73.968)],
            reference: "Central Park is big".into(),
        });
        run.failures.push(StrategyFailure {
            strategy: Strategy::MultiAgentRag,
            error: "Rate limited by 'groq', retry after 0ms".into(),
        });
        run
    }

    #[test]
    fn test_new_run_is_unevaluated() {
        let run = ComparisonRun::new(ItineraryRequest::new("Rome"));
        assert!(!run.is_evaluated());
        assert!(run.results.is_empty());
        assert!(run.failures.is_empty());
    }

    #[test]
    fn test_runs_get_distinct_ids() {
        let a = ComparisonRun::new(ItineraryRequest::new("Rome"));
        let b = ComparisonRun::new(ItineraryRequest::new("Rome"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.json");
        let run = sample_run();
        run.save(&path).unwrap();

        let loaded = ComparisonRun::load(&path).unwrap();
        assert_eq!(loaded.id, run.id);
        assert_eq!(loaded.request.destination, "New_York");
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].strategy(), Strategy::SingleLlmRag);
        assert_eq!(loaded.results[0].points[0].lat, 40.785);
        assert_eq!(loaded.failures, run.failures);
        assert!(!loaded.is_evaluated());
    }

    #[test]
    fn test_saved_json_uses_strategy_ids() {
        let json = serde_json::to_string(&sample_run()).unwrap();
        assert!(json.contains("\"mode_2\""));
        assert!(json.contains("\"mode_1\""));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ComparisonRun::load(Path::new("/nonexistent/run.json")),
            Err(WayfareError::Io(_))
        ));
    }
}
