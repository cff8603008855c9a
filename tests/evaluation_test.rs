// tests/evaluation_test.rs — Integration test: evaluation pipeline over the public API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use wayfare::core::events::EventSink;
use wayfare::core::types::{
    GeneratedItinerary, GenerationResult, GeoPoint, ItineraryRequest, Strategy,
};
use wayfare::evaluation::extractor::parse_place_list;
use wayfare::evaluation::{
    aggregate, parse_judge_response, route_metrics, total_distance_km, Judge, PlaceExtractor,
};
use wayfare::infra::errors::WayfareError;
use wayfare::prompts::PromptBuilder;
use wayfare::provider::retry::{RetryConfig, RetryProvider};
use wayfare::provider::*;

fn manhattan() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new("Central Park, New_York", 40.785, -73.968),
        GeoPoint::new("The Met, New_York", 40.7794, -73.9632),
        GeoPoint::new("Empire State Building, New_York", 40.7484, -73.9857),
    ]
}

/// Always answers with the same text.
struct CannedProvider(&'static str);

#[async_trait]
impl ModelProvider for CannedProvider {
    fn id(&self) -> &str {
        "canned"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, WayfareError> {
        Ok(ChatResponse {
            content: self.0.into(),
            usage: TokenUsage::default(),
        })
    }
}

/// Rate limited on every call.
struct ThrottledProvider;

#[async_trait]
impl ModelProvider for ThrottledProvider {
    fn id(&self) -> &str {
        "throttled"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, WayfareError> {
        Err(WayfareError::RateLimited {
            provider: "throttled".into(),
            retry_after_ms: 0,
        })
    }
}

fn prompts() -> Arc<PromptBuilder> {
    Arc::new(PromptBuilder::new().unwrap())
}

// ─── Route ──────────────────────────────────────────────────────────────────

#[test]
fn test_manhattan_walk_end_to_end() {
    let points = manhattan();
    assert_eq!(total_distance_km(&points), 4.67);

    let metrics = route_metrics(&points, 3);
    assert_eq!(metrics.point_count, 3);
    assert_eq!(metrics.efficiency, 1.56);
}

#[test]
fn test_route_without_places_uses_divisor_one() {
    let metrics = route_metrics(&manhattan(), 0);
    assert_eq!(metrics.efficiency, metrics.total_km);
}

#[test]
fn test_single_point_route_is_zero() {
    let points = &manhattan()[..1];
    assert_eq!(total_distance_km(points), 0.0);
    assert_eq!(route_metrics(points, 5).efficiency, 0.0);
}

// ─── Parsing contracts ──────────────────────────────────────────────────────

#[test]
fn test_judge_contract() {
    let s = parse_judge_response("Note: 7.5/10\nJustification: Good fit.");
    assert_eq!(s.score, 7.5);
    assert_eq!(s.justification, "Good fit.");

    let fallback = parse_judge_response("Great trip, would go again.");
    assert_eq!(fallback.score, 5.0);
    assert_eq!(fallback.justification, "No justification provided.");
}

#[test]
fn test_place_list_contract() {
    assert_eq!(
        parse_place_list(r#"Here you go: ["Central Park, New_York", "MoMA, New_York"]"#),
        vec!["Central Park, New_York", "MoMA, New_York"]
    );
    assert!(parse_place_list("no list here").is_empty());
}

// ─── LLM-backed stages ──────────────────────────────────────────────────────

#[test]
fn test_extractor_over_canned_reply() {
    let provider = Arc::new(CannedProvider(
        r#"["Central Park, New_York", ["MoMA, New_York", "x"]]"#,
    ));
    let extractor = PlaceExtractor::new(provider, "m", prompts(), Duration::ZERO);

    let places = tokio_test::block_on(extractor.extract("* Central Park\n* MoMA", "New_York"));
    let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Central Park, New_York", "MoMA, New_York"]);
    assert!(places.iter().all(|p| p.destination == "New_York"));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_rate_limit_degrades_extraction_to_empty() {
    let provider = Arc::new(RetryProvider::with_config(
        Arc::new(ThrottledProvider),
        RetryConfig::default(),
    ));
    let extractor = PlaceExtractor::new(provider, "m", prompts(), Duration::ZERO);
    assert!(extractor.extract("* Central Park", "New_York").await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_rate_limit_scores_zero() {
    let provider = Arc::new(RetryProvider::with_config(
        Arc::new(ThrottledProvider),
        RetryConfig::default(),
    ));
    let judge = Judge::new(provider, "m", prompts());
    let verdict = judge.score("* Central Park", &ItineraryRequest::new("New_York")).await;
    assert_eq!(verdict.score, 0.0);
    assert!(verdict.justification.starts_with("Evaluation failed:"));
}

#[tokio::test]
async fn test_aggregate_keeps_input_order() {
    let judge = Judge::new(
        Arc::new(CannedProvider("Note: 6.5/10\nJustification: Fine.")),
        "m",
        prompts(),
    );
    let result = |strategy, text: &str, reference: &str, points| GenerationResult {
        itinerary: GeneratedItinerary {
            strategy,
            text: text.into(),
            elapsed_secs: 1.0,
            usage: TokenUsage::default(),
        },
        points,
        reference: reference.into(),
    };
    let results = vec![
        result(Strategy::SingleLlmOnly, "* a\n* b", "", vec![]),
        result(Strategy::SingleLlmRag, "* zoo park", "zoo park tips", manhattan()),
    ];

    let records = aggregate(
        &results,
        &ItineraryRequest::new("New_York"),
        &judge,
        &EventSink::none(),
    )
    .await;

    assert_eq!(records[0].strategy, Strategy::SingleLlmOnly);
    assert_eq!(records[0].rag_fidelity, None);
    assert_eq!(records[0].total_km, 0.0);
    assert_eq!(records[0].places_identified, 2);

    assert_eq!(records[1].label, "Single LLM + RAG");
    assert_eq!(records[1].rag_fidelity, Some(66.67));
    assert_eq!(records[1].total_km, 4.67);
    assert_eq!(records[1].efficiency, 4.67);
    assert_eq!(records[1].score, 6.5);
}
