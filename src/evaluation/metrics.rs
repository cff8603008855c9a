// src/evaluation/metrics.rs — Per-strategy comparison records

use std::collections::HashSet;

use super::judge::Judge;
use super::route::route_metrics;
use crate::core::events::{EventSink, RunEvent};
use crate::core::types::{ComparisonRecord, GenerationResult, ItineraryRequest};
use crate::util::round2;

/// Count list items: lines whose first non-blank characters are a bullet
/// glyph followed by whitespace, or digits followed by a dot.
pub fn count_places(text: &str) -> usize {
    text.lines().filter(|line| is_list_item(line.trim_start())).count()
}

fn is_list_item(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some('*' | '•' | '-') => chars.next().is_some_and(char::is_whitespace),
        Some(c) if c.is_ascii_digit() => {
            let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
            rest.starts_with('.')
        }
        _ => false,
    }
}

/// Share of distinct reference words that also appear in the response, in
/// percent with two decimals. `None` when there is no reference text.
pub fn rag_fidelity(reference: &str, response: &str) -> Option<f64> {
    let ref_words: HashSet<String> = reference
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if ref_words.is_empty() {
        return None;
    }
    let resp_words: HashSet<String> = response
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();

    let shared = ref_words.intersection(&resp_words).count();
    Some(round2(shared as f64 / ref_words.len() as f64 * 100.0))
}

/// Turn generation results into report rows, one per result, in input order.
pub async fn aggregate(
    results: &[GenerationResult],
    req: &ItineraryRequest,
    judge: &Judge,
    events: &EventSink,
) -> Vec<ComparisonRecord> {
    let mut records = Vec::with_capacity(results.len());

    for result in results {
        let strategy = result.strategy();
        let text = &result.itinerary.text;

        let places_identified = count_places(text);
        let fidelity = rag_fidelity(&result.reference, text);
        let route = route_metrics(&result.points, places_identified);
        let verdict = judge.score(text, req).await;

        events.emit(RunEvent::JudgeScored {
            strategy,
            score: verdict.score,
        });

        records.push(ComparisonRecord {
            strategy,
            label: strategy.label().to_string(),
            generation_secs: result.itinerary.elapsed_secs,
            places_identified,
            rag_fidelity: fidelity,
            total_km: route.total_km,
            efficiency: route.efficiency,
            score: verdict.score,
            justification: verdict.justification,
            gps_points: route.point_count,
        });
    }

    records
}
