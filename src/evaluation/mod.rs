// src/evaluation/mod.rs — Post-hoc scoring of generated itineraries
//
// extractor -> geocoder -> route runs per strategy right after generation;
// judge + metrics run once over all results.

pub mod extractor;
pub mod geocoder;
pub mod judge;
pub mod metrics;
pub mod route;

pub use extractor::PlaceExtractor;
pub use geocoder::{Geocoder, GeocodingService, NominatimService};
pub use judge::{parse_judge_response, Judge};
pub use metrics::{aggregate, count_places, rag_fidelity};
pub use route::{route_metrics, total_distance_km};
