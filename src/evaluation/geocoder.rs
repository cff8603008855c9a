// src/evaluation/geocoder.rs — Resolve place names to coordinates
//
// Best-effort and strictly sequential: one lookup at a time, a fixed pause
// between lookups (Nominatim allows one request per second), misses skipped.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::events::{EventSink, RunEvent};
use crate::core::types::{GeoPoint, PlaceName};
use crate::infra::config::GeocodingConfig;
use crate::infra::errors::WayfareError;

/// Built-in destination -> ISO 3166-1 country code hints.
const BUILTIN_COUNTRIES: &[(&str, &str)] = &[
    ("Japan", "jp"),
    ("Japon", "jp"),
    ("Rome", "it"),
    ("New_York", "us"),
];

/// A forward geocoding backend.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Coordinates `(lat, lon)` of the best match, `None` when nothing matched.
    async fn lookup(
        &self,
        query: &str,
        country: Option<&str>,
    ) -> Result<Option<(f64, f64)>, WayfareError>;
}

/// OpenStreetMap Nominatim search API.
pub struct NominatimService {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

impl NominatimService {
    pub fn new(config: &GeocodingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        }
    }

    fn error(query: &str, message: impl Into<String>) -> WayfareError {
        WayfareError::Geocoding {
            query: query.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl GeocodingService for NominatimService {
    async fn lookup(
        &self,
        query: &str,
        country: Option<&str>,
    ) -> Result<Option<(f64, f64)>, WayfareError> {
        let mut params = vec![("q", query), ("format", "jsonv2"), ("limit", "1")];
        if let Some(cc) = country {
            params.push(("countrycodes", cc));
        }

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("User-Agent", &self.user_agent)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::error(query, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error(query, format!("HTTP {}", response.status())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Self::error(query, e.to_string()))?;

        parse_hits(query, &body)
    }
}

/// Coordinates of the first hit in a Nominatim search reply. Nominatim sends
/// `lat` and `lon` as strings.
pub(crate) fn parse_hits(
    query: &str,
    body: &serde_json::Value,
) -> Result<Option<(f64, f64)>, WayfareError> {
    let hits = Vec::<NominatimHit>::deserialize(body)
        .map_err(|e| NominatimService::error(query, e.to_string()))?;

    match hits.first() {
        Some(hit) => match (hit.lat.trim().parse::<f64>(), hit.lon.trim().parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok(Some((lat, lon))),
            _ => Err(NominatimService::error(query, "unparsable coordinates")),
        },
        None => Ok(None),
    }
}

pub struct Geocoder {
    service: Arc<dyn GeocodingService>,
    throttle: Duration,
    max_places: usize,
    countries: BTreeMap<String, String>,
}

impl Geocoder {
    pub fn new(service: Arc<dyn GeocodingService>, config: &GeocodingConfig) -> Self {
        let mut countries: BTreeMap<String, String> = BUILTIN_COUNTRIES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        countries.extend(config.countries.clone());

        Self {
            service,
            throttle: config.throttle(),
            max_places: config.max_places,
            countries,
        }
    }

    /// Country restriction for a destination, if one is known.
    pub fn country_code(&self, destination: &str) -> Option<&str> {
        self.countries
            .get(destination)
            .or_else(|| {
                self.countries
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(destination))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// Resolve up to `max_places` names in order. The output never reorders
    /// and may be shorter than the input.
    pub async fn geocode(
        &self,
        places: &[PlaceName],
        destination: &str,
        events: &EventSink,
    ) -> Vec<GeoPoint> {
        let country = self.country_code(destination);
        let mut points = Vec::new();

        for (i, place) in places.iter().take(self.max_places).enumerate() {
            if i > 0 && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }

            let query = strip_parentheticals(&place.name);
            let found = match self.service.lookup(&query, country).await {
                Ok(Some((lat, lon))) => {
                    tracing::info!(place = %place.name, lat, lon, "geocoded");
                    points.push(GeoPoint::new(place.name.clone(), lat, lon));
                    true
                }
                Ok(None) => {
                    tracing::info!(place = %place.name, "not found");
                    false
                }
                Err(e) => {
                    tracing::warn!(place = %place.name, "geocoding error, skipping: {e}");
                    false
                }
            };
            events.emit(RunEvent::PlaceGeocoded {
                name: place.name.clone(),
                found,
            });
        }

        points
    }
}

/// Remove every `( ... )` group and trim. An unclosed `(` is left alone.
pub fn strip_parentheticals(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// In-memory gazetteer recording every query and the time it arrived.
    struct StubService {
        known: HashMap<&'static str, (f64, f64)>,
        queries: Mutex<Vec<(String, Option<String>, Instant)>>,
    }

    impl StubService {
        fn new(known: &[(&'static str, (f64, f64))]) -> Self {
            Self {
                known: known.iter().cloned().collect(),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GeocodingService for StubService {
        async fn lookup(
            &self,
            query: &str,
            country: Option<&str>,
        ) -> Result<Option<(f64, f64)>, WayfareError> {
            self.queries.lock().unwrap().push((
                query.to_string(),
                country.map(String::from),
                Instant::now(),
            ));
            if query.starts_with("Broken") {
                return Err(WayfareError::Geocoding {
                    query: query.into(),
                    message: "timeout".into(),
                });
            }
            Ok(self.known.get(query).copied())
        }
    }

    fn places(names: &[&str]) -> Vec<PlaceName> {
        names
            .iter()
            .map(|n| PlaceName {
                name: n.to_string(),
                destination: "New_York".into(),
            })
            .collect()
    }

    // ─── strip_parentheticals ───────────────────────────────────

    #[test]
    fn test_strip_parentheticals() {
        assert_eq!(
            strip_parentheticals("MoMA (Museum of Modern Art), New_York"),
            "MoMA , New_York"
        );
        assert_eq!(strip_parentheticals("  High Line  "), "High Line");
        assert_eq!(strip_parentheticals("A (x) B (y)"), "A  B");
        assert_eq!(strip_parentheticals("Unclosed (paren"), "Unclosed (paren");
    }

    // ─── Nominatim replies ──────────────────────────────────────

    #[test]
    fn test_parse_hits_reads_string_coordinates() {
        let body = serde_json::json!([
            {"place_id": 1, "lat": "40.7828647", "lon": "-73.9653551", "name": "Central Park"},
            {"place_id": 2, "lat": "0", "lon": "0"}
        ]);
        assert_eq!(
            parse_hits("Central Park", &body).unwrap(),
            Some((40.7828647, -73.9653551))
        );
    }

    #[test]
    fn test_parse_hits_empty_reply_is_a_miss() {
        assert_eq!(parse_hits("Atlantis", &serde_json::json!([])).unwrap(), None);
    }

    #[test]
    fn test_parse_hits_rejects_bad_coordinates() {
        let body = serde_json::json!([{"lat": "north-ish", "lon": "-73.96"}]);
        let err = parse_hits("Central Park", &body).unwrap_err();
        assert!(matches!(err, WayfareError::Geocoding { .. }));
        assert!(err.to_string().contains("unparsable coordinates"));

        // Not the shape Nominatim sends.
        let body = serde_json::json!({"error": "Unable to geocode"});
        assert!(matches!(
            parse_hits("Central Park", &body),
            Err(WayfareError::Geocoding { .. })
        ));
    }

    // ─── Country table ──────────────────────────────────────────

    #[test]
    fn test_country_codes_builtin_and_config() {
        let mut config = GeocodingConfig::default();
        config.countries.insert("Lisbon".into(), "pt".into());
        let g = Geocoder::new(Arc::new(StubService::new(&[])), &config);

        assert_eq!(g.country_code("New_York"), Some("us"));
        assert_eq!(g.country_code("Japon"), Some("jp"));
        assert_eq!(g.country_code("rome"), Some("it"));
        assert_eq!(g.country_code("Lisbon"), Some("pt"));
        assert_eq!(g.country_code("Atlantis"), None);
    }

    // ─── geocode ────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_miss_is_skipped_and_order_kept() {
        let stub = Arc::new(StubService::new(&[
            ("Central Park, New_York", (40.785, -73.968)),
            ("Empire State Building, New_York", (40.7484, -73.9857)),
        ]));
        let g = Geocoder::new(stub.clone(), &GeocodingConfig::default());

        let points = g
            .geocode(
                &places(&[
                    "Central Park, New_York",
                    "Nowhere Plaza, New_York",
                    "Empire State Building, New_York",
                ]),
                "New_York",
                &EventSink::none(),
            )
            .await;

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "Central Park, New_York");
        assert_eq!(points[1].name, "Empire State Building, New_York");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_are_throttled_and_country_restricted() {
        let stub = Arc::new(StubService::new(&[]));
        let g = Geocoder::new(stub.clone(), &GeocodingConfig::default());
        g.geocode(&places(&["A", "B", "C"]), "New_York", &EventSink::none())
            .await;

        let queries = stub.queries.lock().unwrap();
        assert_eq!(queries.len(), 3);
        assert!(queries.iter().all(|(_, cc, _)| cc.as_deref() == Some("us")));
        assert_eq!(queries[1].2 - queries[0].2, Duration::from_secs(1));
        assert_eq!(queries[2].2 - queries[1].2, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_caps_at_max_places() {
        let stub = Arc::new(StubService::new(&[]));
        let g = Geocoder::new(stub.clone(), &GeocodingConfig::default());
        let names: Vec<String> = (0..14).map(|i| format!("Place {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        g.geocode(&places(&refs), "Rome", &EventSink::none()).await;
        assert_eq!(stub.queries.lock().unwrap().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_skipped_and_names_stay_unstripped() {
        let stub = Arc::new(StubService::new(&[("MoMA , New_York", (40.7614, -73.9776))]));
        let g = Geocoder::new(stub.clone(), &GeocodingConfig::default());

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let sink = EventSink::new(move |e| events_clone.lock().unwrap().push(e));

        let points = g
            .geocode(
                &places(&["Broken Bridge", "MoMA (Museum of Modern Art), New_York"]),
                "Atlantis",
                &sink,
            )
            .await;

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "MoMA (Museum of Modern Art), New_York");
        assert!(stub.queries.lock().unwrap().iter().all(|(_, cc, _)| cc.is_none()));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                RunEvent::PlaceGeocoded {
                    name: "Broken Bridge".into(),
                    found: false
                },
                RunEvent::PlaceGeocoded {
                    name: "MoMA (Museum of Modern Art), New_York".into(),
                    found: true
                },
            ]
        );
    }
}
