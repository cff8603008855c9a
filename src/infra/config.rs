// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::paths;

pub const DEFAULT_MODEL: &str = "groq/llama-3.1-8b-instant";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub comparison: ComparisonConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Model references in `provider/model` form, one per pipeline role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub generator: String,
    pub extractor: String,
    pub judge: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            generator: DEFAULT_MODEL.into(),
            extractor: DEFAULT_MODEL.into(),
            judge: DEFAULT_MODEL.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    /// Output cap for the synthesis-style agent steps.
    pub synthesis_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            synthesis_max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay_secs: u64,
    pub backoff_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_secs: 5,
            backoff_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub throttle_ms: u64,
    pub max_places: usize,
    /// Extra destination -> ISO country code entries, merged over the built-in table.
    pub countries: BTreeMap<String, String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".into(),
            user_agent: format!("wayfare-itinerary-bench/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
            throttle_ms: 1000,
            max_places: 10,
            countries: BTreeMap::new(),
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub cooldown_secs: u64,
    pub failure_cooldown_secs: u64,
    pub extraction_delay_secs: u64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 25,
            failure_cooldown_secs: 15,
            extraction_delay_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub knowledge_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_dir: PathBuf::from("knowledge"),
            chunk_size: 400,
            chunk_overlap: 50,
            top_k: 2,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline misbehave rather than merely run slowly.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        if self.retry.backoff_factor < 1.0 {
            anyhow::bail!("retry.backoff_factor must be >= 1.0");
        }
        if self.retrieval.chunk_size == 0 {
            anyhow::bail!("retrieval.chunk_size must be positive");
        }
        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            anyhow::bail!("retrieval.chunk_overlap must be smaller than chunk_size");
        }
        if !self.geocoding.base_url.starts_with("http://")
            && !self.geocoding.base_url.starts_with("https://")
        {
            anyhow::bail!("geocoding.base_url must be an HTTP(S) URL");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.models.generator, DEFAULT_MODEL);
        assert_eq!(c.retry.max_attempts, 3);
        assert_eq!(c.retry.initial_delay_secs, 5);
        assert_eq!(c.geocoding.max_places, 10);
        assert_eq!(c.geocoding.timeout(), Duration::from_secs(10));
        assert_eq!(c.geocoding.throttle(), Duration::from_secs(1));
        assert_eq!(c.comparison.cooldown_secs, 25);
        assert_eq!(c.retrieval.top_k, 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retrieval.chunk_size, 400);
    }

    #[test]
    fn test_parse_partial_section_keeps_other_defaults() {
        let toml_str = r#"
[comparison]
cooldown_secs = 0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.comparison.cooldown_secs, 0);
        assert_eq!(config.comparison.failure_cooldown_secs, 15);
        assert_eq!(config.comparison.extraction_delay_secs, 3);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[models]
generator = "openai/gpt-4o-mini"
judge = "groq/llama-3.3-70b-versatile"

[retry]
max_attempts = 5
initial_delay_secs = 2
backoff_factor = 3.0

[geocoding]
base_url = "http://localhost:8080"
max_places = 4

[geocoding.countries]
Lisbon = "pt"

[retrieval]
knowledge_dir = "/srv/guides"
top_k = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.models.generator, "openai/gpt-4o-mini");
        assert_eq!(config.models.extractor, DEFAULT_MODEL);
        assert_eq!(config.models.judge, "groq/llama-3.3-70b-versatile");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.geocoding.max_places, 4);
        assert_eq!(config.geocoding.countries.get("Lisbon").unwrap(), "pt");
        assert_eq!(config.retrieval.knowledge_dir, PathBuf::from("/srv/guides"));
        assert_eq!(config.retrieval.chunk_overlap, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut c = Config::default();
        c.retry.max_attempts = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlap_larger_than_chunk() {
        let mut c = Config::default();
        c.retrieval.chunk_overlap = 400;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_geocoder() {
        let mut c = Config::default();
        c.geocoding.base_url = "ftp://example.org".into();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.retry.max_attempts, config.retry.max_attempts);
        assert_eq!(deserialized.geocoding.base_url, config.geocoding.base_url);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[comparison]\ncooldown_secs = 1\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.comparison.cooldown_secs, 1);
    }
}
