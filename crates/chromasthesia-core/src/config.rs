//! Configuration for the chromasthetiation pipeline.
//!
//! A plain immutable struct passed into the orchestrator's constructor; no
//! mutable process-wide singletons. Loaded in layers:
//!
//! 1. `config/default.toml` (base settings)
//! 2. `config/{CHROMA_ENV}.toml` (environment-specific)
//! 3. Environment variables with `CHROMA__` prefix (e.g.
//!    `CHROMA__QUERY__MAX_COLORS=5`)

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Query building settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Maximum color terms drawn from the emotion palette.
    pub max_colors: usize,
    /// Maximum affect-word keywords per query.
    pub max_keywords: usize,
    /// Result page size requested from the search service.
    pub page_size: usize,
    /// Expected result pool size for neutral queries; when it exceeds
    /// `page_size`, neutral queries start at a random offset so repeated
    /// neutral submissions don't always return the same page.
    pub neutral_pool_hint: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_colors: 3,
            max_keywords: 4,
            page_size: 24,
            neutral_pool_hint: 2000,
        }
    }
}

impl QuerySettings {
    /// Validate field constraints.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_colors == 0 {
            return Err(CoreError::Config(
                "query.max_colors must be greater than 0".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(CoreError::Config(
                "query.page_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Retrieval/orchestration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Maximum concurrent remote calls across all submissions.
    /// `0` means unbounded.
    pub max_concurrent_requests: usize,
    /// Number of external display slots the round-robin output index wraps
    /// over.
    pub display_slots: usize,
    /// Per-request timeout for the shared HTTP client, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 0,
            display_slots: 9,
            request_timeout_secs: 20,
        }
    }
}

impl RetrievalSettings {
    /// Validate field constraints.
    pub fn validate(&self) -> CoreResult<()> {
        if self.display_slots == 0 {
            return Err(CoreError::Config(
                "retrieval.display_slots must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "retrieval.request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// One remote endpoint: base URI plus optional bearer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Base URI of the service, without a trailing slash.
    pub base_url: String,
    /// Optional API key sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
        }
    }
}

impl EndpointSettings {
    /// Validate field constraints.
    pub fn validate(&self, name: &str) -> CoreResult<()> {
        if self.base_url.is_empty() {
            return Err(CoreError::Config(format!(
                "{name}.base_url cannot be empty"
            )));
        }
        Ok(())
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaConfig {
    pub query: QuerySettings,
    pub retrieval: RetrievalSettings,
    /// Image search service endpoint.
    pub search: EndpointSettings,
    /// Photo size-lookup service endpoint.
    pub photos: EndpointSettings,
}

impl ChromaConfig {
    /// Load configuration from files and environment.
    ///
    /// # Errors
    ///
    /// `CoreError::Config` on unreadable files, parse failures or invalid
    /// values.
    pub fn load() -> CoreResult<Self> {
        let env = std::env::var("CHROMA_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(config::Environment::with_prefix("CHROMA").separator("__"));

        let config: ChromaConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit TOML file.
    pub fn from_file(path: &std::path::Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let config: ChromaConfig = toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Failed to parse config file: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> CoreResult<()> {
        self.query.validate()?;
        self.retrieval.validate()?;
        self.search.validate("search")?;
        self.photos.validate("photos")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ChromaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.query.max_colors, 3);
        assert_eq!(config.query.max_keywords, 4);
        assert_eq!(config.query.page_size, 24);
        assert_eq!(config.retrieval.display_slots, 9);
        assert_eq!(config.retrieval.max_concurrent_requests, 0);
    }

    #[test]
    fn test_validation_rejects_zero_page_size() {
        let mut config = ChromaConfig::default();
        config.query.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = ChromaConfig::default();
        config.retrieval.display_slots = 0;
        assert!(config.validate().is_err());

        let mut config = ChromaConfig::default();
        config.search.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[query]\nmax_colors = 5\n\n[search]\nbase_url = \"https://search.example\"\n"
        )
        .unwrap();

        let config = ChromaConfig::from_file(file.path()).unwrap();
        assert_eq!(config.query.max_colors, 5);
        // Unlisted fields keep their defaults.
        assert_eq!(config.query.page_size, 24);
        assert_eq!(config.search.base_url, "https://search.example");
    }

    #[test]
    fn test_from_file_missing_path() {
        let result = ChromaConfig::from_file(std::path::Path::new("/nonexistent/chroma.toml"));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = ChromaConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: ChromaConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
