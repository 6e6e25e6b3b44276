//! Folio configuration
//!
//! Loaded from TOML with environment overrides:
//!
//! ```toml
//! [service]
//! endpoint = "https://gen.example.com/v1/generate"
//! timeout_secs = 60
//!
//! [generation]
//! concurrency = "per-section"
//! fallback_on_unusable_output = true
//!
//! [document]
//! preserve_content = false
//!
//! [preview]
//! theme = "dark"
//! sandbox = ["popups"]
//! ```

use crate::error::ConfigError;
use crate::registry::ConcurrencyPolicy;
use folio_preview::PreviewConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Endpoint override
pub const ENV_ENDPOINT: &str = "FOLIO_ENDPOINT";
/// API key override
pub const ENV_API_KEY: &str = "FOLIO_API_KEY";
/// Timeout override, in seconds
pub const ENV_TIMEOUT_SECS: &str = "FOLIO_TIMEOUT_SECS";

/// Default bound on one generation call plus its stream read
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default broadcast buffer for generation events
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Generation service
    pub service: ServiceConfig,
    /// Orchestrator behaviour
    pub generation: GenerationConfig,
    /// Document handling
    pub document: DocumentConfig,
    /// Preview rendering
    pub preview: PreviewConfig,
}

/// Generation service settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service URL; no endpoint means heuristic synthesis only
    pub endpoint: Option<String>,
    /// Bearer token
    pub api_key: Option<String>,
    /// Bound on one call plus its stream read
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ServiceConfig {
    /// Check if an endpoint is set
    #[inline]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Timeout as a duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Which in-flight attempts block a new one
    pub concurrency: ConcurrencyPolicy,
    /// Synthesize locally when no service is configured
    pub fallback_when_unconfigured: bool,
    /// Synthesize locally when the service output is empty after stripping
    pub fallback_on_unusable_output: bool,
    /// Broadcast buffer for generation events
    pub event_capacity: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyPolicy::Exclusive,
            fallback_when_unconfigured: true,
            fallback_on_unusable_output: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Document settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Carry content over to re-segmented sections with the same heading and position
    pub preserve_content: bool,
}

impl FolioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` if validation fails
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, then apply environment overrides
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` / `ConfigError::Invalid` as [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        let config = config.with_env()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `FOLIO_*` environment overrides and validate
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for an unparsable timeout or a config
    /// that fails validation
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup and validate
    ///
    /// # Errors
    /// As [`Self::with_env`]
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            self.service.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.service.api_key = Some(key);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.service.timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_TIMEOUT_SECS} is not a number: {secs}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for a zero timeout, a zero event
    /// capacity, or a non-http(s) endpoint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Invalid("service.timeout_secs must be positive".to_string()));
        }
        if self.generation.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "generation.event_capacity must be positive".to_string(),
            ));
        }
        if let Some(endpoint) = &self.service.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "service.endpoint must be an http(s) URL: {endpoint}"
                )));
            }
        }
        Ok(())
    }

    /// With service endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.service.endpoint = Some(endpoint.into());
        self
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.service.api_key = Some(key.into());
        self
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.service.timeout_secs = secs;
        self
    }

    /// With concurrency policy
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, policy: ConcurrencyPolicy) -> Self {
        self.generation.concurrency = policy;
        self
    }

    /// With unconfigured-service fallback toggled
    #[inline]
    #[must_use]
    pub fn with_fallback_when_unconfigured(mut self, enabled: bool) -> Self {
        self.generation.fallback_when_unconfigured = enabled;
        self
    }

    /// With unusable-output fallback toggled
    #[inline]
    #[must_use]
    pub fn with_fallback_on_unusable_output(mut self, enabled: bool) -> Self {
        self.generation.fallback_on_unusable_output = enabled;
        self
    }

    /// With content preservation across re-segmentation
    #[inline]
    #[must_use]
    pub fn with_preserve_content(mut self, enabled: bool) -> Self {
        self.document.preserve_content = enabled;
        self
    }

    /// With preview settings
    #[inline]
    #[must_use]
    pub fn with_preview(mut self, preview: PreviewConfig) -> Self {
        self.preview = preview;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_preview::{MermaidTheme, SandboxToken};
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = FolioConfig::new();
        assert!(!config.service.is_configured());
        assert_eq!(config.service.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.generation.concurrency, ConcurrencyPolicy::Exclusive);
        assert!(config.generation.fallback_when_unconfigured);
        assert!(config.generation.fallback_on_unusable_output);
        assert!(!config.document.preserve_content);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_all_sections() {
        let config = FolioConfig::from_toml_str(
            r#"
            [service]
            endpoint = "https://gen.example.com/v1"
            api_key = "secret"
            timeout_secs = 5

            [generation]
            concurrency = "per-section"
            fallback_on_unusable_output = false

            [document]
            preserve_content = true

            [preview]
            theme = "forest"
            sandbox = ["popups", "forms"]
            "#,
        )
        .unwrap();

        assert_eq!(config.service.endpoint.as_deref(), Some("https://gen.example.com/v1"));
        assert_eq!(config.service.timeout_secs, 5);
        assert_eq!(config.generation.concurrency, ConcurrencyPolicy::PerSection);
        assert!(config.generation.fallback_when_unconfigured);
        assert!(!config.generation.fallback_on_unusable_output);
        assert!(config.document.preserve_content);
        assert_eq!(config.preview.theme, MermaidTheme::Forest);
        assert_eq!(config.preview.sandbox, vec![SandboxToken::Popups, SandboxToken::Forms]);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            FolioConfig::from_toml_str("[service]\ntimeout_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            FolioConfig::from_toml_str("[service]\nendpoint = \"ftp://host\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            FolioConfig::from_toml_str("[generation]\nconcurrency = \"global\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            FolioConfig::from_toml_str("[preview]\nsandbox = [\"same-origin\"]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overrides_apply_over_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_ENDPOINT, "http://localhost:8080/gen"),
            (ENV_API_KEY, "k"),
            (ENV_TIMEOUT_SECS, "12"),
        ]
        .into_iter()
        .collect();

        let config = FolioConfig::new()
            .with_endpoint("https://other")
            .with_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.service.endpoint.as_deref(), Some("http://localhost:8080/gen"));
        assert_eq!(config.service.api_key.as_deref(), Some("k"));
        assert_eq!(config.service.timeout_secs, 12);
    }

    #[test]
    fn bad_timeout_override_is_invalid() {
        let result = FolioConfig::new()
            .with_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "[document]\npreserve_content = true\n").unwrap();
        let config = FolioConfig::load(&path).unwrap();
        assert!(config.document.preserve_content);

        let missing = FolioConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = FolioConfig::new().with_api_key("hunter2");
        let debug = format!("{:?}", config.service);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
