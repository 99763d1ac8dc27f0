use std::{fmt, fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::evidence::{ReliabilityError, ReliabilityTable};

/// Environment variable holding the fact-check search key.
pub const FACT_CHECK_KEY_ENV: &str = "FACT_CHECK_API_KEY";
/// Environment variable holding the toxicity scorer key.
pub const PERSPECTIVE_KEY_ENV: &str = "PERSPECTIVE_API_KEY";
/// Environment variable holding the generative analysis key.
pub const GENAI_KEY_ENV: &str = "GENAI_API_KEY";
/// Environment variable holding the OCR key.
pub const VISION_KEY_ENV: &str = "VISION_API_KEY";
fn default_language_code() -> String {
    "en".into()
}

const fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".into()
}

fn default_model_version() -> String {
    "CrediScope Multi-Lens v4.0".into()
}

/// Failure while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("reading config {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// File is not valid TOML for this schema.
    #[error("parsing config {path}: {source}")]
    Parse {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A reliability score is out of range.
    #[error("invalid config: {0}")]
    Reliability(#[from] ReliabilityError),
}

/// Collaborator credentials. Placeholder values are dropped on load.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    /// Fact-check search key.
    pub fact_check: Option<String>,
    /// Toxicity scorer key.
    pub perspective: Option<String>,
    /// Generative analysis key.
    pub genai: Option<String>,
    /// OCR key.
    pub vision: Option<String>,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |key: &Option<String>| if key.is_some() { "set" } else { "unset" };
        f.debug_struct("ApiKeys")
            .field("fact_check", &state(&self.fact_check))
            .field("perspective", &state(&self.perspective))
            .field("genai", &state(&self.genai))
            .field("vision", &state(&self.vision))
            .finish()
    }
}

impl ApiKeys {
    fn sanitized(self) -> Self {
        Self {
            fact_check: usable_key(self.fact_check),
            perspective: usable_key(self.perspective),
            genai: usable_key(self.genai),
            vision: usable_key(self.vision),
        }
    }
}

/// Immutable pipeline configuration, built once per process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Collaborator credentials.
    pub keys: ApiKeys,
    /// Language passed to the fact-check search.
    pub language_code: String,
    /// Per-call collaborator timeout.
    pub request_timeout_ms: u64,
    /// Generative model name.
    pub gemini_model: String,
    /// Version string recorded in audit maps.
    pub model_version: String,
    /// Publisher reliability table.
    pub reliability: ReliabilityTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            keys: ApiKeys::default(),
            language_code: default_language_code(),
            request_timeout_ms: default_request_timeout_ms(),
            gemini_model: default_gemini_model(),
            model_version: default_model_version(),
            reliability: ReliabilityTable::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env(|name| std::env::var(name).ok())
    }

    /// Loads a TOML file, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Loads a TOML file and applies overrides from `lookup`.
    pub fn load_with(
        path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        let config = config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Overrides keys with usable values from `lookup`.
    #[must_use]
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let keys = self.keys.sanitized();
        self.keys = ApiKeys {
            fact_check: usable_key(lookup(FACT_CHECK_KEY_ENV)).or(keys.fact_check),
            perspective: usable_key(lookup(PERSPECTIVE_KEY_ENV)).or(keys.perspective),
            genai: usable_key(lookup(GENAI_KEY_ENV)).or(keys.genai),
            vision: usable_key(lookup(VISION_KEY_ENV)).or(keys.vision),
        };
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be > 0".into()));
        }
        if self.language_code.trim().is_empty() {
            return Err(ConfigError::Invalid("language_code must not be empty".into()));
        }
        if self.gemini_model.trim().is_empty() {
            return Err(ConfigError::Invalid("gemini_model must not be empty".into()));
        }
        self.reliability.validate()?;
        Ok(())
    }

    /// Per-call collaborator timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Trimmed key, or `None` when blank or a `...` placeholder.
#[must_use]
pub fn usable_key(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && !value.contains("..."))
}
