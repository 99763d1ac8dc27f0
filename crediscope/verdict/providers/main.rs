use std::{fmt, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

/// Fixed-response collaborators for offline runs and tests.
pub mod fixed;
/// HTTP clients for the hosted fact-check, toxicity, generative and OCR services.
pub mod google;

use crate::{
    config::PipelineConfig,
    model::{non_blank, AnalysisSignal, FactCheckHit, ToxicitySignal},
};

/// Hits listed in the context handed to the analysis collaborator.
pub const MAX_CONTEXT_HITS: usize = 5;
/// Context text used when there are no hits.
pub const NO_FACT_CHECKS: &str = "No professional fact-checks available";

/// Failure of an external collaborator. Every variant degrades the signal to
/// its default; none aborts the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No credentials for the collaborator.
    #[error("{0} is not configured")]
    NotConfigured(String),
    /// Network or client failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Collaborator answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),
    /// Response body could not be decoded.
    #[error("decode failure: {0}")]
    Decode(String),
    /// Call exceeded the per-call timeout.
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// Answer of the generative-analysis collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResponse {
    /// Already-structured signal.
    Structured(AnalysisSignal),
    /// Free text that may or may not contain JSON.
    RawText(String),
}

/// Searches published fact-checks for a claim.
#[async_trait]
pub trait FactCheckProvider: Send + Sync {
    /// Name recorded in audit maps.
    fn name(&self) -> &str;

    /// Whether the provider has what it needs to make calls.
    fn is_configured(&self) -> bool {
        true
    }

    /// Returns every review matching the query.
    async fn search(&self, query: &str) -> Result<Vec<FactCheckHit>, ProviderError>;
}

/// Scores text for toxicity/manipulation.
#[async_trait]
pub trait ToxicityProvider: Send + Sync {
    /// Name recorded in audit maps.
    fn name(&self) -> &str;

    /// Whether the provider has what it needs to make calls.
    fn is_configured(&self) -> bool {
        true
    }

    /// Scores the text.
    async fn score(&self, text: &str) -> Result<ToxicitySignal, ProviderError>;
}

/// Produces a generative analysis of a claim.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Name recorded in audit maps.
    fn name(&self) -> &str;

    /// Whether the provider has what it needs to make calls.
    fn is_configured(&self) -> bool {
        true
    }

    /// Analyses the claim given the fact-check context and toxicity signal.
    async fn analyze(
        &self,
        claim: &str,
        fact_check_context: &str,
        toxicity: &ToxicitySignal,
    ) -> Result<AnalysisResponse, ProviderError>;
}

/// Extracts text from an image.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Name recorded in audit maps.
    fn name(&self) -> &str;

    /// Whether the provider has what it needs to make calls.
    fn is_configured(&self) -> bool {
        true
    }

    /// Returns the full detected text, empty when none.
    async fn extract_text(&self, image: &[u8]) -> Result<String, ProviderError>;
}

/// Stand-in for a collaborator without credentials.
#[derive(Debug, Clone)]
pub struct DisabledProvider {
    name: String,
}

impl DisabledProvider {
    /// Creates a disabled provider reporting `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn error(&self) -> ProviderError {
        ProviderError::NotConfigured(self.name.clone())
    }
}

#[async_trait]
impl FactCheckProvider for DisabledProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn search(&self, _query: &str) -> Result<Vec<FactCheckHit>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl ToxicityProvider for DisabledProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn score(&self, _text: &str) -> Result<ToxicitySignal, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl AnalysisProvider for DisabledProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn analyze(
        &self,
        _claim: &str,
        _fact_check_context: &str,
        _toxicity: &ToxicitySignal,
    ) -> Result<AnalysisResponse, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl OcrProvider for DisabledProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn extract_text(&self, _image: &[u8]) -> Result<String, ProviderError> {
        Err(self.error())
    }
}

/// The four collaborators used by one pipeline.
#[derive(Clone)]
pub struct ProviderSet {
    /// Fact-check search.
    pub fact_check: Arc<dyn FactCheckProvider>,
    /// Toxicity scoring.
    pub toxicity: Arc<dyn ToxicityProvider>,
    /// Generative analysis.
    pub analysis: Arc<dyn AnalysisProvider>,
    /// OCR.
    pub ocr: Arc<dyn OcrProvider>,
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSet")
            .field("fact_check", &self.fact_check.name())
            .field("toxicity", &self.toxicity.name())
            .field("analysis", &self.analysis.name())
            .field("ocr", &self.ocr.name())
            .finish()
    }
}

impl Default for ProviderSet {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ProviderSet {
    /// Every collaborator disabled; the pipeline runs on fallbacks only.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            fact_check: Arc::new(DisabledProvider::new(google::FACT_CHECK_NAME)),
            toxicity: Arc::new(DisabledProvider::new(google::PERSPECTIVE_NAME)),
            analysis: Arc::new(DisabledProvider::new(google::GEMINI_NAME)),
            ocr: Arc::new(DisabledProvider::new(google::VISION_NAME)),
        }
    }

    /// Hosted clients for every key present in `config`, disabled stand-ins
    /// for the rest.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ProviderError> {
        let client = google::http_client(config.request_timeout())?;
        let mut set = Self::disabled();
        if let Some(key) = &config.keys.fact_check {
            set.fact_check = Arc::new(google::FactCheckClient::new(
                client.clone(),
                key,
                &config.language_code,
            ));
        }
        if let Some(key) = &config.keys.perspective {
            set.toxicity = Arc::new(google::PerspectiveClient::new(client.clone(), key));
        }
        if let Some(key) = &config.keys.genai {
            set.analysis = Arc::new(google::GeminiClient::new(
                client.clone(),
                key,
                &config.gemini_model,
            ));
        }
        if let Some(key) = &config.keys.vision {
            set.ocr = Arc::new(google::VisionClient::new(client, key));
        }
        Ok(set)
    }

    /// Replaces the fact-check provider.
    #[must_use]
    pub fn with_fact_check(mut self, provider: Arc<dyn FactCheckProvider>) -> Self {
        self.fact_check = provider;
        self
    }

    /// Replaces the toxicity provider.
    #[must_use]
    pub fn with_toxicity(mut self, provider: Arc<dyn ToxicityProvider>) -> Self {
        self.toxicity = provider;
        self
    }

    /// Replaces the analysis provider.
    #[must_use]
    pub fn with_analysis(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.analysis = provider;
        self
    }

    /// Replaces the OCR provider.
    #[must_use]
    pub fn with_ocr(mut self, provider: Arc<dyn OcrProvider>) -> Self {
        self.ocr = provider;
        self
    }

    /// Names of the configured text-path collaborators.
    #[must_use]
    pub fn apis_used(&self) -> Vec<String> {
        [
            (self.fact_check.is_configured(), self.fact_check.name()),
            (self.analysis.is_configured(), self.analysis.name()),
            (self.toxicity.is_configured(), self.toxicity.name()),
        ]
        .into_iter()
        .filter(|(configured, _)| *configured)
        .map(|(_, name)| name.to_string())
        .collect()
    }
}

/// Numbered `publisher: rating` lines for the first hits.
#[must_use]
pub fn fact_check_context(hits: &[FactCheckHit]) -> String {
    if hits.is_empty() {
        return NO_FACT_CHECKS.to_string();
    }
    hits.iter()
        .take(MAX_CONTEXT_HITS)
        .enumerate()
        .map(|(idx, hit)| {
            let publisher = non_blank(&hit.publisher, "Unknown");
            let rating = non_blank(&hit.rating_text, "Unknown");
            format!("{}. {publisher}: {rating}", idx + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKeys;

    #[test]
    fn context_lists_first_five_hits() {
        let hits: Vec<_> = (0..7)
            .map(|idx| FactCheckHit::new(format!("Outlet {idx}"), "False", "t"))
            .collect();
        let context = fact_check_context(&hits);
        assert_eq!(context.lines().count(), MAX_CONTEXT_HITS);
        assert!(context.starts_with("1. Outlet 0: False"));
        assert!(context.ends_with("5. Outlet 4: False"));
    }

    #[test]
    fn context_without_hits() {
        assert_eq!(fact_check_context(&[]), NO_FACT_CHECKS);
        let blank = fact_check_context(&[FactCheckHit::default()]);
        assert_eq!(blank, "1. Unknown: Unknown");
    }

    #[tokio::test]
    async fn disabled_set_reports_not_configured() {
        let set = ProviderSet::disabled();
        assert!(set.apis_used().is_empty());
        let err = set.fact_check.search("claim").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(set.ocr.extract_text(&[1, 2, 3]).await.is_err());
    }

    #[test]
    fn from_config_enables_keyed_providers() {
        let config = PipelineConfig {
            keys: ApiKeys {
                fact_check: Some("fc".into()),
                genai: Some("gen".into()),
                ..ApiKeys::default()
            },
            ..PipelineConfig::default()
        };
        let set = ProviderSet::from_config(&config).unwrap();
        assert!(set.fact_check.is_configured());
        assert!(set.analysis.is_configured());
        assert!(!set.toxicity.is_configured());
        assert!(!set.ocr.is_configured());
        assert_eq!(
            set.apis_used(),
            vec![google::FACT_CHECK_NAME.to_string(), google::GEMINI_NAME.to_string()]
        );
    }
}
