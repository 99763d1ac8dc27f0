use async_trait::async_trait;

use crate::{
    model::{FactCheckHit, ToxicitySignal},
    providers::{
        AnalysisProvider, AnalysisResponse, FactCheckProvider, OcrProvider, ProviderError,
        ToxicityProvider,
    },
};

/// Returns the same hits for every query.
#[derive(Debug, Clone, Default)]
pub struct FixedFactCheck {
    hits: Vec<FactCheckHit>,
}

impl FixedFactCheck {
    /// Creates the provider.
    #[must_use]
    pub const fn new(hits: Vec<FactCheckHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl FactCheckProvider for FixedFactCheck {
    fn name(&self) -> &str {
        "fixed-fact-check"
    }

    async fn search(&self, _query: &str) -> Result<Vec<FactCheckHit>, ProviderError> {
        Ok(self.hits.clone())
    }
}

/// Returns the same toxicity signal for every text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedToxicity {
    signal: ToxicitySignal,
}

impl FixedToxicity {
    /// Creates the provider.
    #[must_use]
    pub const fn new(signal: ToxicitySignal) -> Self {
        Self { signal }
    }
}

#[async_trait]
impl ToxicityProvider for FixedToxicity {
    fn name(&self) -> &str {
        "fixed-toxicity"
    }

    async fn score(&self, _text: &str) -> Result<ToxicitySignal, ProviderError> {
        Ok(self.signal)
    }
}

/// Returns the same analysis for every claim.
#[derive(Debug, Clone)]
pub struct FixedAnalysis {
    response: AnalysisResponse,
}

impl FixedAnalysis {
    /// Creates the provider.
    #[must_use]
    pub const fn new(response: AnalysisResponse) -> Self {
        Self { response }
    }
}

#[async_trait]
impl AnalysisProvider for FixedAnalysis {
    fn name(&self) -> &str {
        "fixed-analysis"
    }

    async fn analyze(
        &self,
        _claim: &str,
        _fact_check_context: &str,
        _toxicity: &ToxicitySignal,
    ) -> Result<AnalysisResponse, ProviderError> {
        Ok(self.response.clone())
    }
}

/// Returns the same text for every image.
#[derive(Debug, Clone, Default)]
pub struct FixedOcr {
    text: String,
}

impl FixedOcr {
    /// Creates the provider.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl OcrProvider for FixedOcr {
    fn name(&self) -> &str {
        "fixed-ocr"
    }

    async fn extract_text(&self, _image: &[u8]) -> Result<String, ProviderError> {
        Ok(self.text.clone())
    }
}

/// Fails every call with the same error.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    error: ProviderError,
}

impl FailingProvider {
    /// Creates the provider.
    #[must_use]
    pub const fn new(error: ProviderError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl FactCheckProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str) -> Result<Vec<FactCheckHit>, ProviderError> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl ToxicityProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn score(&self, _text: &str) -> Result<ToxicitySignal, ProviderError> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl AnalysisProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn analyze(
        &self,
        _claim: &str,
        _fact_check_context: &str,
        _toxicity: &ToxicitySignal,
    ) -> Result<AnalysisResponse, ProviderError> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl OcrProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn extract_text(&self, _image: &[u8]) -> Result<String, ProviderError> {
        Err(self.error.clone())
    }
}
