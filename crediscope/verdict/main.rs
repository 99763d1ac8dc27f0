use std::{future::Future, sync::Arc, time::Instant};

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use indexmap::IndexMap;
use reqwest::Url;
use serde_json::{json, Value};
use shared_logging::LogLevel;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    checklist,
    classifier::classify,
    confidence::estimate,
    config::PipelineConfig,
    evidence::normalize_with,
    fallback::{resolve_analysis, ResolvedAnalysis},
    intelligence::IntelligenceSynthesizer,
    model::{
        ClaimInput, ContentKind, FactCheckHit, ToxicitySignal, ToxicitySource, VerdictPackage,
    },
    packages::{image_package, service_unavailable_package, url_package},
    providers::{fact_check_context, ProviderError, ProviderSet},
    telemetry::VerdictTelemetry,
};

const DEFAULT_SUMMARY: &str =
    "Analysis completed using professional sources and automated verification.";
const DEFAULT_QUICK_ANALYSIS: &str = "Analysis completed with professional fact-checking sources.";
const ANALYSIS_DEPTH: &str = "multi_lens_intelligence_briefing";

/// Reason a run fell through to the service-unavailable package.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Content kind is not `text`, `url` or `image`.
    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),
    /// Nothing to analyse.
    #[error("claim text is empty")]
    EmptyClaim,
    /// URL could not be parsed or is not http(s).
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl {
        /// Submitted value.
        url: String,
        /// Parser message.
        reason: String,
    },
    /// Image payload is not valid base64.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
}

/// Builder for [`VerdictPipeline`].
pub struct VerdictPipelineBuilder {
    config: PipelineConfig,
    providers: Option<ProviderSet>,
    telemetry: Option<VerdictTelemetry>,
    synthesizer: Option<IntelligenceSynthesizer>,
}

impl VerdictPipelineBuilder {
    /// Creates the builder.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            providers: None,
            telemetry: None,
            synthesizer: None,
        }
    }

    /// Uses these collaborators instead of the hosted clients.
    #[must_use]
    pub fn providers(mut self, providers: ProviderSet) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn telemetry(mut self, telemetry: VerdictTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Replaces the intelligence synthesizer.
    #[must_use]
    pub fn synthesizer(mut self, synthesizer: IntelligenceSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Validates the config and builds the pipeline. Without explicit
    /// providers the hosted clients are built from the config keys.
    pub fn build(self) -> Result<VerdictPipeline> {
        self.config.validate()?;
        let providers = self
            .providers
            .map_or_else(|| ProviderSet::from_config(&self.config), Ok)?;
        Ok(VerdictPipeline {
            config: Arc::new(self.config),
            providers,
            telemetry: self.telemetry,
            synthesizer: self.synthesizer.unwrap_or_default(),
        })
    }
}

/// Claim verdict pipeline. Cheap to clone; share one per process.
#[derive(Debug, Clone)]
pub struct VerdictPipeline {
    config: Arc<PipelineConfig>,
    providers: ProviderSet,
    telemetry: Option<VerdictTelemetry>,
    synthesizer: IntelligenceSynthesizer,
}

impl VerdictPipeline {
    /// Returns a builder.
    #[must_use]
    pub const fn builder(config: PipelineConfig) -> VerdictPipelineBuilder {
        VerdictPipelineBuilder::new(config)
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Collaborators in use.
    #[must_use]
    pub const fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    /// Runs with the configured language.
    pub async fn run(&self, category: ContentKind, content: &str) -> VerdictPackage {
        self.produce_verdict_package(category.as_str(), content, &self.config.language_code)
            .await
    }

    /// Produces a verdict package. Never fails: any error yields the
    /// service-unavailable package.
    pub async fn produce_verdict_package(
        &self,
        category: &str,
        content: &str,
        language: &str,
    ) -> VerdictPackage {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        match self.dispatch(category, content, language, &run_id).await {
            Ok(mut package) => {
                package.audit.insert("analysis_time".into(), json!(Utc::now().to_rfc3339()));
                package.audit.insert(
                    "processing_time".into(),
                    json!(format!("{:.2}s", started.elapsed().as_secs_f64())),
                );
                package
                    .audit
                    .insert("model_version".into(), json!(self.config.model_version));
                package
                    .audit
                    .insert("apis_used".into(), json!(self.providers.apis_used()));
                info!(
                    run_id = %run_id,
                    label = ?package.label,
                    confidence = package.confidence,
                    "verdict package assembled"
                );
                self.publish(
                    "verdict.package.assembled",
                    &run_id,
                    json!({
                        "id": package.id,
                        "label": package.label,
                        "confidence": package.confidence,
                        "evidence": package.evidence.len(),
                    }),
                )
                .await;
                package
            }
            Err(err) => {
                let message = err.to_string();
                warn!(run_id = %run_id, error = %message, "verdict run failed");
                self.log(LogLevel::Error, "verdict.run.failed", &run_id, json!({ "error": message }));
                self.publish(
                    "verdict.package.error",
                    &run_id,
                    json!({ "category": category, "error": message }),
                )
                .await;
                service_unavailable_package(&run_id, content, &message)
            }
        }
    }

    async fn dispatch(
        &self,
        category: &str,
        content: &str,
        language: &str,
        run_id: &str,
    ) -> Result<VerdictPackage, PipelineError> {
        let kind: ContentKind = category.parse().map_err(PipelineError::UnsupportedContent)?;
        match kind {
            ContentKind::Text => {
                self.analyze_text(&ClaimInput::new(content.trim(), kind), language, run_id)
                    .await
            }
            ContentKind::Url => {
                let url = validate_url(content)?;
                Ok(url_package(run_id, url.as_str()))
            }
            ContentKind::Image => self.analyze_image(content, language, run_id).await,
        }
    }

    async fn analyze_image(
        &self,
        content: &str,
        language: &str,
        run_id: &str,
    ) -> Result<VerdictPackage, PipelineError> {
        let image = decode_image(content)?;
        let ocr = Arc::clone(&self.providers.ocr);
        let text = match self
            .isolated(async move { ocr.extract_text(&image).await })
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                self.degraded("ocr", self.providers.ocr.name(), run_id, &err);
                String::new()
            }
        };
        if text.is_empty() {
            return Ok(image_package(run_id));
        }
        let claim = ClaimInput::new(text, ContentKind::Image);
        let mut package = self.analyze_text(&claim, language, run_id).await?;
        package.input = format!("Image Analysis - Extracted Text: {}", claim.text);
        package
            .audit
            .insert("analysis_type".into(), json!(ContentKind::Image.as_str()));
        package
            .audit
            .insert("extracted_characters".into(), json!(claim.text.chars().count()));
        Ok(package)
    }

    async fn analyze_text(
        &self,
        claim: &ClaimInput,
        language: &str,
        run_id: &str,
    ) -> Result<VerdictPackage, PipelineError> {
        if claim.text.trim().is_empty() {
            return Err(PipelineError::EmptyClaim);
        }
        let (hits, toxicity) = tokio::join!(
            self.fetch_fact_checks(&claim.text, run_id),
            self.fetch_toxicity(&claim.text, run_id)
        );
        self.publish(
            "verdict.signals.fetched",
            run_id,
            json!({
                "fact_checks": hits.len(),
                "toxicity_score": toxicity.score,
                "toxicity_source": toxicity.source,
            }),
        )
        .await;

        let context = fact_check_context(&hits);
        let analysis = Arc::clone(&self.providers.analysis);
        let claim_text = claim.text.clone();
        let outcome = self
            .isolated(async move { analysis.analyze(&claim_text, &context, &toxicity).await })
            .await;
        if let Err(err) = &outcome {
            self.degraded("analysis", self.providers.analysis.name(), run_id, err);
        }
        let resolved = resolve_analysis(outcome, &claim.text, hits.len());
        self.publish(
            "verdict.analysis.resolved",
            run_id,
            json!({
                "source": resolved.source,
                "reason": resolved.reason,
            }),
        )
        .await;

        Ok(self.assemble(claim, language, run_id, &hits, &toxicity, resolved))
    }

    fn assemble(
        &self,
        claim: &ClaimInput,
        language: &str,
        run_id: &str,
        hits: &[FactCheckHit],
        toxicity: &ToxicitySignal,
        resolved: ResolvedAnalysis,
    ) -> VerdictPackage {
        let ResolvedAnalysis {
            signal,
            source,
            reason,
        } = resolved;
        let claim_type = signal.claim_type_or_default();
        let evidence = normalize_with(hits, &claim_type, &self.config.reliability);
        let confidence = estimate(hits, &signal);
        let label = classify(hits);
        let checklist = checklist::select(&claim.text, &claim_type).to_vec();
        let intelligence = self
            .synthesizer
            .synthesize(&claim.text, &signal, toxicity, hits);
        let domain = signal.domain_or_default().to_string();

        let mut audit: IndexMap<String, Value> = IndexMap::new();
        audit.insert("fact_checks_found".into(), json!(hits.len()));
        audit.insert("detected_language".into(), json!(language));
        audit.insert("claim_type".into(), json!(claim_type));
        audit.insert("toxicity_score".into(), json!(toxicity.score));
        audit.insert(
            "manipulation_detected".into(),
            json!(toxicity.manipulation_detected),
        );
        audit.insert("analysis_source".into(), json!(source.as_str()));
        if let Some(reason) = reason {
            audit.insert("analysis_fallback_reason".into(), json!(reason.as_str()));
        }
        audit.insert(
            "gemini_available".into(),
            json!(self.providers.analysis.is_configured()),
        );
        audit.insert(
            "fact_check_available".into(),
            json!(self.providers.fact_check.is_configured()),
        );
        audit.insert("content_kind".into(), json!(claim.category_hint.as_str()));
        audit.insert("analysis_depth".into(), json!(ANALYSIS_DEPTH));

        VerdictPackage {
            id: format!("analysis_{run_id}"),
            input: claim.text.clone(),
            label,
            confidence,
            summary: signal
                .summary
                .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            evidence,
            checklist,
            intelligence,
            quick_analysis: signal
                .quick_analysis
                .unwrap_or_else(|| DEFAULT_QUICK_ANALYSIS.to_string()),
            domain,
            audit,
        }
    }

    async fn fetch_fact_checks(&self, text: &str, run_id: &str) -> Vec<FactCheckHit> {
        let provider = &self.providers.fact_check;
        let call = Arc::clone(provider);
        let query = text.to_string();
        match self.isolated(async move { call.search(&query).await }).await {
            Ok(hits) => hits,
            Err(err) => {
                self.degraded("fact_check", provider.name(), run_id, &err);
                Vec::new()
            }
        }
    }

    async fn fetch_toxicity(&self, text: &str, run_id: &str) -> ToxicitySignal {
        let provider = &self.providers.toxicity;
        let call = Arc::clone(provider);
        let text = text.to_string();
        match self.isolated(async move { call.score(&text).await }).await {
            Ok(signal) => signal,
            Err(err) => {
                self.degraded("toxicity", provider.name(), run_id, &err);
                ToxicitySignal::unavailable(match err {
                    ProviderError::NotConfigured(_) => ToxicitySource::Basic,
                    ProviderError::Status(_) => ToxicitySource::Failed,
                    _ => ToxicitySource::Error,
                })
            }
        }
    }

    /// Runs a collaborator call on its own task under the request timeout.
    /// A panic or a timeout in the call degrades to a [`ProviderError`].
    async fn isolated<T, F>(&self, call: F) -> Result<T, ProviderError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ProviderError>> + Send + 'static,
    {
        let mut task = tokio::spawn(call);
        match timeout(self.config.request_timeout(), &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => Err(ProviderError::Transport(format!(
                "collaborator task failed: {err}"
            ))),
            Err(_) => {
                task.abort();
                Err(ProviderError::Timeout(self.config.request_timeout_ms))
            }
        }
    }

    fn degraded(&self, signal: &str, provider: &str, run_id: &str, err: &ProviderError) {
        if matches!(err, ProviderError::NotConfigured(_)) {
            debug!(signal, provider, "collaborator not configured; using default");
        } else {
            warn!(signal, provider, error = %err, "collaborator failed; using default");
        }
        self.log(
            LogLevel::Warn,
            "verdict.signal.degraded",
            run_id,
            json!({ "signal": signal, "provider": provider, "error": err.to_string() }),
        );
    }

    fn log(&self, level: LogLevel, message: &str, run_id: &str, metadata: Value) {
        if let Some(telemetry) = &self.telemetry {
            if let Err(err) = telemetry.log_request(level, message, run_id, metadata) {
                warn!(error = %err, "telemetry log failed");
            }
        }
    }

    async fn publish(&self, event_type: &str, run_id: &str, payload: Value) {
        if let Some(telemetry) = &self.telemetry {
            if let Err(err) = telemetry.emit(event_type, Some(run_id), payload).await {
                warn!(event_type, error = %err, "telemetry event failed");
            }
        }
    }
}

fn validate_url(raw: &str) -> Result<Url, PipelineError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| PipelineError::InvalidUrl {
        url: trimmed.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().unwrap_or_default().is_empty() {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}

/// Decodes base64 image content, dropping an optional `data:...;base64,` prefix.
fn decode_image(content: &str) -> Result<Vec<u8>, PipelineError> {
    let trimmed = content.trim();
    let payload = trimmed
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once("base64,"))
        .map_or(trimmed, |(_, data)| data);
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|err| PipelineError::InvalidImage(err.to_string()))?;
    if bytes.is_empty() {
        return Err(PipelineError::InvalidImage("empty image".into()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_must_be_http() {
        assert!(validate_url(" https://example.org/a ").is_ok());
        assert!(matches!(
            validate_url("ftp://example.org"),
            Err(PipelineError::InvalidUrl { .. })
        ));
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn image_prefix_is_stripped() {
        let encoded = STANDARD.encode(b"png-bytes");
        let with_prefix = format!("data:image/png;base64,{encoded}");
        assert_eq!(decode_image(&with_prefix).unwrap(), b"png-bytes");
        assert_eq!(decode_image(&encoded).unwrap(), b"png-bytes");
        assert!(matches!(
            decode_image("%%%"),
            Err(PipelineError::InvalidImage(_))
        ));
        assert!(decode_image("").is_err());
    }

    #[tokio::test]
    async fn builder_uses_disabled_providers_without_keys() {
        let pipeline = VerdictPipeline::builder(PipelineConfig::default())
            .build()
            .unwrap();
        assert!(pipeline.providers().apis_used().is_empty());
        let package = pipeline.run(ContentKind::Text, "The moon is made of cheese").await;
        assert_eq!(package.audit["analysis_source"], json!("keyword_fallback"));
        assert_eq!(
            package.audit["analysis_fallback_reason"],
            json!("provider_unavailable")
        );
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = PipelineConfig {
            request_timeout_ms: 0,
            ..PipelineConfig::default()
        };
        assert!(VerdictPipeline::builder(config).build().is_err());
    }
}
