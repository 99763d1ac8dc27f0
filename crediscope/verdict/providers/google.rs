use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use crate::{
    model::{FactCheckHit, ToxicitySignal, ToxicitySource},
    providers::{
        AnalysisProvider, AnalysisResponse, FactCheckProvider, OcrProvider, ProviderError,
        ToxicityProvider,
    },
};

/// Audit name of the fact-check search.
pub const FACT_CHECK_NAME: &str = "Google Fact Check";
/// Audit name of the toxicity scorer.
pub const PERSPECTIVE_NAME: &str = "Perspective API";
/// Audit name of the generative analysis.
pub const GEMINI_NAME: &str = "Gemini AI";
/// Audit name of the OCR service.
pub const VISION_NAME: &str = "Cloud Vision";

const FACT_CHECK_BASE: &str = "https://factchecktools.googleapis.com";
const PERSPECTIVE_BASE: &str = "https://commentanalyzer.googleapis.com";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";
const VISION_BASE: &str = "https://vision.googleapis.com";

/// Shared HTTP client with the per-call timeout applied.
pub fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent("crediscope-verdict")
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::Transport(err.to_string()))
}

fn transport(err: reqwest::Error) -> ProviderError {
    ProviderError::Transport(err.to_string())
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| ProviderError::Decode(err.to_string()))
}

fn trimmed_base(url: impl Into<String>) -> String {
    let mut url = url.into();
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClaimSearchResponse {
    claims: Vec<ClaimEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClaimEntry {
    claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClaimReview {
    publisher: ReviewPublisher,
    url: Option<String>,
    title: String,
    textual_rating: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewPublisher {
    name: String,
}

impl ClaimSearchResponse {
    fn into_hits(self) -> Vec<FactCheckHit> {
        self.claims
            .into_iter()
            .flat_map(|claim| claim.claim_review)
            .map(|review| FactCheckHit {
                publisher: review.publisher.name,
                rating_text: review.textual_rating,
                review_title: review.title,
                review_url: review.url,
            })
            .collect()
    }
}

/// Fact Check Tools `claims:search` client.
#[derive(Debug, Clone)]
pub struct FactCheckClient {
    client: Client,
    api_key: String,
    language_code: String,
    base_url: String,
}

impl FactCheckClient {
    /// Creates the client.
    #[must_use]
    pub fn new(client: Client, api_key: &str, language_code: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            language_code: language_code.to_string(),
            base_url: FACT_CHECK_BASE.to_string(),
        }
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = trimmed_base(url);
        self
    }
}

#[async_trait]
impl FactCheckProvider for FactCheckClient {
    fn name(&self) -> &str {
        FACT_CHECK_NAME
    }

    async fn search(&self, query: &str) -> Result<Vec<FactCheckHit>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1alpha1/claims:search", self.base_url))
            .query(&[
                ("query", query),
                ("key", self.api_key.as_str()),
                ("languageCode", self.language_code.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let body: ClaimSearchResponse = decode_json(response).await?;
        Ok(body.into_hits())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzeCommentResponse {
    attribute_scores: AttributeScores,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AttributeScores {
    #[serde(rename = "TOXICITY")]
    toxicity: Option<AttributeScore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryScore {
    value: f64,
}

impl AnalyzeCommentResponse {
    fn into_signal(self) -> Result<ToxicitySignal, ProviderError> {
        let score = self
            .attribute_scores
            .toxicity
            .ok_or_else(|| ProviderError::Decode("missing TOXICITY score".into()))?;
        Ok(ToxicitySignal::from_score(
            score.summary_score.value,
            ToxicitySource::PerspectiveApi,
        ))
    }
}

/// Perspective `comments:analyze` client scoring `TOXICITY`.
#[derive(Debug, Clone)]
pub struct PerspectiveClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PerspectiveClient {
    /// Creates the client.
    #[must_use]
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: PERSPECTIVE_BASE.to_string(),
        }
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = trimmed_base(url);
        self
    }
}

#[async_trait]
impl ToxicityProvider for PerspectiveClient {
    fn name(&self) -> &str {
        PERSPECTIVE_NAME
    }

    async fn score(&self, text: &str) -> Result<ToxicitySignal, ProviderError> {
        let body = json!({
            "requestedAttributes": { "TOXICITY": {} },
            "comment": { "text": text },
        });
        let response = self
            .client
            .post(format!("{}/v1alpha1/comments:analyze", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let decoded: AnalyzeCommentResponse = decode_json(response).await?;
        decoded.into_signal()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ContentPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentPart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, ProviderError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        if text.trim().is_empty() {
            Err(ProviderError::Decode("empty generative response".into()))
        } else {
            Ok(text)
        }
    }
}

/// Prompt asking the model for the ten analysis fields as one JSON object.
#[must_use]
pub fn build_analysis_prompt(
    claim: &str,
    fact_check_context: &str,
    toxicity: &ToxicitySignal,
) -> String {
    format!(
        r#"You are assisting citizens and professional analysts in evaluating a claim.

CLAIM: "{claim}"

PROFESSIONAL FACT-CHECK EVIDENCE:
{fact_check_context}

TOXICITY/MANIPULATION SIGNAL:
Score: {score:.2}
Manipulation detected: {manipulation}

Write 4-6 plain-language analysis points for "quick_analysis", separated by blank
lines, and reference real institutions where relevant. Add context for each
analytical perspective.

Respond with a single JSON object and nothing else:
{{
  "domain": "Medical/Health | Political | Scientific/Technical | General Information",
  "claim_type": "medical | political | scientific | general",
  "quick_analysis": "...",
  "summary": "...",
  "psychological_analysis": "...",
  "historical_context": "...",
  "political_implications": "...",
  "financial_impact": "...",
  "scientific_assessment": "...",
  "technical_patterns": "..."
}}"#,
        score = toxicity.score,
        manipulation = toxicity.manipulation_detected,
    )
}

/// Gemini `generateContent` client. Answers are returned as raw text.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates the client for `model`.
    #[must_use]
    pub fn new(client: Client, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_BASE.to_string(),
        }
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = trimmed_base(url);
        self
    }
}

#[async_trait]
impl AnalysisProvider for GeminiClient {
    fn name(&self) -> &str {
        GEMINI_NAME
    }

    async fn analyze(
        &self,
        claim: &str,
        fact_check_context: &str,
        toxicity: &ToxicitySignal,
    ) -> Result<AnalysisResponse, ProviderError> {
        let prompt = build_analysis_prompt(claim, fact_check_context, toxicity);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let decoded: GenerateContentResponse = decode_json(response).await?;
        decoded.into_text().map(AnalysisResponse::RawText)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnnotateBatchResponse {
    responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnnotateResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    text_annotations: Vec<TextAnnotation>,
    error: Option<AnnotateError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FullTextAnnotation {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnnotateError {
    message: String,
}

impl AnnotateBatchResponse {
    fn into_text(self) -> Result<String, ProviderError> {
        let Some(first) = self.responses.into_iter().next() else {
            return Ok(String::new());
        };
        if let Some(error) = first.error {
            return Err(ProviderError::Decode(error.message));
        }
        let text = first
            .full_text_annotation
            .map(|annotation| annotation.text)
            .or_else(|| {
                first
                    .text_annotations
                    .into_iter()
                    .next()
                    .map(|annotation| annotation.description)
            })
            .unwrap_or_default();
        Ok(text.trim().to_string())
    }
}

/// Cloud Vision `images:annotate` client using `TEXT_DETECTION`.
#[derive(Debug, Clone)]
pub struct VisionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl VisionClient {
    /// Creates the client.
    #[must_use]
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: VISION_BASE.to_string(),
        }
    }

    /// Points the client at another host.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = trimmed_base(url);
        self
    }
}

#[async_trait]
impl OcrProvider for VisionClient {
    fn name(&self) -> &str {
        VISION_NAME
    }

    async fn extract_text(&self, image: &[u8]) -> Result<String, ProviderError> {
        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }],
            }]
        });
        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let decoded: AnnotateBatchResponse = decode_json(response).await?;
        decoded.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parse<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn claim_search_flattens_reviews() {
        let body: ClaimSearchResponse = parse(json!({
            "claims": [
                {
                    "text": "Vaccines contain microchips",
                    "claimReview": [
                        {
                            "publisher": { "name": "Reuters", "site": "reuters.com" },
                            "url": "https://reuters.com/fc/1",
                            "title": "No microchips",
                            "textualRating": "False"
                        },
                        {
                            "publisher": { "name": "AFP Fact Check" },
                            "title": "Fabricated",
                            "textualRating": "Fake"
                        }
                    ]
                },
                { "text": "no reviews" }
            ]
        }));
        let hits = body.into_hits();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].publisher, "Reuters");
        assert_eq!(hits[0].review_url.as_deref(), Some("https://reuters.com/fc/1"));
        assert_eq!(hits[1].rating_text, "Fake");
        assert_eq!(hits[1].review_url, None);
    }

    #[test]
    fn empty_search_body_has_no_hits() {
        let body: ClaimSearchResponse = parse(json!({}));
        assert!(body.into_hits().is_empty());
    }

    #[test]
    fn toxicity_score_decodes() {
        let body: AnalyzeCommentResponse = parse(json!({
            "attributeScores": {
                "TOXICITY": { "summaryScore": { "value": 0.82, "type": "PROBABILITY" } }
            }
        }));
        let signal = body.into_signal().unwrap();
        assert!((signal.score - 0.82).abs() < 1e-9);
        assert!(signal.manipulation_detected);
        assert_eq!(signal.source, ToxicitySource::PerspectiveApi);
    }

    #[test]
    fn missing_toxicity_attribute_is_decode_error() {
        let body: AnalyzeCommentResponse = parse(json!({ "attributeScores": {} }));
        assert!(matches!(body.into_signal(), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn generative_parts_are_joined() {
        let body: GenerateContentResponse = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"domain\":" }, { "text": "\"Political\"}" }] }
            }]
        }));
        assert_eq!(body.into_text().unwrap(), r#"{"domain":"Political"}"#);
        let empty: GenerateContentResponse = parse(json!({ "candidates": [] }));
        assert!(empty.into_text().is_err());
    }

    #[test]
    fn vision_prefers_full_text() {
        let body: AnnotateBatchResponse = parse(json!({
            "responses": [{
                "fullTextAnnotation": { "text": "5G causes covid\n" },
                "textAnnotations": [{ "description": "ignored" }]
            }]
        }));
        assert_eq!(body.into_text().unwrap(), "5G causes covid");

        let fallback: AnnotateBatchResponse = parse(json!({
            "responses": [{ "textAnnotations": [{ "description": "first block" }] }]
        }));
        assert_eq!(fallback.into_text().unwrap(), "first block");

        let blank: AnnotateBatchResponse = parse(json!({ "responses": [{}] }));
        assert_eq!(blank.into_text().unwrap(), "");
    }

    #[test]
    fn vision_error_is_reported() {
        let body: AnnotateBatchResponse = parse(json!({
            "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
        }));
        assert_eq!(
            body.into_text().unwrap_err(),
            ProviderError::Decode("Bad image data.".into())
        );
    }

    #[test]
    fn prompt_carries_claim_and_context() {
        let toxicity = ToxicitySignal::from_score(0.456, ToxicitySource::PerspectiveApi);
        let prompt = build_analysis_prompt("The moon is hollow", "1. Snopes: False", &toxicity);
        assert!(prompt.contains("CLAIM: \"The moon is hollow\""));
        assert!(prompt.contains("1. Snopes: False"));
        assert!(prompt.contains("Score: 0.46"));
        assert!(prompt.contains("\"technical_patterns\""));
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = http_client(Duration::from_secs(1)).unwrap();
        let vision = VisionClient::new(client, "k").with_base_url("http://localhost:9000//");
        assert_eq!(vision.base_url, "http://localhost:9000");
    }
}
