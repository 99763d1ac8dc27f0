use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain reported when the analysis does not name one.
pub const GENERIC_DOMAIN: &str = "General Information";

/// Kind of content submitted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Free text claim.
    Text,
    /// Web address whose content carries the claim.
    Url,
    /// Base64 image whose text is recovered by OCR.
    Image,
}

impl ContentKind {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Url => "url",
            Self::Image => "image",
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "url" => Ok(Self::Url),
            "image" => Ok(Self::Image),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim under evaluation. Built once by the caller and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInput {
    /// Claim text (typed, URL-derived or OCR-extracted).
    pub text: String,
    /// Where the text came from.
    pub category_hint: ContentKind,
}

impl ClaimInput {
    /// Creates a claim.
    #[must_use]
    pub fn new(text: impl Into<String>, category_hint: ContentKind) -> Self {
        Self {
            text: text.into(),
            category_hint,
        }
    }
}

/// One review returned by the fact-check search collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheckHit {
    /// Publishing organisation.
    pub publisher: String,
    /// Textual rating, e.g. `"False"` or `"Partly true"`.
    pub rating_text: String,
    /// Title of the review article.
    pub review_title: String,
    /// Link to the review, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_url: Option<String>,
}

impl FactCheckHit {
    /// Creates a hit without a review URL.
    #[must_use]
    pub fn new(
        publisher: impl Into<String>,
        rating_text: impl Into<String>,
        review_title: impl Into<String>,
    ) -> Self {
        Self {
            publisher: publisher.into(),
            rating_text: rating_text.into(),
            review_title: review_title.into(),
            review_url: None,
        }
    }

    /// Attaches the review URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.review_url = Some(url.into());
        self
    }
}

/// Trimmed `value`, or `fallback` when it is blank.
pub(crate) fn non_blank<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// Output of the generative-analysis collaborator. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSignal {
    /// Human-readable domain, e.g. `"Medical/Health"`.
    pub domain: Option<String>,
    /// Machine claim type: `medical`, `political`, `scientific`, `general`.
    pub claim_type: Option<String>,
    /// Citizen-friendly analysis points separated by blank lines.
    pub quick_analysis: Option<String>,
    /// Short verdict explanation.
    pub summary: Option<String>,
    /// Manipulation patterns and social dynamics.
    pub psychological_analysis: Option<String>,
    /// Historical and international context.
    pub historical_context: Option<String>,
    /// Effect on political trust and institutions.
    pub political_implications: Option<String>,
    /// Economic beneficiaries and market effects.
    pub financial_impact: Option<String>,
    /// Scientific consensus and evidence quality.
    pub scientific_assessment: Option<String>,
    /// Distribution methods and media techniques.
    pub technical_patterns: Option<String>,
}

impl AnalysisSignal {
    /// Returns a copy with blank strings turned into `None` and the rest trimmed.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            domain: clean(self.domain),
            claim_type: clean(self.claim_type),
            quick_analysis: clean(self.quick_analysis),
            summary: clean(self.summary),
            psychological_analysis: clean(self.psychological_analysis),
            historical_context: clean(self.historical_context),
            political_implications: clean(self.political_implications),
            financial_impact: clean(self.financial_impact),
            scientific_assessment: clean(self.scientific_assessment),
            technical_patterns: clean(self.technical_patterns),
        }
    }

    /// Lowercased claim type, `"general"` when absent.
    #[must_use]
    pub fn claim_type_or_default(&self) -> String {
        self.claim_type
            .as_deref()
            .map_or_else(|| "general".to_string(), str::to_lowercase)
    }

    /// Domain, or the generic default when absent.
    #[must_use]
    pub fn domain_or_default(&self) -> &str {
        self.domain.as_deref().unwrap_or(GENERIC_DOMAIN)
    }
}

/// Where a toxicity score came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToxicitySource {
    /// Scored by the Perspective service.
    PerspectiveApi,
    /// No scorer configured.
    #[default]
    Basic,
    /// Scorer answered with an error status.
    Failed,
    /// Scorer call raised a transport or decode error.
    Error,
}

/// Toxicity/manipulation score for the claim text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToxicitySignal {
    /// Score in `[0, 1]`.
    pub score: f64,
    /// Whether manipulation was flagged.
    pub manipulation_detected: bool,
    /// Provenance of the score.
    #[serde(default)]
    pub source: ToxicitySource,
}

impl ToxicitySignal {
    /// Scores above this threshold flag manipulation.
    pub const MANIPULATION_THRESHOLD: f64 = 0.7;

    /// Builds a signal from a raw score, clamping to `[0, 1]`.
    #[must_use]
    pub fn from_score(score: f64, source: ToxicitySource) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            score,
            manipulation_detected: score > Self::MANIPULATION_THRESHOLD,
            source,
        }
    }

    /// Zero signal tagged with the reason it is empty.
    #[must_use]
    pub fn unavailable(source: ToxicitySource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }
}

/// Ranked, reliability-scored evidence shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Publisher or institution name.
    pub source: String,
    /// Link, `"#"` when none.
    pub url: String,
    /// Short description.
    pub snippet: String,
    /// Reliability in `[0, 1]`.
    pub reliability: f64,
}

/// Verification guidance item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// What to check.
    pub point: String,
    /// How to check it.
    pub explanation: String,
    /// UI completion flag, always `false` when produced.
    #[serde(default)]
    pub completed: bool,
}

impl ChecklistItem {
    /// Creates an uncompleted item.
    #[must_use]
    pub fn new(point: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            point: point.into(),
            explanation: explanation.into(),
            completed: false,
        }
    }
}

/// Six-perspective narrative report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelligenceReport {
    /// Institutional trust perspective.
    pub political: Option<String>,
    /// Economic perspective.
    pub financial: Option<String>,
    /// Manipulation and social dynamics perspective.
    pub psychological: Option<String>,
    /// Evidence quality perspective.
    pub scientific: Option<String>,
    /// Distribution and media perspective.
    pub technical: Option<String>,
    /// International perspective.
    pub geopolitical: Option<String>,
}

impl IntelligenceReport {
    /// Report carrying only the technical lens.
    #[must_use]
    pub fn technical_only(text: impl Into<String>) -> Self {
        Self {
            technical: Some(text.into()),
            ..Self::default()
        }
    }

    /// Number of lenses with content.
    #[must_use]
    pub fn filled_lenses(&self) -> usize {
        [
            &self.political,
            &self.financial,
            &self.psychological,
            &self.scientific,
            &self.technical,
            &self.geopolitical,
        ]
        .into_iter()
        .filter(|lens| lens.as_deref().is_some_and(|text| !text.trim().is_empty()))
        .count()
    }
}

/// Verdict label. The first five variants form the closed set produced by the
/// classifier; `ServiceUnavailable` only appears on the error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictLabel {
    /// Sources predominantly rate the claim false.
    False,
    /// Sources predominantly rate the claim true.
    True,
    /// Sources disagree or rate the claim partly true.
    Mixed,
    /// No decisive evidence; needs manual verification.
    RequiresVerification,
    /// Sources exist but none could be classified.
    InsufficientEvidence,
    /// Diagnostic label for failed runs.
    ServiceUnavailable,
}

impl VerdictLabel {
    /// Label shown to end users.
    #[must_use]
    pub const fn display(self) -> &'static str {
        match self {
            Self::False => "❌ False",
            Self::True => "✅ True",
            Self::Mixed => "⚠️ Mixed Evidence",
            Self::RequiresVerification => "⚠️ Requires Verification",
            Self::InsufficientEvidence => "⚠️ Insufficient Evidence",
            Self::ServiceUnavailable => "⚠️ Service Temporarily Unavailable",
        }
    }

    /// Whether the label belongs to the classifier's closed set.
    #[must_use]
    pub const fn is_classifier_label(self) -> bool {
        !matches!(self, Self::ServiceUnavailable)
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Final output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictPackage {
    /// Run identifier.
    pub id: String,
    /// Text that was analysed (or a description of it).
    pub input: String,
    /// Verdict label.
    pub label: VerdictLabel,
    /// Confidence in `[0, 100]`.
    pub confidence: f64,
    /// Short verdict explanation.
    pub summary: String,
    /// Ranked evidence.
    pub evidence: Vec<EvidenceItem>,
    /// Verification guidance.
    pub checklist: Vec<ChecklistItem>,
    /// Six-lens report.
    pub intelligence: IntelligenceReport,
    /// Citizen-friendly analysis.
    pub quick_analysis: String,
    /// Claim domain.
    pub domain: String,
    /// Audit metadata in insertion order.
    pub audit: IndexMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_trims_or_falls_back() {
        assert_eq!(non_blank("  Reuters ", "Unknown"), "Reuters");
        assert_eq!(non_blank(" \t", "Unknown"), "Unknown");
    }

    #[test]
    fn content_kind_parses_case_insensitively() {
        assert_eq!("TEXT".parse::<ContentKind>(), Ok(ContentKind::Text));
        assert_eq!(" image ".parse::<ContentKind>(), Ok(ContentKind::Image));
        assert_eq!("video".parse::<ContentKind>(), Err("video".to_string()));
    }

    #[test]
    fn normalized_analysis_drops_blank_fields() {
        let signal = AnalysisSignal {
            domain: Some("  ".into()),
            claim_type: Some(" Medical ".into()),
            ..AnalysisSignal::default()
        }
        .normalized();
        assert_eq!(signal.domain, None);
        assert_eq!(signal.claim_type.as_deref(), Some("Medical"));
        assert_eq!(signal.claim_type_or_default(), "medical");
        assert_eq!(signal.domain_or_default(), GENERIC_DOMAIN);
    }

    #[test]
    fn analysis_deserializes_from_partial_json() {
        let signal: AnalysisSignal =
            serde_json::from_str(r#"{"domain":"Political","unknown":1}"#).unwrap();
        assert_eq!(signal.domain.as_deref(), Some("Political"));
        assert!(signal.summary.is_none());
    }

    #[test]
    fn toxicity_flags_manipulation_above_threshold() {
        let high = ToxicitySignal::from_score(0.85, ToxicitySource::PerspectiveApi);
        assert!(high.manipulation_detected);
        let clamped = ToxicitySignal::from_score(3.0, ToxicitySource::PerspectiveApi);
        assert!((clamped.score - 1.0).abs() < f64::EPSILON);
        assert!(!ToxicitySignal::from_score(f64::NAN, ToxicitySource::Basic).manipulation_detected);
    }

    #[test]
    fn labels_serialize_as_screaming_snake_case() {
        let json = serde_json::to_string(&VerdictLabel::RequiresVerification).unwrap();
        assert_eq!(json, "\"REQUIRES_VERIFICATION\"");
        assert!(!VerdictLabel::ServiceUnavailable.is_classifier_label());
    }
}
