use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    keywords::{
        FALLBACK_MEDICAL, FALLBACK_POLITICAL, FALLBACK_SCIENTIFIC, RESPONSE_MEDICAL,
        RESPONSE_POLITICAL,
    },
    model::{AnalysisSignal, GENERIC_DOMAIN},
    providers::{AnalysisResponse, ProviderError},
};

/// Characters of a raw response kept as the summary.
pub const SUMMARY_CHARS: usize = 300;

static CODE_FENCE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").ok());

/// Which level of the resolution chain produced the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Structured output of the generative collaborator.
    Generative,
    /// Best-effort fields pulled from unstructured output.
    TextExtraction,
    /// Deterministic keyword analysis of the claim.
    KeywordFallback,
}

impl AnalysisSource {
    /// Audit value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generative => "generative",
            Self::TextExtraction => "text_extraction",
            Self::KeywordFallback => "keyword_fallback",
        }
    }
}

/// Why the chain left the generative level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Collaborator not configured.
    ProviderUnavailable,
    /// Collaborator call failed or timed out.
    ProviderFailed,
    /// Collaborator answered with text that holds no usable JSON.
    Unparseable,
}

impl FallbackReason {
    /// Audit value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "provider_unavailable",
            Self::ProviderFailed => "provider_failed",
            Self::Unparseable => "unparseable",
        }
    }
}

/// Analysis signal together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnalysis {
    /// Normalized signal.
    pub signal: AnalysisSignal,
    /// Chain level that produced it.
    pub source: AnalysisSource,
    /// Set whenever `source` is not [`AnalysisSource::Generative`].
    pub reason: Option<FallbackReason>,
}

impl ResolvedAnalysis {
    fn generative(signal: AnalysisSignal) -> Self {
        Self {
            signal: signal.normalized(),
            source: AnalysisSource::Generative,
            reason: None,
        }
    }

    fn fallback(signal: AnalysisSignal, source: AnalysisSource, reason: FallbackReason) -> Self {
        Self {
            signal: signal.normalized(),
            source,
            reason: Some(reason),
        }
    }
}

/// Resolves the collaborator outcome to a signal:
/// structured JSON, then text extraction, then the keyword fallback.
#[must_use]
pub fn resolve_analysis(
    outcome: Result<AnalysisResponse, ProviderError>,
    claim: &str,
    hit_count: usize,
) -> ResolvedAnalysis {
    match outcome {
        Ok(AnalysisResponse::Structured(signal)) => ResolvedAnalysis::generative(signal),
        Ok(AnalysisResponse::RawText(text)) => {
            if let Some(signal) = parse_structured(&text) {
                ResolvedAnalysis::generative(signal)
            } else if text.trim().is_empty() {
                ResolvedAnalysis::fallback(
                    keyword_fallback(claim, hit_count),
                    AnalysisSource::KeywordFallback,
                    FallbackReason::Unparseable,
                )
            } else {
                ResolvedAnalysis::fallback(
                    extract_from_text(&text, hit_count),
                    AnalysisSource::TextExtraction,
                    FallbackReason::Unparseable,
                )
            }
        }
        Err(err) => {
            let reason = if matches!(err, ProviderError::NotConfigured(_)) {
                FallbackReason::ProviderUnavailable
            } else {
                FallbackReason::ProviderFailed
            };
            ResolvedAnalysis::fallback(
                keyword_fallback(claim, hit_count),
                AnalysisSource::KeywordFallback,
                reason,
            )
        }
    }
}

/// Parses a response as a JSON object, after removing a code fence, or from
/// its outermost `{...}` block.
///
/// Recognized keys are read one by one: strings are kept, string arrays are
/// joined with blank lines and any other value counts as absent.
#[must_use]
pub fn parse_structured(text: &str) -> Option<AnalysisSignal> {
    let body = CODE_FENCE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map_or_else(|| text.trim(), |m| m.as_str());
    serde_json::from_str::<Map<String, Value>>(body)
        .ok()
        .or_else(|| extract_json_block(body).and_then(|slice| serde_json::from_str(slice).ok()))
        .map(|object| signal_from_object(&object))
}

fn signal_from_object(object: &Map<String, Value>) -> AnalysisSignal {
    let field = |key: &str| match object.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("\n\n"))
        }
        _ => None,
    };
    AnalysisSignal {
        domain: field("domain"),
        claim_type: field("claim_type"),
        quick_analysis: field("quick_analysis"),
        summary: field("summary"),
        psychological_analysis: field("psychological_analysis"),
        historical_context: field("historical_context"),
        political_implications: field("political_implications"),
        financial_impact: field("financial_impact"),
        scientific_assessment: field("scientific_assessment"),
        technical_patterns: field("technical_patterns"),
    }
}

fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end >= start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Fields derived from unstructured generative output.
#[must_use]
pub fn extract_from_text(text: &str, hit_count: usize) -> AnalysisSignal {
    let (domain, claim_type) = if RESPONSE_MEDICAL.matches(text) {
        ("Medical/Health", "medical")
    } else if RESPONSE_POLITICAL.matches(text) {
        ("Political", "political")
    } else {
        (GENERIC_DOMAIN, "general")
    };
    let trimmed = text.trim();
    let summary = if trimmed.chars().count() > SUMMARY_CHARS {
        let mut cut: String = trimmed.chars().take(SUMMARY_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        trimmed.to_string()
    };
    AnalysisSignal {
        domain: Some(domain.into()),
        claim_type: Some(claim_type.into()),
        quick_analysis: Some(format!(
            "🧠 The language model reviewed this claim but did not return structured output.\n\n\
             🌍 The claim was cross-referenced with {hit_count} professional fact-checking source(s).\n\n\
             🔬 Treat the summary below as a starting point and verify it against the listed evidence."
        )),
        summary: Some(summary),
        psychological_analysis: Some(
            "Claims like this deserve careful evaluation against several independent sources.".into(),
        ),
        historical_context: Some(
            "Similar claims have benefited from systematic fact-checking and public education.".into(),
        ),
        political_implications: Some(
            "Possible effects on institutional trust need further evaluation.".into(),
        ),
        financial_impact: Some("Economic effects need detailed professional analysis.".into()),
        scientific_assessment: Some(
            "Consensus was assessed from the model's free-text answer only.".into(),
        ),
        technical_patterns: Some(
            "Distribution patterns were not assessed in the free-text answer.".into(),
        ),
    }
}

/// Deterministic analysis built from claim keywords alone.
#[must_use]
pub fn keyword_fallback(claim: &str, hit_count: usize) -> AnalysisSignal {
    let (domain, claim_type) = if FALLBACK_MEDICAL.matches(claim) {
        ("Medical/Health", "medical")
    } else if FALLBACK_POLITICAL.matches(claim) {
        ("Political", "political")
    } else if FALLBACK_SCIENTIFIC.matches(claim) {
        ("Scientific/Technical", "scientific")
    } else {
        (GENERIC_DOMAIN, "general")
    };
    let quick_analysis = if hit_count > 0 {
        format!(
            "🔍 Analysis completed using {hit_count} professional fact-checking source(s).\n\n\
             📋 Established fact-checkers have examined similar claims and published ratings.\n\n\
             ⚖️ These organisations apply published verification standards before rating a claim."
        )
    } else {
        "🔍 No professional fact-check was found for this specific claim.\n\n\
         🔬 The claim was assessed against known patterns using standard verification steps.\n\n\
         📚 Use the checklist below to verify it independently."
            .to_string()
    };
    AnalysisSignal {
        domain: Some(domain.into()),
        claim_type: Some(claim_type.into()),
        quick_analysis: Some(quick_analysis),
        summary: Some(format!(
            "Analysis completed using {hit_count} professional source(s). Generative analysis was unavailable, so keyword analysis was applied."
        )),
        psychological_analysis: Some(
            "Claims of this type often spread through social networks faster than they are checked."
                .into(),
        ),
        historical_context: Some(
            "Similar claims recur across regions and years and are regularly fact-checked.".into(),
        ),
        political_implications: Some(
            "Institutional trust implications could not be assessed without generative analysis."
                .into(),
        ),
        financial_impact: Some(
            "Economic effects could not be assessed without generative analysis.".into(),
        ),
        scientific_assessment: Some(
            "Standard verification steps applied; scientific consensus needs separate confirmation."
                .into(),
        ),
        technical_patterns: Some(
            "Only basic distribution analysis was possible without generative analysis.".into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_response_is_generative() {
        let signal = AnalysisSignal {
            domain: Some("Political".into()),
            ..AnalysisSignal::default()
        };
        let resolved = resolve_analysis(Ok(AnalysisResponse::Structured(signal)), "claim", 0);
        assert_eq!(resolved.source, AnalysisSource::Generative);
        assert_eq!(resolved.reason, None);
        assert_eq!(resolved.signal.domain.as_deref(), Some("Political"));
    }

    #[test]
    fn fenced_json_is_parsed() {
        let raw = "```json\n{\"domain\": \"Medical/Health\", \"claim_type\": \"medical\"}\n```";
        let resolved = resolve_analysis(Ok(AnalysisResponse::RawText(raw.into())), "claim", 1);
        assert_eq!(resolved.source, AnalysisSource::Generative);
        assert_eq!(resolved.signal.claim_type.as_deref(), Some("medical"));
    }

    #[test]
    fn embedded_json_block_is_parsed() {
        let raw = "Here is the analysis: {\"summary\": \"Not supported\"} Hope it helps.";
        let signal = parse_structured(raw).unwrap();
        assert_eq!(signal.summary.as_deref(), Some("Not supported"));
    }

    #[test]
    fn non_string_fields_do_not_discard_the_object() {
        let raw = r#"{"domain":"Medical/Health","claim_type":"medical","summary":"Debunked","quick_analysis":["point one","point two"],"financial_impact":42}"#;
        let resolved = resolve_analysis(Ok(AnalysisResponse::RawText(raw.into())), "claim", 1);
        assert_eq!(resolved.source, AnalysisSource::Generative);
        assert_eq!(resolved.signal.summary.as_deref(), Some("Debunked"));
        assert_eq!(
            resolved.signal.quick_analysis.as_deref(),
            Some("point one\n\npoint two")
        );
        assert_eq!(resolved.signal.financial_impact, None);
        assert_eq!(resolved.signal.domain.as_deref(), Some("Medical/Health"));
    }

    #[test]
    fn json_that_is_not_an_object_is_unparseable() {
        assert!(parse_structured("[1, 2, 3]").is_none());
    }

    #[test]
    fn free_text_falls_back_to_extraction() {
        let raw = format!("The election claim is {}", "unfounded ".repeat(60));
        let resolved = resolve_analysis(Ok(AnalysisResponse::RawText(raw)), "claim", 2);
        assert_eq!(resolved.source, AnalysisSource::TextExtraction);
        assert_eq!(resolved.reason, Some(FallbackReason::Unparseable));
        assert_eq!(resolved.signal.claim_type.as_deref(), Some("political"));
        let summary = resolved.signal.summary.unwrap_or_default();
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn provider_errors_use_keyword_fallback() {
        let unavailable = resolve_analysis(
            Err(ProviderError::NotConfigured("gemini".into())),
            "Covid vaccine claim",
            0,
        );
        assert_eq!(unavailable.source, AnalysisSource::KeywordFallback);
        assert_eq!(unavailable.reason, Some(FallbackReason::ProviderUnavailable));
        assert_eq!(unavailable.signal.domain.as_deref(), Some("Medical/Health"));

        let failed = resolve_analysis(Err(ProviderError::Timeout(8000)), "5G towers", 0);
        assert_eq!(failed.reason, Some(FallbackReason::ProviderFailed));
        assert_eq!(failed.signal.claim_type.as_deref(), Some("scientific"));
    }

    #[test]
    fn keyword_fallback_classifies_claims() {
        assert_eq!(
            keyword_fallback("The minister lied", 0).claim_type.as_deref(),
            Some("political")
        );
        let general = keyword_fallback("The moon is made of cheese", 0);
        assert_eq!(general.domain.as_deref(), Some(GENERIC_DOMAIN));
        assert!(general
            .quick_analysis
            .unwrap_or_default()
            .contains("No professional fact-check"));
        assert!(keyword_fallback("x", 3)
            .quick_analysis
            .unwrap_or_default()
            .contains('3'));
    }

    #[test]
    fn blank_response_goes_straight_to_keywords() {
        let resolved = resolve_analysis(Ok(AnalysisResponse::RawText("  ".into())), "claim", 0);
        assert_eq!(resolved.source, AnalysisSource::KeywordFallback);
        assert_eq!(resolved.reason, Some(FallbackReason::Unparseable));
    }
}
