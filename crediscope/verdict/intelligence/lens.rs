use serde::{Deserialize, Serialize};

use crate::model::{AnalysisSignal, ToxicitySignal};

/// Perspective a lens reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensKind {
    /// Institutional trust.
    Political,
    /// Economic beneficiaries and costs.
    Financial,
    /// Manipulation and social dynamics.
    Psychological,
    /// Evidence quality and consensus.
    Scientific,
    /// Distribution and media techniques.
    Technical,
    /// International context.
    Geopolitical,
}

impl LensKind {
    /// Every lens, in report order.
    pub const ALL: [Self; 6] = [
        Self::Political,
        Self::Financial,
        Self::Psychological,
        Self::Scientific,
        Self::Technical,
        Self::Geopolitical,
    ];

    /// Lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Political => "political",
            Self::Financial => "financial",
            Self::Psychological => "psychological",
            Self::Scientific => "scientific",
            Self::Technical => "technical",
            Self::Geopolitical => "geopolitical",
        }
    }
}

/// Coarse claim type the lenses branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    /// Health and medicine.
    Medical,
    /// Elections and government.
    Political,
    /// Anything else.
    Other,
}

impl ClaimType {
    /// Exact, case-insensitive match on the analysis claim type.
    #[must_use]
    pub fn from_analysis(analysis: &AnalysisSignal) -> Self {
        match analysis.claim_type_or_default().trim() {
            "medical" => Self::Medical,
            "political" => Self::Political,
            _ => Self::Other,
        }
    }
}

/// Inputs shared by every lens for one claim.
#[derive(Debug, Clone, Copy)]
pub struct LensContext<'a> {
    /// Claim text.
    pub claim: &'a str,
    /// Claim type derived from the analysis.
    pub claim_type: ClaimType,
    /// Resolved analysis signal.
    pub analysis: &'a AnalysisSignal,
    /// Toxicity signal.
    pub toxicity: &'a ToxicitySignal,
    /// Number of fact-check hits.
    pub evidence_count: usize,
}

impl<'a> LensContext<'a> {
    /// Builds the context.
    #[must_use]
    pub fn new(
        claim: &'a str,
        analysis: &'a AnalysisSignal,
        toxicity: &'a ToxicitySignal,
        evidence_count: usize,
    ) -> Self {
        Self {
            claim,
            claim_type: ClaimType::from_analysis(analysis),
            analysis,
            toxicity,
            evidence_count,
        }
    }

    /// Toxicity score with three decimals.
    #[must_use]
    pub fn toxicity_score(&self) -> String {
        format!("{:.3}", self.toxicity.score)
    }
}

/// A single analytical perspective. Lenses are pure and cannot fail.
pub trait IntelligenceLens: Send + Sync {
    /// Perspective reported on.
    fn kind(&self) -> LensKind;

    /// Narrative for the claim; never empty.
    fn assess(&self, ctx: &LensContext<'_>) -> String;
}

/// Analysis field text, or `default` when the field is absent or blank.
#[must_use]
pub fn detail_or<'a>(field: Option<&'a str>, default: &'a str) -> &'a str {
    field
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_type_matches_exactly() {
        let medical = AnalysisSignal {
            claim_type: Some("Medical".into()),
            ..AnalysisSignal::default()
        };
        assert_eq!(ClaimType::from_analysis(&medical), ClaimType::Medical);
        let scientific = AnalysisSignal {
            claim_type: Some("medical-adjacent".into()),
            ..AnalysisSignal::default()
        };
        assert_eq!(ClaimType::from_analysis(&scientific), ClaimType::Other);
        assert_eq!(
            ClaimType::from_analysis(&AnalysisSignal::default()),
            ClaimType::Other
        );
    }

    #[test]
    fn detail_falls_back_on_blank() {
        assert_eq!(detail_or(Some("  "), "default"), "default");
        assert_eq!(detail_or(None, "default"), "default");
        assert_eq!(detail_or(Some(" set "), "default"), "set");
    }
}
