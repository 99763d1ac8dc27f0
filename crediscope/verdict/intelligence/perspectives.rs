use crate::intelligence::lens::{detail_or, ClaimType, IntelligenceLens, LensContext, LensKind};

const PSYCHOLOGICAL_DEFAULT: &str =
    "Communication patterns look ordinary, with few emotional manipulation markers.";
const SCIENTIFIC_DEFAULT: &str =
    "Claim checked against available evidence using standard scientific methodology.";
const TECHNICAL_DEFAULT: &str =
    "Distribution looks typical for digital platforms, with few coordination markers.";
const HISTORICAL_DEFAULT: &str =
    "Few signs of international coordination; impact appears mostly domestic.";
const POLITICAL_DEFAULT: &str =
    "No specific institutional impact was reported by the analysis.";
const FINANCIAL_DEFAULT: &str = "No specific economic beneficiaries were reported by the analysis.";

/// Effect on political trust and institutions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoliticalLens;

impl IntelligenceLens for PoliticalLens {
    fn kind(&self) -> LensKind {
        LensKind::Political
    }

    fn assess(&self, ctx: &LensContext<'_>) -> String {
        let detail = detail_or(
            ctx.analysis.political_implications.as_deref(),
            POLITICAL_DEFAULT,
        );
        let framing = match ctx.claim_type {
            ClaimType::Medical => {
                "Health claims like this one can erode trust in public health programmes and are often picked up around election cycles."
            }
            ClaimType::Political => {
                "The claim targets confidence in electoral and democratic institutions."
            }
            ClaimType::Other => {
                "The claim could be used to wear down trust in institutions across several sectors."
            }
        };
        format!(
            "{framing} {detail} {} professional fact-check response(s) were found for this claim.",
            ctx.evidence_count
        )
    }
}

/// Economic beneficiaries and market effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinancialLens;

impl IntelligenceLens for FinancialLens {
    fn kind(&self) -> LensKind {
        LensKind::Financial
    }

    fn assess(&self, ctx: &LensContext<'_>) -> String {
        let detail = detail_or(ctx.analysis.financial_impact.as_deref(), FINANCIAL_DEFAULT);
        let framing = match ctx.claim_type {
            ClaimType::Medical => {
                "Sellers of unproven treatments and supplements tend to profit from health fears, while health systems carry the cost of outbreaks and corrections."
            }
            ClaimType::Political => {
                "Manufactured controversy feeds fundraising and diverts public resources into counter-messaging."
            }
            ClaimType::Other => {
                "Sensational content creators and alternative service providers can profit from the uncertainty."
            }
        };
        format!(
            "{framing} {detail} Verification drew on {} professional source(s).",
            ctx.evidence_count
        )
    }
}

/// Manipulation tactics and social dynamics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsychologicalLens;

impl IntelligenceLens for PsychologicalLens {
    fn kind(&self) -> LensKind {
        LensKind::Psychological
    }

    fn assess(&self, ctx: &LensContext<'_>) -> String {
        let detail = detail_or(
            ctx.analysis.psychological_analysis.as_deref(),
            PSYCHOLOGICAL_DEFAULT,
        );
        let pattern = if ctx.toxicity.manipulation_detected {
            "Strong manipulation signals were detected."
        } else {
            "Influence patterns look ordinary."
        };
        format!(
            "Emotional manipulation score is {} (neutral content sits near 0.200). {pattern} {detail}",
            ctx.toxicity_score()
        )
    }
}

/// Evidence quality and consensus.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScientificLens;

impl IntelligenceLens for ScientificLens {
    fn kind(&self) -> LensKind {
        LensKind::Scientific
    }

    fn assess(&self, ctx: &LensContext<'_>) -> String {
        let detail = detail_or(
            ctx.analysis.scientific_assessment.as_deref(),
            SCIENTIFIC_DEFAULT,
        );
        let framing = if ctx.claim_type == ClaimType::Medical {
            "Medical claims are judged against clinical trials, meta-analyses and national surveillance data."
        } else {
            "The claim is weighed against verifiable empirical data and replicated findings."
        };
        format!(
            "{framing} {} professional fact-checking organisation(s) reviewed related claims. {detail}",
            ctx.evidence_count
        )
    }
}

/// Distribution methods and media techniques.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalLens;

impl IntelligenceLens for TechnicalLens {
    fn kind(&self) -> LensKind {
        LensKind::Technical
    }

    fn assess(&self, ctx: &LensContext<'_>) -> String {
        let detail = detail_or(ctx.analysis.technical_patterns.as_deref(), TECHNICAL_DEFAULT);
        format!(
            "Claims of this kind usually spread through messaging-app forwards and engagement-optimised posts. Toxicity score {} measured for the text. {detail} {} professional source(s) were needed to address it.",
            ctx.toxicity_score(),
            ctx.evidence_count
        )
    }
}

/// International context and influence operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeopoliticalLens;

impl IntelligenceLens for GeopoliticalLens {
    fn kind(&self) -> LensKind {
        LensKind::Geopolitical
    }

    fn assess(&self, ctx: &LensContext<'_>) -> String {
        let detail = detail_or(ctx.analysis.historical_context.as_deref(), HISTORICAL_DEFAULT);
        format!(
            "Similar narratives have circulated in several countries. {detail} {} source(s) outside the originating platform have responded.",
            ctx.evidence_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisSignal, ToxicitySignal, ToxicitySource};

    #[test]
    fn analysis_fields_are_interpolated() {
        let analysis = AnalysisSignal {
            claim_type: Some("political".into()),
            political_implications: Some("Targets polling staff.".into()),
            ..AnalysisSignal::default()
        };
        let toxicity = ToxicitySignal::default();
        let ctx = LensContext::new("claim", &analysis, &toxicity, 2);
        let text = PoliticalLens.assess(&ctx);
        assert!(text.contains("Targets polling staff."));
        assert!(text.contains("electoral"));
        assert!(text.contains('2'));
    }

    #[test]
    fn toxicity_uses_three_decimals() {
        let analysis = AnalysisSignal::default();
        let toxicity = ToxicitySignal::from_score(0.8, ToxicitySource::PerspectiveApi);
        let ctx = LensContext::new("claim", &analysis, &toxicity, 0);
        let text = PsychologicalLens.assess(&ctx);
        assert!(text.contains("0.800"));
        assert!(text.contains("Strong manipulation"));
        assert!(TechnicalLens.assess(&ctx).contains("0.800"));
    }

    #[test]
    fn defaults_fill_absent_fields() {
        let analysis = AnalysisSignal::default();
        let toxicity = ToxicitySignal::default();
        let ctx = LensContext::new("", &analysis, &toxicity, 0);
        assert!(GeopoliticalLens.assess(&ctx).contains(HISTORICAL_DEFAULT));
        assert!(ScientificLens.assess(&ctx).contains(SCIENTIFIC_DEFAULT));
        assert!(FinancialLens.assess(&ctx).contains(FINANCIAL_DEFAULT));
    }
}
