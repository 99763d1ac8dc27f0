use std::sync::Arc;

/// Lens trait and shared context.
pub mod lens;
/// The six built-in perspectives.
pub mod perspectives;

use crate::model::{AnalysisSignal, FactCheckHit, IntelligenceReport, ToxicitySignal};
use lens::{IntelligenceLens, LensContext, LensKind};
use perspectives::{
    FinancialLens, GeopoliticalLens, PoliticalLens, PsychologicalLens, ScientificLens,
    TechnicalLens,
};

/// Runs every registered lens over a claim and assembles the report.
#[derive(Clone)]
pub struct IntelligenceSynthesizer {
    lenses: Vec<Arc<dyn IntelligenceLens>>,
}

impl std::fmt::Debug for IntelligenceSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.lenses.iter().map(|lens| lens.kind().label()).collect();
        f.debug_struct("IntelligenceSynthesizer")
            .field("lenses", &kinds)
            .finish()
    }
}

impl Default for IntelligenceSynthesizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl IntelligenceSynthesizer {
    /// Builds a synthesizer with the six built-in lenses.
    #[must_use]
    pub fn with_defaults() -> Self {
        let lenses: Vec<Arc<dyn IntelligenceLens>> = vec![
            Arc::new(PoliticalLens),
            Arc::new(FinancialLens),
            Arc::new(PsychologicalLens),
            Arc::new(ScientificLens),
            Arc::new(TechnicalLens),
            Arc::new(GeopoliticalLens),
        ];
        Self::new(lenses)
    }

    /// Builds a synthesizer from custom lenses. A later lens of the same kind
    /// replaces an earlier one.
    #[must_use]
    pub const fn new(lenses: Vec<Arc<dyn IntelligenceLens>>) -> Self {
        Self { lenses }
    }

    /// Produces the report for one claim.
    #[must_use]
    pub fn synthesize(
        &self,
        claim: &str,
        analysis: &AnalysisSignal,
        toxicity: &ToxicitySignal,
        hits: &[FactCheckHit],
    ) -> IntelligenceReport {
        let ctx = LensContext::new(claim, analysis, toxicity, hits.len());
        let mut report = IntelligenceReport::default();
        for lens in &self.lenses {
            let narrative = Some(lens.assess(&ctx));
            match lens.kind() {
                LensKind::Political => report.political = narrative,
                LensKind::Financial => report.financial = narrative,
                LensKind::Psychological => report.psychological = narrative,
                LensKind::Scientific => report.scientific = narrative,
                LensKind::Technical => report.technical = narrative,
                LensKind::Geopolitical => report.geopolitical = narrative,
            }
        }
        report
    }
}

/// Synthesizes the six-lens report with the built-in lenses.
#[must_use]
pub fn synthesize(
    claim: &str,
    analysis: &AnalysisSignal,
    toxicity: &ToxicitySignal,
    hits: &[FactCheckHit],
) -> IntelligenceReport {
    IntelligenceSynthesizer::with_defaults().synthesize(claim, analysis, toxicity, hits)
}
