use serde::{Deserialize, Serialize};

use crate::{
    classifier::RatingTally,
    model::{AnalysisSignal, FactCheckHit, GENERIC_DOMAIN},
};

/// Starting confidence before any signal is considered.
pub const BASE_CONFIDENCE: f64 = 45.0;
/// Boost per fact-check hit.
pub const PER_HIT_BOOST: f64 = 12.0;
/// Ceiling on the volume boost.
pub const MAX_VOLUME_BOOST: f64 = 35.0;
/// Boost when classified ratings strongly agree.
pub const STRONG_CONSENSUS_BOOST: f64 = 25.0;
/// Boost when classified ratings moderately agree.
pub const MODERATE_CONSENSUS_BOOST: f64 = 15.0;
/// Boost when the analysis names a specific domain.
pub const DOMAIN_BOOST: f64 = 8.0;
/// Penalty when no evidence was found.
pub const NO_EVIDENCE_PENALTY: f64 = 10.0;
/// Lowest confidence emitted.
pub const MIN_CONFIDENCE: f64 = 20.0;
/// Highest confidence emitted.
pub const MAX_CONFIDENCE: f64 = 92.0;

/// Additive components of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Base value.
    pub base: f64,
    /// Evidence volume boost.
    pub volume: f64,
    /// Rating consensus boost.
    pub consensus: f64,
    /// Analysis domain boost.
    pub domain: f64,
    /// Missing evidence penalty (non-positive).
    pub penalty: f64,
    /// Clamped total.
    pub total: f64,
}

impl ConfidenceBreakdown {
    /// Computes every component for the given signals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(hits: &[FactCheckHit], analysis: &AnalysisSignal) -> Self {
        let hit_count = hits.len();
        let volume = (PER_HIT_BOOST * hit_count as f64).min(MAX_VOLUME_BOOST);
        let consensus = consensus_boost(&RatingTally::from_hits(hits));
        let domain = match analysis.domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() && domain != GENERIC_DOMAIN => DOMAIN_BOOST,
            _ => 0.0,
        };
        let penalty = if hit_count == 0 {
            -NO_EVIDENCE_PENALTY
        } else {
            0.0
        };
        let raw = BASE_CONFIDENCE + volume + consensus + domain + penalty;
        Self {
            base: BASE_CONFIDENCE,
            volume,
            consensus,
            domain,
            penalty,
            total: raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
        }
    }
}

/// Confidence in `[20, 92]` from evidence volume, consensus and analysis quality.
#[must_use]
pub fn estimate(hits: &[FactCheckHit], analysis: &AnalysisSignal) -> f64 {
    ConfidenceBreakdown::compute(hits, analysis).total
}

/// Consensus ratio is distinct classes over classified ratings; lower is tighter.
#[allow(clippy::cast_precision_loss)]
fn consensus_boost(tally: &RatingTally) -> f64 {
    if tally.classified() < 2 {
        return 0.0;
    }
    let ratio = tally.distinct_classes() as f64 / tally.classified() as f64;
    if ratio <= 0.3 {
        STRONG_CONSENSUS_BOOST
    } else if ratio <= 0.5 {
        MODERATE_CONSENSUS_BOOST
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(count: usize, rating: &str) -> Vec<FactCheckHit> {
        (0..count)
            .map(|idx| FactCheckHit::new(format!("outlet {idx}"), rating, "title"))
            .collect()
    }

    fn specific_domain() -> AnalysisSignal {
        AnalysisSignal {
            domain: Some("Medical/Health".into()),
            ..AnalysisSignal::default()
        }
    }

    #[test]
    fn no_hits_and_empty_analysis_is_penalized() {
        assert!((estimate(&[], &AnalysisSignal::default()) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn no_hits_stays_within_bounds() {
        let with_domain = estimate(&[], &specific_domain());
        assert!((with_domain - 43.0).abs() < 1e-9);
        assert!(with_domain >= MIN_CONFIDENCE);
    }

    #[test]
    fn generic_domain_gets_no_boost() {
        let analysis = AnalysisSignal {
            domain: Some(GENERIC_DOMAIN.into()),
            ..AnalysisSignal::default()
        };
        assert!((estimate(&[], &analysis) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn single_hit_has_no_consensus_component() {
        let breakdown = ConfidenceBreakdown::compute(&rated(1, "False"), &AnalysisSignal::default());
        assert!((breakdown.volume - 12.0).abs() < 1e-9);
        assert!(breakdown.consensus.abs() < 1e-9);
        assert!((breakdown.total - 57.0).abs() < 1e-9);
    }

    #[test]
    fn consensus_tiers() {
        // 1 class over 4 ratings
        let strong = ConfidenceBreakdown::compute(&rated(4, "False"), &AnalysisSignal::default());
        assert!((strong.consensus - STRONG_CONSENSUS_BOOST).abs() < 1e-9);
        // 1 class over 2 ratings
        let moderate = ConfidenceBreakdown::compute(&rated(2, "True"), &AnalysisSignal::default());
        assert!((moderate.consensus - MODERATE_CONSENSUS_BOOST).abs() < 1e-9);
        // 2 classes over 2 ratings
        let mut split = rated(1, "True");
        split.extend(rated(1, "False"));
        let none = ConfidenceBreakdown::compute(&split, &AnalysisSignal::default());
        assert!(none.consensus.abs() < 1e-9);
    }

    #[test]
    fn unclassified_ratings_do_not_count_towards_consensus() {
        let mut hits = rated(1, "False");
        hits.extend(rated(3, "Unproven"));
        let breakdown = ConfidenceBreakdown::compute(&hits, &AnalysisSignal::default());
        assert!(breakdown.consensus.abs() < 1e-9);
    }

    #[test]
    fn clamped_to_upper_bound() {
        let value = estimate(&rated(5, "False"), &specific_domain());
        assert!((value - MAX_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn monotone_in_hit_count_for_fixed_ratings() {
        for rating in ["False", "True", "Partly", "Unproven"] {
            let mut previous = f64::MIN;
            for count in 0..=3 {
                let value = estimate(&rated(count, rating), &AnalysisSignal::default());
                assert!(value >= previous, "{rating}: {value} < {previous}");
                previous = value;
            }
        }
    }

    #[test]
    fn always_within_clamp() {
        let ratings = ["False", "True", "Mixed", "Unproven"];
        for count in 0..8 {
            for rating in ratings {
                for analysis in [AnalysisSignal::default(), specific_domain()] {
                    let value = estimate(&rated(count, rating), &analysis);
                    assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&value));
                }
            }
        }
    }
}
