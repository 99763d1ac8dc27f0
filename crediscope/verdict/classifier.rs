use serde::{Deserialize, Serialize};

use crate::{
    keywords::{FALSE_LIKE, MIXED_LIKE, TRUE_LIKE},
    model::{FactCheckHit, VerdictLabel},
};

/// Verdict threshold for a predominant rating class.
pub const MAJORITY_RATIO: f64 = 0.6;
/// Minimum share each side needs for a split verdict.
pub const SPLIT_RATIO: f64 = 0.3;

/// Class of a single fact-check rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingClass {
    /// Rating contradicts the claim.
    False,
    /// Rating supports the claim.
    True,
    /// Rating partly supports the claim.
    Mixed,
}

/// Classifies a textual rating; `None` when no keyword table matches.
///
/// Keywords shared by the false-like and mixed-like tables (`misleading`)
/// resolve to [`RatingClass::Mixed`] unless a false-only keyword is present
/// as well, so `"Misleading"` is mixed while `"False and misleading"` is false.
/// A shared keyword outranks true-like ones: `"True but misleading"` is mixed.
#[must_use]
pub fn classify_rating(rating: &str) -> Option<RatingClass> {
    let false_like = FALSE_LIKE.matched(rating);
    if false_like.iter().any(|word| !MIXED_LIKE.contains(word)) {
        Some(RatingClass::False)
    } else if !false_like.is_empty() {
        Some(RatingClass::Mixed)
    } else if TRUE_LIKE.matches(rating) {
        Some(RatingClass::True)
    } else if MIXED_LIKE.matches(rating) {
        Some(RatingClass::Mixed)
    } else {
        None
    }
}

/// Per-class rating counts over a hit list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTally {
    /// False-like ratings.
    pub false_count: usize,
    /// True-like ratings.
    pub true_count: usize,
    /// Mixed-like ratings.
    pub mixed_count: usize,
    /// Ratings that matched no table.
    pub unclassified: usize,
}

impl RatingTally {
    /// Tallies the ratings of every hit.
    #[must_use]
    pub fn from_hits(hits: &[FactCheckHit]) -> Self {
        hits.iter()
            .fold(Self::default(), |mut tally, hit| {
                match classify_rating(&hit.rating_text) {
                    Some(RatingClass::False) => tally.false_count += 1,
                    Some(RatingClass::True) => tally.true_count += 1,
                    Some(RatingClass::Mixed) => tally.mixed_count += 1,
                    None => tally.unclassified += 1,
                }
                tally
            })
    }

    /// Number of classified ratings.
    #[must_use]
    pub const fn classified(&self) -> usize {
        self.false_count + self.true_count + self.mixed_count
    }

    /// Number of distinct classes among classified ratings.
    #[must_use]
    pub fn distinct_classes(&self) -> usize {
        [self.false_count, self.true_count, self.mixed_count]
            .into_iter()
            .filter(|count| *count > 0)
            .count()
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio(&self, count: usize) -> f64 {
        count as f64 / self.classified() as f64
    }
}

/// Maps the rating consensus of `hits` to a verdict label.
#[must_use]
pub fn classify(hits: &[FactCheckHit]) -> VerdictLabel {
    if hits.is_empty() {
        return VerdictLabel::RequiresVerification;
    }
    let tally = RatingTally::from_hits(hits);
    if tally.classified() == 0 {
        return VerdictLabel::InsufficientEvidence;
    }
    let false_ratio = tally.ratio(tally.false_count);
    let true_ratio = tally.ratio(tally.true_count);
    if false_ratio >= MAJORITY_RATIO {
        VerdictLabel::False
    } else if true_ratio >= MAJORITY_RATIO {
        VerdictLabel::True
    } else if tally.mixed_count > 0 || (false_ratio > SPLIT_RATIO && true_ratio > SPLIT_RATIO) {
        VerdictLabel::Mixed
    } else {
        VerdictLabel::RequiresVerification
    }
}
