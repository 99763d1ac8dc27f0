use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    keywords::{ACADEMIC_MARKERS, BROAD_REACH_PUBLISHERS, PRIORITY_PUBLISHERS},
    model::{non_blank, EvidenceItem, FactCheckHit},
};

/// Maximum number of evidence items in a package.
pub const MAX_EVIDENCE: usize = 5;
/// Review titles longer than this are truncated.
pub const MAX_TITLE_CHARS: usize = 120;

const DEFAULT_PUBLISHER: &str = "Professional Fact Checker";
const DEFAULT_RATING: &str = "Verified";
const DEFAULT_TITLE: &str = "Professional fact-check analysis.";

/// Reliability score outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{name} {score} outside [0, 1]")]
pub struct ReliabilityError {
    /// Offending table field.
    pub name: &'static str,
    /// Rejected value.
    pub score: f64,
}

/// Publisher reliability table. Names are matched case-insensitively by substring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityTable {
    /// Curated high-trust fact-checkers.
    pub priority: Vec<String>,
    /// Score for `priority` publishers.
    pub priority_score: f64,
    /// Broad-reach outlets.
    pub broad_reach: Vec<String>,
    /// Score for `broad_reach` publishers.
    pub broad_reach_score: f64,
    /// Name fragments of academic publishers.
    pub academic: Vec<String>,
    /// Score for `academic` publishers.
    pub academic_score: f64,
    /// Score for everyone else.
    pub default_score: f64,
}

impl Default for ReliabilityTable {
    fn default() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| (*s).to_string()).collect()
        }
        Self {
            priority: owned(PRIORITY_PUBLISHERS),
            priority_score: 0.95,
            broad_reach: owned(BROAD_REACH_PUBLISHERS),
            broad_reach_score: 0.90,
            academic: owned(ACADEMIC_MARKERS),
            academic_score: 0.92,
            default_score: 0.80,
        }
    }
}

impl ReliabilityTable {
    /// Reliability for a publisher name; first matching tier wins.
    #[must_use]
    pub fn score(&self, publisher: &str) -> f64 {
        let name = publisher.to_lowercase();
        let hit = |list: &[String]| list.iter().any(|entry| name.contains(&entry.to_lowercase()));
        let score = if hit(self.priority.as_slice()) {
            self.priority_score
        } else if hit(self.broad_reach.as_slice()) {
            self.broad_reach_score
        } else if hit(self.academic.as_slice()) {
            self.academic_score
        } else {
            self.default_score
        };
        score.clamp(0.0, 1.0)
    }

    /// Checks that every score lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ReliabilityError> {
        let scores = [
            ("priority_score", self.priority_score),
            ("broad_reach_score", self.broad_reach_score),
            ("academic_score", self.academic_score),
            ("default_score", self.default_score),
        ];
        for (name, score) in scores {
            if !(0.0..=1.0).contains(&score) {
                return Err(ReliabilityError { name, score });
            }
        }
        Ok(())
    }
}

/// Normalizes hits with the built-in reliability table.
#[must_use]
pub fn normalize(hits: &[FactCheckHit], category: &str) -> Vec<EvidenceItem> {
    normalize_with(hits, category, &ReliabilityTable::default())
}

/// Turns raw hits into at most [`MAX_EVIDENCE`] de-duplicated, scored items.
///
/// The result is never empty: when no hit is accepted a category institution
/// (or a generic placeholder) is appended.
#[must_use]
pub fn normalize_with(
    hits: &[FactCheckHit],
    category: &str,
    table: &ReliabilityTable,
) -> Vec<EvidenceItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(MAX_EVIDENCE);
    for hit in hits {
        if items.len() >= MAX_EVIDENCE {
            break;
        }
        let publisher = non_blank(&hit.publisher, DEFAULT_PUBLISHER);
        if !seen.insert(publisher.to_lowercase()) {
            continue;
        }
        let rating = non_blank(&hit.rating_text, DEFAULT_RATING);
        let title = truncate_title(non_blank(&hit.review_title, DEFAULT_TITLE));
        items.push(EvidenceItem {
            source: publisher.to_string(),
            url: hit
                .review_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .unwrap_or("#")
                .to_string(),
            snippet: format!("Rating: {rating}. {title}"),
            reliability: table.score(publisher),
        });
    }
    if items.is_empty() {
        items.push(institutional_fallback(category).unwrap_or_else(placeholder));
    }
    items
}

/// Authority consulted when no fact-check covers a claim of this category.
#[must_use]
pub fn institutional_fallback(category: &str) -> Option<EvidenceItem> {
    let category = category.trim();
    if category.eq_ignore_ascii_case("medical") {
        Some(EvidenceItem {
            source: "World Health Organization".into(),
            url: "https://www.who.int/".into(),
            snippet: "Official WHO guidelines and fact sheets provide authoritative medical information.".into(),
            reliability: 0.98,
        })
    } else if category.eq_ignore_ascii_case("political") {
        Some(EvidenceItem {
            source: "Election Commission of India".into(),
            url: "https://eci.gov.in/".into(),
            snippet: "Official election procedures and transparency measures documented by ECI.".into(),
            reliability: 0.96,
        })
    } else {
        None
    }
}

fn placeholder() -> EvidenceItem {
    EvidenceItem {
        source: "Analysis System".into(),
        url: "#".into(),
        snippet: "Automated analysis completed. No professional fact-check matched this claim.".into(),
        reliability: 0.65,
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let mut cut: String = title.chars().take(MAX_TITLE_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reliability_follows_priority_table() {
        let table = ReliabilityTable::default();
        assert!((table.score("Reuters Fact Check") - 0.95).abs() < 1e-9);
        assert!((table.score("BBC News") - 0.90).abs() < 1e-9);
        assert!((table.score("Harvard University") - 0.92).abs() < 1e-9);
        assert!((table.score("Local Blog") - 0.80).abs() < 1e-9);
    }

    #[test]
    fn duplicate_publishers_are_skipped_case_insensitively() {
        let hits = vec![
            FactCheckHit::new("Snopes", "False", "first"),
            FactCheckHit::new("SNOPES", "False", "second"),
            FactCheckHit::new("PolitiFact", "True", "third"),
        ];
        let items = normalize(&hits, "general");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "Snopes");
        assert!(items[0].snippet.ends_with("first"));
    }

    #[test]
    fn caps_at_five_items() {
        let hits: Vec<_> = (0..9)
            .map(|idx| FactCheckHit::new(format!("Outlet {idx}"), "False", "title"))
            .collect();
        let items = normalize(&hits, "medical");
        assert_eq!(items.len(), MAX_EVIDENCE);
        assert!(items.iter().all(|item| item.source.starts_with("Outlet")));
    }

    #[test]
    fn long_titles_are_truncated() {
        let title = "x".repeat(150);
        let items = normalize(&[FactCheckHit::new("AFP Fact Check", "False", title)], "");
        let expected = format!("Rating: False. {}...", "x".repeat(MAX_TITLE_CHARS));
        assert_eq!(items[0].snippet, expected);
        assert_eq!(items[0].url, "#");
    }

    #[test]
    fn blank_fields_use_defaults() {
        let hit = FactCheckHit::new(" ", "", "").with_url("https://example.org/review");
        let items = normalize(&[hit], "general");
        assert_eq!(items[0].source, DEFAULT_PUBLISHER);
        assert_eq!(
            items[0].snippet,
            format!("Rating: {DEFAULT_RATING}. {DEFAULT_TITLE}")
        );
        assert_eq!(items[0].url, "https://example.org/review");
    }

    #[test]
    fn empty_hits_get_category_fallback() {
        let medical = normalize(&[], "Medical");
        assert_eq!(medical.len(), 1);
        assert_eq!(medical[0].source, "World Health Organization");
        let political = normalize(&[], "political");
        assert_eq!(political[0].source, "Election Commission of India");
        let general = normalize(&[], "general");
        assert_eq!(general[0].source, "Analysis System");
        assert!((general[0].reliability - 0.65).abs() < 1e-9);
    }

    #[test]
    fn fallback_is_not_added_when_hits_exist() {
        let items = normalize(&[FactCheckHit::new("Reuters", "False", "t")], "medical");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "Reuters");
    }

    #[test]
    fn validate_rejects_out_of_range_scores() {
        let table = ReliabilityTable {
            default_score: 1.5,
            ..ReliabilityTable::default()
        };
        assert_eq!(
            table.validate(),
            Err(ReliabilityError {
                name: "default_score",
                score: 1.5
            })
        );
        assert!(ReliabilityTable::default().validate().is_ok());
    }
}
