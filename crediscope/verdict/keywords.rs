//! Keyword tables are plain data so they can be versioned and tested apart
//! from the scoring logic. Matching is case-insensitive substring membership.

/// Named list of lowercase keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordSet {
    /// Table name used in logs and tests.
    pub name: &'static str,
    /// Lowercase keywords.
    pub words: &'static [&'static str],
}

impl KeywordSet {
    /// Whether any keyword occurs in `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.words.iter().any(|word| lower.contains(word))
    }

    /// Keywords occurring in `text`, in table order.
    #[must_use]
    pub fn matched(&self, text: &str) -> Vec<&'static str> {
        let lower = text.to_lowercase();
        self.words
            .iter()
            .copied()
            .filter(|word| lower.contains(word))
            .collect()
    }

    /// Whether `word` is part of this table.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }
}

/// Ratings that count against the claim.
pub const FALSE_LIKE: KeywordSet = KeywordSet {
    name: "false_like",
    words: &["false", "incorrect", "misleading", "fake", "wrong"],
};

/// Ratings that support the claim.
pub const TRUE_LIKE: KeywordSet = KeywordSet {
    name: "true_like",
    words: &["true", "correct", "accurate", "verified"],
};

/// Ratings that partly support the claim. Shares `misleading` with [`FALSE_LIKE`].
pub const MIXED_LIKE: KeywordSet = KeywordSet {
    name: "mixed_like",
    words: &["mixed", "partly", "partially", "misleading"],
};

/// Claim text markers for the medical checklist.
pub const MEDICAL_CLAIM: KeywordSet = KeywordSet {
    name: "medical_claim",
    words: &["vaccine", "health", "covid", "medicine", "cure", "treatment"],
};

/// Claim text markers for the political checklist.
pub const POLITICAL_CLAIM: KeywordSet = KeywordSet {
    name: "political_claim",
    words: &["election", "vote", "government", "politician", "democracy"],
};

/// Claim text markers for the technology checklist.
pub const TECHNICAL_CLAIM: KeywordSet = KeywordSet {
    name: "technical_claim",
    words: &["technology", "5g", "ai", "internet", "phone", "tracking"],
};

/// Claim text markers used by the keyword fallback analysis.
pub const FALLBACK_MEDICAL: KeywordSet = KeywordSet {
    name: "fallback_medical",
    words: &[
        "vaccine", "medical", "health", "covid", "disease", "medicine", "doctor",
    ],
};

/// Claim text markers used by the keyword fallback analysis.
pub const FALLBACK_POLITICAL: KeywordSet = KeywordSet {
    name: "fallback_political",
    words: &[
        "election",
        "vote",
        "political",
        "government",
        "minister",
        "party",
    ],
};

/// Claim text markers used by the keyword fallback analysis.
pub const FALLBACK_SCIENTIFIC: KeywordSet = KeywordSet {
    name: "fallback_scientific",
    words: &["climate", "science", "research", "study", "technology", "5g"],
};

/// Markers looked for in unstructured generative output.
pub const RESPONSE_MEDICAL: KeywordSet = KeywordSet {
    name: "response_medical",
    words: &["medical", "health", "vaccine"],
};

/// Markers looked for in unstructured generative output.
pub const RESPONSE_POLITICAL: KeywordSet = KeywordSet {
    name: "response_political",
    words: &["political", "election", "government"],
};

/// Curated high-trust fact-checking outlets.
pub const PRIORITY_PUBLISHERS: &[&str] = &[
    "reuters",
    "ap news",
    "snopes",
    "factcheck.org",
    "politifact",
    "afp fact check",
    "the hindu",
    "indian express",
];

/// Broad-reach outlets.
pub const BROAD_REACH_PUBLISHERS: &[&str] = &["bbc", "cnn"];

/// Name fragments marking academic publishers.
pub const ACADEMIC_MARKERS: &[&str] = &["university", "journal", "research"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        assert!(FALSE_LIKE.matches("FALSE"));
        assert!(TRUE_LIKE.matches("Mostly Accurate"));
        assert!(!MIXED_LIKE.matches("Pants on fire"));
    }

    #[test]
    fn matched_reports_every_hit_in_table_order() {
        assert_eq!(
            FALSE_LIKE.matched("Misleading and false"),
            vec!["false", "misleading"]
        );
    }

    #[test]
    fn misleading_is_shared_between_false_and_mixed() {
        let shared: Vec<_> = FALSE_LIKE
            .words
            .iter()
            .filter(|w| MIXED_LIKE.contains(w))
            .collect();
        assert_eq!(shared, vec![&"misleading"]);
    }

    #[test]
    fn tables_are_lowercase() {
        for set in [
            FALSE_LIKE,
            TRUE_LIKE,
            MIXED_LIKE,
            MEDICAL_CLAIM,
            POLITICAL_CLAIM,
            TECHNICAL_CLAIM,
            FALLBACK_MEDICAL,
            FALLBACK_POLITICAL,
            FALLBACK_SCIENTIFIC,
        ] {
            for word in set.words {
                assert_eq!(*word, word.to_lowercase(), "{} has mixed case", set.name);
            }
        }
    }
}
