use serde::{Deserialize, Serialize};

use crate::{
    keywords::{MEDICAL_CLAIM, POLITICAL_CLAIM, TECHNICAL_CLAIM},
    model::ChecklistItem,
};

/// Number of items in every category checklist.
pub const CHECKLIST_LEN: usize = 4;

type Catalogue = [(&'static str, &'static str); CHECKLIST_LEN];

const MEDICAL: Catalogue = [
    (
        "Check official ingredient lists and medical data",
        "Visit WHO, CDC, and Indian Health Ministry websites for published ingredient lists and clinical trial data.",
    ),
    (
        "Look for peer-reviewed scientific studies",
        "Medical claims should be supported by studies published in reputable journals like The Lancet, NEJM, or ICMR publications.",
    ),
    (
        "Verify with multiple independent health authorities",
        "Cross-check information with WHO, Indian Medical Association, and state health departments.",
    ),
    (
        "Assess scientific plausibility and mechanism",
        "Ask whether the claimed mechanism is biologically possible and consistent with established medical science.",
    ),
];

const POLITICAL: Catalogue = [
    (
        "Verify through Election Commission of India",
        "Check official ECI websites, press releases, and public databases for election-related information.",
    ),
    (
        "Cross-reference with multiple news organizations",
        "Look for coverage in established newspapers like The Hindu, Indian Express, and regional publications.",
    ),
    (
        "Check for official government statements",
        "Verify through official government portals, PIB releases, and ministry websites.",
    ),
    (
        "Analyze source motivation and political bias",
        "Consider who benefits from this claim and check the track record of sources for accuracy.",
    ),
];

const TECHNICAL: Catalogue = [
    (
        "Understand the technical requirements and limitations",
        "Research what the technology actually requires (power, size, connectivity) to function as claimed.",
    ),
    (
        "Check with technical experts and institutions",
        "Consult IITs, technical universities, and certified technology professionals for expert opinions.",
    ),
    (
        "Look for independent technical testing",
        "Search for laboratory tests, technical audits, or engineering analyses of the claimed technology.",
    ),
    (
        "Compare with existing technology capabilities",
        "Assess whether the claim is consistent with current technological capabilities and industry standards.",
    ),
];

const GENERAL: Catalogue = [
    (
        "Verify through multiple credible, independent sources",
        "Check at least 3-4 authoritative sources that don't rely on each other for information.",
    ),
    (
        "Evaluate source credibility and track record",
        "Research the reputation, expertise, and historical accuracy of information sources.",
    ),
    (
        "Look for primary evidence and documentation",
        "Seek original documents, official statements, or firsthand evidence rather than secondary reports.",
    ),
    (
        "Consider context and potential motivations",
        "Ask who benefits from this claim and whether there are economic, political, or social motivations.",
    ),
];

/// Checklist bucket, resolved in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistBucket {
    /// Health and medicine.
    Medical,
    /// Elections and government.
    Political,
    /// Technology.
    Technical,
    /// Everything else.
    General,
}

impl ChecklistBucket {
    /// First bucket whose claim type or keywords match.
    #[must_use]
    pub fn resolve(claim_text: &str, claim_type: &str) -> Self {
        let claim_type = claim_type.to_lowercase();
        if claim_type.contains("medical") || MEDICAL_CLAIM.matches(claim_text) {
            Self::Medical
        } else if claim_type.contains("political") || POLITICAL_CLAIM.matches(claim_text) {
            Self::Political
        } else if TECHNICAL_CLAIM.matches(claim_text) {
            Self::Technical
        } else {
            Self::General
        }
    }

    const fn catalogue(self) -> &'static Catalogue {
        match self {
            Self::Medical => &MEDICAL,
            Self::Political => &POLITICAL,
            Self::Technical => &TECHNICAL,
            Self::General => &GENERAL,
        }
    }

    /// The bucket's fixed items.
    #[must_use]
    pub fn items(self) -> [ChecklistItem; CHECKLIST_LEN] {
        self.catalogue()
            .map(|(point, explanation)| ChecklistItem::new(point, explanation))
    }
}

/// Selects the four-item checklist for a claim. No claim text is interpolated.
#[must_use]
pub fn select(claim_text: &str, claim_type: &str) -> [ChecklistItem; CHECKLIST_LEN] {
    ChecklistBucket::resolve(claim_text, claim_type).items()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_type_wins_over_keywords() {
        assert_eq!(
            ChecklistBucket::resolve("The election was rigged", "Medical"),
            ChecklistBucket::Medical
        );
    }

    #[test]
    fn keywords_pick_bucket_in_order() {
        assert_eq!(
            ChecklistBucket::resolve("Vaccines contain trackers", "general"),
            ChecklistBucket::Medical
        );
        assert_eq!(
            ChecklistBucket::resolve("Votes were changed", "general"),
            ChecklistBucket::Political
        );
        assert_eq!(
            ChecklistBucket::resolve("5G towers spread signals", "general"),
            ChecklistBucket::Technical
        );
        assert_eq!(
            ChecklistBucket::resolve("The moon is cheese", "general"),
            ChecklistBucket::General
        );
    }

    #[test]
    fn always_four_items_and_deterministic() {
        for (text, kind) in [
            ("covid cure", "general"),
            ("vote", ""),
            ("internet", "scientific"),
            ("", ""),
        ] {
            let first = select(text, kind);
            let second = select(text, kind);
            assert_eq!(first.len(), CHECKLIST_LEN);
            assert_eq!(first, second);
            assert!(first.iter().all(|item| !item.completed));
        }
    }

    #[test]
    fn medical_bucket_content() {
        let items = select("", "medical");
        assert_eq!(items[0].point, MEDICAL[0].0);
        assert_eq!(items[3].explanation, MEDICAL[3].1);
    }
}
