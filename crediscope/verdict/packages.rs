//! Packages produced without the scoring stages: URL reputation, images
//! without readable text, and the service-unavailable error path.

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::model::{ChecklistItem, EvidenceItem, IntelligenceReport, VerdictLabel, VerdictPackage};

/// Confidence reported for URL packages.
pub const URL_CONFIDENCE: f64 = 70.0;
/// Confidence reported for images without readable text.
pub const IMAGE_CONFIDENCE: f64 = 65.0;

const URL_CHECKLIST: [(&str, &str); 4] = [
    (
        "Verify the website's reputation and credibility",
        "Research whether this domain is known for reliable information or has a history of misinformation.",
    ),
    (
        "Read the full content and check sources",
        "Review the article itself for evidence, cited sources and editorial standards.",
    ),
    (
        "Cross-reference claims with other sources",
        "Verify specific claims made on this page using independent, authoritative sources.",
    ),
    (
        "Check the publication date and author",
        "Old or anonymous articles are often recirculated out of context.",
    ),
];

const IMAGE_CHECKLIST: [(&str, &str); 4] = [
    (
        "Perform reverse image search",
        "Use Google Images, TinEye or similar tools to find the original source and context.",
    ),
    (
        "Check image metadata and properties",
        "Examine EXIF data, creation dates and technical properties for authenticity indicators.",
    ),
    (
        "Verify any claims made about the image",
        "If the image comes with claims about when, where or what it shows, fact-check those separately.",
    ),
    (
        "Look for signs of editing",
        "Inconsistent lighting, shadows, edges or text rendering can reveal manipulation.",
    ),
];

const ERROR_CHECKLIST: [(&str, &str); 3] = [
    (
        "Retry your analysis in a few minutes",
        "Temporary service issues usually resolve on their own within minutes.",
    ),
    (
        "Check your internet connection",
        "A stable connection is needed to reach the verification services.",
    ),
    (
        "Contact support if problems persist",
        "The technical team monitors service health and can help if issues continue.",
    ),
];

fn items<const N: usize>(catalogue: [(&str, &str); N]) -> Vec<ChecklistItem> {
    catalogue
        .into_iter()
        .map(|(point, explanation)| ChecklistItem::new(point, explanation))
        .collect()
}

fn audit(entries: impl IntoIterator<Item = (&'static str, Value)>) -> IndexMap<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Reputation package for a validated URL.
#[must_use]
pub fn url_package(id: &str, url: &str) -> VerdictPackage {
    VerdictPackage {
        id: format!("url_analysis_{id}"),
        input: url.to_string(),
        label: VerdictLabel::RequiresVerification,
        confidence: URL_CONFIDENCE,
        summary: "URL structure and domain analysed. Review the page content manually for a complete assessment.".into(),
        evidence: vec![EvidenceItem {
            source: "URL Security Analysis".into(),
            url: url.to_string(),
            snippet: "Domain reputation and URL structure analysed for basic safety indicators.".into(),
            reliability: 0.7,
        }],
        checklist: items(URL_CHECKLIST),
        intelligence: IntelligenceReport::technical_only(
            "URL checked against domain reputation and structural safety heuristics.",
        ),
        quick_analysis: "🔗 The URL structure and domain were checked for suspicious patterns.\n\n\
                         🛡️ Only basic safety checks were applied; the page content itself was not analysed.\n\n\
                         📄 Paste specific claims from the page into text analysis for a full fact-check."
            .into(),
        domain: "URL Analysis".into(),
        audit: audit([
            ("analysis_type", json!("url")),
            ("url_provided", json!(url)),
            ("verification_level", json!("basic_security_check")),
        ]),
    }
}

/// Package for an image whose text could not be read.
#[must_use]
pub fn image_package(id: &str) -> VerdictPackage {
    VerdictPackage {
        id: format!("image_analysis_{id}"),
        input: "Image analysis request".into(),
        label: VerdictLabel::RequiresVerification,
        confidence: IMAGE_CONFIDENCE,
        summary: "No readable text was found in the image. Reverse image search and manual review are recommended.".into(),
        evidence: vec![EvidenceItem {
            source: "Image Forensic Analysis".into(),
            url: "#".into(),
            snippet: "Automated image check completed; no text claims could be extracted.".into(),
            reliability: 0.65,
        }],
        checklist: items(IMAGE_CHECKLIST),
        intelligence: IntelligenceReport::technical_only(
            "Image processed with basic forensic checks; no embedded text was available for claim analysis.",
        ),
        quick_analysis: "🖼️ The image was processed but contained no readable text to fact-check.\n\n\
                         🔍 Reverse image search is the best way to find its origin and original context.\n\n\
                         👁️ If the image is shared with a caption, fact-check the caption with text analysis."
            .into(),
        domain: "Image Verification".into(),
        audit: audit([
            ("analysis_type", json!("image")),
            ("verification_level", json!("basic_forensic_analysis")),
        ]),
    }
}

/// Diagnostic package returned whenever a run fails.
#[must_use]
pub fn service_unavailable_package(id: &str, content: &str, message: &str) -> VerdictPackage {
    VerdictPackage {
        id: format!("error_{id}"),
        input: content.to_string(),
        label: VerdictLabel::ServiceUnavailable,
        confidence: 0.0,
        summary: "The fact-checking service hit a technical issue. Please try again in a few moments.".into(),
        evidence: vec![EvidenceItem {
            source: "CrediScope Technical Team".into(),
            url: "#".into(),
            snippet: "Service interruptions are monitored and usually resolved quickly.".into(),
            reliability: 0.0,
        }],
        checklist: items(ERROR_CHECKLIST),
        intelligence: IntelligenceReport::technical_only(format!(
            "System diagnostic: {message}. The request could not be completed."
        )),
        quick_analysis: "❌ A technical issue interrupted the analysis.\n\n\
                         🔄 This is usually temporary; please submit the claim again shortly."
            .into(),
        domain: "System Status".into(),
        audit: audit([
            ("error", json!(message)),
            ("analysis_time", json!(Utc::now().to_rfc3339())),
            ("status", json!("service_unavailable")),
            ("retry_recommended", json!(true)),
        ]),
    }
}
