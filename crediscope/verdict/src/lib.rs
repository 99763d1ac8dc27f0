#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! CrediScope verdict pipeline: turns a claim plus fact-check, toxicity and
//! generative-analysis signals into one explainable verdict package.

/// Immutable pipeline configuration.
#[path = "../config.rs"]
pub mod config;

/// Telemetry builder/hook for pipeline components.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Claim, signal and verdict package data structures.
#[path = "../model.rs"]
pub mod model;

/// Keyword tables used by the classifiers.
#[path = "../keywords.rs"]
pub mod keywords;

/// Evidence normalization and reliability scoring.
#[path = "../evidence.rs"]
pub mod evidence;

/// Rating classification and verdict labels.
#[path = "../classifier.rs"]
pub mod classifier;

/// Confidence estimation.
#[path = "../confidence.rs"]
pub mod confidence;

/// Category-specific verification checklists.
#[path = "../checklist.rs"]
pub mod checklist;

/// Multi-lens intelligence synthesis.
#[path = "../intelligence/main.rs"]
pub mod intelligence;

/// Analysis resolution chain and deterministic fallbacks.
#[path = "../fallback.rs"]
pub mod fallback;

/// External collaborator traits and clients.
#[path = "../providers/main.rs"]
pub mod providers;

/// Fixed packages for the URL, image and error paths.
#[path = "../packages.rs"]
pub mod packages;

/// Pipeline orchestrator entry point.
#[path = "../main.rs"]
pub mod pipeline;

pub use classifier::{classify, classify_rating, RatingClass, RatingTally};
pub use config::{ApiKeys, ConfigError, PipelineConfig};
pub use confidence::{estimate, ConfidenceBreakdown};
pub use evidence::{normalize, normalize_with, ReliabilityError, ReliabilityTable};
pub use fallback::{resolve_analysis, AnalysisSource, FallbackReason, ResolvedAnalysis};
pub use intelligence::{synthesize, IntelligenceSynthesizer};
pub use model::{
    AnalysisSignal, ChecklistItem, ClaimInput, ContentKind, EvidenceItem, FactCheckHit,
    IntelligenceReport, ToxicitySignal, ToxicitySource, VerdictLabel, VerdictPackage,
};
pub use packages::{image_package, service_unavailable_package, url_package};
pub use pipeline::{PipelineError, VerdictPipeline, VerdictPipelineBuilder};
pub use providers::{
    AnalysisProvider, AnalysisResponse, FactCheckProvider, OcrProvider, ProviderError,
    ProviderSet, ToxicityProvider,
};
pub use telemetry::{VerdictTelemetry, VerdictTelemetryBuilder};
