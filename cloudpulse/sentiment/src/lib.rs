#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Provider-aware opinion extraction, sentiment aggregation and comparative
//! ranking of cloud providers.

/// Telemetry builder/hook for the sentiment pipeline.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Typed errors.
#[path = "../error.rs"]
pub mod error;

/// Provider, aspect and calibration settings.
#[path = "../config.rs"]
pub mod config;

/// Opinion records and source units.
#[path = "../record.rs"]
pub mod record;

/// Per-provider, per-aspect record buckets.
#[path = "../store.rs"]
pub mod store;

/// Sentence segmentation and relevance matching.
#[path = "../extraction/main.rs"]
pub mod extraction;

/// Classifier contract, adapter and lexicon fallback.
#[path = "../classifier/main.rs"]
pub mod classifier;

/// Rankings, insights and export tables.
#[path = "../comparative/main.rs"]
pub mod comparative;

/// Pipeline driver entry point.
#[path = "../main.rs"]
pub mod pipeline;

pub use classifier::{
    best_label, Classification, ClassifierAdapter, LabelScore, LexiconClassifier,
    SentimentClassifier,
};
pub use comparative::{postprocess, ComparativeReport, InsightGenerator, OverallScore};
pub use config::{AnalysisConfig, Calibration, ClassifierSettings, ExportSettings};
pub use error::{ClassifyError, ConfigError, PipelineError};
pub use extraction::{extract, RelevanceIndex, RelevanceMatcher};
pub use pipeline::{BatchMetrics, RunCounters, RunReport, SentimentPipeline};
pub use record::{OpinionRecord, SentimentLabel, SourceUnit, UnitKind};
pub use store::OpinionStore;
pub use telemetry::{SentimentTelemetry, SentimentTelemetryBuilder};
