//! Tracegrade Core Library
//!
//! Rubric-based quality assessment for generated reasoning traces: a rubric
//! registry, a five-criterion item scorer, and a corpus aggregator producing
//! quality reports, plus the gate, admission and dataset helpers built on them.

pub mod admission;
pub mod aggregate;
pub mod dataset;
pub mod domain;
pub mod gate;
pub mod metrics;
pub mod obs;
pub mod reporting;
pub mod rubric;
pub mod scorer;
pub mod telemetry;

pub use domain::{
    load_records, ContentItem, ContentKind, QualityDistribution, QualityTier, Result, ScoredItem,
    TracegradeError, PASS_THRESHOLD,
};

pub use admission::{admit, admit_design, admit_qa, AdmissionDecision};
pub use aggregate::{
    fold_report, generate_recommendations, CategorizedScore, CorpusAssessor, DetailedScores,
    GroupAnalysis, OverallSummary, QaAnalysis, QualityReport,
};
pub use dataset::{
    build_training_dataset, dataset_metrics, diversity_score, generation_stats,
    metadata_completeness, write_training_dataset, DatasetMetrics, GenerationStats, RecordType,
    TrainingRecord,
};
pub use gate::{evaluate_gate, GateRule, GateRuleSet, GateThresholds, GateVerdict, Violation};
pub use reporting::{
    read_report, render_summary_md, write_report, write_summary_md, ReportArtifact,
};
pub use rubric::{Rubric, RubricRegistry};
pub use scorer::{score_against, ElementPresence, ItemScorer, LooseElementMatch};

pub use metrics::METRICS;
pub use obs::AssessSpan;
pub use telemetry::init_tracing;

/// Tracegrade version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
