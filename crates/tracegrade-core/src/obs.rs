//! Structured observability hooks for assessment lifecycle events.
//!
//! This module provides:
//! - A batch-scoped tracing span via the `AssessSpan` RAII guard
//! - Emission functions for key events: assess start/finish, per-item scores,
//!   gate evaluation and report persistence
//!
//! Every event carries a stable `event` field so log pipelines can filter on
//! it. Filtering follows `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use std::path::Path;

use tracing::{debug, info};

use crate::aggregate::QualityReport;
use crate::domain::ContentKind;

/// RAII guard that enters an assessment-scoped span for one batch.
///
/// # Example
///
/// ```ignore
/// let _span = AssessSpan::enter("parallel");
/// // item.scored events below are nested under tracegrade.assess
/// ```
pub struct AssessSpan {
    _span: tracing::span::EnteredSpan,
}

impl AssessSpan {
    pub fn enter(mode: &str) -> Self {
        let span = tracing::info_span!("tracegrade.assess", mode = %mode);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: batch assessment started.
pub fn emit_assess_started(qa_items: usize, design_items: usize) {
    info!(
        event = "assess.started",
        qa_items = qa_items,
        design_items = design_items,
    );
}

/// Emit event: one item scored (debug level, one per item).
pub fn emit_item_scored(kind: ContentKind, category: &str, overall: f64, passes: bool) {
    debug!(
        event = "item.scored",
        kind = %kind,
        category = %category,
        overall = overall,
        passes = passes,
    );
}

/// Emit event: batch assessment finished with the headline numbers.
pub fn emit_assess_finished(report: &QualityReport) {
    let summary = &report.overall_summary;
    info!(
        event = "assess.finished",
        qa_score = summary.overall_qa_score,
        design_score = summary.overall_design_score,
        combined_score = summary.combined_score,
        failing_qa = report.qa_analysis.summary.failing_count,
        failing_design = report.design_analysis.failing_count,
        recommendations = report.recommendations.len(),
    );
}

/// Emit event: quality gate evaluated.
pub fn emit_gate_evaluated(passed: bool, violations: usize) {
    info!(event = "gate.evaluated", passed = passed, violations = violations);
}

/// Emit event: report artifact persisted.
pub fn emit_report_written(path: &Path, digest: &str) {
    info!(event = "report.written", path = %path.display(), digest = %digest);
}

/// Emit event: a generator record was rejected by an admission check (warning level).
pub fn emit_item_rejected(kind: ContentKind, index: usize, reason: &dyn std::fmt::Display) {
    tracing::warn!(event = "item.rejected", kind = %kind, index = index, reason = %reason);
}
