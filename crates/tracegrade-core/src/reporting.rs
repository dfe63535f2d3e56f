//! Report artifacts: JSON persistence with an integrity digest, and a
//! Markdown summary for terminals and PR comments.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::aggregate::{GroupAnalysis, QualityReport};
use crate::domain::{Result, TracegradeError};
use crate::obs;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Persisted quality report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub report: QualityReport,
}

impl ReportArtifact {
    pub fn new(report: QualityReport) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            report,
        }
    }
}

/// SHA-256 hex digest of raw bytes.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// `<path>.digest` next to the report file.
pub fn digest_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".digest");
    PathBuf::from(name)
}

/// Write pretty JSON to `path` and its digest to `<path>.digest`.
///
/// Returns the digest.
pub fn write_report(path: &Path, artifact: &ReportArtifact) -> Result<String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_vec_pretty(artifact)?;
    let digest = content_digest(&json);

    std::fs::write(path, &json)?;
    std::fs::write(digest_path(path), digest.as_bytes())?;

    obs::emit_report_written(path, &digest);
    Ok(digest)
}

/// Read a report written by [`write_report`] and verify its digest.
pub fn read_report(path: &Path) -> Result<ReportArtifact> {
    let json = std::fs::read(path)?;
    let expected = std::fs::read_to_string(digest_path(path))?;
    let actual = content_digest(&json);
    if expected.trim() != actual {
        return Err(TracegradeError::DigestMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }
    Ok(serde_json::from_slice(&json)?)
}

/// Render the human-readable summary.
pub fn render_summary_md(report: &QualityReport) -> String {
    let s = &report.overall_summary;
    let mut out = String::new();
    out.push_str("# Reasoning Quality Report\n\n");
    out.push_str("## Overall\n");
    let _ = write!(
        out,
        "- QA items: {}\n- design items: {}\n- QA score: {:.3}\n- design score: {:.3}\n- combined score: {:.3}\n\n",
        s.total_qa_items,
        s.total_design_items,
        s.overall_qa_score,
        s.overall_design_score,
        s.combined_score
    );

    out.push_str("## QA\n");
    push_group(&mut out, &report.qa_analysis.summary);
    if !report.qa_analysis.type_breakdown.is_empty() {
        out.push_str("\n### By Category\n");
        for (category, score) in &report.qa_analysis.type_breakdown {
            let _ = writeln!(out, "- `{}`: {:.3}", category, score);
        }
    }
    out.push('\n');

    out.push_str("## Design\n");
    push_group(&mut out, &report.design_analysis);
    out.push('\n');

    out.push_str("## Recommendations\n");
    if report.recommendations.is_empty() {
        out.push_str("- none\n");
    } else {
        for rec in &report.recommendations {
            let _ = writeln!(out, "- {}", rec);
        }
    }
    out
}

fn push_group(out: &mut String, group: &GroupAnalysis) {
    let d = &group.quality_distribution;
    let _ = write!(
        out,
        "- average score: {:.3}\n- failing: {} ({:.1}%)\n- distribution: excellent {} / good {} / fair {} / poor {}\n",
        group.average_score,
        group.failing_count,
        group.failing_rate * 100.0,
        d.excellent,
        d.good,
        d.fair,
        d.poor
    );
}

/// Write the Markdown summary.
pub fn write_summary_md(path: &Path, report: &QualityReport) -> Result<()> {
    std::fs::write(path, render_summary_md(report))?;
    Ok(())
}
