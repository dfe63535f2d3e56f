use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::aggregate::QualityReport;
use crate::domain::score::round3;
use crate::domain::Result;

/// Metadata keys a QA pair is expected to carry.
pub const QA_METADATA_FIELDS: [&str; 5] = [
    "source_file",
    "question_type",
    "complexity_level",
    "perspective",
    "element_type",
];

/// Metadata keys a design proposal is expected to carry.
pub const DESIGN_METADATA_FIELDS: [&str; 3] = ["proposal_type", "complexity", "generated_by"];

/// QA diversity dimensions: metadata key, expected number of distinct values, weight.
const DIVERSITY_DIMENSIONS: [(&str, u32, f64); 3] = [
    ("question_type", 4, 0.4),
    ("complexity_level", 3, 0.3),
    ("perspective", 4, 0.3),
];

/// Kind of source item a training record was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    QaPair,
    DesignProposal,
}

/// One line of training_dataset.jsonl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub input: String,
    pub output: String,
    pub context: String,
    pub reasoning: String,
    pub metadata: Value,
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

/// Dataset-level quality metrics, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetrics {
    /// Normalised Shannon entropy of QA question type, complexity and perspective.
    pub data_diversity_score: f64,
    /// Combined reasoning score of the batch.
    pub reasoning_quality_score: f64,
    /// Mean share of expected metadata keys present per item.
    pub metadata_completeness: f64,
}

/// Item counts per generator-declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub qa_by_question_type: BTreeMap<String, usize>,
    pub design_by_proposal_type: BTreeMap<String, usize>,
}

impl TrainingRecord {
    /// QA pair: question → answer, with the code context attached.
    pub fn from_qa(record: &Value) -> Self {
        Self {
            input: text(record, "question"),
            output: text(record, "answer"),
            context: text(record, "code_context"),
            reasoning: text(record, "reasoning_trace"),
            metadata: metadata(record),
            record_type: RecordType::QaPair,
        }
    }

    /// Design proposal: a requirement prompt built from the title → description.
    pub fn from_design(record: &Value) -> Self {
        Self {
            input: format!("请为以下需求设计解决方案: {}", text(record, "title")),
            output: text(record, "description"),
            context: text(record, "design_approach"),
            reasoning: text(record, "reasoning_trace"),
            metadata: metadata(record),
            record_type: RecordType::DesignProposal,
        }
    }
}

/// Flatten QA and design records into training records, QA first.
pub fn build_training_dataset(
    qa_records: &[Value],
    design_records: &[Value],
) -> Vec<TrainingRecord> {
    qa_records
        .iter()
        .map(TrainingRecord::from_qa)
        .chain(design_records.iter().map(TrainingRecord::from_design))
        .collect()
}

/// Write records as JSON Lines.
pub fn write_training_dataset(path: &Path, records: &[TrainingRecord]) -> Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Count records per `metadata.question_type` / `metadata.proposal_type`.
pub fn generation_stats(qa_records: &[Value], design_records: &[Value]) -> GenerationStats {
    let mut stats = GenerationStats::default();
    for r in qa_records {
        *stats
            .qa_by_question_type
            .entry(metadata_tag(r, "question_type"))
            .or_default() += 1;
    }
    for r in design_records {
        *stats
            .design_by_proposal_type
            .entry(metadata_tag(r, "proposal_type"))
            .or_default() += 1;
    }
    stats
}

/// Diversity, reasoning and metadata metrics for a generated batch.
///
/// `report` is the quality report of the same records.
pub fn dataset_metrics(
    qa_records: &[Value],
    design_records: &[Value],
    report: &QualityReport,
) -> DatasetMetrics {
    DatasetMetrics {
        data_diversity_score: diversity_score(qa_records),
        reasoning_quality_score: report.overall_summary.combined_score.clamp(0.0, 1.0),
        metadata_completeness: metadata_completeness(qa_records, design_records),
    }
}

/// Weighted normalised entropy over the QA diversity dimensions, capped at 1.
///
/// Missing keys count as their own `unknown` value.
pub fn diversity_score(qa_records: &[Value]) -> f64 {
    if qa_records.is_empty() {
        return 0.0;
    }
    let score: f64 = DIVERSITY_DIMENSIONS
        .iter()
        .map(|(key, expected, weight)| {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for r in qa_records {
                *counts.entry(metadata_tag(r, key)).or_default() += 1;
            }
            shannon_entropy(&counts, qa_records.len()) / f64::from(*expected).log2() * weight
        })
        .sum();
    round3(score.min(1.0))
}

/// Mean per-item share of expected metadata keys with a non-empty value.
pub fn metadata_completeness(qa_records: &[Value], design_records: &[Value]) -> f64 {
    let total = qa_records.len() + design_records.len();
    if total == 0 {
        return 0.0;
    }
    let sum: f64 = qa_records
        .iter()
        .map(|r| field_coverage(r, &QA_METADATA_FIELDS))
        .chain(
            design_records
                .iter()
                .map(|r| field_coverage(r, &DESIGN_METADATA_FIELDS)),
        )
        .sum();
    round3(sum / total as f64)
}

fn shannon_entropy(counts: &BTreeMap<String, usize>, total: usize) -> f64 {
    let total = total as f64;
    counts
        .values()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

fn field_coverage(record: &Value, fields: &[&str]) -> f64 {
    let present = fields
        .iter()
        .filter(|f| {
            record
                .get("metadata")
                .and_then(|m| m.get(**f))
                .is_some_and(is_filled)
        })
        .count();
    present as f64 / fields.len() as f64
}

/// Null, false, zero and empty values do not count as present.
fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn text(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn metadata(record: &Value) -> Value {
    match record.get("metadata") {
        Some(m @ Value::Object(_)) => m.clone(),
        _ => Value::Object(Map::new()),
    }
}

fn metadata_tag(record: &Value, key: &str) -> String {
    match record.get("metadata").and_then(|m| m.get(key)) {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
