//! Content items handed to the assessor by upstream generators.
//!
//! Generators emit loosely-shaped JSON records. Everything the assessor needs
//! is pulled out tolerantly: a missing or wrong-typed field degrades to an
//! empty trace or to the kind's default category, never to an error.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{Result, TracegradeError};

/// Element type assumed for QA items that do not declare one.
pub const DEFAULT_QA_ELEMENT_TYPE: &str = "function";

/// Proposal type assumed for design items that do not declare one.
pub const DEFAULT_DESIGN_PROPOSAL_TYPE: &str = "enhancement";

/// Source group an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Qa,
    Design,
}

impl ContentKind {
    /// Category label prefix (`qa_` / `design_`).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Qa => "qa_",
            Self::Design => "design_",
        }
    }

    /// Category used when an item carries no usable type tag.
    pub fn default_category(self) -> String {
        match self {
            Self::Qa => format!("qa_{DEFAULT_QA_ELEMENT_TYPE}"),
            Self::Design => format!("design_{DEFAULT_DESIGN_PROPOSAL_TYPE}"),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qa => f.write_str("qa"),
            Self::Design => f.write_str("design"),
        }
    }
}

/// One item to be scored: its reasoning trace plus the rubric category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub category: String,
    pub reasoning_trace: String,
}

impl ContentItem {
    /// QA item; `element_type` falls back to `function` when absent or blank.
    pub fn qa(reasoning_trace: impl Into<String>, element_type: Option<&str>) -> Self {
        Self::tagged(ContentKind::Qa, reasoning_trace.into(), element_type)
    }

    /// Design item; `proposal_type` falls back to `enhancement` when absent or blank.
    pub fn design(reasoning_trace: impl Into<String>, proposal_type: Option<&str>) -> Self {
        Self::tagged(ContentKind::Design, reasoning_trace.into(), proposal_type)
    }

    /// Extract a QA item from a generator record.
    ///
    /// Reads `reasoning_trace` and `metadata.element_type`.
    pub fn from_qa_value(value: &Value) -> Self {
        let element_type = str_at(value, &["metadata", "element_type"]);
        Self::qa(trace_of(value), element_type)
    }

    /// Extract a design item from a generator record.
    ///
    /// The proposal type is read from the top-level `type` field first, then
    /// from `metadata.proposal_type`.
    pub fn from_design_value(value: &Value) -> Self {
        let proposal_type = str_at(value, &["type"])
            .filter(|s| !s.trim().is_empty())
            .or_else(|| str_at(value, &["metadata", "proposal_type"]));
        Self::design(trace_of(value), proposal_type)
    }

    fn tagged(kind: ContentKind, reasoning_trace: String, tag: Option<&str>) -> Self {
        let category = match tag.map(str::trim) {
            Some(t) if !t.is_empty() => format!("{}{}", kind.prefix(), t),
            _ => kind.default_category(),
        };
        Self {
            kind,
            category,
            reasoning_trace,
        }
    }
}

fn trace_of(value: &Value) -> String {
    str_at(value, &["reasoning_trace"])
        .unwrap_or_default()
        .to_string()
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = value;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str()
}

/// Read a generator output file: a top-level JSON array of item records.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read(path)?;
    let value: Value = serde_json::from_slice(&raw)?;
    match value {
        Value::Array(records) => Ok(records),
        other => Err(TracegradeError::InvalidInput(format!(
            "{} must contain a JSON array of items, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
