//! Quality gate over a [`QualityReport`].
//!
//! Evaluates a report against a [`GateRuleSet`] to produce a [`GateVerdict`]:
//! the accept/reject decision for a whole generated batch before it is turned
//! into a training dataset. Supports combined-score and per-group thresholds,
//! failing-rate limits and fail-fast.

use serde::{Deserialize, Serialize};

use crate::aggregate::QualityReport;
use crate::domain::score::PASS_THRESHOLD;
use crate::domain::ContentKind;
use crate::obs;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Thresholds referenced by gate rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateThresholds {
    /// Minimum `combined_score`.
    pub min_combined_score: f64,
    /// Minimum mean score of a single group.
    pub min_group_score: f64,
    /// Maximum share (0.0–1.0) of failing items in a single group.
    pub max_failing_rate: f64,
    /// If true, stop at the first violation.
    pub fail_fast: bool,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_combined_score: PASS_THRESHOLD,
            min_group_score: PASS_THRESHOLD,
            max_failing_rate: 0.2,
            fail_fast: false,
        }
    }
}

/// A single rule that can reject a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateRule {
    MinCombinedScore,
    MinGroupScore { kind: ContentKind },
    MaxFailingRate { kind: ContentKind },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateRuleSet {
    pub thresholds: GateThresholds,
    pub rules: Vec<GateRule>,
}

impl GateRuleSet {
    /// Default thresholds with the combined-score rule and failing-rate
    /// limits on both groups.
    pub fn standard() -> Self {
        Self {
            thresholds: GateThresholds::default(),
            rules: vec![
                GateRule::MinCombinedScore,
                GateRule::MaxFailingRate {
                    kind: ContentKind::Qa,
                },
                GateRule::MaxFailingRate {
                    kind: ContentKind::Design,
                },
            ],
        }
    }

    pub fn with_rule(mut self, rule: GateRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_thresholds(mut self, thresholds: GateThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub rule: GateRule,
    /// Human-readable explanation.
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateVerdict {
    /// Violations found (empty when passed).
    pub violations: Vec<Violation>,
}

impl GateVerdict {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate a report against a rule set.
///
/// Group rules are skipped for empty groups: a batch with no design items
/// cannot violate a design failing-rate limit.
pub fn evaluate_gate(rule_set: &GateRuleSet, report: &QualityReport) -> GateVerdict {
    let mut violations = Vec::new();

    for rule in &rule_set.rules {
        if let Some(v) = check_rule(rule, &rule_set.thresholds, report) {
            violations.push(v);
            if rule_set.thresholds.fail_fast {
                break;
            }
        }
    }

    obs::emit_gate_evaluated(violations.is_empty(), violations.len());
    GateVerdict { violations }
}

fn check_rule(
    rule: &GateRule,
    thresholds: &GateThresholds,
    report: &QualityReport,
) -> Option<Violation> {
    let violation = |reason: String| {
        Some(Violation {
            rule: rule.clone(),
            reason,
        })
    };

    match rule {
        GateRule::MinCombinedScore => {
            let combined = report.overall_summary.combined_score;
            if combined < thresholds.min_combined_score {
                violation(format!(
                    "combined score {:.3} < required {:.3}",
                    combined, thresholds.min_combined_score
                ))
            } else {
                None
            }
        }
        GateRule::MinGroupScore { kind } => {
            if group_is_empty(report, *kind) {
                return None;
            }
            let score = report.group(*kind).average_score;
            if score < thresholds.min_group_score {
                violation(format!(
                    "{} average score {:.3} < required {:.3}",
                    kind, score, thresholds.min_group_score
                ))
            } else {
                None
            }
        }
        GateRule::MaxFailingRate { kind } => {
            if group_is_empty(report, *kind) {
                return None;
            }
            let group = report.group(*kind);
            if group.failing_rate > thresholds.max_failing_rate {
                violation(format!(
                    "{} failing rate {:.1}% > allowed {:.1}% ({} failing)",
                    kind,
                    group.failing_rate * 100.0,
                    thresholds.max_failing_rate * 100.0,
                    group.failing_count,
                ))
            } else {
                None
            }
        }
    }
}

fn group_is_empty(report: &QualityReport, kind: ContentKind) -> bool {
    let summary = &report.overall_summary;
    match kind {
        ContentKind::Qa => summary.total_qa_items == 0,
        ContentKind::Design => summary.total_design_items == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_serde_tagging() {
        let rule = GateRule::MaxFailingRate {
            kind: ContentKind::Design,
        };
        let json = serde_json::to_value(&rule).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"type": "max_failing_rate", "kind": "design"})
        );
    }

    #[test]
    fn test_default_thresholds() {
        let t = GateThresholds::default();
        assert_eq!(t.min_combined_score, 0.7);
        assert_eq!(t.max_failing_rate, 0.2);
        assert!(!t.fail_fast);
    }
}
