//! Admission checks applied to freshly generated items before they join a
//! batch.
//!
//! These are coarse filters, cheaper and looser than full rubric scoring:
//! they catch truncated or unstructured traces so that generators can retry
//! immediately instead of discovering the failure in the batch report.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentItem, ContentKind};

const QA_MIN_LENGTH: usize = 100;
const QA_MIN_INDICATORS: usize = 3;
const QA_INDICATORS: &[&str] = &[
    "分析", "考虑", "评估", "推理", "因为", "所以", "背景", "原因", "影响", "优势", "劣势", "方案",
    "设计", "架构", "模式", "原则", "实践",
];
const QA_STRUCTURE_CUES: &[&str] = &[
    "1.", "2.", "3.", "一、", "二、", "三、", "首先", "其次", "最后", "步骤", "阶段",
];

const DESIGN_MIN_LENGTH: usize = 200;
const DESIGN_MIN_INDICATORS: usize = 8;
const DESIGN_MIN_FRAMEWORK: usize = 5;
const DESIGN_INDICATORS: &[&str] = &[
    "现状", "分析", "问题", "根因", "方案", "对比", "选择", "技术", "风险", "评估", "实施", "策略",
    "标准", "考量", "优势", "劣势", "缓解", "措施", "指标", "架构",
];
const DESIGN_FRAMEWORK: &[&str] = &["现状", "问题", "方案", "技术", "风险", "实施", "标准"];

/// Outcome of an admission check; `reasons` is empty when admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDecision {
    pub admitted: bool,
    pub reasons: Vec<String>,
}

impl AdmissionDecision {
    fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            admitted: reasons.is_empty(),
            reasons,
        }
    }
}

/// Admission check for the item's kind.
pub fn admit(item: &ContentItem) -> AdmissionDecision {
    match item.kind {
        ContentKind::Qa => admit_qa(&item.reasoning_trace),
        ContentKind::Design => admit_design(&item.reasoning_trace),
    }
}

/// QA traces need 100+ characters, three indicator terms and one structural cue.
pub fn admit_qa(trace: &str) -> AdmissionDecision {
    let mut reasons = Vec::new();

    let len = trace.chars().count();
    if len < QA_MIN_LENGTH {
        reasons.push(format!(
            "trace has {len} characters, needs at least {QA_MIN_LENGTH}"
        ));
    }

    let indicators = count_present(trace, QA_INDICATORS);
    if indicators < QA_MIN_INDICATORS {
        reasons.push(format!(
            "trace uses {indicators} analysis terms, needs at least {QA_MIN_INDICATORS}"
        ));
    }

    if count_present(trace, QA_STRUCTURE_CUES) == 0 {
        reasons.push("trace has no step or numbering cue".to_string());
    }

    AdmissionDecision::from_reasons(reasons)
}

/// Design traces need 200+ characters, eight analysis terms and five of the
/// seven framework stages.
pub fn admit_design(trace: &str) -> AdmissionDecision {
    let mut reasons = Vec::new();

    let len = trace.chars().count();
    if len < DESIGN_MIN_LENGTH {
        reasons.push(format!(
            "trace has {len} characters, needs at least {DESIGN_MIN_LENGTH}"
        ));
    }

    let indicators = count_present(trace, DESIGN_INDICATORS);
    if indicators < DESIGN_MIN_INDICATORS {
        reasons.push(format!(
            "trace uses {indicators} analysis terms, needs at least {DESIGN_MIN_INDICATORS}"
        ));
    }

    let framework = count_present(trace, DESIGN_FRAMEWORK);
    if framework < DESIGN_MIN_FRAMEWORK {
        reasons.push(format!(
            "trace covers {framework} framework stages, needs at least {DESIGN_MIN_FRAMEWORK}"
        ));
    }

    AdmissionDecision::from_reasons(reasons)
}

fn count_present(trace: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|t| trace.contains(*t)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_qa_rejected_with_all_reasons() {
        let decision = admit_qa("很短");
        assert!(!decision.admitted);
        assert_eq!(decision.reasons.len(), 3);
    }

    #[test]
    fn test_qa_admitted() {
        let trace = format!(
            "首先分析背景，因为调用方依赖返回值，所以需要评估边界。{}",
            "补充说明。".repeat(20)
        );
        let decision = admit_qa(&trace);
        assert!(decision.admitted, "{:?}", decision.reasons);
    }

    #[test]
    fn test_design_needs_framework_coverage() {
        let trace = format!(
            "分析 根因 对比 选择 评估 策略 考量 优势 劣势 缓解 措施 指标 架构 现状 问题。{}",
            "填充内容。".repeat(40)
        );
        let decision = admit_design(&trace);
        assert!(!decision.admitted);
        assert_eq!(decision.reasons.len(), 1);
        assert!(decision.reasons[0].contains("framework stages"));
    }

    #[test]
    fn test_admit_dispatches_on_kind() {
        let item = ContentItem::design("", None);
        let decision = admit(&item);
        assert!(decision.reasons[0].contains("at least 200"));
    }
}
