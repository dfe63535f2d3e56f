//! Rubric registry: category label → scoring rubric.
//!
//! The built-in table covers the categories upstream generators emit. New
//! categories are added by inserting rubrics (directly or from a JSON overlay
//! file) without touching any scoring code. Lookups never fail: unknown
//! labels resolve to the default rubric of their item kind.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ContentKind, Result, TracegradeError};

pub const QA_FUNCTION: &str = "qa_function";
pub const QA_CLASS: &str = "qa_class";
pub const QA_BUSINESS_RULE: &str = "qa_business_rule";
pub const QA_ARCHITECTURE: &str = "qa_architecture";
pub const DESIGN_ENHANCEMENT: &str = "design_enhancement";

/// Labels that resolve to another registered label.
const ALIASES: &[(&str, &str)] = &[("qa_business", QA_BUSINESS_RULE)];

/// Scoring rubric for one content category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    /// Minimum expected trace length, in characters.
    pub minimum_length: usize,
    /// Conceptual phases the reasoning is expected to touch.
    pub required_elements: Vec<String>,
    /// Vocabulary whose presence signals analytical depth.
    pub quality_indicator_terms: Vec<String>,
    /// Tokens signalling explicit structure.
    pub structural_marker_tokens: Vec<String>,
}

impl Rubric {
    fn from_static(
        minimum_length: usize,
        required_elements: &[&str],
        quality_indicator_terms: &[&str],
        structural_marker_tokens: &[&str],
    ) -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            minimum_length,
            required_elements: owned(required_elements),
            quality_indicator_terms: owned(quality_indicator_terms),
            structural_marker_tokens: owned(structural_marker_tokens),
        }
    }

    /// Reject rubrics that would make a sub-score undefined.
    pub fn validate(&self, category: &str) -> Result<()> {
        let invalid = |reason: &str| TracegradeError::InvalidRubric {
            category: category.to_string(),
            reason: reason.to_string(),
        };
        if self.minimum_length == 0 {
            return Err(invalid("minimum_length must be positive"));
        }
        if self.required_elements.is_empty() {
            return Err(invalid("required_elements must not be empty"));
        }
        if self.quality_indicator_terms.is_empty() {
            return Err(invalid("quality_indicator_terms must not be empty"));
        }
        Ok(())
    }

    pub fn function_qa() -> Self {
        Self::from_static(
            150,
            &["问题分析", "技术考察", "深度推理", "实践洞察"],
            &[
                "分析", "考虑", "评估", "推理", "因为", "所以", "背景", "原因", "影响", "优势",
                "劣势", "方案", "设计", "架构", "模式", "原则", "实践",
            ],
            &["1.", "2.", "3.", "首先", "其次", "最后", "步骤", "阶段"],
        )
    }

    pub fn class_qa() -> Self {
        Self::from_static(
            200,
            &["设计意图", "架构模式", "职责边界", "依赖关系", "扩展性", "最佳实践"],
            &[
                "设计", "架构", "模式", "职责", "耦合", "扩展", "维护", "原则", "分析", "评估",
                "考虑",
            ],
            &["1.", "2.", "3.", "**", "SOLID", "单一职责"],
        )
    }

    pub fn business_rule_qa() -> Self {
        Self::from_static(
            180,
            &["业务背景", "规则逻辑", "业务价值", "影响范围", "异常情况", "优化建议"],
            &[
                "业务", "规则", "逻辑", "价值", "流程", "影响", "异常", "处理", "优化", "建议",
                "分析",
            ],
            &["1.", "2.", "3.", "业务", "流程", "规则"],
        )
    }

    pub fn architecture_qa() -> Self {
        Self::from_static(
            220,
            &["架构模式", "设计原则", "可扩展性", "性能影响", "维护性", "演进策略"],
            &[
                "架构", "模式", "设计", "原则", "扩展", "性能", "维护", "演进", "系统", "SOLID",
                "DRY", "KISS",
            ],
            &["1.", "2.", "3.", "SOLID", "水平扩展", "垂直扩展"],
        )
    }

    pub fn enhancement_design() -> Self {
        Self::from_static(
            400,
            &[
                "现状分析", "问题识别", "方案对比", "技术选型", "风险评估", "实施策略", "成功标准",
            ],
            &[
                "现状", "分析", "问题", "根因", "方案", "对比", "选择", "技术", "风险", "评估",
                "实施", "策略", "标准", "考量", "优势", "劣势", "缓解", "措施", "指标", "架构",
            ],
            &["1.", "2.", "3.", "**", "现状", "问题", "方案", "技术", "风险"],
        )
    }
}

/// Immutable-after-construction table of rubrics keyed by category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricRegistry {
    rubrics: BTreeMap<String, Rubric>,
}

impl Default for RubricRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RubricRegistry {
    /// Registry holding the built-in categories.
    pub fn builtin() -> Self {
        let rubrics = BTreeMap::from([
            (QA_FUNCTION.to_string(), Rubric::function_qa()),
            (QA_CLASS.to_string(), Rubric::class_qa()),
            (QA_BUSINESS_RULE.to_string(), Rubric::business_rule_qa()),
            (QA_ARCHITECTURE.to_string(), Rubric::architecture_qa()),
            (DESIGN_ENHANCEMENT.to_string(), Rubric::enhancement_design()),
        ]);
        Self { rubrics }
    }

    /// Add or replace a category rubric.
    pub fn with_rubric(mut self, category: impl Into<String>, rubric: Rubric) -> Result<Self> {
        let category = category.into();
        rubric.validate(&category)?;
        self.rubrics.insert(category, rubric);
        Ok(self)
    }

    /// Merge a JSON object of `{category: rubric}` from disk over this registry.
    pub fn with_overlay_file(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        let overlay: BTreeMap<String, Rubric> = serde_json::from_slice(&raw)?;
        let count = overlay.len();
        let mut registry = self;
        for (category, rubric) in overlay {
            registry = registry.with_rubric(category, rubric)?;
        }
        tracing::debug!(path = %path.display(), count, "rubric overlay applied");
        Ok(registry)
    }

    /// Resolve a label to the registered category it will be scored under.
    ///
    /// Exact match first, then aliases, then the default category of the
    /// label's kind (`design_*` → design default, anything else → QA default).
    pub fn resolve<'a>(&'a self, category: &'a str) -> &'a str {
        if self.rubrics.contains_key(category) {
            return category;
        }
        if let Some((_, target)) = ALIASES.iter().find(|(alias, _)| *alias == category) {
            if self.rubrics.contains_key(*target) {
                return *target;
            }
        }
        default_category_for(category)
    }

    /// Rubric for a category label; never fails.
    pub fn rubric_for(&self, category: &str) -> &Rubric {
        let resolved = self.resolve(category);
        match self.rubrics.get(resolved) {
            Some(rubric) => rubric,
            // Built-in defaults are always present: overlays can replace but
            // not remove entries.
            None => &self.rubrics[default_category_for(category)],
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.rubrics.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rubrics.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rubric)> {
        self.rubrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rubrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rubrics.is_empty()
    }
}

fn default_category_for(category: &str) -> &'static str {
    if category.starts_with(ContentKind::Design.prefix()) {
        DESIGN_ENHANCEMENT
    } else {
        QA_FUNCTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_categories() {
        let reg = RubricRegistry::builtin();
        let cats: Vec<&str> = reg.categories().collect();
        assert_eq!(
            cats,
            vec![
                DESIGN_ENHANCEMENT,
                QA_ARCHITECTURE,
                QA_BUSINESS_RULE,
                QA_CLASS,
                QA_FUNCTION
            ]
        );
    }

    #[test]
    fn test_minimum_lengths_in_range() {
        let reg = RubricRegistry::builtin();
        for (cat, rubric) in reg.iter() {
            assert!(
                (150..=400).contains(&rubric.minimum_length),
                "{cat} out of range"
            );
            rubric.validate(cat).expect("builtin rubric valid");
        }
        assert!(
            reg.rubric_for(DESIGN_ENHANCEMENT).minimum_length
                > reg.rubric_for(QA_FUNCTION).minimum_length
        );
    }

    #[test]
    fn test_unknown_qa_falls_back_to_function() {
        let reg = RubricRegistry::builtin();
        assert!(!reg.contains("qa_module"));
        assert!(!reg.contains("qa_business"));
        assert!(reg.contains(QA_FUNCTION));
        assert_eq!(reg.resolve("qa_module"), QA_FUNCTION);
        assert_eq!(reg.rubric_for("qa_module"), reg.rubric_for(QA_FUNCTION));
        assert_eq!(reg.rubric_for(""), reg.rubric_for(QA_FUNCTION));
    }

    #[test]
    fn test_unknown_design_falls_back_to_enhancement() {
        let reg = RubricRegistry::builtin();
        assert_eq!(reg.resolve("design_refactoring"), DESIGN_ENHANCEMENT);
        assert_eq!(
            reg.rubric_for("design_architecture_migration").minimum_length,
            400
        );
    }

    #[test]
    fn test_business_alias() {
        let reg = RubricRegistry::builtin();
        assert_eq!(reg.resolve("qa_business"), QA_BUSINESS_RULE);
        assert_eq!(reg.rubric_for("qa_business").minimum_length, 180);
    }

    #[test]
    fn test_with_rubric_adds_category() {
        let custom = Rubric {
            minimum_length: 300,
            required_elements: vec!["迁移路径".to_string()],
            quality_indicator_terms: vec!["迁移".to_string()],
            structural_marker_tokens: vec!["1.".to_string()],
        };
        let reg = RubricRegistry::builtin()
            .with_rubric("design_refactoring", custom.clone())
            .expect("valid rubric");
        assert_eq!(reg.len(), 6);
        assert_eq!(reg.resolve("design_refactoring"), "design_refactoring");
        assert_eq!(reg.rubric_for("design_refactoring"), &custom);
    }

    #[test]
    fn test_with_rubric_rejects_zero_length() {
        let bad = Rubric {
            minimum_length: 0,
            ..Rubric::function_qa()
        };
        let err = RubricRegistry::builtin()
            .with_rubric("qa_custom", bad)
            .unwrap_err();
        assert!(matches!(err, TracegradeError::InvalidRubric { .. }));
    }
}
