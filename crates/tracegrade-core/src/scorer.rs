//! Item scorer: five lexical sub-scores combined into one weighted score.
//!
//! Scoring is a pure function of `(reasoning_trace, category)` and the
//! registry. It is keyword and structure based, not semantic: a trace that
//! names every rubric term scores well whether or not its reasoning is sound.

use std::collections::BTreeSet;

use crate::domain::score::{round3, PASS_THRESHOLD};
use crate::domain::{ContentItem, ScoredItem};
use crate::rubric::{Rubric, RubricRegistry};

pub const LENGTH_WEIGHT: f64 = 0.15;
pub const QUALITY_INDICATOR_WEIGHT: f64 = 0.25;
pub const STRUCTURE_WEIGHT: f64 = 0.20;
pub const COMPLETENESS_WEIGHT: f64 = 0.25;
pub const COHERENCE_WEIGHT: f64 = 0.15;

/// Distinct structural markers needed for full structure credit.
pub const STRUCTURE_MARKERS_FOR_FULL_CREDIT: usize = 3;

/// Connectors counted by the coherence sub-score.
pub const LOGICAL_CONNECTORS: &[&str] = &[
    "因为", "所以", "由于", "因此", "然而", "但是", "并且", "同时", "首先", "其次", "最后", "综上",
    "总结", "基于",
];

const SENTENCE_TERMINATORS: &[char] = &['。', '！', '？', '.'];

/// Decides whether a rubric's required element is covered by a trace.
pub trait ElementPresence: Send + Sync {
    fn is_present(&self, trace: &str, element: &str) -> bool;
}

/// Exact phrase, or any whitespace-separated word of the phrase.
///
/// Common words inside multi-word elements match almost any trace, which
/// inflates completeness. Kept for parity with existing scored corpora.
#[derive(Debug, Clone, Copy, Default)]
pub struct LooseElementMatch;

impl ElementPresence for LooseElementMatch {
    fn is_present(&self, trace: &str, element: &str) -> bool {
        trace.contains(element) || element.split_whitespace().any(|word| trace.contains(word))
    }
}

/// Scores reasoning traces against rubrics from a shared registry.
#[derive(Debug, Clone)]
pub struct ItemScorer<'r, P = LooseElementMatch> {
    registry: &'r RubricRegistry,
    presence: P,
}

impl<'r> ItemScorer<'r> {
    pub fn new(registry: &'r RubricRegistry) -> Self {
        Self {
            registry,
            presence: LooseElementMatch,
        }
    }
}

impl<'r, P: ElementPresence> ItemScorer<'r, P> {
    /// Swap the element-presence predicate used for completeness.
    pub fn with_presence<Q: ElementPresence>(self, presence: Q) -> ItemScorer<'r, Q> {
        ItemScorer {
            registry: self.registry,
            presence,
        }
    }

    pub fn score_item(&self, item: &ContentItem) -> ScoredItem {
        self.score(&item.reasoning_trace, &item.category)
    }

    pub fn score(&self, reasoning_trace: &str, category: &str) -> ScoredItem {
        let rubric = self.registry.rubric_for(category);
        score_against(rubric, reasoning_trace, &self.presence)
    }
}

/// Score one trace against an explicit rubric.
pub fn score_against<P: ElementPresence + ?Sized>(
    rubric: &Rubric,
    reasoning_trace: &str,
    presence: &P,
) -> ScoredItem {
    if reasoning_trace.is_empty() {
        return ScoredItem::empty(rubric.minimum_length);
    }

    let reasoning_length = reasoning_trace.chars().count();
    let length = length_score(reasoning_length, rubric.minimum_length);
    let quality = quality_indicator_score(reasoning_trace, &rubric.quality_indicator_terms);
    let structure = structure_score(reasoning_trace, &rubric.structural_marker_tokens);
    let completeness = completeness_score(reasoning_trace, &rubric.required_elements, presence);
    let coherence = coherence_score(reasoning_trace);

    let overall = round3(
        length * LENGTH_WEIGHT
            + quality * QUALITY_INDICATOR_WEIGHT
            + structure * STRUCTURE_WEIGHT
            + completeness * COMPLETENESS_WEIGHT
            + coherence * COHERENCE_WEIGHT,
    );

    ScoredItem {
        overall_score: overall,
        length_score: round3(length),
        quality_indicator_score: round3(quality),
        structure_score: round3(structure),
        completeness_score: round3(completeness),
        coherence_score: round3(coherence),
        reasoning_length,
        required_length: rubric.minimum_length,
        passes_threshold: overall >= PASS_THRESHOLD,
    }
}

pub fn length_score(reasoning_length: usize, minimum_length: usize) -> f64 {
    if minimum_length == 0 {
        return 1.0;
    }
    (reasoning_length as f64 / minimum_length as f64).min(1.0)
}

/// Fraction of distinct rubric terms that occur in the trace.
pub fn quality_indicator_score(trace: &str, terms: &[String]) -> f64 {
    let terms = distinct(terms);
    if trace.is_empty() || terms.is_empty() {
        return 0.0;
    }
    let found = terms.iter().filter(|t| trace.contains(*t)).count();
    (found as f64 / terms.len() as f64).min(1.0)
}

/// Distinct markers found, normalised so three markers give full credit.
pub fn structure_score(trace: &str, markers: &[String]) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }
    let found = distinct(markers)
        .iter()
        .filter(|m| trace.contains(*m))
        .count();
    (found as f64 / STRUCTURE_MARKERS_FOR_FULL_CREDIT as f64).min(1.0)
}

pub fn completeness_score<P: ElementPresence + ?Sized>(
    trace: &str,
    elements: &[String],
    presence: &P,
) -> f64 {
    if trace.is_empty() || elements.is_empty() {
        return 0.0;
    }
    let present = elements
        .iter()
        .filter(|e| presence.is_present(trace, e))
        .count();
    present as f64 / elements.len() as f64
}

/// Connector density: connectors per three sentences, capped at 1.
pub fn coherence_score(trace: &str) -> f64 {
    let sentences = sentence_count(trace);
    if sentences == 0 {
        return 0.0;
    }
    let connectors = LOGICAL_CONNECTORS
        .iter()
        .filter(|c| trace.contains(*c))
        .count();
    let expected = (sentences as f64 / 3.0).max(1.0);
    (connectors as f64 / expected).min(1.0)
}

/// Non-blank segments between sentence terminators.
pub fn sentence_count(trace: &str) -> usize {
    trace
        .split(SENTENCE_TERMINATORS)
        .filter(|s| !s.trim().is_empty())
        .count()
}

fn distinct(items: &[String]) -> BTreeSet<&str> {
    items
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = LENGTH_WEIGHT
            + QUALITY_INDICATOR_WEIGHT
            + STRUCTURE_WEIGHT
            + COMPLETENESS_WEIGHT
            + COHERENCE_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let rubric = Rubric::function_qa();
        let trace = "分".repeat(75);
        let scored = score_against(&rubric, &trace, &LooseElementMatch);
        assert_eq!(scored.reasoning_length, 75);
        assert_eq!(scored.length_score, 0.5);
    }

    #[test]
    fn test_length_caps_at_one() {
        assert_eq!(length_score(500, 150), 1.0);
        assert_eq!(length_score(0, 150), 0.0);
    }

    #[test]
    fn test_quality_indicator_counts_distinct_terms() {
        let t = terms(&["分析", "设计", "架构", "模式"]);
        assert_eq!(quality_indicator_score("分析分析分析", &t), 0.25);
        assert_eq!(quality_indicator_score("分析与设计", &t), 0.5);
        let dup = terms(&["分析", "分析"]);
        assert_eq!(quality_indicator_score("分析", &dup), 1.0);
    }

    #[test]
    fn test_structure_needs_three_distinct_markers() {
        let m = terms(&["1.", "2.", "3.", "首先"]);
        assert_eq!(structure_score("1. a 1. b 1. c", &m), 1.0 / 3.0);
        assert_eq!(structure_score("1. a 2. b", &m), 2.0 / 3.0);
        assert_eq!(structure_score("首先 1. 2. 3.", &m), 1.0);
    }

    #[test]
    fn test_loose_element_match_accepts_any_word() {
        let p = LooseElementMatch;
        assert!(p.is_present("问题分析如下", "问题分析"));
        assert!(p.is_present("the risk is low", "risk assessment"));
        assert!(!p.is_present("nothing here", "risk assessment"));
    }

    #[test]
    fn test_completeness_fraction() {
        let e = terms(&["问题分析", "技术考察", "深度推理", "实践洞察"]);
        assert_eq!(
            completeness_score("问题分析，技术考察", &e, &LooseElementMatch),
            0.5
        );
    }

    #[test]
    fn test_sentence_count_splits_on_terminators() {
        assert_eq!(sentence_count("一。二！三？four. "), 4);
        assert_eq!(sentence_count("。。 .."), 0);
        assert_eq!(sentence_count("no terminator"), 1);
    }

    #[test]
    fn test_coherence_zero_without_sentences() {
        assert_eq!(coherence_score("。。。"), 0.0);
    }

    #[test]
    fn test_coherence_ratio() {
        // Six sentences expect two connectors for full credit.
        let trace = "因为甲。乙。丙。丁。戊。己。";
        assert_eq!(coherence_score(trace), 0.5);
        let trace = "因为甲。所以乙。丙。丁。戊。己。";
        assert_eq!(coherence_score(trace), 1.0);
    }

    #[test]
    fn test_empty_trace_short_circuits() {
        let scored = score_against(&Rubric::enhancement_design(), "", &LooseElementMatch);
        assert_eq!(scored, ScoredItem::empty(400));
    }

    struct NeverPresent;

    impl ElementPresence for NeverPresent {
        fn is_present(&self, _trace: &str, _element: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_presence_predicate_is_pluggable() {
        let registry = RubricRegistry::builtin();
        let trace = "问题分析 技术考察 深度推理 实践洞察";
        let loose = ItemScorer::new(&registry).score(trace, "qa_function");
        let strict = ItemScorer::new(&registry)
            .with_presence(NeverPresent)
            .score(trace, "qa_function");
        assert_eq!(loose.completeness_score, 1.0);
        assert_eq!(strict.completeness_score, 0.0);
        assert!(strict.overall_score < loose.overall_score);
    }
}
