//! Corpus aggregator: scores a batch of QA and design items and folds the
//! results into a [`QualityReport`].
//!
//! Group means, tier histograms, failure counts and recommendations are all
//! derived from the per-item scores; the report is a pure function of the
//! batch. Every mean and rate over an empty group is 0.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::score::{round3, PASS_THRESHOLD};
use crate::domain::{ContentItem, ContentKind, QualityDistribution, ScoredItem};
use crate::metrics::METRICS;
use crate::obs::{self, AssessSpan};
use crate::rubric::RubricRegistry;
use crate::scorer::{ElementPresence, ItemScorer, LooseElementMatch};

/// Group mean at or above which (for both groups) a depth note is emitted.
pub const STRONG_GROUP_SCORE: f64 = 0.8;

/// A scored item together with the category label it was derived under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedScore {
    pub category: String,
    #[serde(flatten)]
    pub score: ScoredItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_qa_items: usize,
    pub total_design_items: usize,
    pub overall_qa_score: f64,
    pub overall_design_score: f64,
    /// Unweighted mean of the two group means, regardless of group sizes.
    pub combined_score: f64,
}

/// Statistics shared by both item groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAnalysis {
    pub average_score: f64,
    pub quality_distribution: QualityDistribution,
    pub failing_count: usize,
    pub failing_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaAnalysis {
    #[serde(flatten)]
    pub summary: GroupAnalysis,
    /// Mean overall score per derived category label.
    pub type_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedScores {
    pub qa_detailed: Vec<CategorizedScore>,
    pub design_detailed: Vec<CategorizedScore>,
}

/// Aggregate quality report over one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub overall_summary: OverallSummary,
    pub qa_analysis: QaAnalysis,
    pub design_analysis: GroupAnalysis,
    pub detailed_scores: DetailedScores,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    /// Items in either group that fall below the pass bar.
    pub fn failing_count(&self) -> usize {
        self.qa_analysis.summary.failing_count + self.design_analysis.failing_count
    }

    pub fn group(&self, kind: ContentKind) -> &GroupAnalysis {
        match kind {
            ContentKind::Qa => &self.qa_analysis.summary,
            ContentKind::Design => &self.design_analysis,
        }
    }
}

/// Scores batches with one shared scorer.
#[derive(Debug, Clone)]
pub struct CorpusAssessor<'r, P = LooseElementMatch> {
    scorer: ItemScorer<'r, P>,
}

impl<'r> CorpusAssessor<'r> {
    pub fn new(registry: &'r RubricRegistry) -> Self {
        Self {
            scorer: ItemScorer::new(registry),
        }
    }
}

impl<'r, P: ElementPresence> CorpusAssessor<'r, P> {
    pub fn with_scorer(scorer: ItemScorer<'r, P>) -> Self {
        Self { scorer }
    }

    /// Score every item sequentially and build the report.
    pub fn assess(&self, qa_items: &[ContentItem], design_items: &[ContentItem]) -> QualityReport {
        let _span = AssessSpan::enter("sequential");
        obs::emit_assess_started(qa_items.len(), design_items.len());
        let qa = qa_items.iter().map(|i| self.score_one(i)).collect();
        let design = design_items.iter().map(|i| self.score_one(i)).collect();
        finish(qa, design)
    }

    /// Same report as [`assess`](Self::assess), scoring items on the rayon pool.
    pub fn assess_parallel(
        &self,
        qa_items: &[ContentItem],
        design_items: &[ContentItem],
    ) -> QualityReport {
        let _span = AssessSpan::enter("parallel");
        obs::emit_assess_started(qa_items.len(), design_items.len());
        let qa = qa_items.par_iter().map(|i| self.score_one(i)).collect();
        let design = design_items.par_iter().map(|i| self.score_one(i)).collect();
        finish(qa, design)
    }

    /// Assess raw generator records, tolerating malformed entries.
    pub fn assess_records(&self, qa_records: &[Value], design_records: &[Value]) -> QualityReport {
        let qa: Vec<ContentItem> = qa_records.iter().map(ContentItem::from_qa_value).collect();
        let design: Vec<ContentItem> = design_records
            .iter()
            .map(ContentItem::from_design_value)
            .collect();
        self.assess(&qa, &design)
    }

    fn score_one(&self, item: &ContentItem) -> CategorizedScore {
        let score = self.scorer.score_item(item);
        METRICS.inc_items_scored();
        if !score.passes_threshold {
            METRICS.inc_items_failed();
        }
        obs::emit_item_scored(
            item.kind,
            &item.category,
            score.overall_score,
            score.passes_threshold,
        );
        CategorizedScore {
            category: item.category.clone(),
            score,
        }
    }
}

fn finish(qa: Vec<CategorizedScore>, design: Vec<CategorizedScore>) -> QualityReport {
    let report = fold_report(qa, design);
    METRICS.inc_reports();
    obs::emit_assess_finished(&report);
    report
}

/// Fold already-scored items into a report.
pub fn fold_report(qa: Vec<CategorizedScore>, design: Vec<CategorizedScore>) -> QualityReport {
    let qa_mean = mean(qa.iter().map(|s| s.score.overall_score));
    let design_mean = mean(design.iter().map(|s| s.score.overall_score));

    let qa_summary = analyse_group(&qa, qa_mean);
    let design_summary = analyse_group(&design, design_mean);

    let mut by_category: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for s in &qa {
        by_category
            .entry(s.category.clone())
            .or_default()
            .push(s.score.overall_score);
    }
    let type_breakdown = by_category
        .into_iter()
        .map(|(category, scores)| (category, round3(mean(scores))))
        .collect();

    let recommendations = generate_recommendations(
        qa_mean,
        design_mean,
        qa_summary.failing_count,
        design_summary.failing_count,
    );

    QualityReport {
        overall_summary: OverallSummary {
            total_qa_items: qa.len(),
            total_design_items: design.len(),
            overall_qa_score: round3(qa_mean),
            overall_design_score: round3(design_mean),
            combined_score: round3((qa_mean + design_mean) / 2.0),
        },
        qa_analysis: QaAnalysis {
            summary: qa_summary,
            type_breakdown,
        },
        design_analysis: design_summary,
        detailed_scores: DetailedScores {
            qa_detailed: qa,
            design_detailed: design,
        },
        recommendations,
    }
}

fn analyse_group(scores: &[CategorizedScore], group_mean: f64) -> GroupAnalysis {
    let failing_count = scores.iter().filter(|s| !s.score.passes_threshold).count();
    let failing_rate = if scores.is_empty() {
        0.0
    } else {
        round3(failing_count as f64 / scores.len() as f64)
    };
    GroupAnalysis {
        average_score: round3(group_mean),
        quality_distribution: QualityDistribution::from_scores(
            scores.iter().map(|s| s.score.overall_score),
        ),
        failing_count,
        failing_rate,
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Fixed rule checks, evaluated in order; each adds at most one line.
pub fn generate_recommendations(
    qa_score: f64,
    design_score: f64,
    failing_qa: usize,
    failing_design: usize,
) -> Vec<String> {
    let mut recs = Vec::new();

    if qa_score < PASS_THRESHOLD {
        recs.push(format!(
            "QA reasoning quality is low ({qa_score:.3}); strengthen the reasoning framework guidance in QA generation prompts"
        ));
    }

    if design_score < PASS_THRESHOLD {
        recs.push(format!(
            "design reasoning quality is low ({design_score:.3}); require deeper architecture analysis in design generation prompts"
        ));
    }

    if failing_qa > 0 {
        recs.push(format!(
            "{failing_qa} QA item(s) fall below the reasoning quality bar; regenerate them"
        ));
    }

    if failing_design > 0 {
        recs.push(format!(
            "{failing_design} design proposal(s) fall below the reasoning quality bar; regenerate them"
        ));
    }

    if qa_score >= STRONG_GROUP_SCORE && design_score >= STRONG_GROUP_SCORE {
        recs.push(
            "reasoning quality is good overall; consider raising complexity and depth".to_string(),
        );
    }

    recs
}
