use tracegrade_core::{
    evaluate_gate, fold_report, CategorizedScore, ContentKind, GateRule, GateRuleSet,
    GateThresholds, QualityReport, ScoredItem, PASS_THRESHOLD,
};

fn scored(category: &str, overall: f64) -> CategorizedScore {
    CategorizedScore {
        category: category.to_string(),
        score: ScoredItem {
            overall_score: overall,
            passes_threshold: overall >= PASS_THRESHOLD,
            ..ScoredItem::empty(150)
        },
    }
}

fn report(qa: &[f64], design: &[f64]) -> QualityReport {
    fold_report(
        qa.iter().map(|s| scored("qa_function", *s)).collect(),
        design
            .iter()
            .map(|s| scored("design_enhancement", *s))
            .collect(),
    )
}

#[test]
fn strong_batch_passes_standard_gate() {
    let verdict = evaluate_gate(
        &GateRuleSet::standard(),
        &report(&[0.9, 0.85, 0.8], &[0.95]),
    );
    assert!(verdict.passed(), "{:?}", verdict.violations);
}

#[test]
fn weak_batch_reports_every_violation() {
    let verdict = evaluate_gate(
        &GateRuleSet::standard(),
        &report(&[0.5, 0.6, 0.9, 0.4], &[0.75]),
    );
    assert!(!verdict.passed());
    assert_eq!(verdict.violations.len(), 2);
    assert_eq!(verdict.violations[0].rule, GateRule::MinCombinedScore);
    assert!(verdict.violations[1].reason.contains("qa failing rate 75.0%"));
}

#[test]
fn fail_fast_stops_at_first_violation() {
    let rules = GateRuleSet::standard().with_thresholds(GateThresholds {
        fail_fast: true,
        ..GateThresholds::default()
    });
    let verdict = evaluate_gate(&rules, &report(&[0.5, 0.6, 0.9, 0.4], &[0.75]));
    assert_eq!(verdict.violations.len(), 1);
}

#[test]
fn empty_groups_skip_group_rules() {
    let rules = GateRuleSet::standard().with_rule(GateRule::MinGroupScore {
        kind: ContentKind::Design,
    });
    let verdict = evaluate_gate(&rules, &report(&[], &[]));
    assert_eq!(verdict.violations.len(), 1);
    assert_eq!(verdict.violations[0].rule, GateRule::MinCombinedScore);
}

#[test]
fn min_group_score_rule() {
    let rules = GateRuleSet {
        thresholds: GateThresholds::default(),
        rules: vec![GateRule::MinGroupScore {
            kind: ContentKind::Design,
        }],
    };
    let verdict = evaluate_gate(&rules, &report(&[0.9], &[0.6, 0.7]));
    assert_eq!(verdict.violations.len(), 1);
    assert!(verdict.violations[0]
        .reason
        .contains("design average score 0.650"));
}
