use serde_json::{json, Value};
use tempfile::tempdir;
use tracegrade_core::{
    build_training_dataset, dataset_metrics, write_training_dataset, CorpusAssessor, RecordType,
    RubricRegistry, TracegradeError,
};

#[test]
fn dataset_is_written_as_json_lines() {
    let qa = vec![json!({
        "question": "这个函数为什么要加锁？",
        "answer": "避免并发写入。",
        "code_context": "fn save(&self) {}",
        "reasoning_trace": "因为存在并发调用。",
        "metadata": {"element_type": "function", "question_type": "why"}
    })];
    let design = vec![
        json!({
            "title": "限流",
            "description": "令牌桶限流",
            "design_approach": "网关层实现",
            "reasoning_trace": "现状分析……",
            "metadata": {"proposal_type": "enhancement"}
        }),
        json!({"title": "空方案"}),
    ];

    let records = build_training_dataset(&qa, &design);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].record_type, RecordType::QaPair);
    assert_eq!(records[2].output, "");

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("training_dataset.jsonl");
    write_training_dataset(&path, &records).expect("write dataset");

    let raw = std::fs::read_to_string(&path).expect("read dataset");
    let lines: Vec<Value> = raw
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json line"))
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["input"], json!("这个函数为什么要加锁？"));
    assert_eq!(lines[0]["type"], json!("qa_pair"));
    assert_eq!(lines[1]["input"], json!("请为以下需求设计解决方案: 限流"));
    assert_eq!(lines[1]["context"], json!("网关层实现"));
    assert_eq!(lines[1]["type"], json!("design_proposal"));
    assert!(raw.ends_with('\n'));
}

#[test]
fn writing_into_a_missing_directory_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("training_dataset.jsonl");
    let err = write_training_dataset(&path, &[]).unwrap_err();
    assert!(matches!(err, TracegradeError::Io(_)));
}

#[test]
fn metrics_follow_the_quality_report() {
    let qa = vec![
        json!({
            "reasoning_trace": "因为输入为空，所以直接返回。",
            "metadata": {
                "source_file": "src/config.rs",
                "question_type": "why",
                "complexity_level": "simple",
                "perspective": "developer",
                "element_type": "function"
            }
        }),
        json!({
            "reasoning_trace": "",
            "metadata": {"question_type": "how", "element_type": "function"}
        }),
    ];
    let design = vec![json!({
        "reasoning_trace": "现状分析……",
        "metadata": {"proposal_type": "enhancement", "complexity": "high"}
    })];

    let registry = RubricRegistry::builtin();
    let report = CorpusAssessor::new(&registry).assess_records(&qa, &design);
    let metrics = dataset_metrics(&qa, &design, &report);

    assert_eq!(
        metrics.reasoning_quality_score,
        report.overall_summary.combined_score
    );
    assert!((0.0..=1.0).contains(&metrics.reasoning_quality_score));
    // (5/5 + 2/5 + 2/3) / 3
    assert_eq!(metrics.metadata_completeness, 0.689);
    // Each dimension splits two ways: 0.4 * 1/2 + 0.3 * 1/log2(3) + 0.3 * 1/2
    assert_eq!(metrics.data_diversity_score, 0.539);
}
