//! Tracegrade CLI
//!
//! The `tracegrade` command scores reasoning traces produced by QA and
//! design-proposal generators and turns accepted batches into training data.
//!
//! ## Commands
//!
//! - `assess`: Score a batch and write the quality report
//! - `score`: Score a single reasoning trace
//! - `dataset`: Flatten generator output into training_dataset.jsonl
//! - `admit`: Run admission checks over generator output
//! - `rubrics`: List the rubric registry

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use tracegrade_core::{
    admit, build_training_dataset, dataset_metrics, evaluate_gate, generation_stats,
    load_records, render_summary_md, write_report, write_summary_md, write_training_dataset,
    ContentItem, ContentKind, CorpusAssessor, GateRuleSet, ItemScorer, ReportArtifact,
    RubricRegistry, METRICS,
};

const REPORT_FILE: &str = "reasoning_quality_report.json";
const SUMMARY_FILE: &str = "reasoning_quality_summary.md";
const DATASET_FILE: &str = "training_dataset.jsonl";

#[derive(Parser)]
#[command(name = "tracegrade")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reasoning-trace quality assessment for generated training data", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true, env = "TRACEGRADE_LOG_JSON")]
    json: bool,

    /// JSON file of extra or replacement rubrics, keyed by category
    #[arg(long, global = true, env = "TRACEGRADE_RUBRICS")]
    rubrics: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch of QA pairs and design proposals
    Assess {
        /// QA pairs file (JSON array)
        #[arg(long)]
        qa: Option<PathBuf>,

        /// Design proposals file (JSON array)
        #[arg(long)]
        design: Option<PathBuf>,

        /// Output directory for the report and summary
        #[arg(short, long, default_value = "./output", env = "TRACEGRADE_OUTPUT_DIR")]
        output: PathBuf,

        /// Fail with a non-zero exit code when the standard quality gate rejects the batch
        #[arg(long)]
        gate: bool,

        /// Score items on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Score a single reasoning trace
    Score {
        /// Category label, e.g. qa_function or design_enhancement
        #[arg(short, long, default_value = "qa_function")]
        category: String,

        /// Read the trace from a file instead of the argument
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Trace text
        #[arg(required_unless_present = "file")]
        text: Option<String>,
    },

    /// Build the training dataset from generator output
    Dataset {
        /// QA pairs file (JSON array)
        #[arg(long)]
        qa: Option<PathBuf>,

        /// Design proposals file (JSON array)
        #[arg(long)]
        design: Option<PathBuf>,

        /// Output directory for training_dataset.jsonl
        #[arg(short, long, default_value = "./output", env = "TRACEGRADE_OUTPUT_DIR")]
        output: PathBuf,
    },

    /// Run admission checks over generator output
    Admit {
        /// Kind of items in the file
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Items file (JSON array)
        path: PathBuf,
    },

    /// List registered rubrics
    Rubrics,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Qa,
    Design,
}

impl From<KindArg> for ContentKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Qa => ContentKind::Qa,
            KindArg::Design => ContentKind::Design,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracegrade_core::init_tracing(cli.json, level);

    let registry = load_registry(cli.rubrics.as_deref())?;

    let result = match cli.command {
        Commands::Assess {
            qa,
            design,
            output,
            gate,
            parallel,
        } => cmd_assess(
            &registry,
            qa.as_deref(),
            design.as_deref(),
            &output,
            gate,
            parallel,
        ),
        Commands::Score {
            category,
            file,
            text,
        } => cmd_score(&registry, &category, file.as_deref(), text),
        Commands::Dataset {
            qa,
            design,
            output,
        } => cmd_dataset(&registry, qa.as_deref(), design.as_deref(), &output),
        Commands::Admit { kind, path } => cmd_admit(kind.into(), &path),
        Commands::Rubrics => cmd_rubrics(&registry),
    };

    METRICS.flush();
    result
}

fn load_registry(overlay: Option<&Path>) -> Result<RubricRegistry> {
    let registry = RubricRegistry::builtin();
    match overlay {
        Some(path) => registry
            .with_overlay_file(path)
            .with_context(|| format!("Failed to load rubric overlay: {:?}", path)),
        None => Ok(registry),
    }
}

fn read_records(path: Option<&Path>) -> Result<Vec<Value>> {
    match path {
        Some(p) => load_records(p).with_context(|| format!("Failed to read items: {:?}", p)),
        None => Ok(Vec::new()),
    }
}

fn cmd_assess(
    registry: &RubricRegistry,
    qa_path: Option<&Path>,
    design_path: Option<&Path>,
    output: &Path,
    gate: bool,
    parallel: bool,
) -> Result<()> {
    let qa: Vec<ContentItem> = read_records(qa_path)?
        .iter()
        .map(ContentItem::from_qa_value)
        .collect();
    let design: Vec<ContentItem> = read_records(design_path)?
        .iter()
        .map(ContentItem::from_design_value)
        .collect();

    let assessor = CorpusAssessor::new(registry);
    let report = if parallel {
        assessor.assess_parallel(&qa, &design)
    } else {
        assessor.assess(&qa, &design)
    };

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;
    let report_path = output.join(REPORT_FILE);
    let digest = write_report(&report_path, &ReportArtifact::new(report.clone()))
        .with_context(|| format!("Failed to write report: {:?}", report_path))?;
    let summary_path = output.join(SUMMARY_FILE);
    write_summary_md(&summary_path, &report)
        .with_context(|| format!("Failed to write summary: {:?}", summary_path))?;

    println!("{}", render_summary_md(&report));
    println!("Report: {} (sha256 {})", report_path.display(), digest);
    let failing = report.failing_count();
    if failing > 0 {
        warn!(failing, "items below the reasoning quality bar");
    }

    if gate {
        let verdict = evaluate_gate(&GateRuleSet::standard(), &report);
        if !verdict.passed() {
            for v in &verdict.violations {
                eprintln!("gate violation: {}", v.reason);
            }
            anyhow::bail!(
                "quality gate rejected the batch ({} violation(s))",
                verdict.violations.len()
            );
        }
        println!("Quality gate passed");
    }
    Ok(())
}

fn cmd_score(
    registry: &RubricRegistry,
    category: &str,
    file: Option<&Path>,
    text: Option<String>,
) -> Result<()> {
    let trace = match file {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read trace file: {:?}", p))?,
        None => text.unwrap_or_default(),
    };

    if trace.trim().is_empty() {
        warn!("empty reasoning trace; every sub-score will be zero");
    }

    if !registry.contains(category) {
        let resolved = registry.resolve(category);
        info!(requested = %category, resolved = %resolved, "category resolved to fallback rubric");
    }

    let scored = ItemScorer::new(registry).score(&trace, category);
    println!("{}", serde_json::to_string_pretty(&scored)?);
    Ok(())
}

fn cmd_dataset(
    registry: &RubricRegistry,
    qa_path: Option<&Path>,
    design_path: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let qa = read_records(qa_path)?;
    let design = read_records(design_path)?;

    let records = build_training_dataset(&qa, &design);
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;
    let path = output.join(DATASET_FILE);
    write_training_dataset(&path, &records)
        .with_context(|| format!("Failed to write dataset: {:?}", path))?;

    let report = CorpusAssessor::new(registry).assess_records(&qa, &design);
    let summary = serde_json::json!({
        "generation_stats": generation_stats(&qa, &design),
        "quality_metrics": dataset_metrics(&qa, &design, &report),
    });
    println!("Wrote {} records to {}", records.len(), path.display());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_admit(kind: ContentKind, path: &Path) -> Result<()> {
    let records = load_records(path).with_context(|| format!("Failed to read items: {:?}", path))?;

    let mut admitted = 0usize;
    for (index, record) in records.iter().enumerate() {
        let item = match kind {
            ContentKind::Qa => ContentItem::from_qa_value(record),
            ContentKind::Design => ContentItem::from_design_value(record),
        };
        let decision = admit(&item);
        if decision.admitted {
            admitted += 1;
            println!("[{}] admitted", index);
        } else {
            let reasons = decision.reasons.join("; ");
            tracegrade_core::obs::emit_item_rejected(kind, index, &reasons);
            println!("[{}] rejected: {}", index, reasons);
        }
    }
    println!("{} of {} {} item(s) admitted", admitted, records.len(), kind);
    Ok(())
}

fn cmd_rubrics(registry: &RubricRegistry) -> Result<()> {
    for (category, rubric) in registry.iter() {
        println!(
            "{:<22} min_length={:<4} elements={} indicators={} markers={}",
            category,
            rubric.minimum_length,
            rubric.required_elements.len(),
            rubric.quality_indicator_terms.len(),
            rubric.structural_marker_tokens.len()
        );
    }
    Ok(())
}
