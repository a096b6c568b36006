mod registry;
mod settings;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use trbx_core::{read_csv, write_csv, Dataset, Error as CoreError};
use trbx_eval::{evaluate_quality, write_quality_artifacts, EvalError, QualityMetrics, ReportOptions};
use trbx_explain::{
    feature_importance, interaction_summary, narrative_report, top_feature_distributions,
    ClassInteractions, ExplainError, FeatureDistribution, FeatureImportance, PrecomputedExplainer,
    DEFAULT_CLASS_NAME, DEFAULT_MAX_DISPLAY, DEFAULT_TOP_N,
};
use trbx_generate::{
    generate_synthetic, DiscreteColumns, GenerateOptions, GenerationError, SynthesizerConfig,
};
use uuid::Uuid;

use registry::{
    init_run_logging, start_run, write_bytes_atomic, write_json_atomic, RunContext, RunOptions,
    RunPaths,
};
use settings::{load_settings, Settings, SettingsError};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("explain error: {0}")]
    Explain(#[from] ExplainError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "trbx", version, about = "Synthetic patient data and tree-model explanations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit a synthesizer on a CSV file and sample synthetic rows.
    Generate(GenerateArgs),
    /// Compare a synthetic CSV file against the real one.
    Evaluate(EvaluateArgs),
    /// Summarize exported attribution values for a dataset.
    Explain(ExplainArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Output directory for runs (overrides settings).
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Settings file; defaults to ./trbx.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Real data as CSV.
    #[arg(value_name = "INPUT_CSV")]
    input: PathBuf,
    /// Column dropped before fitting (e.g. the label).
    #[arg(long)]
    target: Option<String>,
    /// Number of synthetic rows.
    #[arg(long)]
    samples: Option<usize>,
    /// Discrete column name(s); categorical columns are inferred when absent.
    #[arg(long, value_name = "COLUMN")]
    discrete: Vec<String>,
    /// Seed for the built-in synthesizer.
    #[arg(long)]
    seed: Option<u64>,
    /// Skip the quality evaluation.
    #[arg(long, default_value_t = false)]
    no_quality: bool,
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Real data as CSV.
    #[arg(long)]
    real: PathBuf,
    /// Synthetic data as CSV.
    #[arg(long)]
    synthetic: PathBuf,
    /// Column name(s) excluded from scoring.
    #[arg(long, value_name = "COLUMN", conflicts_with = "infer_discrete")]
    discrete: Vec<String>,
    /// Exclude every categorical column of the real data.
    #[arg(long, default_value_t = false)]
    infer_discrete: bool,
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct ExplainArgs {
    /// Feature values as CSV, columns in attribution order.
    #[arg(long)]
    data: PathBuf,
    /// Attribution values exported as JSON.
    #[arg(long)]
    attributions: PathBuf,
    /// Name of the predicted class used in the narrative.
    #[arg(long)]
    class_name: Option<String>,
    /// Number of features summarized per class.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
    #[command(flatten)]
    run: RunArgs,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Explain(args) => run_explain(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        input,
        target,
        samples,
        discrete,
        seed,
        no_quality,
        run,
    } = args;
    let settings = load_settings(run.config.as_deref())?;

    let n_samples = samples.unwrap_or(settings.n_samples);
    if n_samples == 0 {
        return Err(CliError::InvalidConfig(
            "--samples must be at least 1".to_string(),
        ));
    }
    let seed = seed.unwrap_or(settings.seed);
    let discrete = (!discrete.is_empty()).then_some(discrete);

    let options = GenerateOptions {
        target_column: target.clone(),
        n_samples,
        discrete_columns: match &discrete {
            Some(names) => DiscreteColumns::explicit(names.iter().cloned()),
            None => DiscreteColumns::Infer,
        },
        return_model: false,
        evaluate_quality: !no_quality,
        synthesizer: SynthesizerConfig {
            seed,
            smoothing: settings.smoothing,
            ..SynthesizerConfig::default()
        },
    };

    let run_options = RunOptions::Generate {
        input: input.clone(),
        target_column: target.clone(),
        n_samples,
        discrete_columns: discrete,
        seed,
        smoothing: settings.smoothing,
        evaluate_quality: !no_quality,
    };
    let real = load_generate_input(&input, target.as_deref())?;
    let (paths, timer) = begin_run(run.run_dir, &settings, run_options)?;
    tracing::info!(
        event = "input_loaded",
        path = %input.display(),
        rows = real.row_count(),
        columns = real.column_count()
    );

    let output = generate_synthetic(&real, &options)?;

    let synthetic_path = paths.artifact("synthetic.csv");
    let bytes = write_csv(&synthetic_path, &output.synthetic)?;
    tracing::info!(
        event = "synthetic_written",
        path = %synthetic_path.display(),
        rows = output.synthetic.row_count(),
        bytes = bytes
    );

    if let Some(report) = &output.quality {
        let evaluated = match &target {
            Some(target) => real.without_column(target),
            None => real.clone(),
        };
        let metrics = QualityMetrics::new(report, &evaluated, &output.synthetic);
        write_quality(&paths, &metrics, &settings)?;
        println!("global_score: {}", format_score(metrics.global_score));
    }

    finish_run(&paths, timer);
    Ok(())
}

/// Read the generation input and check the target column before any run
/// directory exists.
fn load_generate_input(input: &Path, target: Option<&str>) -> Result<Dataset, CliError> {
    let real = read_csv(input)?;
    if let Some(target) = target {
        if !real.has_column(target) {
            return Err(CliError::InvalidConfig(format!(
                "target column '{target}' not found in input"
            )));
        }
    }
    Ok(real)
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), CliError> {
    let EvaluateArgs {
        real,
        synthetic,
        discrete,
        infer_discrete,
        run,
    } = args;
    let settings = load_settings(run.config.as_deref())?;

    let run_options = RunOptions::Evaluate {
        real: real.clone(),
        synthetic: synthetic.clone(),
        discrete_columns: (!infer_discrete).then(|| discrete.clone()),
        divergence_threshold: settings.divergence_threshold,
    };
    let (paths, timer) = begin_run(run.run_dir, &settings, run_options)?;

    let real_data = read_csv(&real)?;
    let synthetic_data = read_csv(&synthetic)?;
    tracing::info!(
        event = "inputs_loaded",
        real_rows = real_data.row_count(),
        synthetic_rows = synthetic_data.row_count()
    );

    let discrete: BTreeSet<String> = if infer_discrete {
        real_data.categorical_columns()
    } else {
        discrete.into_iter().collect()
    };

    let report = evaluate_quality(&real_data, &synthetic_data, &discrete);
    for (column, failure) in report.unavailable() {
        tracing::warn!(event = "column_unavailable", column = %column, reason = %failure);
    }

    let metrics = QualityMetrics::new(&report, &real_data, &synthetic_data);
    write_quality(&paths, &metrics, &settings)?;
    println!("global_score: {}", format_score(metrics.global_score));

    finish_run(&paths, timer);
    Ok(())
}

/// `importance.json` written by `trbx explain`.
#[derive(Debug, Serialize)]
struct ExplainArtifact<'a> {
    labels: &'a [String],
    features: &'a [FeatureImportance],
    distributions: Vec<ClassDistributions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interactions: Option<Vec<ClassInteractions>>,
}

#[derive(Debug, Serialize)]
struct ClassDistributions {
    label: String,
    features: Vec<FeatureDistribution>,
}

fn run_explain(args: ExplainArgs) -> Result<(), CliError> {
    let ExplainArgs {
        data,
        attributions,
        class_name,
        top_n,
        run,
    } = args;
    let settings = load_settings(run.config.as_deref())?;
    let class_name = class_name.unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string());

    let run_options = RunOptions::Explain {
        data: data.clone(),
        attributions: attributions.clone(),
        class_name: class_name.clone(),
        top_n,
    };
    let (paths, timer) = begin_run(run.run_dir, &settings, run_options)?;

    let dataset: Dataset = read_csv(&data)?;
    let explainer = PrecomputedExplainer::from_path(&attributions)?;
    tracing::info!(
        event = "inputs_loaded",
        rows = dataset.row_count(),
        features = explainer.feature_names().len()
    );

    let summary = feature_importance(&explainer, &dataset)?;
    let names = summary.feature_names();

    let distributions = summary
        .labels
        .iter()
        .enumerate()
        .map(|(class_idx, label)| {
            top_feature_distributions(&summary.attribution, &names, class_idx, top_n).map(
                |features| ClassDistributions {
                    label: label.clone(),
                    features,
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let interactions = match interaction_summary(&explainer, &dataset, DEFAULT_MAX_DISPLAY) {
        Ok(interactions) => Some(interactions),
        Err(ExplainError::Unsupported(reason)) => {
            tracing::info!(event = "interactions_skipped", reason = %reason);
            None
        }
        Err(err) => return Err(err.into()),
    };

    let artifact = ExplainArtifact {
        labels: &summary.labels,
        features: &summary.features,
        distributions,
        interactions,
    };
    let importance_path = paths.artifact("importance.json");
    write_json_atomic(&importance_path, &artifact)?;
    tracing::info!(event = "importance_written", path = %importance_path.display());

    let sentences = narrative_report(&summary, &class_name);
    let mut narrative = String::from("# Narrative Report\n\n");
    for sentence in &sentences {
        narrative.push_str("- ");
        narrative.push_str(sentence);
        narrative.push('\n');
    }
    let narrative_path = paths.artifact("narrative.md");
    write_bytes_atomic(&narrative_path, narrative.as_bytes())?;
    tracing::info!(
        event = "narrative_written",
        path = %narrative_path.display(),
        sentences = sentences.len()
    );

    for sentence in &sentences {
        println!("{sentence}");
    }

    finish_run(&paths, timer);
    Ok(())
}

fn begin_run(
    run_dir: Option<PathBuf>,
    settings: &Settings,
    options: RunOptions,
) -> Result<(RunPaths, Instant), CliError> {
    let run_id = Uuid::new_v4().to_string();
    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: run_dir.unwrap_or_else(|| settings.run_dir.clone()),
        options,
    };

    let paths = start_run(&ctx)?;
    init_run_logging(&paths.logs_path)?;
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        run_dir = %paths.root.display(),
        config = %paths.config_path.display()
    );

    Ok((paths, Instant::now()))
}

fn write_quality(
    paths: &RunPaths,
    metrics: &QualityMetrics,
    settings: &Settings,
) -> Result<(), CliError> {
    let options = ReportOptions {
        max_examples: settings.max_examples,
        divergence_threshold: settings.divergence_threshold,
    };
    let artifacts = write_quality_artifacts(metrics, &paths.root, &options)?;
    tracing::info!(
        event = "quality_written",
        metrics = %artifacts.metrics_path.display(),
        report = %artifacts.report_path.display(),
        global_score = ?metrics.global_score
    );
    Ok(())
}

fn finish_run(paths: &RunPaths, timer: Instant) {
    let duration_ms = timer.elapsed().as_millis() as u64;
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);
    println!("run: {}", paths.root.display());
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{value:.4}"),
        None => "n/a".to_string(),
    }
}
