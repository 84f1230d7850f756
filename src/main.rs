use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use occipital::{run_evaluation, EvalConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root of the labeled test set (one subdirectory per class)
    #[arg(short, long, required_unless_present = "config")]
    data_dir: Option<PathBuf>,

    /// Path to the ONNX model file
    #[arg(short, long, required_unless_present = "config")]
    model: Option<PathBuf>,

    /// Label-mapping sidecar (defaults to <model_stem>.labels.json)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Directory for the report artifacts
    #[arg(short, long, default_value = "results")]
    results_dir: PathBuf,

    /// Seed for the prediction-grid sampler
    #[arg(long, default_value_t = occipital::config::DEFAULT_SEED)]
    seed: u64,

    /// Read the whole run configuration from a JSON file instead of flags
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn build_config(args: Args) -> anyhow::Result<EvalConfig> {
    if let Some(path) = args.config {
        return EvalConfig::from_json_file(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()));
    }
    // required_unless_present guarantees these once --config is absent.
    let mut config = EvalConfig::new(
        args.data_dir.expect("clap enforces --data-dir"),
        args.model.expect("clap enforces --model"),
        args.results_dir,
    );
    config.labels_path = args.labels;
    config.seed = args.seed;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = build_config(args)?;

    info!("=== Starting Classifier Evaluation ===");
    let summary = run_evaluation(&config).context("Evaluation failed")?;

    println!("Test Data Accuracy: {:.2}", summary.accuracy);
    println!(
        "Evaluated {} samples across {} classes ({} skipped)",
        summary.total, summary.num_classes, summary.skipped
    );
    info!("=== Evaluation Complete ===");
    Ok(())
}
