//! Offline training: incident export → model artifact.

use anyhow::{Context, Result};
use clap::Parser;

use crime_core::constants;
use crime_core::logic::dataset;
use crime_core::logic::trainer::{self, TrainerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the offense-group classifier")]
struct Args {
    /// Historical incident export (Latin-1 CSV)
    #[arg(long, default_value = constants::DEFAULT_DATA_PATH)]
    data: String,

    /// Where to write the model artifact
    #[arg(long, default_value = constants::DEFAULT_MODEL_PATH)]
    output: String,

    /// Number of trees (overrides CRIME_TRAIN_TREES)
    #[arg(long)]
    trees: Option<usize>,

    /// RNG seed (overrides CRIME_TRAIN_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum tree depth (overrides CRIME_TRAIN_MAX_DEPTH)
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = TrainerConfig::from_env();
    if let Some(trees) = args.trees {
        config.n_estimators = trees;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.max_depth.is_some() {
        config.max_depth = args.max_depth;
    }

    log::info!("{} trainer v{}", constants::APP_NAME, constants::APP_VERSION);

    let records = dataset::read_records(&args.data)
        .with_context(|| format!("failed to read {}", args.data))?;

    let artifact = trainer::train(&records, &config).context("training failed")?;

    artifact
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output))?;

    println!(
        "Model trained on {} rows ({} features, {} classes) and saved to {}",
        artifact.training_rows,
        artifact.forest.n_features(),
        artifact.classes.len(),
        args.output
    );
    Ok(())
}
