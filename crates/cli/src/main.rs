#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use emoprep_core::config::{
    resolve_dataset_dir, Env, PrepConfig, StdEnv, DEFAULT_DOWNLOAD_ROOT, DEFAULT_FORMAT,
    DEFAULT_OUTPUT_ROOT, DEFAULT_SPLIT_SEED, DEFAULT_TEST_RATIO, DEFAULT_VALID_RATIO,
    ENV_DOWNLOAD_ROOT, ENV_OUTPUT_ROOT,
};
use emoprep_core::dataset::DatasetKind;
use emoprep_core::decode::SymphoniaAudioLoader;
use emoprep_core::output::{OutputFormats, SplitConfig};
use emoprep_core::pipeline::{Pipeline, PipelineConfig, RunSummary};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "emoprep")]
#[command(about = "Normalise speech-emotion corpora into per-utterance metadata")]
struct Args {
    /// Dataset handler to run (savee, tess)
    dataset: String,

    /// Dataset root; defaults to <download root>/<dataset>
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output directory; defaults to <output root>/<dataset>
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// mini_format, jsonl, json, split or all; repeat or comma-separate
    #[arg(long = "format", value_delimiter = ',', default_value = DEFAULT_FORMAT)]
    formats: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_VALID_RATIO)]
    valid_ratio: f64,

    #[arg(long, default_value_t = DEFAULT_TEST_RATIO)]
    test_ratio: f64,

    #[arg(long, default_value_t = DEFAULT_SPLIT_SEED)]
    seed: u64,

    #[arg(long)]
    no_progress: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let cfg = build_config(args, &env)?;

    tracing::info!(
        dataset = %cfg.dataset,
        root = %cfg.dataset_root.display(),
        output_dir = %cfg.output_dir.display(),
        "config loaded"
    );

    let summary = run_dataset(&cfg)?;
    print_summary(&summary);

    Ok(())
}

fn run_dataset(cfg: &PrepConfig) -> anyhow::Result<RunSummary> {
    let handler = cfg.dataset.handler();
    let pipeline = Pipeline::new(SymphoniaAudioLoader::new(), PipelineConfig::from_prep(cfg));
    pipeline
        .run(handler.as_ref(), &cfg.dataset_root)
        .with_context(|| format!("failed to process {}", cfg.dataset))
}

fn print_summary(summary: &RunSummary) {
    println!("Emotion frequency: {}", summary.emotion_frequency);
    println!(
        "{}: {} records, {} skipped files",
        summary.dataset,
        summary.records,
        summary.skipped.len()
    );
    if summary.collisions > 0 {
        println!("{} segment id collisions (later file kept)", summary.collisions);
    }
    if summary.rate_mismatches > 0 {
        println!(
            "{} files at a sample rate other than the nominal one",
            summary.rate_mismatches
        );
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<PrepConfig> {
    let dataset: DatasetKind = args.dataset.parse()?;
    let formats = OutputFormats::parse(&args.formats)?;
    let split = SplitConfig::new(args.valid_ratio, args.test_ratio, args.seed)?;

    let cfg = PrepConfig {
        dataset,
        dataset_root: resolve_dataset_dir(
            args.root,
            ENV_DOWNLOAD_ROOT,
            env,
            DEFAULT_DOWNLOAD_ROOT,
            dataset,
        ),
        output_dir: resolve_dataset_dir(
            args.output_dir,
            ENV_OUTPUT_ROOT,
            env,
            DEFAULT_OUTPUT_ROOT,
            dataset,
        ),
        formats,
        split,
        show_progress: !args.no_progress,
    };
    cfg.validate()?;
    Ok(cfg)
}
