//! `evaluate-agreement`: how well embedding distances agree with skeleton DTW.
//!
//! ```text
//! evaluate-agreement skeletons.data.gz embeddings.data \
//!     thresholds/skeleton.json thresholds/embedding.json \
//!     --dataset hdm05 --n-subsets 10 --subset-size 1000 --seed 42
//! ```
//!
//! Skeleton distances act as the oracle. Exit code is non-zero on any parse,
//! shape or threshold error.

use clap::Parser;
use motion_agreement::agreement::{AgreementEvaluator, AgreementRun, MetricSummary, Representation};
use motion_agreement::config::evaluation::{load_config, EvaluationToolConfig};
use motion_agreement::diagnostics::{ReadStats, TimingBreakdown};
use motion_agreement::store::io::write_json_file;
use motion_agreement::store::{ObjectStore, SkeletonDialect};
use motion_agreement::threshold::load_thresholds;
use motion_agreement::types::PayloadKind;
use motion_agreement::{EvalResult, FrameMetric, ThresholdPair};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "evaluate-agreement",
    version,
    about = "Precision/recall of embedding similarity against skeleton DTW similarity"
)]
struct Args {
    /// Skeleton object store (oracle).
    skeleton_file: PathBuf,
    /// Embedding object store; must list the same objects in the same order.
    embedding_file: PathBuf,
    /// `{"p0.5", "p40"}` record for the skeleton distances.
    skeleton_thresholds: PathBuf,
    /// `{"p0.5", "p40"}` record for the embedding distances.
    embedding_thresholds: PathBuf,

    /// Skeleton payload dialect: hdm05 or pku-mmd.
    #[arg(long)]
    dataset: Option<SkeletonDialect>,

    /// Pad skeleton sequences to this many frames by repeating the last one.
    #[arg(long)]
    pad_to_frames: Option<usize>,

    /// Load at most this many objects from each file.
    #[arg(long)]
    max_objects: Option<usize>,

    #[arg(long)]
    n_subsets: Option<usize>,

    #[arg(long)]
    subset_size: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    skeleton_metric: Option<FrameMetric>,

    #[arg(long)]
    embedding_metric: Option<FrameMetric>,

    /// Evaluate every pair once instead of random subsets.
    #[arg(long)]
    all_pairs: bool,

    /// Abort when the files disagree on canonical object ids.
    #[arg(long)]
    strict_keys: bool,

    /// Where to write per-subset counts, metrics and the summary.
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// JSON config; flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgreementReport<'a> {
    skeleton_file: &'a PathBuf,
    embedding_file: &'a PathBuf,
    skeleton_thresholds: ThresholdPair,
    embedding_thresholds: ThresholdPair,
    skeleton_read: &'a ReadStats,
    embedding_read: &'a ReadStats,
    config: &'a EvaluationToolConfig,
    run: &'a AgreementRun,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> EvalResult<()> {
    let cfg = resolve_config(&args)?;

    let t_skel = load_thresholds(&args.skeleton_thresholds)?;
    let t_emb = load_thresholds(&args.embedding_thresholds)?;
    cfg.order_policy.check(&t_skel, "skeleton thresholds")?;
    cfg.order_policy.check(&t_emb, "embedding thresholds")?;

    let mut timings = TimingBreakdown::default();
    let skeletons = timings.measure("load skeletons", || {
        ObjectStore::load(&args.skeleton_file, &cfg.skeleton.reader, None)
    })?;
    let embeddings = timings.measure("load embeddings", || {
        ObjectStore::load(&args.embedding_file, &cfg.embedding.reader, None)
    })?;
    println!(
        "Loaded {} skeleton objects and {} embedding objects",
        skeletons.len(),
        embeddings.len()
    );

    let evaluator = AgreementEvaluator::new(
        Representation::new(
            &skeletons.objects,
            cfg.skeleton.distance_for(PayloadKind::Skeleton),
            t_skel,
        ),
        Representation::new(
            &embeddings.objects,
            cfg.embedding.distance_for(PayloadKind::Embedding),
            t_emb,
        ),
    )?;

    evaluator.verify_keys(cfg.strict_keys)?;

    let mut run = if cfg.all_pairs {
        evaluator.evaluate_all()?
    } else {
        evaluator.evaluate_subsets(&cfg.plan)?
    };

    for r in &run.subsets {
        let c = &r.counts;
        println!(
            "subset {:>3}: {} objects, {} pairs | TP={} FP={} FN={} TN={} grayA={} grayB={} (A similar {}) | \
             P={:.4} R={:.4} F0.25={:.4} F1={:.4} Acc={:.4}",
            r.subset,
            r.objects,
            r.pairs,
            c.true_pos,
            c.false_pos,
            c.false_neg,
            c.true_neg,
            c.gray_a,
            c.gray_b,
            c.gray_b_when_a_similar,
            r.metrics.precision,
            r.metrics.recall,
            r.metrics.f025,
            r.metrics.f1,
            r.metrics.accuracy
        );
    }
    print_summary(&run.summary);
    timings.extend(std::mem::take(&mut run.timings));
    run.timings = timings;

    if let Some(path) = &cfg.json_out {
        let report = AgreementReport {
            skeleton_file: &args.skeleton_file,
            embedding_file: &args.embedding_file,
            skeleton_thresholds: t_skel,
            embedding_thresholds: t_emb,
            skeleton_read: &skeletons.stats,
            embedding_read: &embeddings.stats,
            config: &cfg,
            run: &run,
        };
        write_json_file(path, &report)?;
        println!("Saved report to {}", path.display());
    }
    Ok(())
}

fn print_summary(summary: &MetricSummary) {
    println!("Across {} subset(s), mean ± std:", summary.subsets);
    println!("  precision: {}", summary.precision);
    println!("  recall:    {}", summary.recall);
    println!("  F0.25:     {}", summary.f025);
    println!("  F1:        {}", summary.f1);
    println!("  accuracy:  {}", summary.accuracy);
}

fn resolve_config(args: &Args) -> EvalResult<EvaluationToolConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path)?,
        None => EvaluationToolConfig::default(),
    };
    if let Some(dialect) = args.dataset {
        cfg.skeleton.reader.dialect = dialect;
    }
    if let Some(frames) = args.pad_to_frames {
        cfg.skeleton.reader.pad_to_frames = Some(frames);
    }
    if let Some(max) = args.max_objects {
        cfg.skeleton.reader.max_objects = Some(max);
        cfg.embedding.reader.max_objects = Some(max);
    }
    if let Some(n) = args.n_subsets {
        cfg.plan.n_subsets = n;
    }
    if let Some(size) = args.subset_size {
        cfg.plan.subset_size = size;
    }
    if let Some(seed) = args.seed {
        cfg.plan.seed = seed;
    }
    if let Some(metric) = args.skeleton_metric {
        let mut distance = cfg.skeleton.distance_for(PayloadKind::Skeleton);
        distance.metric = metric;
        cfg.skeleton.distance = Some(distance);
    }
    if let Some(metric) = args.embedding_metric {
        let mut distance = cfg.embedding.distance_for(PayloadKind::Embedding);
        distance.metric = metric;
        cfg.embedding.distance = Some(distance);
    }
    if args.all_pairs {
        cfg.all_pairs = true;
    }
    if args.strict_keys {
        cfg.strict_keys = true;
    }
    if args.json_out.is_some() {
        cfg.json_out = args.json_out.clone();
    }
    Ok(cfg)
}
