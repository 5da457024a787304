//! `estimate-thresholds`: percentile similarity thresholds for one object store.
//!
//! ```text
//! estimate-thresholds skeletons.data.gz --dataset hdm05 --subset-size 1000 \
//!     --repeats 5 --seed 42 --output thresholds/skeleton.json
//! ```

use clap::Parser;
use motion_agreement::config::threshold::{load_config, ThresholdToolConfig};
use motion_agreement::diagnostics::{ThresholdTrace, TimingBreakdown};
use motion_agreement::store::io::write_json_file;
use motion_agreement::store::{IdFilter, ObjectSource, ObjectStore, SkeletonDialect};
use motion_agreement::threshold::{save_thresholds, ThresholdEstimator};
use motion_agreement::{DistanceParams, EvalResult, FrameMetric, ThresholdPair};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "estimate-thresholds",
    version,
    about = "Estimate p0.5/p40 distance thresholds from random subsets of an object store"
)]
struct Args {
    /// Object store file (`.gz` is decompressed transparently).
    objects: PathBuf,

    /// Skeleton payload dialect: hdm05 or pku-mmd.
    #[arg(long)]
    dataset: Option<SkeletonDialect>,

    /// Frame metric: euclidean-per-joint, euclidean-flat or cosine. Defaults
    /// to euclidean-per-joint for skeletons and cosine for embeddings.
    #[arg(long)]
    metric: Option<FrameMetric>,

    /// Report the raw DTW cost instead of dividing by the path length.
    #[arg(long)]
    no_normalize: bool,

    #[arg(long)]
    subset_size: Option<usize>,

    #[arg(long)]
    repeats: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Restrict sampling to the ids listed in this file.
    #[arg(long)]
    train_ids: Option<PathBuf>,

    /// Reservoir-sample while reading instead of loading the whole store.
    #[arg(long)]
    streaming: bool,

    #[arg(long)]
    max_objects: Option<usize>,

    /// Where to write the `{"p0.5", "p40"}` record.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Where to write the full run report.
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
struct ThresholdRunReport {
    input: PathBuf,
    config: ThresholdToolConfig,
    thresholds: ThresholdPair,
    trace: ThresholdTrace,
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
    let mut cfg = resolve_config(&args)?;
    let filter = cfg.train_ids.as_deref().map(IdFilter::load).transpose()?;
    if let Some(f) = &filter {
        log::info!("restricting sampling to {} listed ids", f.len());
    }

    let source = ObjectSource::new(&args.objects, cfg.reader.clone());
    let mut timings = TimingBreakdown::default();
    let store = if cfg.streaming {
        None
    } else {
        Some(timings.measure("load", || {
            ObjectStore::load(&args.objects, &cfg.reader, filter.as_ref())
        })?)
    };
    let kind = match &store {
        Some(store) => store.objects.first().map(|o| o.payload.kind()),
        None => source.first_kind(filter.as_ref())?,
    };
    if let Some(kind) = kind {
        let distance = apply_distance_flags(&args, cfg.threshold.distance_for(kind));
        log::info!("comparing {kind:?} objects with {:?}", distance.metric);
        cfg.threshold.distance = Some(distance);
    }

    let estimator = ThresholdEstimator::new(cfg.threshold.clone());
    let mut estimate = match store {
        None => estimator.estimate_streaming(&source, filter.as_ref())?,
        Some(store) => {
            let mut estimate = estimator.estimate(&store.objects, None)?;
            estimate.trace.read = Some(store.stats);
            estimate
        }
    };

    for row in &estimate.trace.per_repeat {
        println!(
            "repeat {:>3}: {} objects, {} pairs, p{}={:.6} p{}={:.6} ({:.1} ms)",
            row.repeat,
            row.objects,
            row.pairs,
            cfg.threshold.low_percentile,
            row.low,
            cfg.threshold.high_percentile,
            row.high,
            row.elapsed_ms
        );
    }
    let t = estimate.thresholds;
    println!(
        "thresholds over {} repeats (universe {}): p0.5={:.6} p40={:.6}",
        estimate.trace.per_repeat.len(),
        estimate.trace.universe,
        t.similar,
        t.dissimilar
    );

    if let Some(path) = &cfg.output.thresholds {
        save_thresholds(path, &t)?;
        println!("Saved thresholds to {}", path.display());
    }
    if let Some(path) = &cfg.output.json_out {
        timings.extend(std::mem::take(&mut estimate.trace.timings));
        estimate.trace.timings = timings;
        let report = ThresholdRunReport {
            input: args.objects.clone(),
            config: cfg.clone(),
            thresholds: t,
            trace: estimate.trace,
        };
        write_json_file(path, &report)?;
        println!("Saved run report to {}", path.display());
    }
    Ok(())
}

fn resolve_config(args: &Args) -> EvalResult<ThresholdToolConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path)?,
        None => ThresholdToolConfig::default(),
    };
    if let Some(dialect) = args.dataset {
        cfg.reader.dialect = dialect;
    }
    if let Some(max) = args.max_objects {
        cfg.reader.max_objects = Some(max);
    }
    let params = &mut cfg.threshold;
    if let Some(size) = args.subset_size {
        params.subset_size = size;
    }
    if let Some(repeats) = args.repeats {
        params.repeats = repeats;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if args.train_ids.is_some() {
        cfg.train_ids = args.train_ids.clone();
    }
    if args.streaming {
        cfg.streaming = true;
    }
    if args.output.is_some() {
        cfg.output.thresholds = args.output.clone();
    }
    if args.json_out.is_some() {
        cfg.output.json_out = args.json_out.clone();
    }
    Ok(cfg)
}

/// Distance flags override the configured or kind-derived distance.
fn apply_distance_flags(args: &Args, mut distance: DistanceParams) -> DistanceParams {
    if let Some(metric) = args.metric {
        distance.metric = metric;
    }
    if args.no_normalize {
        distance.normalize = false;
    }
    distance
}
