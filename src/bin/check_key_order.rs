//! `check-key-order`: do two object stores list the same ids in the same order?
//!
//! Only `#objectKey` lines are scanned. Exit code 0 when the order matches,
//! 1 otherwise (or on error).

use clap::Parser;
use motion_agreement::store::{compare_key_order, scan_object_keys};
use motion_agreement::EvalResult;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "check-key-order",
    version,
    about = "Compare the #objectKey order of two object store files"
)]
struct Args {
    file_a: PathBuf,
    file_b: PathBuf,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> EvalResult<bool> {
    let left = scan_object_keys(&args.file_a)?;
    let right = scan_object_keys(&args.file_b)?;
    let report = compare_key_order(&left, &right);

    println!("{}: {} keys", args.file_a.display(), report.left_count);
    println!("{}: {} keys", args.file_b.display(), report.right_count);
    match &report.first_difference {
        None => println!("Key order is identical"),
        Some(diff) => println!(
            "First difference at position {}: {:?} vs {:?}",
            diff.position, diff.left, diff.right
        ),
    }
    Ok(report.same_order())
}
