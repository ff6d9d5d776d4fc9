//! CLI entry point for catalogue construction (C4, part 1).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use genomic_sketch::catalogue::{build_catalogue, write_name_list};
use tracing::{info, warn};

/// Selects `n` sketches at random from `pool_dir` and merges them into a
/// reference catalogue.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of candidate `.hll` sketch files.
    #[arg(long)]
    pool_dir: PathBuf,

    /// Number of sketches to select.
    #[arg(short, long)]
    n: usize,

    /// Optional RNG seed, for reproducible selection.
    #[arg(long)]
    seed: Option<u64>,

    /// Path to write the merged reference sketch to.
    #[arg(long, default_value = "reference.hll")]
    r_out: PathBuf,

    /// Path to write the list of selected file names to.
    #[arg(long, default_value = "used.txt")]
    used_out: PathBuf,

    /// Path to write the list of unselected file names to.
    #[arg(long, default_value = "unused.txt")]
    unused_out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let pool: Vec<PathBuf> = std::fs::read_dir(&args.pool_dir)
        .with_context(|| format!("reading {:?}", args.pool_dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("hll"))
        .collect();

    info!(candidates = pool.len(), "scanned pool");

    let (result, truncated) = build_catalogue(&pool, args.n, args.seed, &args.pool_dir)?;
    if truncated {
        warn!(
            requested = args.n,
            available = pool.len(),
            "pool smaller than requested, selected entire pool"
        );
    }

    result.reference.save_to_path(&args.r_out).with_context(|| format!("writing {:?}", args.r_out))?;
    write_name_list(&result.chosen, &args.used_out)?;
    write_name_list(&result.not_chosen, &args.unused_out)?;

    info!(
        chosen = result.chosen.len(),
        not_chosen = result.not_chosen.len(),
        "catalogue built"
    );
    Ok(())
}
