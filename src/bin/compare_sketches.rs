//! CLI entry point for the novelty comparator (C4, part 2).

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use genomic_sketch::comparator::{compare_pool, read_used_list, write_csv};
use genomic_sketch::HyperLogLog;
use tracing::{info, warn};

/// Computes novelty of every unused sketch in a pool against a reference catalogue.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the merged reference sketch.
    #[arg(long)]
    r_path: PathBuf,

    /// Directory of candidate `.hll` sketch files.
    #[arg(long)]
    s_dir: PathBuf,

    /// Path to the list of sketch file names already folded into `r_path`.
    #[arg(long)]
    used_list: PathBuf,

    /// Path to write the novelty CSV report to.
    #[arg(long, default_value = "novelty.csv")]
    csv_out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let reference = HyperLogLog::load_from_path(&args.r_path).with_context(|| format!("loading {:?}", args.r_path))?;

    let used_file = File::open(&args.used_list).with_context(|| format!("opening {:?}", args.used_list))?;
    let used = read_used_list(BufReader::new(used_file)).with_context(|| format!("reading {:?}", args.used_list))?;

    let (rows, skipped) = compare_pool(&reference, &args.r_path, &args.s_dir, &used)?;
    for (path, err) in &skipped {
        warn!(?path, %err, "skipping sketch that could not be compared");
    }

    let out_file = File::create(&args.csv_out).with_context(|| format!("creating {:?}", args.csv_out))?;
    write_csv(out_file, &rows)?;

    info!(compared = rows.len(), skipped = skipped.len(), "novelty comparison complete");
    Ok(())
}
