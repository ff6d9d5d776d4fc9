//! CLI entry point for sketch construction from minimizer files (C3).

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use genomic_sketch::config::DEFAULT_SKETCH_PRECISION;
use genomic_sketch::sketch_builder::build_sketch;
use tracing::{info, warn};

/// Builds one HyperLogLog sketch per minimizer file in `input_dir`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of `<hash>\t<idx>` minimizer files.
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Directory to write `.hll` sketch files to.
    #[arg(short, long)]
    output_dir: PathBuf,

    /// HyperLogLog precision.
    #[arg(short, default_value_t = DEFAULT_SKETCH_PRECISION)]
    p: u8,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    std::fs::create_dir_all(&args.output_dir).with_context(|| format!("creating {:?}", args.output_dir))?;

    let entries = std::fs::read_dir(&args.input_dir).with_context(|| format!("reading {:?}", args.input_dir))?;

    let mut built = 0usize;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(err) => {
                warn!(?path, %err, "skipping unreadable minimizer file");
                continue;
            }
        };

        let hll = match build_sketch(BufReader::new(file), args.p, &path) {
            Ok(hll) => hll,
            Err(err) => {
                warn!(?path, %err, "skipping malformed minimizer file");
                continue;
            }
        };

        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let out_path = args.output_dir.join(format!("{stem}.hll"));
        hll.save_to_path(&out_path).with_context(|| format!("writing {out_path:?}"))?;
        built += 1;
    }

    info!(built, "wrote sketches");
    Ok(())
}
