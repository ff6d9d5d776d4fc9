//! CLI entry point for canonical minimizer extraction (C1/C2).

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use genomic_sketch::fasta;
use genomic_sketch::minimizer::MinimizerExtractor;
use tracing::{info, warn};

/// Extracts canonical minimizers from FASTA contigs into `<hash>\t<idx>` records.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// FASTA file to read contigs from.
    #[arg(short, long)]
    input: PathBuf,

    /// Path to write minimizer records to.
    #[arg(short, long)]
    output: PathBuf,

    /// K-mer length.
    #[arg(short, default_value_t = 21)]
    k: u32,

    /// Minimizer window width.
    #[arg(short, default_value_t = 11)]
    w: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let in_file = File::open(&args.input).with_context(|| format!("opening {:?}", args.input))?;
    let contigs = fasta::read_contigs(BufReader::new(in_file)).with_context(|| format!("parsing {:?}", args.input))?;
    info!(contigs = contigs.len(), "parsed FASTA");

    let out_file = File::create(&args.output).with_context(|| format!("creating {:?}", args.output))?;
    let mut writer = BufWriter::new(out_file);

    let mut total = 0usize;
    for contig in &contigs {
        if contig.sequence.len() < args.k as usize {
            warn!(header = %contig.header, "contig shorter than k, skipping");
            continue;
        }
        let mut extractor = MinimizerExtractor::new(args.k, args.w)?;
        let mut minimizers = Vec::new();
        for &base in &contig.sequence {
            extractor.feed(base, &mut minimizers);
        }
        for m in &minimizers {
            writeln!(writer, "{}\t{}", m.hash, m.idx).with_context(|| format!("writing {:?}", args.output))?;
        }
        total += minimizers.len();
    }

    info!(total, "wrote minimizers");
    writer.flush().with_context(|| format!("flushing {:?}", args.output))?;
    Ok(())
}
