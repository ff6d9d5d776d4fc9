//! Typed pipeline configuration, shared by every CLI entry point and by
//! callers embedding the library directly.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::hll::HyperLogLog;

/// The fixed sketch precision used by the sketch builder (§4.3).
pub const DEFAULT_SKETCH_PRECISION: u8 = 14;

/// Recognized pipeline options (§6 "Environment / CLI surface").
///
/// Not every field is relevant to every component: [`crate::minimizer`]
/// only consumes `k`/`w`; [`crate::catalogue`] only consumes `n`/`seed`;
/// [`crate::comparator`] only consumes the `r_path`/`s_dir`/`used_list`/
/// `csv_out` quartet. Each CLI binary builds a `PipelineConfig` from its own
/// subset of fields and calls [`PipelineConfig::validate`] before running.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Directory of input FASTA files or minimizer files, depending on
    /// which component is reading it.
    pub input_dir: Option<PathBuf>,
    /// Directory into which output files are written.
    pub output_dir: Option<PathBuf>,
    /// K-mer length.
    pub k: Option<u32>,
    /// Minimizer window width.
    pub w: Option<u32>,
    /// HyperLogLog precision.
    pub p: Option<u8>,
    /// Number of sketches to select for a catalogue.
    pub n: Option<usize>,
    /// Optional seed for the catalogue's random selection.
    pub seed: Option<u64>,
    /// Reference catalogue sketch path, for the comparator.
    pub r_path: Option<PathBuf>,
    /// Pool directory of candidate sketches, for the comparator.
    pub s_dir: Option<PathBuf>,
    /// Used-sketch-name list path, for the comparator.
    pub used_list: Option<PathBuf>,
    /// CSV output path, for the comparator.
    pub csv_out: Option<PathBuf>,
}

impl PipelineConfig {
    /// Validates the fields relevant to the minimizer extractor: `k > 0`,
    /// `2*k <= 64`, `w > 0`.
    pub fn validate_extraction(&self) -> Result<()> {
        let k = self.require("k", self.k)?;
        let w = self.require("w", self.w)?;
        if k == 0 {
            return Err(bad_config("k must be > 0"));
        }
        if 2 * k > 64 {
            return Err(bad_config("2*k must be <= 64"));
        }
        if w == 0 {
            return Err(bad_config("w must be > 0"));
        }
        Ok(())
    }

    /// Validates the fields relevant to sketch construction: `p` in
    /// `[4, 18]` if given explicitly (otherwise [`DEFAULT_SKETCH_PRECISION`]
    /// is used).
    pub fn validate_sketch_precision(&self) -> Result<u8> {
        let p = self.p.unwrap_or(DEFAULT_SKETCH_PRECISION);
        if !(HyperLogLog::MIN_PRECISION..=HyperLogLog::MAX_PRECISION).contains(&p) {
            return Err(bad_config(format!(
                "p={p} outside [{}, {}]",
                HyperLogLog::MIN_PRECISION,
                HyperLogLog::MAX_PRECISION
            )));
        }
        Ok(p)
    }

    /// Validates the fields relevant to catalogue construction: `n >= 1`.
    pub fn validate_catalogue(&self) -> Result<usize> {
        let n = self.require("n", self.n)?;
        if n == 0 {
            return Err(bad_config("n must be >= 1"));
        }
        Ok(n)
    }

    fn require<T>(&self, name: &str, value: Option<T>) -> Result<T> {
        value.ok_or_else(|| bad_config(format!("missing required field '{name}'")))
    }
}

fn bad_config(reason: impl Into<String>) -> PipelineError {
    PipelineError::BadConfig {
        reason: reason.into(),
    }
}
