//! Catalogue construction: select N sketches uniformly at random from a
//! pool and merge them into a single reference sketch (C4, part 1).

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PipelineError, Result};
use crate::hll::HyperLogLog;

/// Outcome of [`build_catalogue`]: the merged reference sketch plus the
/// partition of the input pool into chosen and not-chosen file paths, in
/// the order they were written to the used/unused lists.
pub struct CatalogueResult {
    /// The merged reference sketch.
    pub reference: HyperLogLog,
    /// Paths selected for the catalogue, in selection order.
    pub chosen: Vec<PathBuf>,
    /// Paths not selected for the catalogue.
    pub not_chosen: Vec<PathBuf>,
}

/// Builds a catalogue from `pool`, a list of `.hll` sketch file paths.
///
/// Shuffles `pool` with a seedable PRNG (see design notes on the
/// Mersenne-Twister substitution), takes the first `n` entries as
/// `chosen` (capping `n` to `pool.len()` with a caller-visible warning via
/// the returned flag when the pool is smaller than requested), and merges
/// them into one reference sketch.
///
/// # Errors
///
/// - [`PipelineError::EmptyPool`] if `pool` is empty.
/// - [`PipelineError::IncompatibleSketches`] if any two sketches in the
///   pool have different precisions.
/// - Any [`PipelineError`] produced while loading a sketch file.
pub fn build_catalogue(
    pool: &[PathBuf],
    n: usize,
    seed: Option<u64>,
    pool_dir: &Path,
) -> Result<(CatalogueResult, bool)> {
    if pool.is_empty() {
        return Err(PipelineError::EmptyPool {
            path: pool_dir.to_path_buf(),
        });
    }

    validate_pool_compatible(pool)?;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let mut shuffled = pool.to_vec();
    shuffled.shuffle(&mut rng);

    let truncated = pool.len() < n;
    let effective_n = n.min(shuffled.len());

    let chosen: Vec<PathBuf> = shuffled[..effective_n].to_vec();
    let not_chosen: Vec<PathBuf> = shuffled[effective_n..].to_vec();

    let mut reference = HyperLogLog::load_from_path(&chosen[0])?;
    for path in &chosen[1..] {
        let next = HyperLogLog::load_from_path(path)?;
        reference.merge(&next)?;
    }

    Ok((
        CatalogueResult {
            reference,
            chosen,
            not_chosen,
        },
        truncated,
    ))
}

/// Validates that every sketch in `pool` is readable and shares a common
/// precision, without loading any registers (§4.4 catalogue construction,
/// step 1).
///
/// # Errors
///
/// [`PipelineError::IncompatibleSketches`] if precisions differ; any other
/// [`PipelineError`] produced while opening a header.
fn validate_pool_compatible(pool: &[PathBuf]) -> Result<u8> {
    let first_p = HyperLogLog::peek_precision(&pool[0])?;
    for path in &pool[1..] {
        let p = HyperLogLog::peek_precision(path)?;
        if p != first_p {
            return Err(PipelineError::IncompatibleSketches {
                p_a: first_p,
                m_a: 1u32 << first_p,
                p_b: p,
                m_b: 1u32 << p,
            });
        }
    }
    Ok(first_p)
}

/// Writes one file name per line (no directory prefix) to `path`.
pub fn write_name_list(paths: &[PathBuf], path: &Path) -> Result<()> {
    use std::io::Write;
    let file = std::fs::File::create(path).map_err(|source| PipelineError::IoOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = std::io::BufWriter::new(file);
    for p in paths {
        let name = p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        writeln!(writer, "{name}").map_err(|source| PipelineError::IoOpen {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
