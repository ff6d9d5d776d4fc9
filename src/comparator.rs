//! Novelty comparator: compute |S \ R| / |S| for every sketch in a pool
//! that was not part of the catalogue (C4, part 2).

use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::hll::HyperLogLog;

/// One row of the comparator's CSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct NoveltyRow {
    /// File name of the compared sketch (no directory prefix).
    pub sketch_s: String,
    /// Estimated cardinality of the reference catalogue.
    pub r_size: f64,
    /// Estimated cardinality of this sketch.
    pub s_size: f64,
    /// Estimated cardinality of the union of the reference and this sketch.
    pub r_union_s: f64,
    /// Estimated novel mass: `max(0, |R∪S| - |R|)`.
    pub s_minus_r: f64,
    /// Novelty ratio: `s_minus_r / s_size`, or `0` if `s_size == 0`.
    pub rho: f64,
}

/// Reads a used-list file into a set of base file names.
pub fn read_used_list<R: BufRead>(reader: R) -> std::io::Result<HashSet<String>> {
    let mut names = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        if !line.is_empty() {
            names.insert(line);
        }
    }
    Ok(names)
}

/// Computes the novelty row for `s` relative to the already-estimated
/// reference `r` with cardinality `r_size`.
pub fn compare_one(r: &HyperLogLog, r_size: f64, s_path: &Path, sketch_name: String) -> Result<NoveltyRow> {
    let s = HyperLogLog::load_from_path(s_path)?;
    let s_size = s.estimate();

    let union = HyperLogLog::union(r, &s)?;
    let union_size = union.estimate();

    let s_minus_r = (union_size - r_size).max(0.0);
    let rho = if s_size > 0.0 { s_minus_r / s_size } else { 0.0 };

    Ok(NoveltyRow {
        sketch_s: sketch_name,
        r_size,
        s_size,
        r_union_s: union_size,
        s_minus_r,
        rho,
    })
}

/// Drives the full comparator: for every `.hll` file directly under
/// `pool_dir` that is neither `r_path` nor named in `used`, computes a
/// [`NoveltyRow`]. Per-file errors are logged by the caller and recorded in
/// the returned `skipped` list rather than aborting the run, matching the
/// comparator's recoverable-error policy (§4.4 / §7).
pub fn compare_pool(
    r: &HyperLogLog,
    r_path: &Path,
    pool_dir: &Path,
    used: &HashSet<String>,
) -> Result<(Vec<NoveltyRow>, Vec<(PathBuf, PipelineError)>)> {
    let r_size = r.estimate();
    let r_canonical = std::fs::canonicalize(r_path).unwrap_or_else(|_| r_path.to_path_buf());

    let entries = std::fs::read_dir(pool_dir).map_err(|source| PipelineError::IoOpen {
        path: pool_dir.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("hll") {
            continue;
        }
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let canonical = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if canonical == r_canonical {
            continue;
        }

        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if used.contains(&name) {
            continue;
        }

        match compare_one(r, r_size, &path, name) {
            Ok(row) => rows.push(row),
            Err(err) => skipped.push((path, err)),
        }
    }

    Ok((rows, skipped))
}

/// Writes `rows` as CSV to `writer`, with the fixed header from §4.4.
pub fn write_csv<W: std::io::Write>(writer: W, rows: &[NoveltyRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["sketch_S", "|R|", "|S|", "|R_union_S|", "|S_minus_R|", "rho"])
        .map_err(csv_err)?;
    for row in rows {
        wtr.write_record(&[
            row.sketch_s.clone(),
            row.r_size.to_string(),
            row.s_size.to_string(),
            row.r_union_s.to_string(),
            row.s_minus_r.to_string(),
            row.rho.to_string(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| PipelineError::IoOpen {
        path: PathBuf::new(),
        source: e,
    })?;
    Ok(())
}

fn csv_err(e: csv::Error) -> PipelineError {
    PipelineError::IoOpen {
        path: PathBuf::new(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sketch_with(hashes: impl Iterator<Item = u64>) -> HyperLogLog {
        let mut hll = HyperLogLog::new(12).unwrap();
        for h in hashes {
            hll.add(h);
        }
        hll
    }

    #[test]
    fn read_used_list_skips_blank_lines() {
        let data = "a.hll\n\nb.hll\n";
        let set = read_used_list(Cursor::new(data)).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("a.hll"));
        assert!(set.contains("b.hll"));
    }

    #[test]
    fn identical_sketch_has_near_zero_novelty() {
        let dir = tempfile::tempdir().unwrap();
        let a_hashes: Vec<u64> = (0..100_000u64).collect();
        let r = sketch_with(a_hashes.iter().copied());
        let s = sketch_with(a_hashes.iter().copied());
        let s_path = dir.path().join("s.hll");
        s.save_to_path(&s_path).unwrap();

        let row = compare_one(&r, r.estimate(), &s_path, "s.hll".to_string()).unwrap();
        assert!(row.rho < 0.05, "rho={}", row.rho);
        assert!(row.s_minus_r / row.s_size < 0.05);
    }

    #[test]
    fn disjoint_sketch_has_near_total_novelty() {
        let dir = tempfile::tempdir().unwrap();
        let r = sketch_with((0..100_000u64).map(|x| x * 2));
        let s_hashes: Vec<u64> = (0..100_000u64).map(|x| x * 2 + 1).collect();
        let s = sketch_with(s_hashes.iter().copied());
        let s_path = dir.path().join("s.hll");
        s.save_to_path(&s_path).unwrap();

        let row = compare_one(&r, r.estimate(), &s_path, "s.hll".to_string()).unwrap();
        assert!((row.rho - 1.0).abs() < 0.05, "rho={}", row.rho);
    }

    #[test]
    fn s_minus_r_never_negative() {
        let r = sketch_with(0..1000u64);
        let s = sketch_with(0..1000u64);
        let dir = tempfile::tempdir().unwrap();
        let s_path = dir.path().join("s.hll");
        s.save_to_path(&s_path).unwrap();
        let row = compare_one(&r, r.estimate(), &s_path, "s.hll".to_string()).unwrap();
        assert!(row.s_minus_r >= 0.0);
    }

    #[test]
    fn write_csv_emits_fixed_header() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "sketch_S,|R|,|S|,|R_union_S|,|S_minus_R|,rho\n");
    }
}
