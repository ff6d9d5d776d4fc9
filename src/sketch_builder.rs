//! Builds a single HyperLogLog sketch from one minimizer file (C3).
//!
//! Each line of the minimizer file is a whitespace-separated `<hash>
//! <idx>` pair; only the hash is consumed, the k-mer index exists for
//! downstream tooling that might want to locate minimizers and is ignored
//! here.

use std::io::BufRead;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::hll::HyperLogLog;

/// Builds a sketch of precision `p` from the minimizer records in `reader`.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedMinimizerLine`] for any non-blank line
/// that is not a well-formed `<hash> <idx>` pair of `u64`s.
pub fn build_sketch<R: BufRead>(reader: R, p: u8, path: &Path) -> Result<HyperLogLog> {
    let mut hll = HyperLogLog::new(p)?;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| PipelineError::IoOpen {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let hash_field = fields.next();
        let idx_field = fields.next();
        let extra = fields.next();

        let malformed = || PipelineError::MalformedMinimizerLine {
            path: path.to_path_buf(),
            line_no: line_no + 1,
            line: line.clone(),
        };

        let (Some(hash_str), Some(idx_str), None) = (hash_field, idx_field, extra) else {
            return Err(malformed());
        };
        let hash: u64 = hash_str.parse().map_err(|_| malformed())?;
        let _idx: u64 = idx_str.parse().map_err(|_| malformed())?;

        hll.add(hash);
    }
    Ok(hll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;

    #[test]
    fn builds_sketch_from_well_formed_lines() {
        let data = "100\t0\n200\t1\n300\t2\n";
        let hll = build_sketch(Cursor::new(data), 10, Path::new("test")).unwrap();
        assert!(!hll.is_empty());
    }

    #[test]
    fn ignores_the_idx_field() {
        let data_a = "42\t0\n";
        let data_b = "42\t999999\n";
        let a = build_sketch(Cursor::new(data_a), 10, Path::new("a")).unwrap();
        let b = build_sketch(Cursor::new(data_b), 10, Path::new("b")).unwrap();
        let mut a_bytes = Vec::new();
        let mut b_bytes = Vec::new();
        a.save(&mut a_bytes).unwrap();
        b.save(&mut b_bytes).unwrap();
        assert_eq!(a_bytes, b_bytes);
    }

    #[test]
    fn rejects_non_numeric_lines() {
        let data = "notanumber\t0\n";
        let err = build_sketch(Cursor::new(data), 10, Path::new("bad")).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedMinimizerLine { .. }));
    }

    #[test]
    fn rejects_incomplete_lines() {
        let data = "42\n";
        let err = build_sketch(Cursor::new(data), 10, Path::new("bad")).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedMinimizerLine { .. }));
    }

    #[test]
    fn skips_blank_lines() {
        let data = "100\t0\n\n200\t1\n";
        let hll = build_sketch(Cursor::new(data), 10, Path::new("test")).unwrap();
        assert!(!hll.is_empty());
    }
}
