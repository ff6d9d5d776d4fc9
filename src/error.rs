//! Error types for the minimizer/HLL pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by any pipeline component.
///
/// Variant names mirror the error-kind taxonomy of the pipeline's design
/// document verbatim so that log lines and CSV-adjacent diagnostics stay
/// traceable to a single fixed vocabulary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Could not open a required input or create an output path.
    #[error("could not open {path:?}: {source}")]
    IoOpen {
        /// Path that could not be opened or created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A sketch file is missing the `HLL1` magic prefix.
    #[error("bad magic in sketch file {path:?}")]
    BadMagic {
        /// Path of the offending sketch file.
        path: PathBuf,
    },

    /// A sketch's precision byte falls outside `[4, 18]`.
    #[error("precision {precision} outside [4, 18]")]
    BadPrecision {
        /// The out-of-range precision value.
        precision: u8,
    },

    /// A sketch file's stored `m` does not equal `1 << p`.
    #[error("sketch file {path:?} has m={stored_m} but p={p} implies m={expected_m}")]
    InconsistentM {
        /// Path of the offending sketch file.
        path: PathBuf,
        /// Precision read from the file.
        p: u8,
        /// `m` value actually stored in the file.
        stored_m: u32,
        /// `m` value implied by `p`.
        expected_m: u32,
    },

    /// Fewer bytes than the format requires were available.
    #[error("short read in {path:?}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Path being read.
        path: PathBuf,
        /// Number of bytes the format requires.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// A minimizer file line was not a well-formed `<hash>\t<idx>` record.
    #[error("malformed minimizer line {line_no} in {path:?}: {line:?}")]
    MalformedMinimizerLine {
        /// Path of the minimizer file.
        path: PathBuf,
        /// 1-based line number.
        line_no: usize,
        /// The offending line's contents.
        line: String,
    },

    /// Two sketches cannot be merged or unioned because their precisions differ.
    #[error("incompatible sketches: p={p_a} (m={m_a}) vs p={p_b} (m={m_b})")]
    IncompatibleSketches {
        /// Precision of the first sketch.
        p_a: u8,
        /// Register count of the first sketch.
        m_a: u32,
        /// Precision of the second sketch.
        p_b: u8,
        /// Register count of the second sketch.
        m_b: u32,
    },

    /// The caller-supplied configuration is internally inconsistent.
    #[error("bad configuration: {reason}")]
    BadConfig {
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// No sketches were available to build a catalogue from.
    #[error("empty sketch pool: no candidates found in {path:?}")]
    EmptyPool {
        /// Directory that was scanned for candidates.
        path: PathBuf,
    },
}

/// Result type alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;
