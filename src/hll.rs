//! HyperLogLog engine: register update, estimation, merge, and bit-exact
//! on-disk representation.
//!
//! # Algorithm
//!
//! Each 64-bit hash is split into a `p`-bit register index (the top `p`
//! bits) and a 64-`p`-bit remainder. The register stores the maximum
//! "leading zeros in the remainder, plus one" seen for its index. Estimation
//! uses the classic harmonic-mean formula with Flajolet's bias constant and
//! falls back to linear counting when the raw estimate is small; no
//! HyperLogLog++ large-range correction is applied.
//!
//! # References
//!
//! Flajolet et al., "HyperLogLog: the analysis of a near-optimal
//! cardinality estimation algorithm" (2007).

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{PipelineError, Result};

/// On-disk magic bytes identifying a sketch file.
const MAGIC: [u8; 4] = *b"HLL1";

/// A HyperLogLog cardinality sketch with `m = 2^p` byte registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HyperLogLog {
    p: u8,
    registers: Vec<u8>,
}

impl HyperLogLog {
    /// Minimum precision value.
    pub const MIN_PRECISION: u8 = 4;

    /// Maximum precision value.
    pub const MAX_PRECISION: u8 = 18;

    /// Creates an empty sketch of the given precision.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BadPrecision`] if `p` is outside `[4, 18]`.
    pub fn new(p: u8) -> Result<Self> {
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&p) {
            return Err(PipelineError::BadPrecision { precision: p });
        }
        let m = 1usize << p;
        Ok(HyperLogLog {
            p,
            registers: vec![0u8; m],
        })
    }

    /// Precision parameter.
    #[inline]
    pub fn precision(&self) -> u8 {
        self.p
    }

    /// Number of registers, `m = 2^p`.
    #[inline]
    pub fn num_registers(&self) -> u32 {
        1u32 << self.p
    }

    /// Updates the sketch with a pre-hashed 64-bit value.
    ///
    /// A hash of `0` is remapped to `1` so the leading-zero scan below is
    /// well-defined (an all-zero word has no leading one).
    pub fn add(&mut self, h: u64) {
        let h = if h == 0 { 1 } else { h };
        let idx = (h >> (64 - self.p)) as usize;
        let w = h << self.p;
        let rho = (w.leading_zeros() + 1) as u8;
        if rho > self.registers[idx] {
            self.registers[idx] = rho;
        }
    }

    /// Returns the bias-correction constant for this sketch's `m`.
    fn alpha(&self) -> f64 {
        let m = f64::from(self.num_registers());
        match self.num_registers() {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m),
        }
    }

    /// Estimates the cardinality represented by this sketch.
    ///
    /// Applies the small-range linear-counting correction when the raw
    /// estimate is at most `5m` and at least one register is still zero.
    /// No large-range correction is applied (see design notes).
    pub fn estimate(&self) -> f64 {
        let m = f64::from(self.num_registers());

        let mut sum = 0.0f64;
        let mut zeros = 0u32;
        for &r in &self.registers {
            sum += 2.0_f64.powi(-(i32::from(r)));
            if r == 0 {
                zeros += 1;
            }
        }

        let raw = self.alpha() * m * m / sum;

        if raw <= 5.0 * m && zeros > 0 {
            return m * (m / f64::from(zeros)).ln();
        }

        raw
    }

    /// Merges `other` into `self`, taking the register-wise maximum.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IncompatibleSketches`] if the two sketches
    /// have different precisions.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.p != other.p {
            return Err(PipelineError::IncompatibleSketches {
                p_a: self.p,
                m_a: self.num_registers(),
                p_b: other.p,
                m_b: other.num_registers(),
            });
        }
        for (slot, &other_reg) in self.registers.iter_mut().zip(other.registers.iter()) {
            if other_reg > *slot {
                *slot = other_reg;
            }
        }
        Ok(())
    }

    /// Returns a new sketch holding the register-wise union of `a` and `b`,
    /// leaving both inputs untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::IncompatibleSketches`] if precisions differ.
    pub fn union(a: &Self, b: &Self) -> Result<Self> {
        let mut out = a.clone();
        out.merge(b)?;
        Ok(out)
    }

    /// `true` if every register is still zero.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&r| r == 0)
    }

    /// Writes this sketch in the bit-exact `HLL1` wire format:
    /// `magic(4) | p(1) | m(4, LE) | M(m)`.
    pub fn save<W: Write>(&self, mut out: W) -> Result<()> {
        out.write_all(&MAGIC).map_err(io_open_anon)?;
        out.write_u8(self.p).map_err(io_open_anon)?;
        out.write_u32::<LittleEndian>(self.num_registers())
            .map_err(io_open_anon)?;
        out.write_all(&self.registers).map_err(io_open_anon)?;
        Ok(())
    }

    /// Writes this sketch to `path`, overwriting any existing file.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| PipelineError::IoOpen {
            path: path.to_path_buf(),
            source,
        })?;
        self.save(std::io::BufWriter::new(file))
    }

    /// Reads a sketch from the bit-exact `HLL1` wire format.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BadMagic`], [`PipelineError::BadPrecision`],
    /// [`PipelineError::InconsistentM`], or [`PipelineError::ShortRead`]
    /// according to which part of the format is violated. `path` is used
    /// only to produce informative errors.
    pub fn load<R: Read>(mut input: R, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut magic = [0u8; 4];
        read_exact_or_short(&mut input, &mut magic, &path, 4)?;
        if magic != MAGIC {
            return Err(PipelineError::BadMagic { path });
        }

        let mut p_buf = [0u8; 1];
        read_exact_or_short(&mut input, &mut p_buf, &path, 1)?;
        let p = p_buf[0];
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&p) {
            return Err(PipelineError::BadPrecision { precision: p });
        }

        let mut m_buf = [0u8; 4];
        read_exact_or_short(&mut input, &mut m_buf, &path, 4)?;
        let stored_m = u32::from_le_bytes(m_buf);
        let expected_m = 1u32 << p;
        if stored_m != expected_m {
            return Err(PipelineError::InconsistentM {
                path,
                p,
                stored_m,
                expected_m,
            });
        }

        let mut registers = vec![0u8; expected_m as usize];
        read_exact_or_short(&mut input, &mut registers, &path, expected_m as usize)?;

        Ok(HyperLogLog { p, registers })
    }

    /// Reads a sketch from the file at `path`.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| PipelineError::IoOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(std::io::BufReader::new(file), path)
    }

    /// Reads just the magic and precision byte of the sketch file at
    /// `path`, without loading its registers. Used to validate that a pool
    /// of candidate sketches is compatible before committing to a full
    /// load of any of them.
    pub fn peek_precision(path: impl AsRef<Path>) -> Result<u8> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| PipelineError::IoOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = std::io::BufReader::new(file);

        let mut magic = [0u8; 4];
        read_exact_or_short(&mut reader, &mut magic, path, 4)?;
        if magic != MAGIC {
            return Err(PipelineError::BadMagic {
                path: path.to_path_buf(),
            });
        }

        let mut p_buf = [0u8; 1];
        read_exact_or_short(&mut reader, &mut p_buf, path, 1)?;
        let p = p_buf[0];
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&p) {
            return Err(PipelineError::BadPrecision { precision: p });
        }
        Ok(p)
    }
}

fn read_exact_or_short<R: Read>(
    input: &mut R,
    buf: &mut [u8],
    path: &Path,
    expected: usize,
) -> Result<()> {
    let mut read = 0usize;
    while read < buf.len() {
        match input.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(PipelineError::IoOpen {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
    if read != buf.len() {
        return Err(PipelineError::ShortRead {
            path: path.to_path_buf(),
            expected,
            actual: read,
        });
    }
    Ok(())
}

/// Wraps a write-side I/O error with an unspecified path; callers writing
/// through [`HyperLogLog::save`] to an arbitrary `Write` (not necessarily a
/// file) attach the real path in [`HyperLogLog::save_to_path`].
fn io_open_anon(source: std::io::Error) -> PipelineError {
    PipelineError::IoOpen {
        path: PathBuf::new(),
        source,
    }
}
