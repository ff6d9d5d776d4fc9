//! FASTA parsing: split a multi-contig file into `(header, sequence)` pairs.
//!
//! Header lines begin with `>`; everything else is sequence, concatenated
//! across lines within one contig (whitespace stripped) until the next
//! header or end of file. Contigs are never joined across a header
//! boundary.

use std::io::BufRead;

/// One FASTA contig: its header line (without the leading `>`) and its
/// concatenated, whitespace-stripped sequence bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    /// Header text following the `>` marker.
    pub header: String,
    /// Concatenated sequence bytes for this contig.
    pub sequence: Vec<u8>,
}

/// Reads every contig out of a FASTA source.
///
/// Blank lines are skipped. A contig with an empty sequence (e.g. a header
/// immediately followed by another header) is not emitted, matching the
/// original parser, which never emits a header-only contig.
pub fn read_contigs<R: BufRead>(reader: R) -> std::io::Result<Vec<Contig>> {
    let mut contigs = Vec::new();
    let mut current_header: Option<String> = None;
    let mut current_seq = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('>') {
            if !current_seq.is_empty() {
                contigs.push(Contig {
                    header: current_header.take().unwrap_or_default(),
                    sequence: std::mem::take(&mut current_seq),
                });
            }
            current_header = Some(rest.to_string());
        } else {
            current_seq.extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }
    }
    if !current_seq.is_empty() {
        contigs.push(Contig {
            header: current_header.unwrap_or_default(),
            sequence: current_seq,
        });
    }
    Ok(contigs)
}
