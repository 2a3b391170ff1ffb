// Sequence database and read registry loading.
//
// Reference records are named `gene.allele`; the part before the first `.`
// keys the gene, the rest keys the allele within it. Reads get dense integer
// ids (0, 1, 2, ...) in input order, so interleaved paired-end files put
// mates at ids 2k and 2k+1. Both loaders auto-detect gzip by extension, the
// same way the FASTQ path does elsewhere; record parsing itself is delegated
// to `bio`.

use bio::io::{fasta, fastq};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Gene id -> allele id -> nucleotide sequence. Read-only after load.
pub type GeneMap = HashMap<String, HashMap<String, Vec<u8>>>;

/// Read sequences indexed by read id. Read-only after load.
pub type ReadRegistry = Vec<Vec<u8>>;

/// Mate id of a read in an interleaved paired-end layout: flips the low bit,
/// mapping 2k <-> 2k+1. Involution for every id.
#[inline]
pub const fn pair_id(read_id: u32) -> u32 {
    read_id ^ 1
}

fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

fn is_fastq(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = name.strip_suffix(".gz").unwrap_or(name);
    stem.ends_with(".fq") || stem.ends_with(".fastq")
}

/// Load the gene/allele database from a (possibly gzipped) FASTA file.
///
/// Fails with `Format` when a record name lacks the `gene.allele` separator.
/// Duplicate allele names silently overwrite, matching load order.
pub fn load_database(path: &Path) -> Result<GeneMap> {
    let reader = fasta::Reader::new(open_maybe_gz(path)?);
    let mut genes: GeneMap = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let name = record.id();
        let (gene, allele) = name.split_once('.').ok_or_else(|| {
            Error::format(format!(
                "record name {name:?} is missing the `gene.allele` separator"
            ))
        })?;
        genes
            .entry(gene.to_string())
            .or_default()
            .insert(allele.to_string(), record.seq().to_ascii_uppercase());
    }
    Ok(genes)
}

/// Load reads from a (possibly gzipped) FASTA or FASTQ file, assigning ids
/// in input order.
pub fn load_reads(path: &Path) -> Result<ReadRegistry> {
    let input = open_maybe_gz(path)?;
    let mut reads = Vec::new();
    if is_fastq(path) {
        for record in fastq::Reader::new(input).records() {
            let record = record.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            reads.push(record.seq().to_ascii_uppercase());
        }
    } else {
        for record in fasta::Reader::new(input).records() {
            let record = record.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            reads.push(record.seq().to_ascii_uppercase());
        }
    }
    Ok(reads)
}
