// Flat alignment record stream: the persisted form of a result store.
//
// One tab-separated line per match: read_id, gene_id, allele_id, strand
// flag (1 = reverse), mismatch count, read_start, read_end, query_start,
// query_end, edit script. Written in sorted (gene, allele) order so output
// is stable across runs; read back with optional filters for reporting.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::aligner::{AlignmentMap, ReadAlignment};
use crate::error::{Error, Result};

/// Serialize a result map as the flat record stream.
pub fn write_alignments<W: Write>(results: &AlignmentMap, writer: &mut W) -> io::Result<()> {
    let mut genes: Vec<&String> = results.keys().collect();
    genes.sort_unstable();
    for gene in genes {
        let alleles = &results[gene];
        let mut allele_ids: Vec<&String> = alleles.keys().collect();
        allele_ids.sort_unstable();
        for allele in allele_ids {
            for hit in &alleles[allele] {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    hit.read_id,
                    hit.gene_id,
                    hit.allele_id,
                    if hit.reversed { 1 } else { 0 },
                    hit.mismatches,
                    hit.read_start,
                    hit.read_end,
                    hit.query_start,
                    hit.query_end,
                    hit.cigar
                )?;
            }
        }
    }
    Ok(())
}

/// Filters for re-reading a record stream. `limit` caps the number of
/// matching records returned.
#[derive(Clone, Debug, Default)]
pub struct ReportFilter {
    pub read_id: Option<u32>,
    pub gene_id: Option<String>,
    pub allele_id: Option<String>,
    pub limit: Option<usize>,
}

impl ReportFilter {
    fn accepts(&self, hit: &ReadAlignment) -> bool {
        self.read_id.map_or(true, |id| hit.read_id == id)
            && self.gene_id.as_deref().map_or(true, |g| hit.gene_id == g)
            && self.allele_id.as_deref().map_or(true, |a| hit.allele_id == a)
    }
}

/// Read a previously written record stream, returning the records that pass
/// `filter`, up to its limit.
pub fn scan_alignments(path: &Path, filter: &ReportFilter) -> Result<Vec<ReadAlignment>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        if filter.limit.is_some_and(|limit| records.len() >= limit) {
            break;
        }
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let record = parse_record(&line)?;
        if filter.accepts(&record) {
            records.push(record);
        }
    }
    Ok(records)
}

fn parse_record(line: &str) -> Result<ReadAlignment> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 10 {
        return Err(Error::format(format!(
            "alignment record has {} field(s), expected 10",
            fields.len()
        )));
    }
    let parse_int = |field: &str, what: &str| {
        field
            .parse()
            .map_err(|_| Error::format(format!("bad {what} {field:?} in alignment record")))
    };
    Ok(ReadAlignment {
        read_id: parse_int(fields[0], "read id")? as u32,
        gene_id: fields[1].to_string(),
        allele_id: fields[2].to_string(),
        reversed: fields[3] == "1",
        mismatches: parse_int(fields[4], "mismatch count")? as u32,
        read_start: parse_int(fields[5], "read start")?,
        read_end: parse_int(fields[6], "read end")?,
        query_start: parse_int(fields[7], "query start")?,
        query_end: parse_int(fields[8], "query end")?,
        cigar: fields[9].parse()?,
    })
}

/// Human-readable block form of one record, one field per line.
pub fn print_alignment<W: Write>(hit: &ReadAlignment, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Read ID: {}", hit.read_id)?;
    writeln!(writer, "Gene ID: {}", hit.gene_id)?;
    writeln!(writer, "Allele ID: {}", hit.allele_id)?;
    writeln!(writer, "Reversed: {}", if hit.reversed { "Yes" } else { "No" })?;
    writeln!(writer, "Mismatches: {}", hit.mismatches)?;
    writeln!(writer, "Read Start: {}", hit.read_start)?;
    writeln!(writer, "Read End: {}", hit.read_end)?;
    writeln!(writer, "Query Start: {}", hit.query_start)?;
    writeln!(writer, "Query End: {}", hit.query_end)?;
    writeln!(writer, "CIGAR: {}", hit.cigar)?;
    writeln!(writer)
}
