//! The aligner seam and its match records.
//!
//! Every strategy stages a set of named references and a set of id'd
//! queries, hands them to an [`Aligner`], and gets back matches grouped by
//! gene and allele. The orchestrator never looks inside the aligner; it only
//! relies on each call being independent and safe to run concurrently with
//! disjoint inputs.

pub mod cigar;
pub mod scan;

use std::collections::HashMap;

use crate::error::Result;
pub use cigar::{Cigar, CigarOp};
pub use scan::ScanAligner;

/// Gene id -> allele id -> matches against that allele.
pub type AlignmentMap = HashMap<String, HashMap<String, Vec<ReadAlignment>>>;

/// One match of a read against one allele.
///
/// `query_start`/`query_end` are offsets into the full-length allele
/// sequence; a match computed against a trimmed allele window is translated
/// back before it reaches the result store. `read_start`/`read_end` are
/// offsets into the read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadAlignment {
    pub read_id: u32,
    pub gene_id: String,
    pub allele_id: String,
    pub reversed: bool,
    pub mismatches: u32,
    pub read_start: usize,
    pub read_end: usize,
    pub query_start: usize,
    pub query_end: usize,
    pub cigar: Cigar,
}

/// A blocking, CPU-bound alignment service.
///
/// `references` are `("gene.allele", sequence)` pairs; the name splits on
/// the first `.`. `queries` are `(read_id, sequence)` pairs. Implementations
/// must be re-entrant: many threads invoke `align` concurrently, each with
/// its own staged inputs.
pub trait Aligner: Sync {
    fn align(
        &self,
        references: &[(String, &[u8])],
        queries: &[(u32, &[u8])],
    ) -> Result<AlignmentMap>;
}

/// Fold `src` into `dst`, appending match lists per gene/allele.
pub fn merge_maps(dst: &mut AlignmentMap, src: AlignmentMap) {
    for (gene, alleles) in src {
        let gene_entry = dst.entry(gene).or_default();
        for (allele, mut matches) in alleles {
            gene_entry.entry(allele).or_default().append(&mut matches);
        }
    }
}
