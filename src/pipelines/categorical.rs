// Categorical strategy: one gene per claim. The second pass stages only the
// reads that hit any of the gene's representatives in the first pass (plus
// mates when pair inclusion is on) against the gene's full allele set.
// Full-length references, so results merge verbatim. A gene whose second
// pass comes back empty is a valid outcome: its first-pass reads were false
// positives, and progress still advances.

use std::collections::BTreeSet;

use super::{run_workers, sorted_keys, AlignConfig};
use crate::aligner::{Aligner, AlignmentMap};
use crate::cursor::GeneCursor;
use crate::database::{pair_id, GeneMap, ReadRegistry};
use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::store::ResultStore;

pub fn run<A: Aligner>(
    database: &GeneMap,
    reads: &ReadRegistry,
    aligner: &A,
    first_pass: &AlignmentMap,
    config: &AlignConfig,
) -> Result<AlignmentMap> {
    log::info!(
        "Performing categorical alignment on {} gene(s) with {} thread(s)",
        first_pass.len(),
        config.threads
    );
    let cursor = GeneCursor::new(sorted_keys(first_pass), config.threads);
    let tracker = ProgressTracker::new(first_pass.len());
    let store = ResultStore::new();
    run_workers(config.threads, &tracker, || {
        worker(
            database,
            reads,
            aligner,
            first_pass,
            &cursor,
            &store,
            &tracker,
            config.include_pair,
        )
    })?;
    Ok(store.into_map())
}

#[allow(clippy::too_many_arguments)]
pub fn worker<A: Aligner>(
    database: &GeneMap,
    reads: &ReadRegistry,
    aligner: &A,
    first_pass: &AlignmentMap,
    cursor: &GeneCursor<String>,
    store: &ResultStore,
    tracker: &ProgressTracker,
    include_pair: bool,
) -> Result<()> {
    while let Some(gene) = cursor.claim_one() {
        if let Some(alleles) = database.get(&gene) {
            let read_ids = first_pass_reads(first_pass, &gene, include_pair);
            let queries: Vec<(u32, &[u8])> = read_ids
                .iter()
                .filter_map(|&id| reads.get(id as usize).map(|seq| (id, seq.as_slice())))
                .collect();
            let references: Vec<(String, &[u8])> = alleles
                .iter()
                .map(|(allele, seq)| (format!("{gene}.{allele}"), seq.as_slice()))
                .collect();
            let mut results = aligner.align(&references, &queries)?;
            if let Some(allele_hits) = results.remove(&gene) {
                store.merge_gene(&gene, allele_hits);
            }
        }
        tracker.advance(1);
    }
    Ok(())
}

/// Ids of every read that matched any allele of `gene` in the first pass.
fn first_pass_reads(first_pass: &AlignmentMap, gene: &str, include_pair: bool) -> BTreeSet<u32> {
    let mut read_ids = BTreeSet::new();
    if let Some(alleles) = first_pass.get(gene) {
        for matches in alleles.values() {
            for hit in matches {
                read_ids.insert(hit.read_id);
                if include_pair {
                    read_ids.insert(pair_id(hit.read_id));
                }
            }
        }
    }
    read_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{Cigar, CigarOp, ReadAlignment};

    fn hit(read_id: u32, allele: &str) -> ReadAlignment {
        ReadAlignment {
            read_id,
            gene_id: "G".to_string(),
            allele_id: allele.to_string(),
            reversed: false,
            mismatches: 0,
            read_start: 0,
            read_end: 4,
            query_start: 0,
            query_end: 4,
            cigar: Cigar::single(4, CigarOp::M),
        }
    }

    #[test]
    fn collects_reads_across_alleles_without_duplicates() {
        let mut first_pass = AlignmentMap::new();
        let gene = first_pass.entry("G".to_string()).or_default();
        gene.insert("001".to_string(), vec![hit(0, "001"), hit(2, "001")]);
        gene.insert("002".to_string(), vec![hit(2, "002"), hit(5, "002")]);

        let ids = first_pass_reads(&first_pass, "G", false);
        assert_eq!(ids, BTreeSet::from([0, 2, 5]));

        let with_pairs = first_pass_reads(&first_pass, "G", true);
        assert_eq!(with_pairs, BTreeSet::from([0, 1, 2, 3, 4, 5]));
    }
}
