// Regional strategy: one gene per claim, refined region by region. Each
// allele's first-pass hits are clustered into buffered coordinate regions;
// every surviving region stages exactly its reads against all of the gene's
// alleles trimmed to the region window, and returned matches are translated
// back into full-length allele coordinates before merging. Narrowing both
// the reference window and the read subset keeps aligner cost proportional
// to local match density.

use super::{region_buffer, run_workers, sorted_keys, AlignConfig};
use crate::aligner::{Aligner, AlignmentMap, ReadAlignment};
use crate::cursor::GeneCursor;
use crate::database::{GeneMap, ReadRegistry};
use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::region::{cluster_regions, Region};
use crate::store::ResultStore;

pub fn run<A: Aligner>(
    database: &GeneMap,
    reads: &ReadRegistry,
    aligner: &A,
    first_pass: &AlignmentMap,
    config: &AlignConfig,
) -> Result<AlignmentMap> {
    log::info!(
        "Performing regional alignment on {} gene(s) with {} thread(s)",
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
            config,
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
    config: &AlignConfig,
) -> Result<()> {
    let buffer = region_buffer(reads);
    while let Some(gene) = cursor.claim_one() {
        if let (Some(alleles), Some(hits)) = (database.get(&gene), first_pass.get(&gene)) {
            for matches in hits.values() {
                let regions = cluster_regions(
                    matches,
                    buffer,
                    config.include_pair,
                    config.min_reads_per_region,
                );
                for region in &regions {
                    if region.is_empty() {
                        continue;
                    }
                    align_region(&gene, alleles, reads, aligner, region, store)?;
                }
            }
        }
        tracker.advance(1);
    }
    Ok(())
}

/// Second pass for one region: trimmed references, region reads, remapped
/// results. Zero hits is a valid outcome and contributes nothing.
fn align_region<A: Aligner>(
    gene: &str,
    alleles: &std::collections::HashMap<String, Vec<u8>>,
    reads: &ReadRegistry,
    aligner: &A,
    region: &Region,
    store: &ResultStore,
) -> Result<()> {
    let queries: Vec<(u32, &[u8])> = region
        .reads
        .iter()
        .filter_map(|&id| reads.get(id as usize).map(|seq| (id, seq.as_slice())))
        .collect();
    if queries.is_empty() {
        return Ok(());
    }
    let references: Vec<(String, &[u8])> = alleles
        .iter()
        .map(|(allele, seq)| {
            let start = region.start.min(seq.len().saturating_sub(1));
            let end = region.end.min(seq.len());
            (format!("{gene}.{allele}"), &seq[start..end])
        })
        .collect();
    let mut results = aligner.align(&references, &queries)?;
    if let Some(allele_hits) = results.remove(gene) {
        for (allele, mut matches) in allele_hits {
            let full_len = alleles.get(&allele).map(|seq| seq.len()).unwrap_or(0);
            for hit in &mut matches {
                remap(hit, region.start, full_len);
            }
            store.push(gene, &allele, matches);
        }
    }
    Ok(())
}

/// Translate a match against a trimmed allele window back into full-length
/// allele coordinates.
fn remap(hit: &mut ReadAlignment, region_start: usize, full_len: usize) {
    hit.query_start += region_start;
    hit.query_end = (hit.query_end + region_start).min(full_len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{Cigar, CigarOp};

    fn window_hit(query_start: usize, query_end: usize) -> ReadAlignment {
        ReadAlignment {
            read_id: 0,
            gene_id: "G".to_string(),
            allele_id: "001".to_string(),
            reversed: false,
            mismatches: 0,
            read_start: 0,
            read_end: query_end - query_start,
            query_start,
            query_end,
            cigar: Cigar::single((query_end - query_start) as u32, CigarOp::M),
        }
    }

    // qs' = qs + s, qe' = min(qe + s, L), and qs' <= qe' <= L.
    #[test]
    fn remap_translates_into_full_coordinates() {
        let mut hit = window_hit(3, 10);
        remap(&mut hit, 50, 1000);
        assert_eq!(hit.query_start, 53);
        assert_eq!(hit.query_end, 60);

        let mut clipped = window_hit(3, 10);
        remap(&mut clipped, 995, 1000);
        assert_eq!(clipped.query_start, 998);
        assert_eq!(clipped.query_end, 1000);
        assert!(clipped.query_start <= clipped.query_end);
        assert!(clipped.query_end <= 1000);
    }
}
