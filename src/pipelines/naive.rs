// Naive strategy: no first pass. Workers claim gene chunks and align the
// entire read set against every full-length allele in the chunk, one
// aligner call per chunk. Results merge verbatim; full-length references
// mean no coordinate remapping.

use super::{run_workers, sorted_keys, stage_all_reads, AlignConfig};
use crate::aligner::{Aligner, AlignmentMap};
use crate::cursor::GeneCursor;
use crate::database::{GeneMap, ReadRegistry};
use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::store::ResultStore;

pub fn run<A: Aligner>(
    database: &GeneMap,
    reads: &ReadRegistry,
    aligner: &A,
    config: &AlignConfig,
) -> Result<AlignmentMap> {
    log::info!(
        "Performing naive alignment on {} gene(s) with {} thread(s)",
        database.len(),
        config.threads
    );
    let cursor = GeneCursor::new(sorted_keys(database), config.threads);
    let tracker = ProgressTracker::new(database.len());
    let store = ResultStore::new();
    run_workers(config.threads, &tracker, || {
        worker(database, reads, aligner, &cursor, &store, &tracker)
    })?;
    Ok(store.into_map())
}

pub fn worker<A: Aligner>(
    database: &GeneMap,
    reads: &ReadRegistry,
    aligner: &A,
    cursor: &GeneCursor<String>,
    store: &ResultStore,
    tracker: &ProgressTracker,
) -> Result<()> {
    let queries = stage_all_reads(reads);
    loop {
        let chunk = cursor.claim_chunk();
        if chunk.is_empty() {
            break;
        }
        let mut references: Vec<(String, &[u8])> = Vec::new();
        for gene in &chunk {
            if let Some(alleles) = database.get(gene) {
                for (allele, seq) in alleles {
                    references.push((format!("{gene}.{allele}"), seq));
                }
            }
        }
        let results = aligner.align(&references, &queries)?;
        store.merge(results);
        tracker.advance(chunk.len());
    }
    Ok(())
}
