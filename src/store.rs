// Shared result store: gene -> allele -> matches, behind one coarse lock.
//
// Workers merge whole aligner result maps in a single short critical
// section; match-list order across threads is unspecified and nothing may
// depend on it. Insertion order within one merge call is preserved.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::aligner::{merge_maps, AlignmentMap, ReadAlignment};

#[derive(Default)]
pub struct ResultStore {
    inner: Mutex<AlignmentMap>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an aligner result map verbatim.
    pub fn merge(&self, results: AlignmentMap) {
        merge_maps(&mut self.inner.lock().unwrap(), results);
    }

    /// Merge one gene's allele map verbatim.
    pub fn merge_gene(&self, gene: &str, alleles: HashMap<String, Vec<ReadAlignment>>) {
        let mut inner = self.inner.lock().unwrap();
        let gene_entry = inner.entry(gene.to_string()).or_default();
        for (allele, mut matches) in alleles {
            gene_entry.entry(allele).or_default().append(&mut matches);
        }
    }

    /// Append remapped matches under one gene/allele.
    pub fn push(&self, gene: &str, allele: &str, mut matches: Vec<ReadAlignment>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .entry(gene.to_string())
            .or_default()
            .entry(allele.to_string())
            .or_default()
            .append(&mut matches);
    }

    pub fn into_map(self) -> AlignmentMap {
        self.inner.into_inner().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{Cigar, CigarOp};

    fn record(read_id: u32) -> ReadAlignment {
        ReadAlignment {
            read_id,
            gene_id: "G".to_string(),
            allele_id: "001".to_string(),
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
    fn concurrent_merges_keep_every_match() {
        let store = ResultStore::new();
        std::thread::scope(|s| {
            for t in 0..8u32 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..50 {
                        store.push("G", "001", vec![record(t * 50 + i)]);
                    }
                });
            }
        });
        let map = store.into_map();
        assert_eq!(map["G"]["001"].len(), 400);
    }

    #[test]
    fn merge_gene_appends_to_existing_lists() {
        let store = ResultStore::new();
        store.push("G", "001", vec![record(0)]);
        let mut alleles = HashMap::new();
        alleles.insert("001".to_string(), vec![record(1)]);
        alleles.insert("002".to_string(), vec![record(2)]);
        store.merge_gene("G", alleles);
        let map = store.into_map();
        assert_eq!(map["G"]["001"].len(), 2);
        assert_eq!(map["G"]["002"].len(), 1);
    }
}
