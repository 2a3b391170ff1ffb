// Region clustering for the regional strategy.
//
// First-pass hits on one allele are folded into a minimal set of clusters:
// two regions belong together iff their buffered intervals overlap. That
// relation is not transitive before folding, so clustering is a left-to-right
// linear scan against the regions built so far, never a map keyed on region
// equality. Regions that stay under the read threshold are swept into one
// shared catch-all, which is appended last and processed like any other
// region.

use std::collections::BTreeSet;

use crate::aligner::ReadAlignment;
use crate::database::pair_id;

/// A half-open interval `[start, end)` over one allele's coordinate space,
/// plus the reads assigned to it. The buffer radius widens the interval for
/// overlap tests only; `start`/`end` stay in raw allele coordinates.
#[derive(Clone, Debug)]
pub struct Region {
    pub start: usize,
    pub end: usize,
    buffer: usize,
    pub reads: BTreeSet<u32>,
}

impl Region {
    pub fn new(start: usize, end: usize, buffer: usize) -> Self {
        Self {
            start,
            end,
            buffer,
            reads: BTreeSet::new(),
        }
    }

    /// The empty catch-all sentinel: `[+inf, 0)` collapses to a real span on
    /// the first merge.
    pub fn catch_all(buffer: usize) -> Self {
        Self::new(usize::MAX, 0, buffer)
    }

    pub fn add_read(&mut self, read_id: u32) {
        self.reads.insert(read_id);
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Buffered-interval overlap: `[a-buf, b+buf)` intersects `[c-buf, d+buf)`.
    /// Never called on the catch-all sentinel.
    pub fn overlaps(&self, other: &Region) -> bool {
        let a0 = self.start.saturating_sub(self.buffer);
        let a1 = self.end.saturating_add(self.buffer);
        let b0 = other.start.saturating_sub(other.buffer);
        let b1 = other.end.saturating_add(other.buffer);
        a0 < b1 && b0 < a1
    }

    /// Union of read sets; the interval becomes the enclosing span of both.
    pub fn merge(&mut self, other: &Region) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
        self.reads.extend(&other.reads);
    }
}

/// Cluster one allele's first-pass matches into regions.
///
/// `buffer` is the overlap slack (read length x 100, computed by the
/// orchestrator). Regions with fewer than `min_reads` reads are folded into
/// the catch-all, which is always appended last; callers skip regions whose
/// read set is empty.
pub fn cluster_regions(
    matches: &[ReadAlignment],
    buffer: usize,
    include_pair: bool,
    min_reads: usize,
) -> Vec<Region> {
    let mut regions: Vec<Region> = Vec::new();
    for hit in matches {
        let mut candidate = Region::new(hit.query_start, hit.query_end, buffer);
        candidate.add_read(hit.read_id);
        if include_pair {
            candidate.add_read(pair_id(hit.read_id));
        }
        match regions.iter_mut().find(|r| r.overlaps(&candidate)) {
            Some(existing) => existing.merge(&candidate),
            None => regions.push(candidate),
        }
    }

    let mut catch_all = Region::catch_all(buffer);
    let mut kept = Vec::with_capacity(regions.len() + 1);
    for region in regions {
        if region.reads.len() < min_reads {
            catch_all.merge(&region);
        } else {
            kept.push(region);
        }
    }
    kept.push(catch_all);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::{Cigar, CigarOp};

    fn hit(read_id: u32, query_start: usize, query_end: usize) -> ReadAlignment {
        ReadAlignment {
            read_id,
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

    #[test]
    fn overlap_is_symmetric() {
        let a = Region::new(0, 100, 10);
        let b = Region::new(105, 200, 10);
        let c = Region::new(500, 600, 10);
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));
    }

    // A-B overlap and B-C overlap puts all three in one region even when
    // A and C do not overlap directly, because merging grows the span.
    #[test]
    fn chained_overlaps_merge_transitively() {
        let matches = vec![hit(0, 0, 10), hit(1, 15, 25), hit(2, 30, 40)];
        let regions = cluster_regions(&matches, 10, false, 1);
        // One merged region plus the empty catch-all.
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].start, 0);
        assert_eq!(regions[0].end, 40);
        assert_eq!(regions[0].reads, BTreeSet::from([0, 1, 2]));
        assert!(regions[1].is_empty());
    }

    #[test]
    fn merging_preserves_the_read_set() {
        let matches = vec![
            hit(0, 0, 10),
            hit(2, 5, 15),
            hit(4, 1000, 1010),
            hit(6, 5000, 5010),
        ];
        for include_pair in [false, true] {
            let regions = cluster_regions(&matches, 20, include_pair, 2);
            let mut all_reads = BTreeSet::new();
            let mut total = 0;
            for region in &regions {
                total += region.reads.len();
                all_reads.extend(&region.reads);
            }
            let mut expected = BTreeSet::new();
            for m in &matches {
                expected.insert(m.read_id);
                if include_pair {
                    expected.insert(pair_id(m.read_id));
                }
            }
            assert_eq!(all_reads, expected);
            assert_eq!(total, all_reads.len(), "a read landed in two regions");
        }
    }

    #[test]
    fn sparse_regions_fold_into_the_catch_all() {
        // Two overlapping hits cluster; one isolated hit stays under the
        // threshold and moves to the catch-all.
        let matches = vec![hit(0, 0, 10), hit(1, 5, 15), hit(2, 10_000, 10_010)];
        let regions = cluster_regions(&matches, 10, false, 2);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].reads, BTreeSet::from([0, 1]));
        let catch_all = regions.last().unwrap();
        assert_eq!(catch_all.reads, BTreeSet::from([2]));
        assert_eq!(catch_all.start, 10_000);
        assert_eq!(catch_all.end, 10_010);
    }

    #[test]
    fn catch_all_is_empty_when_every_region_survives() {
        let matches = vec![hit(0, 0, 10), hit(1, 2, 12)];
        let regions = cluster_regions(&matches, 5, false, 2);
        assert_eq!(regions.len(), 2);
        assert!(regions.last().unwrap().is_empty());
    }

    #[test]
    fn pair_inclusion_adds_mates() {
        let matches = vec![hit(4, 0, 10)];
        let regions = cluster_regions(&matches, 5, true, 1);
        assert_eq!(regions[0].reads, BTreeSet::from([4, 5]));
    }
}
