//! Bundled ungapped scan aligner.
//!
//! Slides every query along every reference on both strands, counting
//! mismatches with early abandon, and reports each full-containment
//! placement within the mismatch budget. Good enough to localize reads on
//! near-identical allele variants; anything fancier plugs in behind the
//! [`Aligner`](super::Aligner) trait.
//!
//! Per-query work is data-parallel via rayon; each worker thread's call
//! shares the global pool.

use rayon::prelude::*;

use super::{merge_maps, AlignmentMap, Cigar, CigarOp, ReadAlignment};
use crate::error::{Error, Result};

pub struct ScanAligner {
    max_mismatches: u32,
}

impl ScanAligner {
    /// Matches with more than `max_mismatches` mismatching bases are dropped.
    pub fn new(max_mismatches: u32) -> Self {
        Self { max_mismatches }
    }

    fn placements(
        &self,
        read_id: u32,
        read: &[u8],
        reversed: bool,
        gene: &str,
        allele: &str,
        target: &[u8],
    ) -> Vec<ReadAlignment> {
        let mut matches = Vec::new();
        if read.is_empty() || read.len() > target.len() {
            return matches;
        }
        for offset in 0..=target.len() - read.len() {
            let window = &target[offset..offset + read.len()];
            let mut mismatches = 0u32;
            for (a, b) in read.iter().zip(window) {
                if a != b {
                    mismatches += 1;
                    if mismatches > self.max_mismatches {
                        break;
                    }
                }
            }
            if mismatches <= self.max_mismatches {
                matches.push(ReadAlignment {
                    read_id,
                    gene_id: gene.to_string(),
                    allele_id: allele.to_string(),
                    reversed,
                    mismatches,
                    read_start: 0,
                    read_end: read.len(),
                    query_start: offset,
                    query_end: offset + read.len(),
                    cigar: Cigar::single(read.len() as u32, CigarOp::M),
                });
            }
        }
        matches
    }
}

impl Default for ScanAligner {
    fn default() -> Self {
        // The classic short-read mismatch budget.
        Self::new(5)
    }
}

impl super::Aligner for ScanAligner {
    fn align(
        &self,
        references: &[(String, &[u8])],
        queries: &[(u32, &[u8])],
    ) -> Result<AlignmentMap> {
        let references: Vec<(&str, &str, &[u8])> = references
            .iter()
            .map(|(name, seq)| {
                let (gene, allele) = name.split_once('.').ok_or_else(|| {
                    Error::aligner(format!(
                        "reference name {name:?} is missing the `gene.allele` separator"
                    ))
                })?;
                Ok((gene, allele, *seq))
            })
            .collect::<Result<_>>()?;

        let per_query: Vec<AlignmentMap> = queries
            .par_iter()
            .map(|&(read_id, read)| {
                let mut local = AlignmentMap::new();
                let revcomp = reverse_complement(read);
                for &(gene, allele, target) in &references {
                    for (seq, reversed) in [(read, false), (revcomp.as_slice(), true)] {
                        let found = self.placements(read_id, seq, reversed, gene, allele, target);
                        if !found.is_empty() {
                            local
                                .entry(gene.to_string())
                                .or_default()
                                .entry(allele.to_string())
                                .or_default()
                                .extend(found);
                        }
                    }
                }
                local
            })
            .collect();

        let mut merged = AlignmentMap::new();
        for local in per_query {
            merge_maps(&mut merged, local);
        }
        Ok(merged)
    }
}

fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

const fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        _ => b'N',
    }
}

#[cfg(test)]
mod tests {
    use super::super::Aligner;
    use super::*;

    fn refs(entries: &[(&str, &[u8])]) -> Vec<(String, &'static [u8])> {
        // Leaking keeps the fixture signatures simple.
        entries
            .iter()
            .map(|&(name, seq)| (name.to_string(), &*Box::leak(seq.to_vec().into_boxed_slice())))
            .collect()
    }

    #[test]
    fn finds_exact_forward_placements() {
        let aligner = ScanAligner::new(0);
        let references = refs(&[("G.001", b"ACGTACGT")]);
        let results = aligner.align(&references, &[(0, b"ACGT")]).unwrap();
        let matches = &results["G"]["001"];
        let starts: Vec<usize> = matches
            .iter()
            .filter(|m| !m.reversed)
            .map(|m| m.query_start)
            .collect();
        assert_eq!(starts, vec![0, 4]);
        assert_eq!(matches[0].cigar.to_string(), "4M");
    }

    #[test]
    fn reverse_strand_hits_are_flagged() {
        let aligner = ScanAligner::new(0);
        // Reverse complement of TTACGG is CCGTAA.
        let references = refs(&[("G.001", b"AACCGTAAGG")]);
        let results = aligner.align(&references, &[(3, b"TTACGG")]).unwrap();
        let matches = &results["G"]["001"];
        assert_eq!(matches.len(), 1);
        assert!(matches[0].reversed);
        assert_eq!(matches[0].query_start, 2);
        assert_eq!(matches[0].query_end, 8);
    }

    #[test]
    fn mismatch_budget_is_enforced() {
        let references = refs(&[("G.001", b"AAAATTTT")]);
        let strict = ScanAligner::new(0);
        assert!(strict.align(&references, &[(0, b"AAAT")]).unwrap().is_empty());
        let lenient = ScanAligner::new(1);
        let results = lenient.align(&references, &[(0, b"AAAT")]).unwrap();
        assert!(results["G"]["001"].iter().any(|m| m.mismatches == 1));
    }

    #[test]
    fn query_longer_than_reference_yields_nothing() {
        let aligner = ScanAligner::new(5);
        let references = refs(&[("G.001", b"ACG")]);
        assert!(aligner.align(&references, &[(0, b"ACGTACGT")]).unwrap().is_empty());
    }

    #[test]
    fn bad_reference_name_is_an_aligner_error() {
        let aligner = ScanAligner::default();
        let references = refs(&[("no-separator", b"ACGT")]);
        assert!(matches!(
            aligner.align(&references, &[(0, b"ACGT")]),
            Err(Error::Aligner { .. })
        ));
    }
}
