//! Alignment strategies and the worker pool driving them.
//!
//! All three strategies run identically shaped worker bodies: claim work
//! from the shared cursor, stage a minimal input set, invoke the aligner,
//! merge into the result store, advance progress. `naive` aligns every read
//! against full-length alleles in gene chunks; `categorical` and `regional`
//! first localize reads with a representative-allele pass, then refine per
//! gene — `categorical` by read subset, `regional` by read subset and
//! trimmed coordinate window.

pub mod categorical;
pub mod naive;
pub mod regional;

use std::str::FromStr;
use std::thread;

use crate::aligner::{Aligner, AlignmentMap};
use crate::database::{GeneMap, ReadRegistry};
use crate::error::Result;
use crate::progress::{self, ProgressTracker};
use crate::sampler;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    Naive,
    Categorical,
    Regional,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Categorical => "categorical",
            Self::Regional => "regional",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "naive" => Ok(Self::Naive),
            "categorical" => Ok(Self::Categorical),
            "regional" => Ok(Self::Regional),
            other => Err(format!(
                "unknown strategy {other:?} (expected naive, categorical, or regional)"
            )),
        }
    }
}

/// Orchestrator configuration, decoupled from any CLI grammar.
#[derive(Clone, Debug)]
pub struct AlignConfig {
    pub strategy: Strategy,
    /// Representative alleles sampled per gene for the first pass.
    pub num_representatives: usize,
    /// Also pull each first-pass read's mate into the second pass.
    pub include_pair: bool,
    /// Worker thread count.
    pub threads: usize,
    /// Regions with fewer reads fold into the catch-all.
    pub min_reads_per_region: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Regional,
            num_representatives: 1,
            include_pair: false,
            threads: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            min_reads_per_region: 3,
        }
    }
}

/// Run the configured strategy to completion and return the merged results.
///
/// The database and read registry are read-only and shared by all workers;
/// the strategy is fixed for the whole invocation.
pub fn run<A: Aligner>(
    database: &GeneMap,
    reads: &ReadRegistry,
    aligner: &A,
    config: &AlignConfig,
) -> Result<AlignmentMap> {
    match config.strategy {
        Strategy::Naive => naive::run(database, reads, aligner, config),
        Strategy::Categorical => {
            let first_pass = first_pass(database, reads, aligner, config)?;
            categorical::run(database, reads, aligner, &first_pass, config)
        }
        Strategy::Regional => {
            let first_pass = first_pass(database, reads, aligner, config)?;
            regional::run(database, reads, aligner, &first_pass, config)
        }
    }
}

/// Localization pass: align every read against sampled representative
/// alleles. One aligner call, before any worker spawns.
pub fn first_pass<A: Aligner>(
    database: &GeneMap,
    reads: &ReadRegistry,
    aligner: &A,
    config: &AlignConfig,
) -> Result<AlignmentMap> {
    log::info!(
        "Extracting {} representative allele(s) per gene",
        config.num_representatives
    );
    let representatives = sampler::sample(database, config.num_representatives)?;
    let references: Vec<(String, &[u8])> = representatives
        .iter()
        .map(|(name, seq)| (name.clone(), seq.as_slice()))
        .collect();
    let queries = stage_all_reads(reads);
    log::info!("Performing initial alignment with representative alleles");
    let results = aligner.align(&references, &queries)?;
    log::info!("First pass localized {} gene(s)", results.len());
    Ok(results)
}

/// Spawn `threads` workers running `body` plus the progress reporter, join
/// everything, and surface the first worker error.
fn run_workers<F>(threads: usize, tracker: &ProgressTracker, body: F) -> Result<()>
where
    F: Fn() -> Result<()> + Sync,
{
    thread::scope(|scope| {
        let body = &body;
        let handles: Vec<_> = (0..threads).map(|_| scope.spawn(move || body())).collect();
        scope.spawn(|| progress::report(tracker));

        let mut outcome = Ok(());
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if outcome.is_ok() {
                        outcome = Err(e);
                    }
                }
                Err(payload) => {
                    tracker.halt();
                    std::panic::resume_unwind(payload);
                }
            }
        }
        // A failed worker leaves the counter short of the total; the
        // reporter must not keep polling for it.
        tracker.halt();
        outcome
    })
}

fn stage_all_reads(reads: &ReadRegistry) -> Vec<(u32, &[u8])> {
    reads
        .iter()
        .enumerate()
        .map(|(id, seq)| (id as u32, seq.as_slice()))
        .collect()
}

/// Overlap slack for region clustering: reads are assumed uniform length,
/// so any read's length works.
pub(crate) fn region_buffer(reads: &ReadRegistry) -> usize {
    reads.first().map(|r| r.len() * 100).unwrap_or(0)
}

/// Ordered snapshot of keys for the cursor.
pub(crate) fn sorted_keys<V>(map: &std::collections::HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort_unstable();
    keys
}
