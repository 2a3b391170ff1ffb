//! Multi-strategy short-read alignment against databases of highly
//! polymorphic, multi-allele genes.
//!
//! The database maps gene -> allele -> sequence; reads get dense integer
//! ids. A first pass against sampled representative alleles localizes which
//! reads plausibly belong to which gene, then a pool of worker threads runs
//! one of three refinement strategies (naive, categorical, regional) over a
//! shared work cursor, merging per-read match records into a shared store.
//! The alignment kernel itself sits behind the [`aligner::Aligner`] trait;
//! a bundled scan aligner is the default.

pub mod aligner;
pub mod cursor; // Thread-safe work partitioner (chunked and singleton claims)
pub mod database; // Gene/allele database and read registry loading
pub mod error;
pub mod pipelines; // The three strategy drivers and their worker bodies
pub mod progress; // Atomic progress counter + polling reporter
pub mod region; // Buffered interval clustering for the regional strategy
pub mod report; // Flat alignment record stream, written and re-read
pub mod sampler; // Representative allele sampling for the first pass
pub mod store; // Coarse-locked shared result store

pub use error::{Error, Result};
