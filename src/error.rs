//! Crate-wide error taxonomy.
//!
//! Load and sampling failures are fatal; an aligner failure aborts the
//! owning worker and the whole run. A second pass that yields no matches
//! for a gene is not an error anywhere in this crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Source file unopenable or unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed sequence record or alignment record.
    #[error("format error: {message}")]
    Format { message: String },

    /// A gene with zero alleles cannot be sampled.
    #[error("gene {gene:?} has no alleles")]
    EmptyGene { gene: String },

    /// The aligner failed for a given reference set.
    #[error("aligner error: {message}")]
    Aligner { message: String },
}

impl Error {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn aligner(message: impl Into<String>) -> Self {
        Self::Aligner {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
