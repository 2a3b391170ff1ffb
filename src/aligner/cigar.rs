//! Edit scripts: run-length CIGAR operations.
//!
//! The flat alignment record stores the edit script in its textual
//! `<len><op>` form, so `Cigar` round-trips through `Display`/`FromStr`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// CIGAR operation type with zero-cost conversion to/from bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CigarOp {
    M = b'M',  // Match/mismatch
    I = b'I',  // Insertion to reference
    D = b'D',  // Deletion from reference
    S = b'S',  // Soft clip
    H = b'H',  // Hard clip
    N = b'N',  // Skipped region
    X = b'X',  // Sequence mismatch
    Eq = b'=', // Sequence match
}

impl CigarOp {
    /// Convert from byte representation
    #[inline(always)]
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'M' => Some(Self::M),
            b'I' => Some(Self::I),
            b'D' => Some(Self::D),
            b'S' => Some(Self::S),
            b'H' => Some(Self::H),
            b'N' => Some(Self::N),
            b'X' => Some(Self::X),
            b'=' => Some(Self::Eq),
            _ => None,
        }
    }

    /// Convert to byte representation
    #[inline(always)]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Returns true if this operation consumes query bases
    #[inline(always)]
    pub const fn consumes_query(self) -> bool {
        matches!(self, Self::M | Self::I | Self::S | Self::Eq | Self::X)
    }

    /// Returns true if this operation consumes reference bases
    #[inline(always)]
    pub const fn consumes_ref(self) -> bool {
        matches!(self, Self::M | Self::D | Self::N | Self::Eq | Self::X)
    }
}

/// Run-length edit script, e.g. `101M` or `50M2D51M`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cigar(pub Vec<(u32, CigarOp)>);

impl Cigar {
    /// Single-run script, e.g. the `<len>M` emitted for an ungapped match.
    pub fn single(len: u32, op: CigarOp) -> Self {
        Self(vec![(len, op)])
    }

    /// Total reference bases consumed by this script.
    pub fn ref_len(&self) -> u32 {
        self.0
            .iter()
            .filter(|(_, op)| op.consumes_ref())
            .map(|(len, _)| len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(len, op) in &self.0 {
            write!(f, "{}{}", len, op.to_byte() as char)?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut runs = Vec::new();
        let mut len: u32 = 0;
        let mut have_len = false;
        for b in s.bytes() {
            if b.is_ascii_digit() {
                len = len
                    .checked_mul(10)
                    .and_then(|l| l.checked_add((b - b'0') as u32))
                    .ok_or_else(|| Error::format(format!("CIGAR run length overflow in {s:?}")))?;
                have_len = true;
            } else {
                let op = CigarOp::from_byte(b)
                    .filter(|_| have_len)
                    .ok_or_else(|| Error::format(format!("malformed CIGAR string {s:?}")))?;
                runs.push((len, op));
                len = 0;
                have_len = false;
            }
        }
        if have_len {
            return Err(Error::format(format!("malformed CIGAR string {s:?}")));
        }
        Ok(Self(runs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_parse() {
        for text in ["4M", "50M2D51M", "10S90M", "3=1X3="] {
            let cigar: Cigar = text.parse().unwrap();
            assert_eq!(cigar.to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_scripts() {
        for text in ["M", "10", "4Q", "1M2"] {
            assert!(text.parse::<Cigar>().is_err(), "{text:?} parsed");
        }
    }

    #[test]
    fn ref_len_skips_insertions() {
        let cigar: Cigar = "10M2I5M3D".parse().unwrap();
        assert_eq!(cigar.ref_len(), 18);
    }
}
