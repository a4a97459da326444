//! Approval vectors: the bit-level primitive behind ballots and committees.
//!
//! Bit `i` refers to alternative `i` of the run's `AlternativeSet`. Vectors
//! are packed into `u64` words so that Hamming distance is a handful of
//! `xor` + `count_ones` operations, which matters inside the exhaustive
//! committee search.

use crate::error::{ensure_len, VotingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const WORD_BITS: usize = 64;

/// Fixed-length boolean vector over the alternatives.
///
/// Serialized as a `0`/`1` string (e.g. `"1100"`), most readable in reports.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ApprovalVector {
    len: usize,
    words: Vec<u64>,
}

impl ApprovalVector {
    /// Creates an all-zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(WORD_BITS)],
        }
    }

    /// Creates a vector from explicit bits.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut v = Self::zeros(bits.len());
        for (i, &bit) in bits.iter().enumerate() {
            v.set(i, bit);
        }
        v
    }

    /// Creates a vector of length `len` with exactly the given positions set.
    ///
    /// Fails with `DimensionMismatch` if an index is out of range.
    pub fn from_indices(len: usize, indices: &[usize]) -> Result<Self, VotingError> {
        let mut v = Self::zeros(len);
        for &i in indices {
            if i >= len {
                return Err(VotingError::DimensionMismatch { expected: len, found: i + 1 });
            }
            v.set(i, true);
        }
        Ok(v)
    }

    /// Number of alternatives covered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns bit `i`. Out-of-range positions read as `false`.
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    pub(crate) fn set(&mut self, i: usize, bit: bool) {
        debug_assert!(i < self.len);
        let mask = 1u64 << (i % WORD_BITS);
        if bit {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }

    /// Number of set bits (approved / elected alternatives).
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Bitwise exclusive or.
    pub fn xor(&self, other: &ApprovalVector) -> Result<ApprovalVector, VotingError> {
        ensure_len(self.len, other.len)?;
        Ok(Self {
            len: self.len,
            words: self.words.iter().zip(&other.words).map(|(a, b)| a ^ b).collect(),
        })
    }

    /// Hamming distance, `popcount(self XOR other)`.
    pub fn hamming(&self, other: &ApprovalVector) -> Result<usize, VotingError> {
        ensure_len(self.len, other.len)?;
        Ok(self.hamming_unchecked(other))
    }

    /// Hamming distance for vectors already known to have equal length.
    pub(crate) fn hamming_unchecked(&self, other: &ApprovalVector) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }

    /// Iterates over all bits in alternative order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Iterates over the indices of set bits, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.get(i))
    }
}

impl fmt::Display for ApprovalVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for ApprovalVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApprovalVector({})", self)
    }
}

impl FromStr for ApprovalVector {
    type Err = VotingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '1' => Ok(true),
                '0' => Ok(false),
                _ => Err(VotingError::InvalidBitString(s.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_bits(&bits))
    }
}

impl From<ApprovalVector> for String {
    fn from(v: ApprovalVector) -> Self {
        v.to_string()
    }
}

impl TryFrom<String> for ApprovalVector {
    type Error = VotingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An agent's approval ballot. Immutable once derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ballot(ApprovalVector);

impl Ballot {
    pub fn new(approvals: ApprovalVector) -> Self {
        Self(approvals)
    }

    /// The underlying approval bits.
    pub fn approvals(&self) -> &ApprovalVector {
        &self.0
    }

    /// Number of alternatives.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn approves(&self, alternative: usize) -> bool {
        self.0.get(alternative)
    }

    /// Hamming distance to any approval vector (committee or group proxy).
    pub fn distance(&self, other: &ApprovalVector) -> Result<usize, VotingError> {
        self.0.hamming(other)
    }
}

impl FromStr for Ballot {
    type Err = VotingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Ballot)
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An elected committee: exactly `k` alternatives. Immutable once produced.
///
/// Serialize-only: the size check needs `k`, which a committee does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Committee(ApprovalVector);

impl Committee {
    /// Wraps a vector whose cardinality the caller guarantees.
    pub(crate) fn from_vector(members: ApprovalVector) -> Self {
        Self(members)
    }

    /// Creates a committee, checking that exactly `size` alternatives are selected.
    pub fn with_size(members: ApprovalVector, size: usize) -> Result<Self, VotingError> {
        let found = members.count_ones();
        if found != size {
            return Err(VotingError::InvalidCommitteeSize { k: found, m: members.len() });
        }
        Ok(Self(members))
    }

    /// The committee as approval bits.
    pub fn members(&self) -> &ApprovalVector {
        &self.0
    }

    /// Committee size `k`.
    pub fn size(&self) -> usize {
        self.0.count_ones()
    }

    /// Number of alternatives `m`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, alternative: usize) -> bool {
        self.0.get(alternative)
    }

    /// Indices of the elected alternatives, ascending.
    pub fn elected(&self) -> Vec<usize> {
        self.0.ones().collect()
    }
}

impl fmt::Display for Committee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ApprovalVector {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let a = v("10110");
        assert_eq!(a.len(), 5);
        assert_eq!(a.count_ones(), 3);
        assert_eq!(a.to_string(), "10110");
        assert_eq!(a.ones().collect::<Vec<_>>(), vec![0, 2, 3]);

        assert!(matches!("10x".parse::<ApprovalVector>(), Err(VotingError::InvalidBitString(_))));
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(v("1100").hamming(&v("0110")).unwrap(), 2);
        assert_eq!(v("1100").hamming(&v("1100")).unwrap(), 0);
        assert_eq!(v("0000").hamming(&v("1111")).unwrap(), 4);
        assert_eq!(v("1100").xor(&v("0110")).unwrap(), v("1010"));
    }

    #[test]
    fn test_hamming_dimension_mismatch() {
        let err = v("110").hamming(&v("1100")).unwrap_err();
        assert_eq!(err, VotingError::DimensionMismatch { expected: 3, found: 4 });
    }

    #[test]
    fn test_vectors_spanning_multiple_words() {
        let mut a = ApprovalVector::zeros(130);
        a.set(0, true);
        a.set(64, true);
        a.set(129, true);
        let b = ApprovalVector::from_indices(130, &[64, 128]).unwrap();

        assert_eq!(a.count_ones(), 3);
        assert_eq!(a.hamming(&b).unwrap(), 3);
        assert!(!a.get(500));

        a.set(64, false);
        assert_eq!(a.ones().collect::<Vec<_>>(), vec![0, 129]);
    }

    #[test]
    fn test_from_indices_out_of_range() {
        assert!(ApprovalVector::from_indices(4, &[4]).is_err());
    }

    #[test]
    fn test_committee_size_checked() {
        assert!(Committee::with_size(v("1010"), 2).is_ok());
        assert!(Committee::with_size(v("1110"), 2).is_err());

        let c = Committee::with_size(v("0101"), 2).unwrap();
        assert_eq!(c.elected(), vec![1, 3]);
        assert!(c.contains(3));
        assert!(!c.contains(0));
    }

    #[test]
    fn test_string_conversions() {
        let ballot: Ballot = "0110".parse().unwrap();
        assert_eq!(String::from(ballot.approvals().clone()), "0110");
        assert_eq!(ApprovalVector::try_from("0110".to_string()).unwrap(), *ballot.approvals());
        assert!(ballot.approves(1));
        assert!(!ballot.approves(3));
    }
}
