//! Fixed-parameter bloom filter with multi-round BLAKE2b hashing (spec.md
//! §4.7, §6), grounded on `examples/original_source/bloom.py`: a dense
//! bitset, `HASH_ROUNDS` independent keyed-round hashes per element, and
//! union/intersection that requires both operands to share the same
//! `(byte_size, hash_rounds)` shape. The teacher doesn't carry a bitset
//! crate, so `bitvec` is pulled in from the rest of the retrieval pack to
//! back the dense bit storage, and `blake2` to provide the hash rounds.

use bitvec::prelude::{BitVec, Lsb0};
use blake2::Blake2bVar;
use blake2::digest::{Update, VariableOutput};
use thiserror::Error;

use dimy_types::constants::{FILTER_BITS, FILTER_SIZE, HASH_ROUNDS};

/// Raised when combining two filters built with different parameters
/// (spec.md §7: fatal, a programming error).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("bloom filters have mismatched parameters (byte_size or hash_rounds differ)")]
pub struct ParameterMismatch;

/// A dense bitset bloom filter over arbitrary byte-string keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    bits: BitVec<u8, Lsb0>,
    byte_size: usize,
    hash_rounds: usize,
}

impl BloomFilter {
    /// Builds an empty filter with the protocol's standard shape
    /// ([`FILTER_SIZE`] bytes, [`HASH_ROUNDS`] hash rounds).
    pub fn new() -> Self {
        Self::with_params(FILTER_SIZE, HASH_ROUNDS)
    }

    /// Builds an empty filter with an explicit shape. Exposed mainly for
    /// tests; production code should use [`Self::new`] so every filter in
    /// the system shares the standard parameters.
    pub fn with_params(byte_size: usize, hash_rounds: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, byte_size * 8),
            byte_size,
            hash_rounds,
        }
    }

    /// `ceil(bit_length(bit_size) / 8)`, the smallest digest width that can
    /// represent any bit index (spec.md §4.1).
    fn digest_size(&self) -> usize {
        let bit_size = self.byte_size * 8;
        let bit_length = usize::BITS - bit_size.leading_zeros();
        (bit_length as usize).div_ceil(8)
    }

    /// Hashes `key` under each of `hash_rounds` independent BLAKE2b keys
    /// (`ascii(round)`, matching `examples/original_source/bloom.py`'s
    /// `generate_hashes`), reducing each digest modulo the bit size.
    fn hash_indices(&self, key: &[u8]) -> impl Iterator<Item = usize> + '_ {
        let digest_size = self.digest_size();
        (0..self.hash_rounds).map(move |round| {
            let mut hasher = Blake2bVar::new_keyed(round.to_string().as_bytes(), digest_size)
                .expect("digest_size is within blake2b's 1..=64 output range");
            hasher.update(key);
            let mut digest = vec![0u8; digest_size];
            hasher.finalize_variable(&mut digest).expect("digest_size matches output buffer");
            let mut padded = [0u8; 8];
            padded[..digest.len()].copy_from_slice(&digest);
            (u64::from_le_bytes(padded) as usize) % (self.byte_size * 8)
        })
    }

    /// Adds `key` to the filter.
    pub fn add(&mut self, key: &[u8]) {
        for index in self.hash_indices(key).collect::<Vec<_>>() {
            self.bits.set(index, true);
        }
    }

    /// Tests whether `key` may be a member (no false negatives; false
    /// positives are possible and expected).
    pub fn contains(&self, key: &[u8]) -> bool {
        self.hash_indices(key).all(|index| self.bits[index])
    }

    /// Adds an [`dimy_types::EncId`], encoded the way
    /// `examples/original_source/bloom.py` encodes its integer keys:
    /// decimal ASCII digits.
    pub fn add_enc_id(&mut self, enc_id: &dimy_types::EncId) {
        self.add(enc_id.to_biguint().to_string().as_bytes());
    }

    /// Tests membership of an [`dimy_types::EncId`]; see [`Self::add_enc_id`].
    pub fn contains_enc_id(&self, enc_id: &dimy_types::EncId) -> bool {
        self.contains(enc_id.to_biguint().to_string().as_bytes())
    }

    /// Number of set bits.
    pub fn popcount(&self) -> usize {
        self.bits.count_ones()
    }

    /// Shape this filter was built with, used by [`Self::same_params`].
    fn same_params(&self, other: &BloomFilter) -> bool {
        self.byte_size == other.byte_size && self.hash_rounds == other.hash_rounds
    }

    /// Bitwise union (membership in either operand).
    ///
    /// # Errors
    /// Returns [`ParameterMismatch`] if `self` and `other` weren't built
    /// with the same shape.
    pub fn union(&self, other: &BloomFilter) -> Result<BloomFilter, ParameterMismatch> {
        if !self.same_params(other) {
            return Err(ParameterMismatch);
        }
        let bits = self
            .bits
            .iter()
            .by_vals()
            .zip(other.bits.iter().by_vals())
            .map(|(a, b)| a | b)
            .collect();
        Ok(BloomFilter {
            bits,
            byte_size: self.byte_size,
            hash_rounds: self.hash_rounds,
        })
    }

    /// Bitwise intersection (membership in both operands).
    ///
    /// # Errors
    /// Returns [`ParameterMismatch`] if `self` and `other` weren't built
    /// with the same shape.
    pub fn intersect(&self, other: &BloomFilter) -> Result<BloomFilter, ParameterMismatch> {
        if !self.same_params(other) {
            return Err(ParameterMismatch);
        }
        let bits = self
            .bits
            .iter()
            .by_vals()
            .zip(other.bits.iter().by_vals())
            .map(|(a, b)| a & b)
            .collect();
        Ok(BloomFilter {
            bits,
            byte_size: self.byte_size,
            hash_rounds: self.hash_rounds,
        })
    }

    /// Merges `other` into `self` in place (spec.md §4.7's DBF rolling
    /// union and the backend's standing-filter accumulation both use this
    /// instead of allocating a fresh filter per merge).
    ///
    /// # Errors
    /// Returns [`ParameterMismatch`] if `self` and `other` weren't built
    /// with the same shape.
    pub fn union_in_place(&mut self, other: &BloomFilter) -> Result<(), ParameterMismatch> {
        if !self.same_params(other) {
            return Err(ParameterMismatch);
        }
        for (index, bit) in other.bits.iter().by_vals().enumerate() {
            if bit {
                self.bits.set(index, true);
            }
        }
        Ok(())
    }

    /// Serializes the filter to its fixed-size byte buffer, matching the
    /// wire's CBF/QBF upload framing (spec.md §6).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.clone().into_vec()
    }

    /// Reconstructs a filter of the protocol's standard shape from a buffer
    /// produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut bits = BitVec::<u8, Lsb0>::from_slice(bytes);
        bits.resize(FILTER_BITS, false);
        Self {
            bits,
            byte_size: FILTER_SIZE,
            hash_rounds: HASH_ROUNDS,
        }
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_implies_contains_no_false_negatives() {
        let mut filter = BloomFilter::with_params(256, 3);
        for i in 0u32..50 {
            filter.add(&i.to_le_bytes());
        }
        for i in 0u32..50 {
            assert!(filter.contains(&i.to_le_bytes()));
        }
    }

    #[test]
    fn union_absorbs_membership() {
        let mut f = BloomFilter::with_params(256, 3);
        let mut g = BloomFilter::with_params(256, 3);
        f.add(b"alice");
        g.add(b"bob");
        let union = f.union(&g).expect("same params");
        assert!(union.contains(b"alice"));
        assert!(union.contains(b"bob"));
    }

    #[test]
    fn intersect_requires_membership_in_both() {
        let mut f = BloomFilter::with_params(256, 3);
        let mut g = BloomFilter::with_params(256, 3);
        f.add(b"alice");
        f.add(b"shared");
        g.add(b"shared");
        let inter = f.intersect(&g).expect("same params");
        assert!(inter.contains(b"shared"));
    }

    #[test]
    fn mismatched_params_rejected() {
        let f = BloomFilter::with_params(256, 3);
        let g = BloomFilter::with_params(128, 3);
        assert_eq!(f.union(&g), Err(ParameterMismatch));
        assert_eq!(f.intersect(&g), Err(ParameterMismatch));
    }

    #[test]
    fn to_bytes_from_bytes_round_trip_preserves_membership() {
        let mut filter = BloomFilter::new();
        filter.add(b"encounter-id-123");
        let bytes = filter.to_bytes();
        assert_eq!(bytes.len(), FILTER_SIZE);
        let restored = BloomFilter::from_bytes(&bytes);
        assert!(restored.contains(b"encounter-id-123"));
    }

    #[test]
    fn popcount_matches_manual_count() {
        let mut filter = BloomFilter::with_params(256, 3);
        filter.add(b"x");
        assert!(filter.popcount() > 0);
        assert!(filter.popcount() <= 3);
    }
}
