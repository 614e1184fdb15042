//! The one fixed-digest-size BLAKE2b hash used outside the bloom filter:
//! EphID digests and reconstruction verification (spec.md §3, §4.6).

use blake2::Blake2bVar;
use blake2::digest::{Update, VariableOutput};

/// `BLAKE2b(data, digest_size = 32)`.
pub fn blake2b_32(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2bVar::new(32).expect("32 is a valid blake2b output size");
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher
        .finalize_variable(&mut out)
        .expect("output buffer matches requested size");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic_and_depends_on_input() {
        assert_eq!(blake2b_32(b"a"), blake2b_32(b"a"));
        assert_ne!(blake2b_32(b"a"), blake2b_32(b"b"));
    }
}
