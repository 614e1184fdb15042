//! EphID generator (spec.md §4.4), grounded on
//! `examples/original_source/client.py`'s `eph_gen`: mint a keypair, split
//! the compressed public point, and enqueue one packet per share.

use dimy_core::shamir;
use dimy_types::constants::{K, N};
use dimy_types::{EphIdHash, EphPrivateScalar, Share};
use rand::{CryptoRng, RngCore};

/// One queued broadcast: a share of the current generation's EphID, paired
/// with the private scalar and hash the broadcaster needs once it's this
/// packet's turn (spec.md §4.4's `(share, private_scalar, hash)` packet).
#[derive(Clone)]
pub struct QueuedShare {
    /// The share itself.
    pub share: Share,
    /// The EphID's private scalar, carried so the broadcaster can set
    /// `LastSecret` when this packet is actually sent.
    pub secret: EphPrivateScalar,
    /// Digest of the EphID this share reconstructs to.
    pub hash: EphIdHash,
}

/// Mints a fresh EphID generation: samples a keypair, splits its compressed
/// public point into `N` shares with threshold `K`, and returns one queued
/// packet per share plus the generation's hash (for `OwnShares`).
pub fn generate(rng: &mut (impl RngCore + CryptoRng)) -> (Vec<QueuedShare>, EphIdHash) {
    let keypair = dimy_core::generate_keypair(rng);
    let public = keypair.public.compress();
    let hash = EphIdHash::from_bytes(dimy_core::blake2b_32(&public));
    let secret = keypair.private.to_bytes();

    let shares = shamir::split(&public, K, N, rng).expect("public key is block-aligned");
    let queued = shares
        .into_iter()
        .enumerate()
        .map(|(i, payload)| QueuedShare {
            share: Share::new((i + 1) as u8, payload),
            secret: secret.clone(),
            hash,
        })
        .collect();
    (queued, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generates_n_shares_with_matching_hash() {
        let mut rng = StdRng::seed_from_u64(3);
        let (shares, hash) = generate(&mut rng);
        assert_eq!(shares.len(), N as usize);
        assert!(shares.iter().all(|s| s.hash == hash));
        let indices: Vec<u8> = shares.iter().map(|s| s.share.index).collect();
        assert_eq!(indices, (1..=N).collect::<Vec<_>>());
    }
}
