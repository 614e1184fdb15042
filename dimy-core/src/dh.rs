//! Shared-secret derivation from a compressed public point and a private
//! scalar (spec.md §4.2, §4.6), grounded on `calc_shared` in
//! `examples/original_source/sss.py`: decompress the peer's point, scale it
//! by the local scalar, and take the x-coordinate.

use dimy_types::EncId;

use crate::ed25519::{Ed25519Error, EdwardsPoint, Scalar};

/// Derives the `EncID` shared between a freshly reconstructed peer EphID and
/// this node's own current private scalar: `x(decompress(public) * secret)`.
///
/// # Errors
/// Returns [`Ed25519Error::InvalidPoint`] if `public` doesn't decompress to a
/// valid curve point.
pub fn shared_enc_id(public: &[u8; 32], secret: &Scalar) -> Result<EncId, Ed25519Error> {
    let peer = EdwardsPoint::decompress(public)?;
    let shared = peer.scalar_mul(secret.as_biguint());
    Ok(EncId::from_be_bytes(flip_to_be(&shared.x().to_le_bytes_32())))
}

fn flip_to_be(le: &[u8; 32]) -> [u8; 32] {
    let mut be = *le;
    be.reverse();
    be
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::generate_keypair;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn dh_is_symmetric_through_enc_id() {
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let a = generate_keypair(&mut rng);
        let b = generate_keypair(&mut rng);

        let enc_ab = shared_enc_id(&b.public.compress(), &a.private).expect("valid point");
        let enc_ba = shared_enc_id(&a.public.compress(), &b.private).expect("valid point");
        assert_eq!(enc_ab, enc_ba);
    }

    #[test]
    fn rejects_invalid_point() {
        use num_bigint::BigUint;

        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let a = generate_keypair(&mut rng);
        // At least one small y in this range has no square root on the
        // curve; encode it as `y << 1` (x-bit 0), matching `compress`.
        let found_failure = (2u64..50).any(|y| {
            let encoded = BigUint::from(y) << 1;
            let mut bytes = encoded.to_bytes_le();
            bytes.resize(32, 0);
            let bytes: [u8; 32] = bytes.try_into().unwrap();
            shared_enc_id(&bytes, &a.private).is_err()
        });
        assert!(found_failure);
    }
}
