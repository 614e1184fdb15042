//! Ed25519 point compression/decompression (spec.md §4.2).
//!
//! Ported 1:1 from the constants and recovery formula of
//! `examples/original_source/Ed25519.py`, which is itself adapted from
//! djb's reference `ed25519.py`. Point addition uses the twisted Edwards
//! unified addition law, which is complete (no special-cased doubling or
//! identity) because `d` is a non-square mod `q`.

use std::sync::LazyLock;

use dimy_types::EphPrivateScalar;
use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::field::{Fq, L, Q};

/// `d = -121665 * inv(121666) mod q`, the twisted Edwards curve constant.
static D: LazyLock<Fq> = LazyLock::new(|| {
    let a = Fq::from_u64(121665);
    let b = Fq::from_u64(121666);
    -a * b.inverse()
});

/// `I = 2^((q-1)/4) mod q`, a quartic root of unity used to correct the
/// candidate square root during decompression.
static SQRT_MINUS_ONE: LazyLock<Fq> = LazyLock::new(|| {
    let exponent = (&*Q - BigUint::one()) / 4u32;
    Fq::from_u64(2).pow(&exponent)
});

/// The standard Ed25519 base point (`y = 4/5`, even `x`).
static BASE_POINT: LazyLock<EdwardsPoint> = LazyLock::new(|| {
    let y = Fq::from_u64(4) * Fq::from_u64(5).inverse();
    let x = xrecover(&y).expect("base point y is a valid curve coordinate");
    EdwardsPoint { x, y }
});

/// Errors raised while decompressing a point (spec.md §4.2, §7).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Ed25519Error {
    /// The encoded `y` coordinate has no corresponding `x` on the curve.
    #[error("invalid point: no square root exists for the encoded y-coordinate")]
    InvalidPoint,
}

/// A point on the (twisted) Edwards curve underlying Ed25519, in affine
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdwardsPoint {
    x: Fq,
    y: Fq,
}

impl EdwardsPoint {
    /// The neutral element, `(0, 1)`.
    pub fn identity() -> Self {
        Self {
            x: Fq::zero(),
            y: Fq::one(),
        }
    }

    /// The standard Ed25519 base point `B`.
    pub fn base_point() -> Self {
        BASE_POINT.clone()
    }

    /// Unified twisted Edwards point addition; valid for any two points on
    /// the curve, including doubling or either operand being the identity.
    pub fn add(&self, other: &EdwardsPoint) -> EdwardsPoint {
        let (x1, y1) = (self.x.clone(), self.y.clone());
        let (x2, y2) = (other.x.clone(), other.y.clone());
        let cross = D.clone() * x1.clone() * x2.clone() * y1.clone() * y2.clone();
        let x3_num = x1.clone() * y2.clone() + y1.clone() * x2.clone();
        let y3_num = y1 * y2 + x1 * x2;
        let x3 = x3_num * (Fq::one() + cross.clone()).inverse();
        let y3 = y3_num * (Fq::one() - cross).inverse();
        EdwardsPoint { x: x3, y: y3 }
    }

    /// Scalar multiplication via double-and-add, most significant bit
    /// first.
    pub fn scalar_mul(&self, scalar: &BigUint) -> EdwardsPoint {
        let mut result = EdwardsPoint::identity();
        let mut addend = self.clone();
        for i in 0..scalar.bits() {
            if scalar.bit(i) {
                result = result.add(&addend);
            }
            addend = addend.add(&addend);
        }
        result
    }

    /// The x-coordinate of this point, as a field element.
    pub fn x(&self) -> &Fq {
        &self.x
    }

    /// The y-coordinate of this point, as a field element.
    pub fn y(&self) -> &Fq {
        &self.y
    }

    /// Compresses this point into its 32-byte little-endian encoding:
    /// `(y << 1) | (x mod 2)`, read as one 256-bit little-endian integer
    /// (not RFC 8032's "y with x's parity in the top bit" scheme).
    pub fn compress(&self) -> [u8; 32] {
        let shifted = self.y.as_biguint().clone() << 1;
        let encoded = shifted + BigUint::from(self.x.is_odd() as u8);
        let mut bytes = encoded.to_bytes_le();
        bytes.resize(32, 0);
        bytes
            .try_into()
            .expect("(y << 1) | (x mod 2) fits in 32 bytes")
    }

    /// Decompresses a point previously produced by [`Self::compress`].
    ///
    /// # Errors
    /// Returns [`Ed25519Error::InvalidPoint`] if the encoded `y` has no
    /// square root, i.e. does not correspond to any point on the curve.
    pub fn decompress(bytes: &[u8; 32]) -> Result<Self, Ed25519Error> {
        let encoded = BigUint::from_bytes_le(bytes);
        let sign = encoded.bit(0);
        let y = Fq::new(encoded / 2u32);
        let mut x = xrecover(&y).ok_or(Ed25519Error::InvalidPoint)?;
        if x.is_odd() != sign {
            x = -x;
        }
        Ok(Self { x, y })
    }
}

/// Recovers a candidate `x` for the given `y`, correcting by the quartic
/// root of unity when the naive candidate squares to the wrong value. The
/// caller is responsible for flipping the sign to match an encoded parity
/// bit, as [`EdwardsPoint::decompress`] does.
fn xrecover(y: &Fq) -> Option<Fq> {
    let y2 = y.clone() * y.clone();
    let xx = (y2.clone() - Fq::one()) * (D.clone() * y2 + Fq::one()).inverse();
    let exponent = (&*Q + BigUint::from(3u32)) / 8u32;
    let mut x = xx.pow(&exponent);
    if !x.squares_to(&xx) {
        x = x * SQRT_MINUS_ONE.clone();
    }
    if !x.squares_to(&xx) {
        return None;
    }
    Some(x)
}

/// An Ed25519 private scalar, reduced into `[0, l)`.
///
/// Best-effort cleared on drop, mirroring how the teacher's
/// `DLogShareShamir` protects its scalar field; `BigUint` doesn't implement
/// [`zeroize::Zeroize`] itself, so we clear it by replacing it with zero
/// rather than deriving the trait.
#[derive(Clone)]
pub struct Scalar(BigUint);

impl Drop for Scalar {
    fn drop(&mut self) {
        self.0 = BigUint::from(0u32);
    }
}

impl Scalar {
    /// Samples a fresh private scalar uniformly from `[0, l)`.
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(BigUint::from_bytes_le(&bytes) % &*L)
    }

    /// Wraps an existing 32-byte little-endian scalar, reducing mod `l`.
    pub fn from_bytes(bytes: &EphPrivateScalar) -> Self {
        Self(BigUint::from_bytes_le(bytes.as_bytes()) % &*L)
    }

    /// Encodes as 32 little-endian bytes, suitable for
    /// [`dimy_types::EphPrivateScalar`].
    pub fn to_bytes(&self) -> EphPrivateScalar {
        let mut bytes = self.0.to_bytes_le();
        bytes.resize(32, 0);
        EphPrivateScalar::from_bytes(bytes.try_into().expect("scalar fits in 32 bytes"))
    }

    /// The underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

/// A freshly minted Ed25519 keypair: a private scalar and the public point
/// it corresponds to.
pub struct Keypair {
    /// The private scalar. Callers are responsible for keeping this secret.
    pub private: Scalar,
    /// The public point, `private * B`.
    pub public: EdwardsPoint,
}

/// Samples a fresh random Ed25519 keypair.
pub fn generate_keypair(rng: &mut (impl RngCore + CryptoRng)) -> Keypair {
    let private = Scalar::random(rng);
    let public = EdwardsPoint::base_point().scalar_mul(private.as_biguint());
    Keypair { private, public }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn compress_decompress_round_trips_for_generated_points() {
        let mut rng = rng();
        for _ in 0..16 {
            let keypair = generate_keypair(&mut rng);
            let compressed = keypair.public.compress();
            let decompressed = EdwardsPoint::decompress(&compressed).expect("valid point");
            assert_eq!(decompressed, keypair.public);
            assert_eq!(decompressed.compress(), compressed);
        }
    }

    #[test]
    fn base_point_is_on_curve_and_nonzero() {
        let base = EdwardsPoint::base_point();
        assert_ne!(base, EdwardsPoint::identity());
    }

    #[test]
    fn dh_shared_secret_is_symmetric() {
        let mut rng = rng();
        let a = generate_keypair(&mut rng);
        let b = generate_keypair(&mut rng);

        let shared_ab = a.public.scalar_mul(b.private.as_biguint());
        let shared_ba = b.public.scalar_mul(a.private.as_biguint());
        assert_eq!(shared_ab.x(), shared_ba.x());
    }

    #[test]
    fn decompress_rejects_non_residue() {
        // y = 2 has no valid x on the curve for almost all encodings; probe
        // a handful of small y values (encoded as `y << 1`, x-bit 0) and
        // require at least one failure, proving `InvalidPoint` is reachable.
        let failures = (2u64..50)
            .filter(|&y| {
                let encoded = BigUint::from(y) << 1;
                let mut bytes = encoded.to_bytes_le();
                bytes.resize(32, 0);
                let bytes: [u8; 32] = bytes.try_into().unwrap();
                EdwardsPoint::decompress(&bytes).is_err()
            })
            .count();
        assert!(failures > 0);
    }
}
