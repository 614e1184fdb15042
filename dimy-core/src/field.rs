//! Curve25519 base-field arithmetic, `GF(q)` with `q = 2^255 - 19`.
//!
//! The teacher workspace represents curve base fields with `ark-ff`'s
//! macro-generated field types; Curve25519 isn't one of the curves the
//! teacher has registered, so this module plays the same role by hand,
//! backed by [`num_bigint::BigUint`] (already a teacher workspace
//! dependency) instead of `ark-ff`'s fixed-width limbs.

use std::ops::{Add, Mul, Neg, Sub};
use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// `q = 2^255 - 19`.
pub static Q: LazyLock<BigUint> = LazyLock::new(|| (BigUint::one() << 255) - 19u32);

/// `l = 2^252 + 27742317777372353535851937790883648493`, the order of the
/// standard Ed25519 base point (used to reduce freshly sampled private
/// scalars into the prime-order subgroup).
pub static L: LazyLock<BigUint> = LazyLock::new(|| {
    (BigUint::one() << 252)
        + "27742317777372353535851937790883648493"
            .parse::<BigUint>()
            .expect("valid constant")
});

/// An element of `GF(q)`, always kept in `[0, q)` reduced form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fq(BigUint);

impl Fq {
    /// Wraps a `BigUint`, reducing it modulo `q`.
    pub fn new(value: BigUint) -> Self {
        Self(value % &*Q)
    }

    /// Builds a field element from a small integer literal.
    pub fn from_u64(value: u64) -> Self {
        Self::new(BigUint::from(value))
    }

    /// The additive identity.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(BigUint::one())
    }

    /// Interprets `bytes` as a little-endian integer and reduces mod `q`.
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        Self::new(BigUint::from_bytes_le(bytes))
    }

    /// Returns the 32-byte little-endian encoding of this element (it is
    /// always `< q < 2^255`, so 32 bytes always suffice).
    pub fn to_le_bytes_32(&self) -> [u8; 32] {
        let mut bytes = self.0.to_bytes_le();
        bytes.resize(32, 0);
        bytes.try_into().expect("reduced element fits in 32 bytes")
    }

    /// Exposes the underlying integer (always `< q`).
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Returns `true` iff this element is odd, i.e. its lowest bit is set.
    pub fn is_odd(&self) -> bool {
        self.0.bit(0)
    }

    /// Raises this element to `exponent`.
    pub fn pow(&self, exponent: &BigUint) -> Self {
        Self(self.0.modpow(exponent, &Q))
    }

    /// Multiplicative inverse via Fermat's little theorem (`a^(q-2)`).
    ///
    /// # Panics
    /// Panics if `self` is zero.
    pub fn inverse(&self) -> Self {
        assert!(!self.0.is_zero(), "cannot invert zero");
        self.pow(&(&*Q - 2u32))
    }

    /// Returns `true` iff `self` is a square root of `other`.
    pub fn squares_to(&self, other: &Fq) -> bool {
        self.clone() * self.clone() == *other
    }
}

impl Add for Fq {
    type Output = Fq;
    fn add(self, rhs: Fq) -> Fq {
        Fq::new(self.0 + rhs.0)
    }
}

impl Sub for Fq {
    type Output = Fq;
    fn sub(self, rhs: Fq) -> Fq {
        // BigUint has no negative values, so add q before subtracting.
        Fq::new(self.0 + &*Q - rhs.0)
    }
}

impl Mul for Fq {
    type Output = Fq;
    fn mul(self, rhs: Fq) -> Fq {
        Fq::new(self.0 * rhs.0)
    }
}

impl Neg for Fq {
    type Output = Fq;
    fn neg(self) -> Fq {
        if self.0.is_zero() {
            self
        } else {
            Fq::new(&*Q - self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_round_trips() {
        let a = Fq::from_u64(12345);
        let inv = a.inverse();
        assert_eq!(a * inv, Fq::one());
    }

    #[test]
    fn neg_is_additive_inverse() {
        let a = Fq::from_u64(999);
        assert_eq!(a.clone() + (-a), Fq::zero());
    }

    #[test]
    fn le_bytes_round_trip() {
        let a = Fq::from_u64(0xdead_beef);
        let bytes = a.to_le_bytes_32();
        assert_eq!(Fq::from_le_bytes(&bytes), a);
    }
}
