//! Core identifiers of the proximity-tracing data model (spec.md §3).

use std::fmt;

use num_bigint::BigUint;
use zeroize::Zeroize;

/// A 32-byte compressed Ed25519 public point, advertised for one
/// [`crate::constants::SHARE_TIME`] window.
///
/// This is the value that is Shamir-split into [`Share`]s and broadcast; it
/// is never sent whole over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EphId(pub [u8; 32]);

impl EphId {
    /// Wraps a raw compressed point.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the compressed point bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for EphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EphId({})", hex_prefix(&self.0))
    }
}

/// BLAKE2b digest of an [`EphId`]'s compressed point; this is what travels
/// alongside every share on the wire (spec.md §3 `BroadcastPacket.hash`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EphIdHash(pub [u8; 32]);

impl EphIdHash {
    /// Wraps a raw 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for EphIdHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EphIdHash({})", hex_prefix(&self.0))
    }
}

fn hex_prefix(bytes: &[u8; 32]) -> String {
    bytes[..4].iter().map(|b| format!("{b:02x}")).collect()
}

/// One of the `N` pieces an [`EphId`] is split into; `K` distinct indices
/// reconstruct the original value (spec.md §3 `Share`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    /// 1-based share index, in `1..=N`.
    pub index: u8,
    /// Share payload; length is always a multiple of
    /// [`crate::constants::SHAMIR_BLOCK_SIZE`].
    pub payload: Vec<u8>,
}

impl Share {
    /// Builds a new share, trusting the caller that `payload`'s length is a
    /// correct multiple of the Shamir block size.
    pub fn new(index: u8, payload: Vec<u8>) -> Self {
        Self { index, payload }
    }
}

/// The Ed25519 private scalar paired with a generated [`EphId`].
///
/// Zeroized on drop; this is the only long-lived secret a node holds.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct EphPrivateScalar(pub [u8; 32]);

impl EphPrivateScalar {
    /// Wraps a raw 32-byte scalar.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the scalar bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for EphPrivateScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EphPrivateScalar(..)")
    }
}

/// Encounter identifier: the x-coordinate of a Diffie-Hellman shared point,
/// one per reconstructed peer [`EphId`] (spec.md §3 `EncID`).
///
/// Represented as a fixed-size big-endian byte array so it is cheaply
/// `Copy`-free but still `Eq`/`Hash`; convert to [`num_bigint::BigUint`] via
/// [`EncId::to_biguint`] when doing modular arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncId(pub [u8; 32]);

impl EncId {
    /// Builds an `EncId` from the big-endian bytes of a field element.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Converts to an arbitrary-precision unsigned integer.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}

impl fmt::Display for EncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncId({})", self.to_biguint())
    }
}
