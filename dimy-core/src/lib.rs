#![deny(missing_docs)]
//! Cryptographic substrate and bloom filter algebra for the DIMY-style
//! proximity-tracing protocol: Ed25519 point compression, block-wise Shamir
//! secret sharing, Diffie-Hellman shared-secret derivation, and a
//! fixed-parameter bloom filter — the crate `oprf-core` plays for the
//! OPRF protocol this workspace is modeled on.

pub mod bloom;
pub mod dh;
pub mod ed25519;
pub mod field;
pub mod hash;
pub mod shamir;

pub use bloom::{BloomFilter, ParameterMismatch};
pub use dh::shared_enc_id;
pub use ed25519::{Ed25519Error, EdwardsPoint, Keypair, Scalar, generate_keypair};
pub use hash::blake2b_32;
pub use shamir::ShamirError;
