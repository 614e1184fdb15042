#![deny(missing_docs)]
//! Shared data model for the DIMY-style proximity-tracing protocol.
//!
//! This crate holds the identifiers, wire structures and protocol constants
//! that [`dimy_core`](../dimy_core/index.html), `dimy-node` and
//! `dimy-backend` all need, without pulling in any cryptography or I/O —
//! mirroring how `oprf-types` sits below `oprf-core`/`oprf-service` in the
//! workspace this crate is modeled on.

pub mod constants;
pub mod ephid;
pub mod error;
pub mod wire;

pub use ephid::{EncId, EphId, EphIdHash, EphPrivateScalar, Share};
pub use wire::{BroadcastPacket, UploadKind};
