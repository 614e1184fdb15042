#![deny(missing_docs)]
//! Node runtime for the DIMY-style proximity-tracing protocol: a
//! single-threaded cooperative scheduler driving EphID generation, share
//! broadcast/reassembly, DH derivation, and the DBF/QBF/CBF pipeline
//! (spec.md §4, §5) — the role `oprf-client`/`oprf-service` play together
//! in the workspace this crate is modeled on.

pub mod backend_client;
pub mod clock;
pub mod commands;
pub mod config;
pub mod dbf_pipeline;
pub mod ephid_gen;
pub mod error;
pub mod scheduler;
pub mod share_io;
pub mod share_table;
mod state;

pub use config::NodeConfig;
pub use error::NodeError;
pub use state::NodeState;
