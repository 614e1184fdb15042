//! Protocol constants shared by every component.
//!
//! These are wire-compatibility constants, not runtime configuration: two
//! nodes running with different values here cannot reconstruct each other's
//! shares or agree on bloom filter parameters, so they are `const`, not CLI
//! flags (see `dimy-node::config` for the knobs that *are* configurable).

use std::time::Duration;

/// Number of shares an EphID is split into.
pub const N: u8 = 5;

/// Number of shares required to reconstruct an EphID.
pub const K: u8 = 3;

/// How long one EphID generation is broadcast for before the next is minted.
pub const EPHID_TIME: Duration = Duration::from_secs(15);

/// Interval between successive share-broadcast ticks (the broadcaster
/// dequeues and sends at most one packet per tick).
pub const SHARE_TIME: Duration = Duration::from_secs(3);

/// How long a [`crate::ephid::EphId`] digest's share-table entry is kept
/// before being evicted, regardless of how many shares it has collected.
pub const SHARE_CLEAN_TIME: Duration = Duration::from_secs(2 * N as u64 * SHARE_TIME.as_secs());

/// Interval between appending a fresh, empty Daily Bloom Filter to the ring.
pub const DBF_TIME: Duration = Duration::from_secs(90);

/// How long an individual Daily Bloom Filter is kept relevant.
pub const DBF_LIFE: Duration = Duration::from_secs(540);

/// Interval between constructing and uploading a Query/Contact Bloom Filter.
pub const QBF_TIME: Duration = Duration::from_secs(540);

/// Number of bytes backing a [`crate::bloom::BloomFilter`]-shaped byte buffer.
pub const FILTER_SIZE: usize = 100_000;

/// Number of bits backing a bloom filter (`FILTER_SIZE * 8`).
pub const FILTER_BITS: usize = FILTER_SIZE * 8;

/// Number of independent BLAKE2b hash rounds per bloom filter key.
pub const HASH_ROUNDS: usize = 3;

/// Size, in 16-byte blocks, of the underlying Shamir secret-sharing unit.
pub const SHAMIR_BLOCK_SIZE: usize = 16;

/// `ceil(DBF_LIFE / DBF_TIME) + 1`, the bounded FIFO capacity of the DBF ring.
pub const fn dbf_ring_capacity() -> usize {
    DBF_LIFE.as_secs().div_ceil(DBF_TIME.as_secs()) as usize + 1
}
