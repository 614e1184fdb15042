//! `ShareTable`/`OwnShares` (spec.md §3, §4.6), grounded on
//! `examples/original_source/client.py`'s `self.shares` `defaultdict` and
//! `self.own_shares` set — a mapping keyed by hash, not a graph (spec.md
//! §9).

use std::collections::HashMap;

use dimy_types::EphIdHash;

/// One hash's accumulated shares and the time its first share arrived.
struct ShareEntry {
    first_seen: f64,
    shares: Vec<(u8, Vec<u8>)>,
}

/// Maps an EphID digest to the shares collected for it so far.
#[derive(Default)]
pub struct ShareTable {
    entries: HashMap<EphIdHash, ShareEntry>,
}

impl ShareTable {
    /// Builds an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one `(idx, payload)` share for `hash`, stamping
    /// `first_seen` if this is a new entry. Returns the number of distinct
    /// shares now held for this hash.
    pub fn insert(&mut self, hash: EphIdHash, idx: u8, payload: Vec<u8>, now: f64) -> usize {
        let entry = self.entries.entry(hash).or_insert_with(|| ShareEntry {
            first_seen: now,
            shares: Vec::new(),
        });
        if !entry.shares.iter().any(|(existing_idx, _)| *existing_idx == idx) {
            entry.shares.push((idx, payload));
        }
        entry.shares.len()
    }

    /// Borrows the shares collected so far for `hash`, if any.
    pub fn shares(&self, hash: &EphIdHash) -> Option<&[(u8, Vec<u8>)]> {
        self.entries.get(hash).map(|entry| entry.shares.as_slice())
    }

    /// Clears the share list for `hash` (keeping the entry itself, so a
    /// late duplicate doesn't look new and retrigger reconstruction within
    /// the clean window — spec.md §4.6).
    pub fn clear_shares(&mut self, hash: &EphIdHash) {
        if let Some(entry) = self.entries.get_mut(hash) {
            entry.shares.clear();
        }
    }

    /// Evicts every entry whose `first_seen` is older than `max_age`
    /// relative to `now` (spec.md §3 `SHARE_CLEAN_TIME`).
    pub fn clean(&mut self, now: f64, max_age: f64) {
        self.entries
            .retain(|_, entry| now - entry.first_seen <= max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> EphIdHash {
        EphIdHash::from_bytes([byte; 32])
    }

    #[test]
    fn insert_accumulates_distinct_indices() {
        let mut table = ShareTable::new();
        assert_eq!(table.insert(hash(1), 1, vec![0; 32], 0.0), 1);
        assert_eq!(table.insert(hash(1), 2, vec![0; 32], 0.0), 2);
        // Duplicate index doesn't grow the count.
        assert_eq!(table.insert(hash(1), 1, vec![0; 32], 0.0), 2);
    }

    #[test]
    fn clear_shares_retains_entry() {
        let mut table = ShareTable::new();
        table.insert(hash(1), 1, vec![0; 32], 0.0);
        table.clear_shares(&hash(1));
        assert_eq!(table.shares(&hash(1)), Some(&[][..]));
    }

    #[test]
    fn clean_evicts_only_expired_entries() {
        let mut table = ShareTable::new();
        table.insert(hash(1), 1, vec![0; 32], 0.0);
        table.insert(hash(2), 1, vec![0; 32], 40.0);
        table.clean(30.0, 30.0);
        assert!(table.shares(&hash(1)).is_some());
        table.clean(61.0, 30.0);
        assert!(table.shares(&hash(1)).is_none());
        assert!(table.shares(&hash(2)).is_some());
    }
}
