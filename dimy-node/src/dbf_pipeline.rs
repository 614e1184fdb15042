//! DBF ring and QBF/CBF construction (spec.md §4.7), grounded on
//! `examples/original_source/client.py`'s `DBFContainer`: a bounded deque of
//! bloom filters with the newest at the tail, unioned on demand into a
//! combined filter.

use std::collections::VecDeque;

use dimy_core::BloomFilter;
use dimy_types::constants::dbf_ring_capacity;
use dimy_types::EncId;

/// The rolling ring of Daily Bloom Filters plus the `is_cbf` diagnosis flag.
pub struct DbfPipeline {
    ring: VecDeque<BloomFilter>,
    capacity: usize,
    /// While true, the periodic filter upload is tagged CBF instead of QBF.
    pub is_cbf: bool,
}

impl DbfPipeline {
    /// Builds a pipeline with one empty DBF already in the ring.
    pub fn new() -> Self {
        let capacity = dbf_ring_capacity();
        let mut ring = VecDeque::with_capacity(capacity);
        ring.push_back(BloomFilter::new());
        Self {
            ring,
            capacity,
            is_cbf: false,
        }
    }

    /// Appends a fresh empty DBF, evicting the oldest if the ring is full
    /// (spec.md §4.7 `dbf_cycle`).
    pub fn cycle(&mut self) {
        if self.ring.len() >= self.capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(BloomFilter::new());
    }

    /// Adds a reconstructed encounter into the newest (active) DBF.
    pub fn add_enc_id(&mut self, enc_id: &EncId) {
        self.ring
            .back_mut()
            .expect("ring always has at least one filter")
            .add_enc_id(enc_id);
    }

    /// Unions every DBF currently in the ring into one combined filter
    /// (spec.md §4.7 `qbf_create`'s `combined`).
    pub fn combine(&self) -> BloomFilter {
        let mut combined = BloomFilter::new();
        for dbf in &self.ring {
            combined
                .union_in_place(dbf)
                .expect("every ring entry shares the standard filter shape");
        }
        combined
    }

    /// Current number of DBFs held in the ring (spec.md §8's ring
    /// cardinality invariant).
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the ring is empty. Never true in practice: [`Self::new`]
    /// seeds one filter and [`Self::cycle`] always leaves at least one.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl Default for DbfPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_respects_ring_capacity() {
        let mut pipeline = DbfPipeline::new();
        for _ in 0..20 {
            pipeline.cycle();
        }
        assert!(pipeline.len() <= dbf_ring_capacity());
    }

    #[test]
    fn combine_reflects_entries_across_the_ring() {
        let mut pipeline = DbfPipeline::new();
        let enc_id = EncId::from_be_bytes([7u8; 32]);
        pipeline.add_enc_id(&enc_id);
        pipeline.cycle();
        let combined = pipeline.combine();
        assert!(combined.contains_enc_id(&enc_id));
    }
}
