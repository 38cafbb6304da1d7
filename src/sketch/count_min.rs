use tracing::{debug, trace};

use super::table::{self, MAX_NIBBLE};
use crate::config::{ResetMode, SketchConfig, UpdateMode};
use crate::error::Result;
use crate::frequency::Frequency;
use crate::metrics::stats::TableStats;

/// Multiplier for the third probe (FNV-1a offset basis).
const SEED: u64 = 0xcbf2_9ce4_8422_2325;

/// Count-min sketch of 4-bit counters, aged by how full it is rather than
/// by how many writes it has seen.
///
/// The table is a power-of-two run of words, sixteen counters to a word, and
/// bits 2..5 of a probe pick the counter inside its word.
///
/// For each already spread hash, four (word, nibble) probes are derived by a
/// fixed chain of rotations and one multiplication.  Every probe addresses
/// its word with the top bits of the probe value, so the chain only has to
/// keep the upper half well mixed.  `frequency` returns the **minimum** of
/// the four counters.
///
/// **Aging**: `occupancy` is the exact sum of all counters.  When it reaches
/// `occupancy_ratio` of the total counter capacity the sketch either zeroes
/// the table or halves the counters of one word at a time, round-robin,
/// until it is back under the limit.
pub struct FrequencySketch {
    table: Box<[u64]>,
    /// `e >> table_shift` is a valid index for every `e`.
    table_shift: u32,
    /// Sum of all counters.
    occupancy: u64,
    max_occupancy: u64,
    cursor: usize,
    resets: u64,
    occupancy_ratio: f64,
    reset: ResetMode,
    update: UpdateMode,
}

impl FrequencySketch {
    pub fn new(config: &SketchConfig) -> Result<Self> {
        config.validate()?;
        let mut sketch = FrequencySketch {
            table: Box::default(),
            table_shift: 0,
            occupancy: 0,
            max_occupancy: 0,
            cursor: 0,
            resets: 0,
            occupancy_ratio: config.occupancy_ratio,
            reset: config.reset,
            update: config.update,
        };
        sketch.ensure_capacity(config.words_for(config.expected_insertions));
        Ok(sketch)
    }

    /// Grows the table, if needed, to at least `words` words (16 counters
    /// each).  Growing forgets all previous counts.
    pub fn ensure_capacity(&mut self, words: usize) {
        let words = words.clamp(2, table::MAX_WORDS);
        if self.table.len() >= words {
            return;
        }

        let len = table::table_len(words);
        self.table = vec![0u64; len].into_boxed_slice();
        self.table_shift = table::table_shift(len);
        self.occupancy = 0;
        self.cursor = 0;
        // Every word holds 16 counters of at most 15.
        let capacity = len as f64 * 16.0 * f64::from(MAX_NIBBLE);
        self.max_occupancy = ((self.occupancy_ratio * capacity) as u64).max(1);
        debug!(
            words = len,
            max_occupancy = self.max_occupancy,
            "sketch table allocated"
        );
    }

    /// Estimated frequency of `e`, in `[0, 15]`.
    pub fn estimate(&self, e: u64) -> u8 {
        self.probes(e)
            .iter()
            .map(|&p| self.extract(p))
            .min()
            .unwrap_or(0)
    }

    /// Sum of all counters.
    pub fn occupancy(&self) -> u64 {
        self.occupancy
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            words: self.table.len(),
            occupancy: self.occupancy,
            max_occupancy: self.max_occupancy,
            resets: self.resets,
        }
    }

    /// Zeroes every counter.
    pub fn clear(&mut self) {
        self.table.fill(0);
        self.occupancy = 0;
    }

    #[inline]
    fn probes(&self, e: u64) -> [u64; 4] {
        let p0 = e;
        let p1 = p0.rotate_left(32);
        let p2 = p1.wrapping_mul(SEED);
        let p3 = p2.rotate_left(32);
        [p0, p1, p2, p3]
    }

    #[inline]
    fn index(&self, e: u64) -> usize {
        (e >> self.table_shift) as usize
    }

    /// Bit offset of the probed nibble, one of `0, 4, .., 60`.
    #[inline]
    fn shift(e: u64) -> u32 {
        (e & 0x3C) as u32
    }

    #[inline]
    fn extract(&self, e: u64) -> u8 {
        table::extract_nibble(self.table[self.index(e)], Self::shift(e))
    }

    /// Raises the probed counter to `f(old)`; returns the amount added.
    #[inline]
    fn update_at(&mut self, e: u64, f: impl Fn(u8) -> u8) -> u64 {
        let index = self.index(e);
        let shift = Self::shift(e);
        let word = self.table[index];
        let old = table::extract_nibble(word, shift);
        let new = f(old);
        debug_assert!(new >= old && new <= MAX_NIBBLE);
        self.table[index] = table::set_nibble(word, shift, new);
        u64::from(new - old)
    }

    fn regular_increment(&mut self, e: u64, count: u8) {
        for p in self.probes(e) {
            let added = self.update_at(p, |old| old.saturating_add(count).min(MAX_NIBBLE));
            self.occupancy += added;
        }
    }

    fn conservative_increment(&mut self, e: u64, count: u8) {
        let old = self.estimate(e);
        let new = old.saturating_add(count).min(MAX_NIBBLE);
        if new == old {
            return;
        }
        for p in self.probes(e) {
            let added = self.update_at(p, |current| current.max(new));
            self.occupancy += added;
        }
    }

    /// Zeroes the table, or halves round-robin words until occupancy is
    /// back under the limit.  Halving normally touches a single word; it
    /// moves on to the next one only when that word held too little.
    fn decay(&mut self) {
        let before = self.occupancy;
        match self.reset {
            ResetMode::Full => self.clear(),
            ResetMode::Partial => {
                let mask = self.table.len() - 1;
                while self.occupancy >= self.max_occupancy {
                    let i = self.cursor & mask;
                    self.cursor = self.cursor.wrapping_add(1);
                    let old = self.table[i];
                    let new = table::halve_nibbles(old);
                    self.table[i] = new;
                    // Per nibble `new <= old`, so the subtraction never borrows.
                    self.occupancy -= table::nibble_sum(old - new);
                }
            }
        }
        self.resets += 1;
        trace!(before, after = self.occupancy, "sketch decayed");
    }
}

impl Frequency for FrequencySketch {
    fn increment(&mut self, e: u64, count: u32) {
        if count == 0 {
            return;
        }
        let count = count.min(u32::from(MAX_NIBBLE)) as u8;
        match self.update {
            UpdateMode::Regular => self.regular_increment(e, count),
            UpdateMode::Conservative => self.conservative_increment(e, count),
        }
        if self.occupancy >= self.max_occupancy {
            self.decay();
        }
    }

    fn frequency(&mut self, e: u64) -> u8 {
        self.estimate(e)
    }
}
