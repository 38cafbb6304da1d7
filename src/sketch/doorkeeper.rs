use tracing::{debug, trace};

use super::table::{self, MAX_WORDS};
use crate::config::{DoorkeeperConfig, ResetMode};
use crate::error::Result;
use crate::metrics::stats::TableStats;

/// Set-membership capability used as a first-sighting gate.
///
/// Keys are expected to be already spread 64-bit hashes.
pub trait MembershipFilter {
    /// Records `e`.  Returns `true` if the filter changed, i.e. a prior
    /// [`might_contain`](Self::might_contain) would have returned `false`.
    fn put(&mut self, e: u64) -> bool;

    /// `false` means `e` was definitely never put (or has since decayed).
    fn might_contain(&self, e: u64) -> bool;

    fn clear(&mut self);
}

/// Target false-positive probability used for sizing.
const FPP: f64 = 0.03;

/// Respread multiplier deriving the second probe.
const SEED: u64 = 0xb492_b66f_be98_f273;

const TOP_BIT: u64 = 1 << 63;

/// A Bloom filter that decays instead of saturating.
///
/// Each key probes two words, and sets two bits inside each: one chosen by
/// bits `0..6` of the probe, one by bits `6..12`.  Two multiplicative mixes
/// therefore give four bit positions, close to a 4-hash Bloom filter at half
/// the hashing cost.
///
/// The number of set bits is tracked exactly.  Once it reaches
/// `occupancy_ratio` of the table, the filter either clears completely or
/// clears words round-robin until it is back under the limit, which keeps the
/// false-positive rate bounded under an endless stream of puts.
pub struct Doorkeeper {
    table: Box<[u64]>,
    /// `e >> table_shift` is a valid index for every `e`.
    table_shift: u32,
    /// Number of set bits in `table`.
    occupancy: u64,
    max_occupancy: u64,
    cursor: usize,
    resets: u64,
    occupancy_ratio: f64,
    reset: ResetMode,
}

impl Doorkeeper {
    pub fn new(config: &DoorkeeperConfig) -> Result<Self> {
        config.validate()?;
        let mut doorkeeper = Doorkeeper {
            table: Box::default(),
            table_shift: 0,
            occupancy: 0,
            max_occupancy: 0,
            cursor: 0,
            resets: 0,
            occupancy_ratio: config.occupancy_ratio,
            reset: config.reset,
        };
        doorkeeper.ensure_capacity(config.expected_insertions);
        Ok(doorkeeper)
    }

    /// Grows the table, if needed, so it can hold `expected_insertions` keys
    /// at the target false-positive rate.  Growing forgets every key.
    pub fn ensure_capacity(&mut self, expected_insertions: usize) {
        let optimal_bits = (expected_insertions as f64 * optimal_bits_factor()) as usize;
        let words = (optimal_bits >> 6).clamp(2, MAX_WORDS);
        if self.table.len() >= words {
            return;
        }

        let len = table::table_len(words);
        self.table = vec![0u64; len].into_boxed_slice();
        self.table_shift = table::table_shift(len);
        self.occupancy = 0;
        self.cursor = 0;
        self.max_occupancy = ((self.occupancy_ratio * (len as f64) * 64.0) as u64).max(1);
        debug!(
            expected_insertions,
            words = len,
            max_occupancy = self.max_occupancy,
            "doorkeeper table allocated"
        );
    }

    /// Number of bits currently set.
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

    #[inline]
    fn index(&self, e: u64) -> usize {
        (e >> self.table_shift) as usize
    }

    /// Both bits selected by `e` within its word.
    #[inline]
    fn bit_pair(e: u64) -> u64 {
        (TOP_BIT >> (e & 63)) | (TOP_BIT >> ((e >> 6) & 63))
    }

    /// Sets the bit pair for `e`; returns how many bits flipped from 0 to 1.
    #[inline]
    fn set_two(&mut self, e: u64) -> u64 {
        let index = self.index(e);
        let old = self.table[index];
        let new = old | Self::bit_pair(e);
        self.table[index] = new;
        (new ^ old).count_ones() as u64
    }

    #[inline]
    fn get_two(&self, e: u64) -> bool {
        let pair = Self::bit_pair(e);
        self.table[self.index(e)] & pair == pair
    }

    /// Clears the table, or clears round-robin words until occupancy is
    /// back under the limit.  Partial decay normally clears a single word;
    /// it moves on to the next one only when that word held too few bits.
    fn decay(&mut self) {
        let before = self.occupancy;
        match self.reset {
            ResetMode::Full => self.clear(),
            ResetMode::Partial => {
                let mask = self.table.len() - 1;
                while self.occupancy >= self.max_occupancy {
                    let i = self.cursor & mask;
                    self.cursor = self.cursor.wrapping_add(1);
                    self.occupancy -= self.table[i].count_ones() as u64;
                    self.table[i] = 0;
                }
            }
        }
        self.resets += 1;
        trace!(before, after = self.occupancy, "doorkeeper decayed");
    }
}

impl MembershipFilter for Doorkeeper {
    fn put(&mut self, e: u64) -> bool {
        let flipped = self.set_two(e) + self.set_two(respread(e));
        self.occupancy += flipped;
        if self.occupancy >= self.max_occupancy {
            self.decay();
        }
        flipped > 0
    }

    fn might_contain(&self, e: u64) -> bool {
        self.get_two(e) && self.get_two(respread(e))
    }

    fn clear(&mut self) {
        self.table.fill(0);
        self.occupancy = 0;
    }
}

#[inline]
fn respread(e: u64) -> u64 {
    let e = e.wrapping_mul(SEED);
    e ^ (e >> 21) ^ (e >> 41)
}

/// Bits per insertion for the target false-positive probability.
fn optimal_bits_factor() -> f64 {
    let ln2 = std::f64::consts::LN_2;
    -FPP.ln() / (ln2 * ln2)
}
