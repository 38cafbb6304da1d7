//! Bit table helpers shared by the doorkeeper and the count-min sketch.
//!
//! Tables are power-of-two slices of `u64` words.  A structure addresses a
//! word with the high bits of an already spread hash (`e >> table_shift`), so
//! no modulo is ever needed.

/// Largest table we allocate, in words (8 GiB of `u64`).
pub(crate) const MAX_WORDS: usize = 1 << 30;

/// `0x1` in every nibble.
pub(crate) const ONE_MASK: u64 = 0x1111_1111_1111_1111;

/// `0x7` in every nibble: clears the bit that would bleed into the lower
/// neighbour when the whole word is shifted right by one.
pub(crate) const RESET_MASK: u64 = 7 * ONE_MASK;

/// Largest value a 4-bit counter can hold.
pub(crate) const MAX_NIBBLE: u8 = 15;

/// Rounds a requested word count up to a valid table length: a power of two,
/// at least 2 and at most [`MAX_WORDS`].
#[inline]
pub(crate) fn table_len(words: usize) -> usize {
    words.clamp(2, MAX_WORDS).next_power_of_two()
}

/// Shift such that `e >> shift` is a valid index into a table of `len` words.
#[inline]
pub(crate) fn table_shift(len: usize) -> u32 {
    debug_assert!(len >= 2 && len.is_power_of_two());
    ((len - 1) as u64).leading_zeros()
}

/// Reads the 4-bit counter starting at bit `shift`.
#[inline]
pub(crate) fn extract_nibble(word: u64, shift: u32) -> u8 {
    ((word >> shift) & 0xF) as u8
}

/// Returns `word` with the 4-bit counter at bit `shift` replaced by `value`.
#[inline]
pub(crate) fn set_nibble(word: u64, shift: u32, value: u8) -> u64 {
    debug_assert!(value <= MAX_NIBBLE);
    (word & !(0xF << shift)) | ((value as u64) << shift)
}

/// Sum of all 16 nibbles of `word`.
#[inline]
pub(crate) fn nibble_sum(word: u64) -> u64 {
    const BYTE_MASK: u64 = 0x0F0F_0F0F_0F0F_0F0F;
    let bytes = (word & BYTE_MASK) + ((word >> 4) & BYTE_MASK);
    bytes.wrapping_mul(0x0101_0101_0101_0101) >> 56
}

/// Halves every nibble of `word`, rounding down.
#[inline]
pub(crate) fn halve_nibbles(word: u64) -> u64 {
    (word >> 1) & RESET_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_len_is_power_of_two_and_at_least_two() {
        assert_eq!(table_len(0), 2);
        assert_eq!(table_len(1), 2);
        assert_eq!(table_len(2), 2);
        assert_eq!(table_len(3), 4);
        assert_eq!(table_len(1000), 1024);
        assert_eq!(table_len(usize::MAX), MAX_WORDS);
    }

    #[test]
    fn shifted_hash_stays_in_bounds() {
        for len in [2usize, 4, 64, 1 << 20] {
            let shift = table_shift(len);
            assert!((u64::MAX >> shift) as usize == len - 1);
            assert_eq!(0u64 >> shift, 0);
        }
    }

    #[test]
    fn nibble_helpers_touch_only_their_slot() {
        let word = 0xFEDC_BA98_7654_3210u64;
        for i in 0..16u32 {
            assert_eq!(extract_nibble(word, i * 4), i as u8);
        }
        let updated = set_nibble(word, 8, 0xF);
        assert_eq!(extract_nibble(updated, 8), 0xF);
        assert_eq!(updated & !(0xF << 8), word & !(0xF << 8));
    }

    #[test]
    fn nibble_sum_matches_naive_sum() {
        let word = 0xFFFF_FFFF_FFFF_FFFFu64;
        assert_eq!(nibble_sum(word), 15 * 16);
        let word = 0xFEDC_BA98_7654_3210u64;
        assert_eq!(nibble_sum(word), (0..16).sum::<u64>());
        assert_eq!(nibble_sum(0), 0);
    }

    #[test]
    fn halving_does_not_bleed_between_nibbles() {
        let word = 0xFEDC_BA98_7654_3210u64;
        let halved = halve_nibbles(word);
        for i in 0..16u32 {
            assert_eq!(extract_nibble(halved, i * 4), (i as u8) / 2);
        }
    }
}
