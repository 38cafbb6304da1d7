use super::Frequency;

/// Mixes raw keys once before they reach the rest of the stack.
///
/// Everything downstream assumes uniformly distributed 64-bit input.  The
/// per-instance seed keeps an adversary from choosing keys that collide in
/// the doorkeeper or the sketch.
pub struct Spreading<D> {
    delegate: D,
    /// Always odd.
    seed: u64,
}

impl<D: Frequency> Spreading<D> {
    pub fn new(delegate: D, seed: u64) -> Self {
        Spreading {
            delegate,
            seed: seed | 1,
        }
    }

    #[inline]
    pub fn spread(&self, e: u64) -> u64 {
        let e = e.wrapping_mul(0xc3a5_c85c_97cb_3127);
        // Byte reversal moves the well mixed high byte to the bottom.
        let e = e.swap_bytes().wrapping_mul(self.seed);
        e ^ (e >> 21) ^ (e >> 41)
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    pub fn into_inner(self) -> D {
        self.delegate
    }
}

impl<D: Frequency> Frequency for Spreading<D> {
    #[inline]
    fn increment(&mut self, e: u64, count: u32) {
        let e = self.spread(e);
        self.delegate.increment(e, count);
    }

    #[inline]
    fn frequency(&mut self, e: u64) -> u8 {
        let e = self.spread(e);
        self.delegate.frequency(e)
    }
}
