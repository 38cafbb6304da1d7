use super::Frequency;

/// Coalesces runs of increments to the same key.
///
/// Holds at most one pending `(key, count)` pair.  The pair is forwarded
/// when a different key arrives or before any read, so a read always sees
/// every increment issued before it.
pub struct Batching<D> {
    delegate: D,
    key: u64,
    /// Zero means nothing is pending.
    count: u32,
}

impl<D: Frequency> Batching<D> {
    pub fn new(delegate: D) -> Self {
        Batching {
            delegate,
            key: 0,
            count: 0,
        }
    }

    /// Forwards the pending increment, if any.
    #[inline]
    pub fn flush(&mut self) {
        if self.count > 0 {
            self.delegate.increment(self.key, self.count);
            self.count = 0;
        }
    }

    /// Drops the pending increment without forwarding it.
    pub fn discard(&mut self) {
        self.count = 0;
    }

    /// The pending increment, if any.
    pub fn pending(&self) -> Option<(u64, u32)> {
        (self.count > 0).then_some((self.key, self.count))
    }

    /// The wrapped frequency.  It may lag by the pending increment.
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// Flushes, then unwraps.
    pub fn into_inner(mut self) -> D {
        self.flush();
        self.delegate
    }
}

impl<D: Frequency> Frequency for Batching<D> {
    #[inline]
    fn increment(&mut self, e: u64, count: u32) {
        if count == 0 {
            return;
        }
        if self.count > 0 && e == self.key {
            self.count = self.count.saturating_add(count);
        } else {
            self.flush();
            self.key = e;
            self.count = count;
        }
    }

    #[inline]
    fn frequency(&mut self, e: u64) -> u8 {
        self.flush();
        self.delegate.frequency(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u64, u32)>,
    }

    impl Frequency for Recorder {
        fn increment(&mut self, e: u64, count: u32) {
            self.calls.push((e, count));
        }

        fn frequency(&mut self, e: u64) -> u8 {
            self.calls
                .iter()
                .filter(|(k, _)| *k == e)
                .map(|(_, c)| *c)
                .sum::<u32>()
                .min(15) as u8
        }
    }

    #[test]
    fn consecutive_increments_coalesce() {
        let mut b = Batching::new(Recorder::default());
        for _ in 0..5 {
            b.increment(1, 1);
        }
        assert!(b.delegate().calls.is_empty(), "nothing may be forwarded before a flush");
        assert_eq!(b.pending(), Some((1, 5)));
        b.flush();
        assert_eq!(b.delegate().calls, vec![(1, 5)]);
    }

    #[test]
    fn new_key_flushes_previous() {
        let mut b = Batching::new(Recorder::default());
        b.increment(1, 2);
        b.increment(2, 1);
        b.increment(1, 1);
        assert_eq!(b.delegate().calls, vec![(1, 2), (2, 1)]);
        assert_eq!(b.pending(), Some((1, 1)));
    }

    #[test]
    fn read_flushes_first() {
        let mut b = Batching::new(Recorder::default());
        b.increment(9, 3);
        assert_eq!(b.frequency(9), 3);
        assert_eq!(b.pending(), None);
        // A second read has nothing left to forward.
        b.frequency(9);
        assert_eq!(b.delegate().calls, vec![(9, 3)]);
    }

    #[test]
    fn key_zero_is_not_mistaken_for_empty() {
        let mut b = Batching::new(Recorder::default());
        b.increment(0, 1);
        b.increment(0, 1);
        assert_eq!(b.frequency(0), 2);
        assert_eq!(b.delegate().calls, vec![(0, 2)]);
    }

    #[test]
    fn discard_drops_pending() {
        let mut b = Batching::new(Recorder::default());
        b.increment(4, 2);
        b.discard();
        assert_eq!(b.frequency(4), 0);
        assert!(b.delegate().calls.is_empty());
    }

    #[test]
    fn into_inner_flushes() {
        let mut b = Batching::new(Recorder::default());
        b.increment(4, 2);
        assert_eq!(b.into_inner().calls, vec![(4, 2)]);
    }
}
