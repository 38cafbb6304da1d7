use super::Frequency;
use crate::sketch::MembershipFilter;

/// Keeps one-hit wonders out of the delegate.
///
/// The first sighting of a key is recorded in the filter only; the delegate
/// sees a key from its second occurrence on.  Reads add the absorbed
/// occurrence back, so any key seen at least once reports at least 1 and a
/// key the filter has never seen reports 0.
///
/// The `-1` on write and the `+1` on read belong together: changing one
/// without the other shifts every estimate.
pub struct Gated<D, F> {
    delegate: D,
    filter: F,
}

impl<D: Frequency, F: MembershipFilter> Gated<D, F> {
    pub fn new(delegate: D, filter: F) -> Self {
        Gated { delegate, filter }
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }

    pub fn into_parts(self) -> (D, F) {
        (self.delegate, self.filter)
    }
}

impl<D: Frequency, F: MembershipFilter> Frequency for Gated<D, F> {
    fn increment(&mut self, e: u64, count: u32) {
        if count == 0 {
            return;
        }
        let count = if self.filter.put(e) { count - 1 } else { count };
        if count == 0 {
            return;
        }
        self.delegate.increment(e, count);
    }

    fn frequency(&mut self, e: u64) -> u8 {
        if !self.filter.might_contain(e) {
            return 0;
        }
        self.delegate.frequency(e).saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use ahash::{AHashMap, AHashSet};

    use super::*;

    /// Exact filter, so tests are not at the mercy of false positives.
    #[derive(Default)]
    struct ExactFilter(AHashSet<u64>);

    impl MembershipFilter for ExactFilter {
        fn put(&mut self, e: u64) -> bool {
            self.0.insert(e)
        }

        fn might_contain(&self, e: u64) -> bool {
            self.0.contains(&e)
        }

        fn clear(&mut self) {
            self.0.clear();
        }
    }

    /// Exact counter recording every forwarded call.
    #[derive(Default)]
    struct Recorder {
        counts: AHashMap<u64, u32>,
        calls: Vec<(u64, u32)>,
    }

    impl Frequency for Recorder {
        fn increment(&mut self, e: u64, count: u32) {
            self.calls.push((e, count));
            *self.counts.entry(e).or_default() += count;
        }

        fn frequency(&mut self, e: u64) -> u8 {
            self.counts.get(&e).copied().unwrap_or(0).min(15) as u8
        }
    }

    fn make() -> Gated<Recorder, ExactFilter> {
        Gated::new(Recorder::default(), ExactFilter::default())
    }

    #[test]
    fn unseen_key_reads_zero() {
        let mut g = make();
        assert_eq!(g.frequency(7), 0);
    }

    #[test]
    fn first_sighting_is_absorbed() {
        let mut g = make();
        g.increment(7, 1);
        assert!(g.delegate().calls.is_empty(), "first sighting must not reach the delegate");
        assert_eq!(g.frequency(7), 1, "absorbed occurrence must be added back exactly once");
    }

    #[test]
    fn repeat_sightings_are_forwarded() {
        let mut g = make();
        for _ in 0..4 {
            g.increment(7, 1);
        }
        assert_eq!(g.delegate().calls, vec![(7, 1), (7, 1), (7, 1)]);
        assert_eq!(g.frequency(7), 4);
    }

    #[test]
    fn first_batch_loses_only_one() {
        let mut g = make();
        g.increment(7, 5);
        assert_eq!(g.delegate().calls, vec![(7, 4)]);
        assert_eq!(g.frequency(7), 5);
    }

    #[test]
    fn zero_count_touches_nothing() {
        let mut g = make();
        g.increment(7, 0);
        assert!(!g.filter().might_contain(7));
        assert!(g.delegate().calls.is_empty());
    }

    #[test]
    fn cleared_filter_absorbs_again() {
        let mut g = make();
        g.increment(7, 1);
        g.increment(7, 1);
        g.filter_mut().clear();
        assert_eq!(g.frequency(7), 0, "filter no longer vouches for the key");
        g.increment(7, 1);
        assert_eq!(g.delegate().calls, vec![(7, 1)]);
        assert_eq!(g.frequency(7), 2);
    }
}
