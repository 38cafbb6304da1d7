use crate::builder::EstimatorBuilder;
use crate::config::FrequencyConfig;
use crate::error::Result;
use crate::frequency::{Batching, Frequency, Gated, Spreading};
use crate::metrics::stats::Metrics;
use crate::sketch::{Doorkeeper, FrequencySketch, MembershipFilter};

type Stack = Spreading<Gated<Batching<FrequencySketch>, Doorkeeper>>;

/// The assembled frequency estimator.
///
/// Raw 64-bit keys go through the spreader exactly once, then the
/// doorkeeper gate, the write batcher and finally the count-min sketch.
/// Estimates are in `[0, 16]`: the sketch saturates at 15 and the gate adds
/// back the first sighting it absorbed.
///
/// Not thread-safe.  Give each shard its own estimator or serialize access
/// externally.
///
/// # Example
/// ```
/// use freqgate::{Estimator, Frequency};
///
/// let mut estimator = Estimator::builder(1_000).seed(42).build().unwrap();
/// assert_eq!(estimator.frequency(7), 0);
/// estimator.increment(7, 1);
/// estimator.increment(7, 1);
/// assert_eq!(estimator.frequency(7), 2);
/// ```
pub struct Estimator {
    stack: Stack,
    counters_multiplier: f64,
}

impl Estimator {
    pub(crate) fn new(config: &FrequencyConfig) -> Result<Self> {
        config.validate()?;
        let doorkeeper = Doorkeeper::new(&config.doorkeeper)?;
        let sketch = FrequencySketch::new(&config.sketch)?;
        let stack = Spreading::new(Gated::new(Batching::new(sketch), doorkeeper), config.seed);
        Ok(Estimator {
            stack,
            counters_multiplier: config.sketch.counters_multiplier,
        })
    }

    /// Returns an [`EstimatorBuilder`] with defaults for `expected_insertions`.
    pub fn builder(expected_insertions: usize) -> EstimatorBuilder {
        EstimatorBuilder::new(expected_insertions)
    }

    /// Grows the doorkeeper and the sketch, if needed, for
    /// `expected_insertions` keys.  A structure that grows forgets its
    /// history; one that is already large enough is left untouched.
    pub fn ensure_capacity(&mut self, expected_insertions: usize) {
        let words = (self.counters_multiplier * expected_insertions as f64) as usize;
        let gated = self.stack.delegate_mut();
        gated.filter_mut().ensure_capacity(expected_insertions);
        let batching = gated.delegate_mut();
        batching.flush();
        batching.delegate_mut().ensure_capacity(words);
    }

    /// Forgets every key, including a pending batched increment.
    pub fn clear(&mut self) {
        let gated = self.stack.delegate_mut();
        gated.filter_mut().clear();
        let batching = gated.delegate_mut();
        batching.discard();
        batching.delegate_mut().clear();
    }

    /// Snapshot of the doorkeeper and sketch tables.  Sketch figures do not
    /// include a still pending batched increment.
    pub fn metrics(&self) -> Metrics {
        let gated = self.stack.delegate();
        Metrics {
            doorkeeper: gated.filter().stats(),
            sketch: gated.delegate().delegate().stats(),
        }
    }
}

impl Frequency for Estimator {
    #[inline]
    fn increment(&mut self, e: u64, count: u32) {
        self.stack.increment(e, count);
    }

    #[inline]
    fn frequency(&mut self, e: u64) -> u8 {
        self.stack.frequency(e)
    }
}
