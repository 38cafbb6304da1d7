use tracing::debug;

use crate::config::{FrequencyConfig, ResetMode, UpdateMode};
use crate::error::Result;
use crate::estimator::Estimator;

/// Builder for configuring and constructing an [`Estimator`].
///
/// Setters never fail; [`build`](Self::build) validates the whole
/// configuration at once.
///
/// # Example
/// ```
/// use freqgate::{EstimatorBuilder, ResetMode, UpdateMode};
///
/// let estimator = EstimatorBuilder::new(10_000)
///     .counters_multiplier(2.0)
///     .update(UpdateMode::Conservative)
///     .reset(ResetMode::Partial)
///     .build()
///     .unwrap();
/// assert_eq!(estimator.metrics().sketch.words, 32_768);
/// ```
pub struct EstimatorBuilder {
    config: FrequencyConfig,
}

impl EstimatorBuilder {
    /// Sizes both the doorkeeper and the sketch for `expected_insertions`
    /// keys, with a fresh random seed.
    pub fn new(expected_insertions: usize) -> Self {
        EstimatorBuilder {
            config: FrequencyConfig::new(expected_insertions),
        }
    }

    /// Starts from a complete configuration.
    pub fn from_config(config: FrequencyConfig) -> Self {
        EstimatorBuilder { config }
    }

    /// Expected insertions for both structures.
    pub fn expected_insertions(mut self, n: usize) -> Self {
        self.config.doorkeeper.expected_insertions = n;
        self.config.sketch.expected_insertions = n;
        self
    }

    pub fn doorkeeper_insertions(mut self, n: usize) -> Self {
        self.config.doorkeeper.expected_insertions = n;
        self
    }

    pub fn sketch_insertions(mut self, n: usize) -> Self {
        self.config.sketch.expected_insertions = n;
        self
    }

    /// Decay mode for both structures.
    pub fn reset(mut self, mode: ResetMode) -> Self {
        self.config.doorkeeper.reset = mode;
        self.config.sketch.reset = mode;
        self
    }

    pub fn doorkeeper_reset(mut self, mode: ResetMode) -> Self {
        self.config.doorkeeper.reset = mode;
        self
    }

    pub fn sketch_reset(mut self, mode: ResetMode) -> Self {
        self.config.sketch.reset = mode;
        self
    }

    /// Fraction of the doorkeeper's bits that may be set before it decays.
    pub fn doorkeeper_occupancy_ratio(mut self, ratio: f64) -> Self {
        self.config.doorkeeper.occupancy_ratio = ratio;
        self
    }

    /// Fraction of the sketch's counter capacity that may be used before it
    /// decays.
    pub fn sketch_occupancy_ratio(mut self, ratio: f64) -> Self {
        self.config.sketch.occupancy_ratio = ratio;
        self
    }

    /// Sketch words allocated per expected insertion.
    pub fn counters_multiplier(mut self, multiplier: f64) -> Self {
        self.config.sketch.counters_multiplier = multiplier;
        self
    }

    pub fn update(mut self, mode: UpdateMode) -> Self {
        self.config.sketch.update = mode;
        self
    }

    /// Fixes the spreader seed, e.g. for reproducible tests.  Must be
    /// non-zero.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config(&self) -> &FrequencyConfig {
        &self.config
    }

    pub fn build(self) -> Result<Estimator> {
        let estimator = Estimator::new(&self.config)?;
        let metrics = estimator.metrics();
        debug!(
            doorkeeper_words = metrics.doorkeeper.words,
            sketch_words = metrics.sketch.words,
            update = ?self.config.sketch.update,
            doorkeeper_reset = ?self.config.doorkeeper.reset,
            sketch_reset = ?self.config.sketch.reset,
            "frequency estimator assembled"
        );
        Ok(estimator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn shared_setters_touch_both_structures() {
        let b = EstimatorBuilder::new(10)
            .expected_insertions(500)
            .reset(ResetMode::Full);
        assert_eq!(b.config().doorkeeper.expected_insertions, 500);
        assert_eq!(b.config().sketch.expected_insertions, 500);
        assert_eq!(b.config().doorkeeper.reset, ResetMode::Full);
        assert_eq!(b.config().sketch.reset, ResetMode::Full);
    }

    #[test]
    fn specific_setters_override() {
        let b = EstimatorBuilder::new(10)
            .reset(ResetMode::Full)
            .sketch_reset(ResetMode::Partial)
            .sketch_insertions(64);
        assert_eq!(b.config().doorkeeper.reset, ResetMode::Full);
        assert_eq!(b.config().sketch.reset, ResetMode::Partial);
        assert_eq!(b.config().doorkeeper.expected_insertions, 10);
        assert_eq!(b.config().sketch.expected_insertions, 64);
    }

    #[test]
    fn build_rejects_bad_ratio() {
        let err = EstimatorBuilder::new(10)
            .doorkeeper_occupancy_ratio(1.0)
            .build()
            .err();
        assert_eq!(
            err,
            Some(ConfigError::InvalidRatio {
                name: "doorkeeper",
                value: 1.0
            })
        );
    }

    #[test]
    fn build_rejects_zero_seed() {
        assert_eq!(EstimatorBuilder::new(10).seed(0).build().err(), Some(ConfigError::ZeroSeed));
    }

    #[test]
    fn build_rejects_zero_capacity() {
        assert!(EstimatorBuilder::new(10).sketch_insertions(0).build().is_err());
    }
}
