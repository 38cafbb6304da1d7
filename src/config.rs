//! Immutable sizing and policy parameters consumed at construction time.

use ahash::RandomState;

use crate::error::{ConfigError, Result};

/// What a structure does once its occupancy reaches the configured limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// Forget everything at once.
    Full,
    /// Age one word at a time, round-robin, keeping most recent history.
    #[default]
    Partial,
}

/// How the count-min sketch raises its four counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Every probed counter is raised by the full count.
    Regular,
    /// Only counters below the new estimate are raised, and only up to it.
    #[default]
    Conservative,
}

/// Parameters of the doorkeeper (first-sighting Bloom filter).
#[derive(Clone, Debug, PartialEq)]
pub struct DoorkeeperConfig {
    pub expected_insertions: usize,
    /// Fraction of all table bits that may be set before decay fires.
    pub occupancy_ratio: f64,
    pub reset: ResetMode,
}

impl DoorkeeperConfig {
    pub fn new(expected_insertions: usize) -> Self {
        DoorkeeperConfig {
            expected_insertions,
            occupancy_ratio: 0.5,
            reset: ResetMode::Partial,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ConfigError::check_capacity("doorkeeper", self.expected_insertions)?;
        ConfigError::check_ratio("doorkeeper", self.occupancy_ratio)
    }
}

/// Parameters of the 4-bit count-min sketch.
#[derive(Clone, Debug, PartialEq)]
pub struct SketchConfig {
    pub expected_insertions: usize,
    /// Table words per expected insertion (each word holds 16 counters).
    pub counters_multiplier: f64,
    /// Fraction of the total counter capacity (`words * 16 * 15`) that may be
    /// accumulated before decay fires.
    pub occupancy_ratio: f64,
    pub reset: ResetMode,
    pub update: UpdateMode,
}

impl SketchConfig {
    pub fn new(expected_insertions: usize) -> Self {
        SketchConfig {
            expected_insertions,
            counters_multiplier: 1.0,
            occupancy_ratio: 0.5,
            reset: ResetMode::Partial,
            update: UpdateMode::Conservative,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ConfigError::check_capacity("sketch", self.expected_insertions)?;
        if !(self.counters_multiplier.is_finite() && self.counters_multiplier > 0.0) {
            return Err(ConfigError::InvalidMultiplier(self.counters_multiplier));
        }
        ConfigError::check_ratio("sketch", self.occupancy_ratio)
    }

    /// Number of table words requested for `expected_insertions`.
    pub(crate) fn words_for(&self, expected_insertions: usize) -> usize {
        (self.counters_multiplier * expected_insertions as f64) as usize
    }
}

/// Everything the builder needs to assemble an estimator.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyConfig {
    pub doorkeeper: DoorkeeperConfig,
    pub sketch: SketchConfig,
    /// Seed of the outermost key spreader. Must be non-zero.
    pub seed: u64,
}

impl FrequencyConfig {
    pub fn new(expected_insertions: usize) -> Self {
        FrequencyConfig {
            doorkeeper: DoorkeeperConfig::new(expected_insertions),
            sketch: SketchConfig::new(expected_insertions),
            seed: random_seed(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.doorkeeper.validate()?;
        self.sketch.validate()?;
        if self.seed == 0 {
            return Err(ConfigError::ZeroSeed);
        }
        Ok(())
    }
}

/// A fresh per-process seed; never zero.
pub(crate) fn random_seed() -> u64 {
    RandomState::new().hash_one(0x9e37_79b9_7f4a_7c15_u64) | 1
}
