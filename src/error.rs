use thiserror::Error;

/// Result type for estimator construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Rejected configuration.
///
/// Only construction and builder validation produce these; once an estimator
/// exists every operation on it is total.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid {name}: expected insertions must be greater than 0, got {value}")]
    InvalidCapacity { name: &'static str, value: usize },

    #[error("invalid {name}: occupancy ratio must lie strictly between 0 and 1, got {value}")]
    InvalidRatio { name: &'static str, value: f64 },

    #[error("invalid counters multiplier: must be finite and positive, got {0}")]
    InvalidMultiplier(f64),

    #[error("random seed must be non-zero")]
    ZeroSeed,
}

impl ConfigError {
    pub(crate) fn check_capacity(name: &'static str, value: usize) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::InvalidCapacity { name, value });
        }
        Ok(())
    }

    pub(crate) fn check_ratio(name: &'static str, value: f64) -> Result<()> {
        // NaN fails both comparisons.
        if !(value > 0.0 && value < 1.0) {
            return Err(ConfigError::InvalidRatio { name, value });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_bounds_are_exclusive() {
        assert!(ConfigError::check_ratio("r", 0.0).is_err());
        assert!(ConfigError::check_ratio("r", 1.0).is_err());
        assert!(ConfigError::check_ratio("r", f64::NAN).is_err());
        assert!(ConfigError::check_ratio("r", 0.5).is_ok());
    }

    #[test]
    fn message_names_the_field() {
        let err = ConfigError::check_capacity("doorkeeper", 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid doorkeeper: expected insertions must be greater than 0, got 0"
        );
    }
}
