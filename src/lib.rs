//! Bounded-memory popularity estimation for cache admission.
//!
//! A doorkeeper Bloom filter absorbs first sightings, a 4-bit count-min
//! sketch counts the rest, and both age themselves once they fill up, so
//! recent activity outweighs old popularity without a clock or a background
//! thread.
//!
//! # Example
//! ```
//! use freqgate::{EstimatorBuilder, Frequency};
//!
//! let mut estimator = EstimatorBuilder::new(1_000).build().unwrap();
//! for _ in 0..3 {
//!     estimator.increment(0xfeed, 1);
//! }
//! assert_eq!(estimator.frequency(0xfeed), 3);
//! assert_eq!(estimator.frequency(0xbeef), 0);
//! ```

mod builder;
mod error;
mod estimator;
mod metrics;
pub mod admission;
pub mod config;
pub mod frequency;
pub mod sketch;

pub use admission::Admittor;
pub use builder::EstimatorBuilder;
pub use config::{DoorkeeperConfig, FrequencyConfig, ResetMode, SketchConfig, UpdateMode};
pub use error::{ConfigError, Result};
pub use estimator::Estimator;
pub use frequency::Frequency;
pub use metrics::stats::{Metrics, TableStats};
pub use sketch::{Doorkeeper, FrequencySketch, MembershipFilter};
