//! The frequency capability and the layers that compose it.
//!
//! An estimator is a fixed stack of owned layers, outermost first:
//!
//! ```text
//! Spreading -> Gated -> Batching -> FrequencySketch
//! ```
//!
//! Every layer implements [`Frequency`] and owns its delegate by value, so
//! the whole stack is a single concrete type with no dynamic dispatch.

pub mod batching;
pub mod gated;
pub mod spreading;

pub use batching::Batching;
pub use gated::Gated;
pub use spreading::Spreading;

/// A multiset for estimating the popularity of an element.
///
/// All methods are called single-threadedly; implementors are not required
/// to be `Sync`.
pub trait Frequency {
    /// Adds `count` occurrences of `e`.  A zero count is a no-op.
    fn increment(&mut self, e: u64, count: u32);

    /// Estimated number of times `e` was seen.
    ///
    /// Takes `&mut self` because buffering layers flush before reading.
    fn frequency(&mut self, e: u64) -> u8;
}
