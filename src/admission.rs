//! TinyLFU admission over arbitrary hashable keys.

use std::hash::Hash;
use std::marker::PhantomData;

use ahash::RandomState;

use crate::estimator::Estimator;
use crate::frequency::Frequency;
use crate::metrics::stats::Metrics;

/// Decides whether a new entry deserves the slot of an eviction victim.
///
/// Keys are hashed to a raw `u64` with `ahash` and fed to an [`Estimator`].
/// A cache records every access, then on a full insert asks
/// [`admit`](Self::admit) whether the candidate should replace the victim.
///
/// # Example
/// ```
/// use freqgate::{Admittor, Estimator};
///
/// let mut admittor = Admittor::new(Estimator::builder(100).build().unwrap());
/// for _ in 0..5 {
///     admittor.record("hot");
/// }
/// admittor.record("cold");
/// assert!(!admittor.admit("cold", "hot"));
/// assert!(admittor.admit("hot", "cold"));
/// ```
pub struct Admittor<K: ?Sized> {
    estimator: Estimator,
    /// Hasher used for turning keys into raw estimator input.
    build_hasher: RandomState,
    _key: PhantomData<fn(&K)>,
}

impl<K: Hash + ?Sized> Admittor<K> {
    /// Creates an admittor with a fresh random hasher.
    pub fn new(estimator: Estimator) -> Self {
        Self::with_hasher(estimator, RandomState::new())
    }

    /// Creates an admittor with a caller-supplied hasher.
    ///
    /// Useful when the cache already hashes keys with the same `RandomState`
    /// and wants to call the `*_hash` methods directly.
    pub fn with_hasher(estimator: Estimator, hasher: RandomState) -> Self {
        Admittor {
            estimator,
            build_hasher: hasher,
            _key: PhantomData,
        }
    }

    #[inline]
    pub fn hash_key(&self, key: &K) -> u64 {
        self.build_hasher.hash_one(key)
    }

    pub fn hasher(&self) -> &RandomState {
        &self.build_hasher
    }

    /// Records one access to `key`.
    #[inline]
    pub fn record(&mut self, key: &K) {
        let h = self.hash_key(key);
        self.record_hash(h);
    }

    /// Records one access to a key already hashed with [`hasher`](Self::hasher).
    #[inline]
    pub fn record_hash(&mut self, h: u64) {
        self.estimator.increment(h, 1);
    }

    pub fn frequency(&mut self, key: &K) -> u8 {
        let h = self.hash_key(key);
        self.frequency_hash(h)
    }

    pub fn frequency_hash(&mut self, h: u64) -> u8 {
        self.estimator.frequency(h)
    }

    /// `true` if `candidate` should replace `victim`.  Ties keep the
    /// incumbent.
    pub fn admit(&mut self, candidate: &K, victim: &K) -> bool {
        let candidate = self.hash_key(candidate);
        let victim = self.hash_key(victim);
        self.admit_hash(candidate, victim)
    }

    pub fn admit_hash(&mut self, candidate: u64, victim: u64) -> bool {
        self.frequency_hash(candidate) > self.frequency_hash(victim)
    }

    pub fn metrics(&self) -> Metrics {
        self.estimator.metrics()
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut Estimator {
        &mut self.estimator
    }
}
