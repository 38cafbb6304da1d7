//! Hit-rate comparison: FIFO with and without TinyLFU admission.
//!
//! Uses a Zipf(s=1.0) access trace, the standard academic benchmark for
//! cache admission policies.  The same trace is replayed against each cache
//! so the comparison is fair.
//!
//! Run with:
//!     cargo run --example hit_rate --release

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ahash::AHashSet;
use freqgate::{Admittor, EstimatorBuilder};

/// Cache capacity (number of unique entries each cache may hold).
const CAP: usize = 10_000;
/// Key universe size.  CAP is 10 % of POOL, a moderately hard workload.
const POOL: usize = 100_000;
/// Number of accesses in the trace.
const TRACE: usize = 500_000;

// ---------------------------------------------------------------------------
// Zipf(s=1.0) sampler, no external dependency required.
//
// Inverse-CDF derivation:
//   P(X ≤ k) ≈ ln(k) / ln(N)   for large N
//   ⟹  k = N^u  where u ~ Uniform[0,1]
// ---------------------------------------------------------------------------

struct Xorshift64(u64);

impl Xorshift64 {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    /// Returns a uniform float in (0, 1].
    fn uniform(&mut self) -> f64 {
        let bits = self.next() >> 11;
        (bits + 1) as f64 / (1u64 << 53) as f64
    }

    /// Zipf(s=1) sample in [0, pool).
    fn zipf(&mut self, pool: usize) -> usize {
        let u = self.uniform();
        let k = (pool as f64).powf(u) as usize;
        k.saturating_sub(1).min(pool - 1)
    }
}

fn generate_trace(seed: u64, pool: usize, len: usize) -> Vec<usize> {
    let mut rng = Xorshift64(seed);
    (0..len).map(|_| rng.zipf(pool)).collect()
}

// ---------------------------------------------------------------------------
// A FIFO cache, optionally gated by an admittor
// ---------------------------------------------------------------------------

struct FifoCache {
    queue: VecDeque<usize>,
    present: AHashSet<usize>,
    admittor: Option<Admittor<usize>>,
}

impl FifoCache {
    fn new(admittor: Option<Admittor<usize>>) -> Self {
        FifoCache {
            queue: VecDeque::with_capacity(CAP),
            present: AHashSet::with_capacity(CAP),
            admittor,
        }
    }

    /// Returns `true` on a hit.
    fn access(&mut self, key: usize) -> bool {
        if let Some(admittor) = self.admittor.as_mut() {
            admittor.record(&key);
        }
        if self.present.contains(&key) {
            return true;
        }

        if self.queue.len() >= CAP {
            let victim = self.queue[0];
            let admit = match self.admittor.as_mut() {
                Some(admittor) => admittor.admit(&key, &victim),
                None => true,
            };
            if !admit {
                return false;
            }
            self.queue.pop_front();
            self.present.remove(&victim);
        }
        self.queue.push_back(key);
        self.present.insert(key);
        false
    }
}

fn run(name: &str, mut cache: FifoCache, trace: &[usize]) {
    let start = Instant::now();
    let hits = trace.iter().filter(|&&key| cache.access(key)).count();
    print_row(name, hits, start.elapsed());
    if let Some(admittor) = &cache.admittor {
        let m = admittor.metrics();
        println!(
            "{:<14} doorkeeper resets {}, sketch resets {}",
            "", m.doorkeeper.resets, m.sketch.resets
        );
    }
}

fn print_row(name: &str, hits: usize, elapsed: Duration) {
    println!(
        "{:<14} {:>10} {:>9.2}% {:>12}",
        name,
        hits,
        hits as f64 / TRACE as f64 * 100.0,
        elapsed.as_millis(),
    );
}

fn main() {
    println!("  Distribution : Zipf(s = 1.0)");
    println!("  Key universe : {POOL:>10} unique keys");
    println!(
        "  Capacity     : {CAP:>10} entries  ({:.0}% of universe)",
        CAP as f64 / POOL as f64 * 100.0
    );
    println!("  Trace length : {TRACE:>10} accesses");
    println!();
    let trace = generate_trace(0xDEAD_BEEF_1234_5678, POOL, TRACE);

    println!("{:<14} {:>10} {:>10} {:>12}", "Cache", "Hits", "Hit Rate", "Time (ms)");
    println!("{}", "─".repeat(49));

    run("FIFO", FifoCache::new(None), &trace);

    let estimator = match EstimatorBuilder::new(CAP).build() {
        Ok(estimator) => estimator,
        Err(err) => {
            eprintln!("invalid estimator configuration: {err}");
            return;
        }
    };
    run("FIFO+TinyLFU", FifoCache::new(Some(Admittor::new(estimator))), &trace);
}
