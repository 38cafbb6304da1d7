/// A point-in-time view of one bit table and its decay bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStats {
    /// Table length in 64-bit words.
    pub words: usize,
    /// Set bits (doorkeeper) or counter sum (sketch).
    pub occupancy: u64,
    /// Occupancy at which decay fires.
    pub max_occupancy: u64,
    /// Number of decay events since construction.
    pub resets: u64,
}

impl TableStats {
    /// `occupancy / max_occupancy`, or `0.0` for an unallocated table.
    pub fn fill_ratio(&self) -> f64 {
        if self.max_occupancy == 0 {
            0.0
        } else {
            self.occupancy as f64 / self.max_occupancy as f64
        }
    }
}

/// A point-in-time snapshot of an estimator's internal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub doorkeeper: TableStats,
    pub sketch: TableStats,
}

impl Metrics {
    pub fn total_resets(&self) -> u64 {
        self.doorkeeper.resets + self.sketch.resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_ratio_of_empty_table_is_zero() {
        assert_eq!(TableStats::default().fill_ratio(), 0.0);
    }

    #[test]
    fn fill_ratio_divides() {
        let stats = TableStats {
            words: 2,
            occupancy: 32,
            max_occupancy: 64,
            resets: 0,
        };
        assert!((stats.fill_ratio() - 0.5).abs() < 1e-12);
    }
}
