use chrono::Utc;
use common::{DistributionTable, EventCategory, UrgencyDistribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Level returned when `r` lands beyond the table's cumulative weight.
pub const FALLBACK_URGENCY: u8 = 1;

/// Inverse-CDF walk over `(level, weight)` pairs in table order.
pub fn sample_level(distribution: &UrgencyDistribution, r: f64) -> u8 {
    let mut remaining = r;
    for &(level, weight) in distribution.entries() {
        if remaining < weight {
            return level;
        }
        remaining -= weight;
    }
    FALLBACK_URGENCY
}

/// Run seed taken from the wall clock, used when none is configured.
pub fn time_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros()) as u64
}

/// Seed for one category's stream, derived from the run seed.
pub fn stream_seed(run_seed: u64, category: EventCategory) -> u64 {
    run_seed ^ (category.code() as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Draws urgency levels for a stream. Each stream owns its own generator.
pub struct UrgencySampler<R = StdRng> {
    table: Arc<DistributionTable>,
    rng: R,
}

impl UrgencySampler<StdRng> {
    pub fn seeded(table: Arc<DistributionTable>, run_seed: u64, category: EventCategory) -> Self {
        Self::new(table, StdRng::seed_from_u64(stream_seed(run_seed, category)))
    }
}

impl<R: Rng> UrgencySampler<R> {
    pub fn new(table: Arc<DistributionTable>, rng: R) -> Self {
        Self { table, rng }
    }

    /// Maps a uniform value in `[0, 1)` to a level of `category`'s distribution.
    pub fn sample(&self, category: EventCategory, r: f64) -> u8 {
        sample_level(self.table.distribution_for(category), r)
    }

    pub fn draw(&mut self, category: EventCategory) -> u8 {
        let r: f64 = self.rng.gen();
        self.sample(category, r)
    }
}
